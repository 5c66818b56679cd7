// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `SG_IO` pass-through for `/dev/sg*` and block device nodes.
//!
//! The ioctl blocks until the device answers or the kernel timeout fires, so
//! it runs on tokio's blocking pool while the walker awaits it.

use std::{
    fs::{File, OpenOptions},
    io,
    os::{fd::AsRawFd, raw::c_void},
    path::{Path, PathBuf},
    sync::Arc,
};

use libc::{c_int, c_uint, c_ushort};
use tracing::debug;

use crate::transport::{
    Completion, Direction, ScsiTransport, TransportError, TransportOptions,
};

const SG_IO: libc::c_ulong = 0x2285;
const SG_INTERFACE_ID: c_int = b'S' as c_int;

const SG_DXFER_NONE: c_int = -1;
const SG_DXFER_TO_DEV: c_int = -2;
const SG_DXFER_FROM_DEV: c_int = -3;

const SG_INFO_OK_MASK: c_uint = 0x1;
const SG_INFO_OK: c_uint = 0x0;

const SENSE_BUF_LEN: usize = 64;

/// `struct sg_io_hdr` from `<scsi/sg.h>`.
#[repr(C)]
struct SgIoHdr {
    interface_id: c_int,
    dxfer_direction: c_int,
    cmd_len: u8,
    mx_sb_len: u8,
    iovec_count: c_ushort,
    dxfer_len: c_uint,
    dxferp: *mut c_void,
    cmdp: *mut u8,
    sbp: *mut u8,
    timeout: c_uint,
    flags: c_uint,
    pack_id: c_int,
    usr_ptr: *mut c_void,
    status: u8,
    masked_status: u8,
    msg_status: u8,
    sb_len_wr: u8,
    host_status: c_ushort,
    driver_status: c_ushort,
    resid: c_int,
    duration: c_uint,
    info: c_uint,
}

fn dxfer_direction(direction: Direction) -> c_int {
    match direction {
        Direction::None => SG_DXFER_NONE,
        Direction::ToDevice => SG_DXFER_TO_DEV,
        Direction::FromDevice => SG_DXFER_FROM_DEV,
    }
}

fn sg_io(
    file: &File,
    mut cdb: Vec<u8>,
    capacity: usize,
    direction: Direction,
    timeout_ms: c_uint,
) -> io::Result<Completion> {
    let cmd_len = u8::try_from(cdb.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "CDB longer than 255"))?;
    let dxfer_len = c_uint::try_from(capacity)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "capacity too large"))?;

    let mut data = vec![0u8; capacity];
    let mut sense = [0u8; SENSE_BUF_LEN];

    let mut hdr = SgIoHdr {
        interface_id: SG_INTERFACE_ID,
        dxfer_direction: dxfer_direction(direction),
        cmd_len,
        mx_sb_len: SENSE_BUF_LEN as u8,
        iovec_count: 0,
        dxfer_len,
        dxferp: data.as_mut_ptr().cast(),
        cmdp: cdb.as_mut_ptr(),
        sbp: sense.as_mut_ptr(),
        timeout: timeout_ms,
        flags: 0,
        pack_id: 0,
        usr_ptr: std::ptr::null_mut(),
        status: 0,
        masked_status: 0,
        msg_status: 0,
        sb_len_wr: 0,
        host_status: 0,
        driver_status: 0,
        resid: 0,
        duration: 0,
        info: 0,
    };

    // SAFETY: every pointer in `hdr` refers to a live buffer of the declared
    // length that outlives the ioctl call.
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), SG_IO as _, &mut hdr as *mut SgIoHdr) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    let resid = usize::try_from(hdr.resid.max(0)).unwrap_or(0);
    data.truncate(capacity.saturating_sub(resid));

    let sense = if hdr.info & SG_INFO_OK_MASK != SG_INFO_OK {
        let n = (hdr.sb_len_wr as usize).min(SENSE_BUF_LEN);
        Some(sense[..n].to_vec())
    } else {
        None
    };

    debug!(
        status = hdr.status,
        host_status = hdr.host_status,
        driver_status = hdr.driver_status,
        duration_ms = hdr.duration,
        "SG_IO completed"
    );

    Ok(Completion { sense, data })
}

/// Linux SCSI generic transport bound to one open device node.
#[derive(Debug)]
pub struct SgTransport {
    path: PathBuf,
    file: Arc<File>,
    opts: TransportOptions,
    pending: Option<Completion>,
}

impl SgTransport {
    pub fn open(path: impl AsRef<Path>, opts: TransportOptions) -> Result<Self, TransportError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Arc::new(file),
            opts,
            pending: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScsiTransport for SgTransport {
    async fn submit(
        &mut self,
        cdb: &[u8],
        capacity: usize,
        direction: Direction,
    ) -> Result<(), TransportError> {
        self.pending = None;
        if self.opts.trace_exchanges {
            debug!(cdb = %hex::encode(cdb), capacity, "submit");
        }

        let file = Arc::clone(&self.file);
        let cdb = cdb.to_vec();
        let timeout_ms = c_uint::try_from(self.opts.timeout.as_millis()).unwrap_or(c_uint::MAX);

        let completion = tokio::task::spawn_blocking(move || {
            sg_io(&file, cdb, capacity, direction, timeout_ms)
        })
        .await
        .map_err(|e| TransportError::Worker(e.to_string()))?
        .map_err(TransportError::Ioctl)?;

        self.pending = Some(completion);
        Ok(())
    }

    async fn read_result(&mut self) -> Result<Completion, TransportError> {
        let completion = self.pending.take().ok_or(TransportError::NoPending)?;
        if self.opts.trace_exchanges {
            debug!(
                sense = %completion.sense.as_deref().map(hex::encode).unwrap_or_default(),
                data = %hex::encode(&completion.data),
                "result"
            );
        }
        Ok(completion)
    }
}
