// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Device transports.
//!
//! A transport takes a framed CDB, runs it against the device and hands back
//! the sense bytes (if the device reported an error) and the returned
//! payload. Anything that goes wrong before a device-level answer exists is a
//! [`TransportError`].

use std::{future::Future, io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Replays a previously written capture file.
pub mod replay;
/// Linux SCSI generic (`SG_IO`) pass-through.
#[cfg(target_os = "linux")]
pub mod sg;

/// Data phase direction of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    ToDevice,
    FromDevice,
}

/// Device-level result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Present iff the device signaled an error status.
    pub sense: Option<Vec<u8>>,
    /// At most `capacity` bytes.
    pub data: Vec<u8>,
}

impl Completion {
    pub fn good(data: Vec<u8>) -> Self {
        Self { sense: None, data }
    }

    pub fn check_condition(sense: Vec<u8>) -> Self {
        Self {
            sense: Some(sense),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("SG_IO ioctl failed: {0}")]
    Ioctl(#[source] io::Error),
    #[error("blocking worker failed: {0}")]
    Worker(String),
    #[error("command {0} is not present in the capture")]
    NotRecorded(String),
    #[error("submission failed (replayed)")]
    ReplayedFailure,
    #[error("no submitted command awaits a result")]
    NoPending,
}

/// Knobs handed to a transport at construction.
///
/// `trace_exchanges` turns on hex dumps of every command and completion at
/// debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub trace_exchanges: bool,
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            trace_exchanges: false,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Two-step submission contract: `submit` hands the command over and waits
/// for transport completion, `read_result` collects what the device said.
///
/// Either call failing means no device-level response exists for the command.
pub trait ScsiTransport {
    fn submit(
        &mut self,
        cdb: &[u8],
        capacity: usize,
        direction: Direction,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn read_result(&mut self) -> impl Future<Output = Result<Completion, TransportError>> + Send;
}
