// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Result, anyhow};
use zerocopy::{
    FromBytes, Immutable, KnownLayout,
    byteorder::{BigEndian, U32, U64},
};

use crate::control_block::common::{CdbBuf, put_u32};

pub const READ_CAPACITY_10: u8 = 0x25;
pub const SERVICE_ACTION_IN_16: u8 = 0x9E;
pub const SA_READ_CAPACITY_16: u8 = 0x10;

/// Fill a **SCSI READ CAPACITY(10)** CDB (opcode 0x25). Returns 10.
///
/// Parameters:
/// - `lba`     : 32-bit LBA hint (meaningful only when `pmi` = true; else set
///   0)
/// - `pmi`     : Partial Medium Indicator (true => return info for `lba`)
/// - `control` : CONTROL byte
///
/// With `pmi = false`, targets return the **maximum LBA** and the **logical
/// block length** (8-byte response). A Max LBA of `0xFFFF_FFFF` hints that
/// READ CAPACITY(16) is required.
#[inline]
pub fn fill_read_capacity10(cdb: &mut CdbBuf, lba: u32, pmi: bool, control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = READ_CAPACITY_10;
    put_u32(cdb, 2, lba); // only used if PMI=1
    cdb[8] = pmi as u8; // PMI bit (bit 0)
    cdb[9] = control;
    10
}

/// Fill a **SCSI READ CAPACITY(16)** CDB via SERVICE ACTION IN(16)
/// (opcode 0x9E, SA=0x10). Returns 16.
///
/// - `alloc_len` : Allocation length for the parameter data (big-endian).
///   32 bytes cover the full parameter data; larger values are allowed.
#[inline]
pub fn fill_read_capacity16(
    cdb: &mut CdbBuf,
    lba: u64,
    pmi: bool,
    alloc_len: u32,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = SERVICE_ACTION_IN_16;
    cdb[1] = SA_READ_CAPACITY_16;
    cdb[2..10].copy_from_slice(&lba.to_be_bytes()); // only used if PMI=1
    put_u32(cdb, 10, alloc_len);
    cdb[14] = pmi as u8;
    cdb[15] = control;
    16
}

/// Raw 8-byte parameter data returned by READ CAPACITY(10).
#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Debug)]
pub struct Rc10Raw {
    /// Maximum logical block address (bytes 0-3)
    pub max_lba: U32<BigEndian>,
    /// Block length in bytes (bytes 4-7)
    pub block_len: U32<BigEndian>,
}

/// Raw header (first 12 bytes) of READ CAPACITY(16) parameter data.
#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Debug)]
pub struct Rc16Raw {
    /// Maximum logical block address (bytes 0-7)
    pub max_lba: U64<BigEndian>,
    /// Block length in bytes (bytes 8-11)
    pub block_len: U32<BigEndian>,
}

impl Rc10Raw {
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        (self.max_lba.get() as u64 + 1) * self.block_len.get() as u64
    }

    /// If true, target likely needs READ CAPACITY(16).
    #[inline]
    pub fn indicates_overflow(&self) -> bool {
        self.max_lba.get() == u32::MAX
    }
}

impl Rc16Raw {
    #[inline]
    pub fn total_bytes(&self) -> u128 {
        (self.max_lba.get() as u128 + 1) * self.block_len.get() as u128
    }
}

/// Parse READ CAPACITY(10) parameter data (needs ≥ 8 bytes).
#[inline]
pub fn parse_read_capacity10_zerocopy(buf: &[u8]) -> Result<&Rc10Raw> {
    let (raw, _rest) = Rc10Raw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("READ CAPACITY(10): need ≥ 8 bytes, got {}", buf.len()))?;
    Ok(raw)
}

/// Parse READ CAPACITY(16) parameter data head (needs ≥ 12 bytes).
#[inline]
pub fn parse_read_capacity16_zerocopy(buf: &[u8]) -> Result<&Rc16Raw> {
    let (raw, _rest) = Rc16Raw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("READ CAPACITY(16): need ≥ 12 bytes, got {}", buf.len()))?;
    Ok(raw)
}
