// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Largest CDB any filler in this crate writes (variable-length CDBs top out
/// at 32 bytes).
pub const CDB_MAX_LEN: usize = 32;

/// Caller-owned scratch buffer every filler writes into.
pub type CdbBuf = [u8; CDB_MAX_LEN];

/// Returns a zeroed CDB buffer.
#[inline]
pub const fn new_cdb() -> CdbBuf {
    [0u8; CDB_MAX_LEN]
}

/// Write a big-endian `u16` at `cdb[off..off + 2]`.
#[inline]
pub(crate) fn put_u16(cdb: &mut CdbBuf, off: usize, v: u16) {
    cdb[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

/// Write a big-endian `u32` at `cdb[off..off + 4]`.
#[inline]
pub(crate) fn put_u32(cdb: &mut CdbBuf, off: usize, v: u32) {
    cdb[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

/// Clamp a host-side buffer size to a CDB allocation-length field width.
#[inline]
pub fn alloc_len_u16(capacity: usize) -> u16 {
    u16::try_from(capacity).unwrap_or(u16::MAX)
}

#[inline]
pub fn alloc_len_u8(capacity: usize) -> u8 {
    u8::try_from(capacity).unwrap_or(u8::MAX)
}

#[inline]
pub fn alloc_len_u32(capacity: usize) -> u32 {
    u32::try_from(capacity).unwrap_or(u32::MAX)
}
