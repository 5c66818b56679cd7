// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! RECEIVE DIAGNOSTIC RESULTS (6): CDB filler.
//!
//! CDB layout (SPC-4):
//!   [0]    = 0x1C
//!   [1]    = PCV (bit 0): page code field is valid
//!   [2]    = PAGE CODE
//!   [3..5] = ALLOCATION LENGTH (big-endian u16)
//!   [5]    = CONTROL

use crate::control_block::common::{CdbBuf, put_u16};

pub const RECEIVE_DIAGNOSTIC_RESULTS: u8 = 0x1C;

/// Diagnostic page 0x00 lists the supported diagnostic pages.
pub const SUPPORTED_DIAGNOSTIC_PAGES: u8 = 0x00;

#[inline]
pub fn fill_receive_diagnostics(
    cdb: &mut CdbBuf,
    pcv: bool,
    page_code: u8,
    allocation_len: u16,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = RECEIVE_DIAGNOSTIC_RESULTS;
    cdb[1] = pcv as u8;
    cdb[2] = page_code;
    put_u16(cdb, 3, allocation_len);
    cdb[5] = control;
    6
}
