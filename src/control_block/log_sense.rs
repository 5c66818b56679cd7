// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! LOG SENSE (10): CDB filler written into a provided CDB buffer.
//!
//! CDB layout (SPC-4):
//!   [0]    = 0x4D (LOG SENSE)
//!   [1]    = SP (bit 0), other bits obsolete/reserved
//!   [2]    = PC (7..6) | PAGE CODE (5..0)
//!   [3]    = SUBPAGE CODE
//!   [4]    = reserved
//!   [5..7] = PARAMETER POINTER (big-endian u16)
//!   [7..9] = ALLOCATION LENGTH (big-endian u16)
//!   [9]    = CONTROL

use crate::control_block::common::{CdbBuf, put_u16};

pub const LOG_SENSE: u8 = 0x4D;
pub const LOG_SENSE_CDB_LEN: usize = 10;

/// Page 0x00 is the directory of supported pages (and, with subpage 0xFF,
/// of supported page/subpage pairs).
pub const SUPPORTED_PAGES: u8 = 0x00;
pub const ALL_SUBPAGES: u8 = 0xFF;

/// Page Control for LOG SENSE byte 2 (bits 7..6).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum LogPageControl {
    ThresholdValues = 0b00,
    CumulativeValues = 0b01,
    DefaultThreshold = 0b10,
    DefaultCumulative = 0b11,
}

/// Fill a LOG SENSE CDB into `cdb[0..10]`.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn fill_log_sense(
    cdb: &mut CdbBuf,
    save_parameters: bool,
    pc: LogPageControl,
    page_code: u8,
    subpage_code: u8,
    parameter_pointer: u16,
    allocation_len: u16,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = LOG_SENSE;
    cdb[1] = save_parameters as u8;
    cdb[2] = ((pc as u8) << 6) | (page_code & 0x3F);
    cdb[3] = subpage_code;
    put_u16(cdb, 5, parameter_pointer);
    put_u16(cdb, 7, allocation_len);
    cdb[9] = control;
    LOG_SENSE_CDB_LEN
}

/// Convenience: cumulative values, SP=0, parameter pointer 0, control 0.
#[inline]
pub fn fill_log_sense_simple(
    cdb: &mut CdbBuf,
    page_code: u8,
    subpage_code: u8,
    allocation_len: u16,
) -> usize {
    fill_log_sense(
        cdb,
        false,
        LogPageControl::CumulativeValues,
        page_code,
        subpage_code,
        0,
        allocation_len,
        0,
    )
}
