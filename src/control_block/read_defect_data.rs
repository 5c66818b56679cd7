// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! READ DEFECT DATA (10 / 12): CDB fillers.
//!
//! READ DEFECT DATA(10) layout (SBC-3):
//!   [0]    = 0x37
//!   [2]    = REQ_PLIST (bit 4) | REQ_GLIST (bit 3) | DEFECT LIST FORMAT (2..0)
//!   [7..9] = ALLOCATION LENGTH (big-endian u16)
//!   [9]    = CONTROL
//!
//! READ DEFECT DATA(12) layout (SBC-3):
//!   [0]     = 0xB7
//!   [1]     = REQ_PLIST (bit 4) | REQ_GLIST (bit 3) | DEFECT LIST FORMAT (2..0)
//!   [2..6]  = ADDRESS DESCRIPTOR INDEX (big-endian u32)
//!   [6..10] = ALLOCATION LENGTH (big-endian u32)
//!   [11]    = CONTROL

use crate::control_block::common::{CdbBuf, put_u16, put_u32};

pub const READ_DEFECT_DATA_10: u8 = 0x37;
pub const READ_DEFECT_DATA_12: u8 = 0xB7;

/// Allocation length that only fetches the defect list header.
pub const DEFECT_HEADER_LEN: usize = 8;

bitflags::bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    /// Which defect lists the device should report.
    pub struct DefectListSelect: u8 {
        /// Primary (manufacturer) defect list.
        const PLIST = 0b0001_0000;
        /// Grown defect list.
        const GLIST = 0b0000_1000;
    }
}

#[inline]
fn list_byte(lists: DefectListSelect, format: u8) -> u8 {
    lists.bits() | (format & 0x07)
}

#[inline]
pub fn fill_read_defect_data10(
    cdb: &mut CdbBuf,
    lists: DefectListSelect,
    format: u8,
    allocation_len: u16,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = READ_DEFECT_DATA_10;
    cdb[2] = list_byte(lists, format);
    put_u16(cdb, 7, allocation_len);
    cdb[9] = control;
    10
}

#[inline]
pub fn fill_read_defect_data12(
    cdb: &mut CdbBuf,
    lists: DefectListSelect,
    format: u8,
    allocation_len: u32,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = READ_DEFECT_DATA_12;
    cdb[1] = list_byte(lists, format);
    // address descriptor index stays 0: start of the list
    put_u32(cdb, 6, allocation_len);
    cdb[11] = control;
    12
}
