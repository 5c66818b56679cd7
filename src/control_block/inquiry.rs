// SPDX-License-Identifier: AGPL-3.0-or-later GPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! INQUIRY (6): CDB fillers that write into a provided CDB buffer.
//! Returns the CDB length actually used (always 6 bytes).
//!
//! CDB layout (SPC-4):
//!   [0]    = 0x12 (INQUIRY)
//!   [1]    = EVPD (bit 0); other bits reserved (CMDDT obsolete → 0)
//!   [2]    = Page Code (only when EVPD=1; else 0)
//!   [3..5] = Allocation Length (big-endian u16)
//!   [5]    = Control

use anyhow::{Result, bail};

use crate::control_block::common::{CdbBuf, put_u16};

pub const INQUIRY_OPCODE: u8 = 0x12;
pub const INQUIRY_CDB_LEN: usize = 6;

/// VPD page 0x00 lists every page the device supports.
pub const VPD_SUPPORTED_PAGES: u8 = 0x00;

/// Fill a **Standard INQUIRY (EVPD=0)** CDB.
#[inline]
pub fn fill_inquiry_standard(cdb: &mut CdbBuf, allocation_len: u16, control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = INQUIRY_OPCODE;
    cdb[1] = 0x00; // EVPD=0
    cdb[2] = 0x00; // page code ignored when EVPD=0
    put_u16(cdb, 3, allocation_len);
    cdb[5] = control;
    INQUIRY_CDB_LEN
}

/// Convenience: Standard INQUIRY with control=0.
#[inline]
pub fn fill_inquiry_standard_simple(cdb: &mut CdbBuf, allocation_len: u16) -> usize {
    fill_inquiry_standard(cdb, allocation_len, 0x00)
}

/// Fill a **VPD INQUIRY (EVPD=1)** CDB for an arbitrary page code.
///
/// Page codes are taken as raw bytes: the walker asks for whatever the
/// device lists in VPD page 0x00, vendor pages included.
#[inline]
pub fn fill_inquiry_vpd(
    cdb: &mut CdbBuf,
    page_code: u8,
    allocation_len: u16,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = INQUIRY_OPCODE;
    cdb[1] = 0x01; // EVPD=1
    cdb[2] = page_code;
    put_u16(cdb, 3, allocation_len);
    cdb[5] = control;
    INQUIRY_CDB_LEN
}

/// Convenience: VPD INQUIRY with control=0.
#[inline]
pub fn fill_inquiry_vpd_simple(cdb: &mut CdbBuf, page_code: u8, allocation_len: u16) -> usize {
    fill_inquiry_vpd(cdb, page_code, allocation_len, 0x00)
}

/// Identity fields of a Standard INQUIRY (EVPD=0) response.
#[derive(Debug, Clone)]
pub struct InquiryStandard {
    pub peripheral_qualifier: u8, // bits 7..5 of byte0
    pub device_type: u8,          // bits 4..0 of byte0
    pub rmb: bool,                // byte1 bit7
    pub version: u8,              // byte2
    pub vendor_id: String,        // bytes 8..16
    pub product_id: String,       // bytes 16..32
    pub product_rev: String,      // bytes 32..36
}

impl InquiryStandard {
    pub fn device_type_str(&self) -> &'static str {
        match self.device_type {
            0x00 => "Direct-access block (disk)",
            0x01 => "Sequential-access (tape)",
            0x03 => "Processor",
            0x04 => "WORM",
            0x05 => "CD/DVD",
            0x07 => "Optical memory",
            0x08 => "Medium changer",
            0x0C => "Storage array controller",
            0x0D => "Enclosure services",
            0x0E => "RBC",
            0x11 => "Object-based storage",
            0x12 => "Automation/Drive Interface",
            _ => "Unknown/Reserved",
        }
    }
}

/// Parse a Standard INQUIRY (EVPD=0) response (minimum 36 bytes).
pub fn parse_inquiry_standard(buf: &[u8]) -> Result<InquiryStandard> {
    if buf.len() < 36 {
        bail!("INQUIRY buffer too short: {}", buf.len());
    }

    Ok(InquiryStandard {
        peripheral_qualifier: (buf[0] >> 5) & 0x07,
        device_type: buf[0] & 0x1F,
        rmb: (buf[1] & 0x80) != 0,
        version: buf[2],
        vendor_id: trim_ascii(&buf[8..16]),
        product_id: trim_ascii(&buf[16..32]),
        product_rev: trim_ascii(&buf[32..36]),
    })
}

fn trim_ascii(bytes: &[u8]) -> String {
    let s: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    s.trim().to_string()
}
