// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Four-byte page headers shared by VPD, log and diagnostic pages.
//!
//! ```text
//!            byte 0              byte 1         bytes 2..4
//! VPD      PQ(7..5)|PDT(4..0)   PAGE CODE      PAGE LENGTH (BE)
//! LOG      DS|SPF|PAGE(5..0)    SUBPAGE CODE   PAGE LENGTH (BE)
//! DIAG     PAGE CODE            page specific  PAGE LENGTH (BE)
//! ```
//!
//! All extractors are total: a buffer shorter than the header yields `None`.

use zerocopy::{
    FromBytes, Immutable, KnownLayout,
    byteorder::{BigEndian, U16},
};

pub const PAGE_HEADER_LEN: usize = 4;

/// Log page byte 0: page code bits.
pub const LOG_PAGE_CODE_MASK: u8 = 0x3F;
/// Log page byte 0: SubPage Format bit.
pub const LOG_SPF: u8 = 0x40;
/// Log page byte 0: Disable Save bit.
pub const LOG_DS: u8 = 0x80;

#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Debug)]
pub struct PageHeader {
    pub byte0: u8,
    pub byte1: u8,
    pub page_len: U16<BigEndian>,
}

impl PageHeader {
    #[inline]
    pub fn view(buf: &[u8]) -> Option<&PageHeader> {
        PageHeader::ref_from_prefix(buf).ok().map(|(hdr, _)| hdr)
    }

    /// Declared page length as a host integer.
    #[inline]
    pub fn declared_len(&self) -> usize {
        self.page_len.get() as usize
    }
}

/// Bytes following the header, regardless of what the header declares.
#[inline]
pub fn page_body(buf: &[u8]) -> &[u8] {
    buf.get(PAGE_HEADER_LEN..).unwrap_or(&[])
}

#[inline]
pub fn vpd_page_code(buf: &[u8]) -> Option<u8> {
    PageHeader::view(buf).map(|h| h.byte1)
}

#[inline]
pub fn evpd_page_len(buf: &[u8]) -> Option<usize> {
    PageHeader::view(buf).map(PageHeader::declared_len)
}

#[inline]
pub fn log_page_code(buf: &[u8]) -> Option<u8> {
    PageHeader::view(buf).map(|h| h.byte0 & LOG_PAGE_CODE_MASK)
}

#[inline]
pub fn log_disable_save(buf: &[u8]) -> Option<bool> {
    PageHeader::view(buf).map(|h| h.byte0 & LOG_DS != 0)
}

#[inline]
pub fn log_subpage_format(buf: &[u8]) -> Option<bool> {
    PageHeader::view(buf).map(|h| h.byte0 & LOG_SPF != 0)
}

#[inline]
pub fn log_subpage_code(buf: &[u8]) -> Option<u8> {
    PageHeader::view(buf).map(|h| h.byte1)
}

#[inline]
pub fn log_page_len(buf: &[u8]) -> Option<usize> {
    PageHeader::view(buf).map(PageHeader::declared_len)
}

#[inline]
pub fn recv_diag_page_code(buf: &[u8]) -> Option<u8> {
    PageHeader::view(buf).map(|h| h.byte0)
}

#[inline]
pub fn recv_diag_len(buf: &[u8]) -> Option<usize> {
    PageHeader::view(buf).map(PageHeader::declared_len)
}
