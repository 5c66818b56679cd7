// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The directories the walker knows how to expand.

use std::io::Write;

use crate::{
    control_block::{
        inquiry::VPD_SUPPORTED_PAGES,
        log_sense::{ALL_SUBPAGES, SUPPORTED_PAGES},
        receive_diagnostics::SUPPORTED_DIAGNOSTIC_PAGES,
    },
    response::page::{
        LOG_PAGE_CODE_MASK, PageHeader, evpd_page_len, log_disable_save, log_page_code,
        log_page_len, log_subpage_code, log_subpage_format, recv_diag_len, recv_diag_page_code,
    },
    transport::ScsiTransport,
    walker::{WalkError, Walker, exchange::Exchange},
};

/// A page request understood by the single-shot runners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Vpd(u8),
    Log { page: u8, subpage: u8 },
    Diagnostic(u8),
}

impl<T: ScsiTransport, W: Write> Walker<'_, T, W> {
    pub async fn fetch(&mut self, fetch: Fetch) -> Result<Exchange, WalkError> {
        match fetch {
            Fetch::Vpd(page) => self.vpd_page(page).await,
            Fetch::Log { page, subpage } => self.log_page(page, subpage).await,
            Fetch::Diagnostic(page) => self.diagnostic_page(page).await,
        }
    }
}

/// Describes one directory-driven family.
///
/// The directory is the payload of [`DirectorySource::directory`]. Its item
/// count is the big-endian u16 at offset 2 and entries start at offset 4,
/// [`DirectorySource::stride`] bytes each.
pub trait DirectorySource {
    fn name(&self) -> &'static str;

    fn directory(&self) -> Fetch;

    fn stride(&self) -> usize {
        1
    }

    /// Message recorded when the directory is shorter than its header.
    fn short_message(&self) -> &'static str;

    /// Check the fixed part of the header. `payload` holds at least the
    /// four header bytes.
    fn validate(&self, _payload: &[u8]) -> Result<(), &'static str> {
        Ok(())
    }

    /// Item count declared by the directory header.
    fn declared_count(&self, payload: &[u8]) -> Option<usize> {
        PageHeader::view(payload).map(PageHeader::declared_len)
    }

    /// Turn one `stride`-sized entry into a request.
    fn decode(&self, entry: &[u8]) -> Fetch;

    /// Entries that must not be fetched; the returned message is recorded
    /// in their place.
    fn skip(&self, _item: Fetch) -> Option<String> {
        None
    }
}

/// Extended INQUIRY: the supported VPD pages list.
#[derive(Debug, Clone, Copy, Default)]
pub struct VpdPages;

impl DirectorySource for VpdPages {
    fn name(&self) -> &'static str {
        "vpd pages"
    }

    fn directory(&self) -> Fetch {
        Fetch::Vpd(VPD_SUPPORTED_PAGES)
    }

    fn short_message(&self) -> &'static str {
        "vpd page list must have at least 4 bytes"
    }

    fn declared_count(&self, payload: &[u8]) -> Option<usize> {
        evpd_page_len(payload)
    }

    fn decode(&self, entry: &[u8]) -> Fetch {
        Fetch::Vpd(entry[0])
    }
}

/// Log page header with DS clear and exactly the given page, SPF and subpage.
fn is_log_header(payload: &[u8], page: u8, spf: bool, subpage: u8) -> bool {
    log_disable_save(payload) == Some(false)
        && log_page_code(payload) == Some(page)
        && log_subpage_format(payload) == Some(spf)
        && log_subpage_code(payload) == Some(subpage)
}

/// LOG SENSE page 0x00 subpage 0x00: the supported log pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPages;

impl DirectorySource for LogPages {
    fn name(&self) -> &'static str {
        "log pages"
    }

    fn directory(&self) -> Fetch {
        Fetch::Log {
            page: SUPPORTED_PAGES,
            subpage: 0,
        }
    }

    fn short_message(&self) -> &'static str {
        "log sense list must have at least 4 bytes"
    }

    fn validate(&self, payload: &[u8]) -> Result<(), &'static str> {
        if !is_log_header(payload, SUPPORTED_PAGES, false, 0x00) {
            return Err("expected to receive log page 0 subpage 0");
        }
        Ok(())
    }

    fn declared_count(&self, payload: &[u8]) -> Option<usize> {
        log_page_len(payload)
    }

    fn decode(&self, entry: &[u8]) -> Fetch {
        Fetch::Log {
            page: entry[0],
            subpage: 0,
        }
    }
}

/// LOG SENSE page 0x00 subpage 0xFF: supported page/subpage pairs.
///
/// Subpage 0 of every page was already fetched from the [`LogPages`]
/// directory, so those entries are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSubpages;

impl DirectorySource for LogSubpages {
    fn name(&self) -> &'static str {
        "log subpages"
    }

    fn directory(&self) -> Fetch {
        Fetch::Log {
            page: SUPPORTED_PAGES,
            subpage: ALL_SUBPAGES,
        }
    }

    fn stride(&self) -> usize {
        2
    }

    fn short_message(&self) -> &'static str {
        "log sense list must have at least 4 bytes"
    }

    fn validate(&self, payload: &[u8]) -> Result<(), &'static str> {
        if !is_log_header(payload, SUPPORTED_PAGES, true, ALL_SUBPAGES) {
            return Err("expected to receive log page 0 (spf=1) subpage 0xff");
        }
        Ok(())
    }

    fn declared_count(&self, payload: &[u8]) -> Option<usize> {
        log_page_len(payload)
    }

    fn decode(&self, entry: &[u8]) -> Fetch {
        Fetch::Log {
            page: entry[0] & LOG_PAGE_CODE_MASK,
            subpage: entry[1],
        }
    }

    fn skip(&self, item: Fetch) -> Option<String> {
        match item {
            Fetch::Log { page, subpage: 0 } => {
                Some(format!("skipping log page {page:02x} subpage 00 already retrieved"))
            },
            _ => None,
        }
    }
}

/// RECEIVE DIAGNOSTIC RESULTS page 0x00: the supported diagnostic pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticPages;

impl DirectorySource for DiagnosticPages {
    fn name(&self) -> &'static str {
        "diagnostic pages"
    }

    fn directory(&self) -> Fetch {
        Fetch::Diagnostic(SUPPORTED_DIAGNOSTIC_PAGES)
    }

    fn short_message(&self) -> &'static str {
        "receive diagnostics list must have at least 4 bytes"
    }

    fn validate(&self, payload: &[u8]) -> Result<(), &'static str> {
        if recv_diag_page_code(payload) != Some(SUPPORTED_DIAGNOSTIC_PAGES) {
            return Err("expected to receive receive diagnostics page 0");
        }
        Ok(())
    }

    fn declared_count(&self, payload: &[u8]) -> Option<usize> {
        recv_diag_len(payload)
    }

    fn decode(&self, entry: &[u8]) -> Fetch {
        Fetch::Diagnostic(entry[0])
    }
}
