// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Single-shot family runners: one command, one exchange, one record.

use std::io::Write;

use tracing::{debug, info};

use crate::{
    control_block::{
        common::{alloc_len_u16, alloc_len_u32, new_cdb},
        inquiry::{fill_inquiry_standard_simple, fill_inquiry_vpd_simple, parse_inquiry_standard},
        log_sense::fill_log_sense_simple,
        read_capacity::{
            fill_read_capacity10, fill_read_capacity16, parse_read_capacity10_zerocopy,
            parse_read_capacity16_zerocopy,
        },
        receive_diagnostics::fill_receive_diagnostics,
    },
    response::page::vpd_page_code,
    transport::ScsiTransport,
    walker::{WalkError, Walker, exchange::Exchange},
};

pub const READ_CAPACITY_10_CAPACITY: usize = 8;
pub const READ_CAPACITY_16_CAPACITY: usize = 512;
pub const INQUIRY_CAPACITY: usize = 512;
pub const VPD_PAGE_CAPACITY: usize = 512;
pub const LOG_PAGE_CAPACITY: usize = 16 * 1024;
pub const DIAGNOSTIC_PAGE_CAPACITY: usize = 16 * 1024;

impl<T: ScsiTransport, W: Write> Walker<'_, T, W> {
    pub async fn read_capacity10(&mut self) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len = fill_read_capacity10(&mut cdb, 0, false, 0);
        let ex = self.exchange(&cdb, len, READ_CAPACITY_10_CAPACITY).await?;
        if ex.is_clean() {
            match parse_read_capacity10_zerocopy(&ex.data) {
                Ok(rc) if rc.indicates_overflow() => info!(
                    block_len = rc.block_len.get(),
                    "capacity (10): LBA field saturated, see READ CAPACITY (16)"
                ),
                Ok(rc) => info!(
                    max_lba = rc.max_lba.get(),
                    block_len = rc.block_len.get(),
                    "capacity (10): {} bytes",
                    rc.total_bytes()
                ),
                Err(e) => debug!("{e}"),
            }
        }
        Ok(ex)
    }

    pub async fn read_capacity16(&mut self) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len = fill_read_capacity16(
            &mut cdb,
            0,
            false,
            alloc_len_u32(READ_CAPACITY_16_CAPACITY),
            0,
        );
        let ex = self.exchange(&cdb, len, READ_CAPACITY_16_CAPACITY).await?;
        if ex.is_clean() {
            match parse_read_capacity16_zerocopy(&ex.data) {
                Ok(rc) => info!(
                    max_lba = rc.max_lba.get(),
                    block_len = rc.block_len.get(),
                    "capacity (16): {} bytes",
                    rc.total_bytes()
                ),
                Err(e) => debug!("{e}"),
            }
        }
        Ok(ex)
    }

    /// READ CAPACITY (10) then (16).
    pub async fn capacity_family(&mut self) -> Result<(), WalkError> {
        self.read_capacity10().await?;
        self.read_capacity16().await?;
        Ok(())
    }

    pub async fn standard_inquiry(&mut self) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len = fill_inquiry_standard_simple(&mut cdb, alloc_len_u16(INQUIRY_CAPACITY));
        let ex = self.exchange(&cdb, len, INQUIRY_CAPACITY).await?;
        if ex.is_clean() {
            match parse_inquiry_standard(&ex.data) {
                Ok(id) => info!(
                    vendor = %id.vendor_id,
                    product = %id.product_id,
                    revision = %id.product_rev,
                    "device type: {}",
                    id.device_type_str()
                ),
                Err(e) => debug!("{e}"),
            }
        }
        Ok(ex)
    }

    pub async fn vpd_page(&mut self, page: u8) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len = fill_inquiry_vpd_simple(&mut cdb, page, alloc_len_u16(VPD_PAGE_CAPACITY));
        let ex = self.exchange(&cdb, len, VPD_PAGE_CAPACITY).await?;
        let returned = vpd_page_code(&ex.data).filter(|&got| got != page);
        if let (true, Some(got)) = (ex.is_clean(), returned) {
            debug!(requested = page, returned = got, "vpd page code mismatch");
        }
        Ok(ex)
    }

    pub async fn log_page(&mut self, page: u8, subpage: u8) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len =
            fill_log_sense_simple(&mut cdb, page, subpage, alloc_len_u16(LOG_PAGE_CAPACITY));
        self.exchange(&cdb, len, LOG_PAGE_CAPACITY).await
    }

    pub async fn diagnostic_page(&mut self, page: u8) -> Result<Exchange, WalkError> {
        let mut cdb = new_cdb();
        let len = fill_receive_diagnostics(
            &mut cdb,
            true,
            page,
            alloc_len_u16(DIAGNOSTIC_PAGE_CAPACITY),
            0,
        );
        self.exchange(&cdb, len, DIAGNOSTIC_PAGE_CAPACITY).await
    }
}
