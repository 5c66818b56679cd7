// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, io::Write};

use tracing::{Instrument, info, info_span};

use crate::{
    transport::ScsiTransport,
    walker::{
        WalkError, WalkStats, Walker,
        directories::{DiagnosticPages, LogPages, LogSubpages, VpdPages},
    },
};

/// One entry of a walk plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// READ CAPACITY (10) and (16).
    Capacity,
    /// Standard INQUIRY.
    Inquiry,
    /// INQUIRY EVPD page 0x00 and every listed VPD page.
    ExtendedInquiry,
    /// LOG SENSE pages, then page/subpage pairs.
    LogSense,
    /// MODE SENSE (10) and (6) sweeps.
    ModeSense,
    /// RECEIVE DIAGNOSTIC RESULTS page 0x00 and every listed page.
    ReceiveDiagnostics,
    /// READ DEFECT DATA (10) and (12) sweep.
    DefectData,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Family::Capacity => "capacity",
            Family::Inquiry => "inquiry",
            Family::ExtendedInquiry => "extended_inquiry",
            Family::LogSense => "log_sense",
            Family::ModeSense => "mode_sense",
            Family::ReceiveDiagnostics => "receive_diagnostics",
            Family::DefectData => "defect_data",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of families to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkPlan {
    families: Vec<Family>,
}

impl WalkPlan {
    pub fn standard() -> Self {
        Self {
            families: vec![
                Family::Capacity,
                Family::Inquiry,
                Family::ExtendedInquiry,
                Family::LogSense,
                Family::ModeSense,
                Family::ReceiveDiagnostics,
                Family::DefectData,
            ],
        }
    }

    pub fn only(families: impl IntoIterator<Item = Family>) -> Self {
        Self {
            families: families.into_iter().collect(),
        }
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }
}

impl Default for WalkPlan {
    fn default() -> Self {
        Self::standard()
    }
}

impl<T: ScsiTransport, W: Write> Walker<'_, T, W> {
    pub async fn run_family(&mut self, family: Family) -> Result<(), WalkError> {
        match family {
            Family::Capacity => self.capacity_family().await,
            Family::Inquiry => self.standard_inquiry().await.map(drop),
            Family::ExtendedInquiry => self.discover(&VpdPages).await.map(drop),
            Family::LogSense => {
                if self.discover(&LogPages).await?.reached_items() {
                    self.discover(&LogSubpages).await?;
                }
                Ok(())
            },
            Family::ModeSense => self.mode_sense_family().await,
            Family::ReceiveDiagnostics => self.discover(&DiagnosticPages).await.map(drop),
            Family::DefectData => self.defect_data_family().await,
        }
    }

    /// Write the header, then run every family of `plan` in order.
    ///
    /// Only an output failure stops the walk.
    pub async fn run_all(&mut self, plan: &WalkPlan) -> Result<WalkStats, WalkError> {
        self.write_header()?;
        for &family in plan.families() {
            let before = self.stats();
            let span = info_span!("family", name = family.name());
            self.run_family(family).instrument(span.clone()).await?;

            let after = self.stats();
            span.in_scope(|| {
                info!(
                    records = after.records() - before.records(),
                    transport_failures = after.transport_failures - before.transport_failures,
                    device_errors = after.device_errors - before.device_errors,
                    "family done"
                )
            });
        }
        Ok(self.stats())
    }
}
