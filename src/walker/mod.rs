// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Diagnostic surface walker.
//!
//! A [`Walker`] owns the output sink and borrows the transport for the whole
//! walk. Family runners, sweeps and discovery drivers are `impl` blocks on it
//! spread over the submodules; every exchange they perform goes through
//! [`Walker::exchange`] so that it produces exactly one record.

use std::io::{self, Write};

use thiserror::Error;

use crate::{
    capture::{record::Record, writer::RecordWriter},
    control_block::common::CdbBuf,
    transport::ScsiTransport,
};

pub mod common;
pub mod directories;
pub mod discovery;
pub mod exchange;
pub mod plan;
pub mod runners;
pub mod sweep;

use exchange::{Exchange, perform};

/// The only condition that aborts a walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("failed to write capture record: {0}")]
    Output(#[from] io::Error),
}

/// Counters reported once the walk is over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub exchanges: usize,
    pub transport_failures: usize,
    pub device_errors: usize,
    pub notices: usize,
}

impl WalkStats {
    /// Data lines written (header excluded).
    #[inline]
    pub fn records(&self) -> usize {
        self.exchanges + self.notices
    }
}

pub struct Walker<'t, T, W: Write> {
    transport: &'t mut T,
    sink: RecordWriter<W>,
    stats: WalkStats,
}

impl<'t, T: ScsiTransport, W: Write> Walker<'t, T, W> {
    pub fn new(transport: &'t mut T, out: W) -> Self {
        Self {
            transport,
            sink: RecordWriter::new(out),
            stats: WalkStats::default(),
        }
    }

    pub fn write_header(&mut self) -> Result<(), WalkError> {
        self.sink.write_header()?;
        Ok(())
    }

    /// Perform `cdb[..len]` and emit its record.
    pub async fn exchange(
        &mut self,
        cdb: &CdbBuf,
        len: usize,
        capacity: usize,
    ) -> Result<Exchange, WalkError> {
        let ex = perform(&mut *self.transport, &cdb[..len], capacity).await;

        self.stats.exchanges += 1;
        if !ex.transport_ok {
            self.stats.transport_failures += 1;
        } else if ex.device_error() {
            self.stats.device_errors += 1;
        }

        self.sink.write(&ex.to_record())?;
        Ok(ex)
    }

    /// Emit a message-only record.
    pub fn notice(&mut self, message: impl Into<String>) -> Result<(), WalkError> {
        self.stats.notices += 1;
        self.sink.write(&Record::notice(message))?;
        Ok(())
    }

    #[inline]
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Flush the sink and give it back.
    pub fn finish(mut self) -> Result<(WalkStats, W), WalkError> {
        self.sink.flush()?;
        Ok((self.stats, self.sink.into_inner()))
    }
}
