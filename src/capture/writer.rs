// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::io::{self, BufRead, Write};

use crate::capture::record::{HEADER, Record, RecordError};

/// Append-only sink for capture records.
///
/// The header line goes out exactly once, before the first record, even if
/// the caller never asks for it explicitly.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: W,
    header_written: bool,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
        }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.inner, "{HEADER}")?;
            self.header_written = true;
        }
        Ok(())
    }

    pub fn write(&mut self, record: &Record) -> io::Result<()> {
        self.write_header()?;
        writeln!(self.inner, "{record}")?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Parse a whole capture: header line first, then one record per line.
/// Blank trailing lines are ignored.
pub fn read_capture<R: BufRead>(reader: R) -> anyhow::Result<Vec<Record>> {
    let mut lines = reader.lines();
    let first = lines.next().transpose()?;
    if first.as_deref().map(|l| l.trim_end_matches('\r')) != Some(HEADER) {
        return Err(RecordError::MissingHeader.into());
    }

    let mut out = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = line
            .parse::<Record>()
            .map_err(|e| anyhow::anyhow!("line {}: {e}", idx + 2))?;
        out.push(record);
    }
    Ok(out)
}
