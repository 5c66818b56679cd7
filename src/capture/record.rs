// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Line codec for capture records.
//!
//! One record per line: `message,cdb,sense,data`. Byte fields are lowercase
//! two-digit hex octets separated by single spaces; an empty sequence is an
//! empty field.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Column header emitted once at the top of every capture.
pub const HEADER: &str = "message,cdb,sense,data";

pub const FIELD_SEPARATOR: char = ',';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid hex octet {octet:?} in {field} field")]
    BadOctet { field: &'static str, octet: String },
    #[error("capture does not start with the message,cdb,sense,data header")]
    MissingHeader,
}

/// Serialized form of one exchange, or a message-only notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub message: String,
    pub cdb: Vec<u8>,
    pub sense: Vec<u8>,
    pub data: Vec<u8>,
}

impl Record {
    /// A notice that is not tied to any device exchange.
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_notice(&self) -> bool {
        !self.message.is_empty()
    }
}

/// Render bytes as `xx xx xx`.
pub fn render_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(3));
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&hex::encode([*b]));
    }
    out
}

/// Exact inverse of [`render_hex`]: two hex digits per octet, single spaces.
pub fn parse_hex(field: &'static str, s: &str) -> Result<Vec<u8>, RecordError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(' ')
        .map(|octet| {
            let bad = || RecordError::BadOctet {
                field,
                octet: octet.to_string(),
            };
            // hex::decode accepts uppercase; the rendering never produces it
            if octet.len() != 2 || octet.bytes().any(|c| c.is_ascii_uppercase()) {
                return Err(bad());
            }
            match hex::decode(octet) {
                Ok(v) => Ok(v[0]),
                Err(_) => Err(bad()),
            }
        })
        .collect()
}

fn sanitize_message(msg: &str) -> String {
    msg.chars()
        .map(|c| match c {
            ',' => ';',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            sanitize_message(&self.message),
            render_hex(&self.cdb),
            render_hex(&self.sense),
            render_hex(&self.data)
        )
    }
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [message, cdb, sense, data] = fields.as_slice() else {
            return Err(RecordError::FieldCount(fields.len()));
        };
        Ok(Self {
            message: (*message).to_string(),
            cdb: parse_hex("cdb", cdb)?,
            sense: parse_hex("sense", sense)?,
            data: parse_hex("data", data)?,
        })
    }
}
