// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tracing::{debug, warn};

use crate::{
    capture::record::Record,
    response::sense::{SenseSummary, asc_ascq_to_str},
    transport::{Completion, Direction, ScsiTransport},
};

/// Message carried by the record of an exchange whose submission failed.
pub const SUBMIT_FAILED_MESSAGE: &str = "failed to submit command";

/// One command/response round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub cdb: Vec<u8>,
    /// Present iff the device signaled an error status.
    pub sense: Option<Vec<u8>>,
    pub data: Vec<u8>,
    /// False when no device-level response was obtained at all.
    pub transport_ok: bool,
}

impl Exchange {
    pub fn failed(cdb: &[u8]) -> Self {
        Self {
            cdb: cdb.to_vec(),
            sense: None,
            data: Vec::new(),
            transport_ok: false,
        }
    }

    pub fn completed(cdb: &[u8], completion: Completion, capacity: usize) -> Self {
        let Completion { sense, mut data } = completion;
        data.truncate(capacity);
        Self {
            cdb: cdb.to_vec(),
            sense,
            data,
            transport_ok: true,
        }
    }

    /// The payload can be trusted as a directory: submission went through and
    /// the device reported no error.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.transport_ok && self.sense.is_none()
    }

    #[inline]
    pub fn device_error(&self) -> bool {
        self.transport_ok && self.sense.is_some()
    }

    pub fn to_record(&self) -> Record {
        if !self.transport_ok {
            return Record {
                message: SUBMIT_FAILED_MESSAGE.to_string(),
                cdb: self.cdb.clone(),
                sense: Vec::new(),
                data: Vec::new(),
            };
        }
        Record {
            message: String::new(),
            cdb: self.cdb.clone(),
            sense: self.sense.clone().unwrap_or_default(),
            data: self.data.clone(),
        }
    }
}

/// Submit `cdb`, wait for completion and collect the result.
///
/// Never fails: a transport error is folded into `transport_ok = false`.
pub async fn perform<T: ScsiTransport>(transport: &mut T, cdb: &[u8], capacity: usize) -> Exchange {
    if let Err(e) = transport.submit(cdb, capacity, Direction::FromDevice).await {
        warn!(cdb = %hex::encode(cdb), error = %e, "submission failed");
        return Exchange::failed(cdb);
    }

    let completion = match transport.read_result().await {
        Ok(c) => c,
        Err(e) => {
            warn!(cdb = %hex::encode(cdb), error = %e, "reading result failed");
            return Exchange::failed(cdb);
        },
    };

    if let Some(sense) = completion.sense.as_deref() {
        match SenseSummary::parse(sense) {
            Ok(s) => debug!(
                opcode = format_args!("{:#04x}", cdb.first().copied().unwrap_or(0)),
                key = s.sense_key_str(),
                asc = format_args!("{:#04x}", s.asc),
                ascq = format_args!("{:#04x}", s.ascq),
                "device reported {}",
                asc_ascq_to_str(s.asc, s.ascq)
            ),
            Err(e) => debug!(sense = %hex::encode(sense), "undecodable sense: {e}"),
        }
    }

    Exchange::completed(cdb, completion, capacity)
}
