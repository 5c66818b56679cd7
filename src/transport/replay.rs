// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    collections::{HashMap, VecDeque},
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    capture::{record::Record, writer::read_capture},
    transport::{Completion, Direction, ScsiTransport, TransportError, TransportOptions},
    walker::exchange::SUBMIT_FAILED_MESSAGE,
};

#[derive(Debug, Clone)]
enum Answer {
    Failed,
    Completed(Completion),
}

/// Answers commands from an earlier capture.
///
/// Each command is matched against the not-yet-used records carrying the
/// same CDB, oldest first, so a walk over an unchanged plan reproduces the
/// capture line for line. An empty sense field replays as "no error".
#[derive(Debug, Default)]
pub struct ReplayTransport {
    answers: HashMap<Vec<u8>, VecDeque<Answer>>,
    opts: TransportOptions,
    pending: Option<Result<Completion, TransportError>>,
}

impl ReplayTransport {
    pub fn from_records<I>(records: I, opts: TransportOptions) -> Self
    where I: IntoIterator<Item = Record> {
        let mut answers: HashMap<Vec<u8>, VecDeque<Answer>> = HashMap::new();
        for rec in records {
            if rec.cdb.is_empty() {
                // skip notices and validation messages: the walker emits them again
                continue;
            }
            let answer = if rec.message == SUBMIT_FAILED_MESSAGE {
                Answer::Failed
            } else {
                Answer::Completed(Completion {
                    sense: (!rec.sense.is_empty()).then_some(rec.sense),
                    data: rec.data,
                })
            };
            answers.entry(rec.cdb).or_default().push_back(answer);
        }
        Self {
            answers,
            opts,
            pending: None,
        }
    }

    pub fn open(path: impl AsRef<Path>, opts: TransportOptions) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open capture {path:?}"))?;
        let records = read_capture(BufReader::new(file))
            .with_context(|| format!("failed to parse capture {path:?}"))?;
        Ok(Self::from_records(records, opts))
    }

    /// Recorded answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.values().map(VecDeque::len).sum()
    }
}

impl ScsiTransport for ReplayTransport {
    async fn submit(
        &mut self,
        cdb: &[u8],
        capacity: usize,
        _direction: Direction,
    ) -> Result<(), TransportError> {
        if self.opts.trace_exchanges {
            debug!(cdb = %hex::encode(cdb), capacity, "replay submit");
        }
        let answer = self.answers.get_mut(cdb).and_then(VecDeque::pop_front);
        match answer {
            None => {
                self.pending = None;
                Err(TransportError::NotRecorded(hex::encode(cdb)))
            },
            Some(Answer::Failed) => {
                self.pending = None;
                Err(TransportError::ReplayedFailure)
            },
            Some(Answer::Completed(mut completion)) => {
                completion.data.truncate(capacity);
                self.pending = Some(Ok(completion));
                Ok(())
            },
        }
    }

    async fn read_result(&mut self) -> Result<Completion, TransportError> {
        self.pending.take().unwrap_or(Err(TransportError::NoPending))
    }
}
