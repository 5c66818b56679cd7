// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Two-phase discovery: fetch a directory, then fetch everything it lists.

use std::io::Write;

use tracing::{debug, info};

use crate::{
    response::page::{PAGE_HEADER_LEN, page_body},
    transport::ScsiTransport,
    walker::{
        WalkError, Walker,
        common::Transition,
        directories::{DirectorySource, Fetch},
        exchange::Exchange,
    },
};

/// How a discovery run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// Transport failure or device error on the directory fetch.
    Unavailable,
    /// The directory failed validation; one message record was written.
    Malformed,
    /// Every listed entry was fetched or skipped.
    Walked { fetched: usize, skipped: usize },
}

impl Discovery {
    #[inline]
    pub fn reached_items(&self) -> bool {
        matches!(self, Discovery::Walked { .. })
    }
}

#[derive(Debug)]
pub enum DiscoveryState {
    FetchDirectory,
    Validate(Exchange),
    FetchItems {
        items: Vec<Fetch>,
        next: usize,
        fetched: usize,
        skipped: usize,
    },
}

/// Decode a directory payload into requests.
///
/// The declared count is clamped to the entries actually present.
pub fn decode_directory<S: DirectorySource + ?Sized>(
    source: &S,
    payload: &[u8],
) -> Result<Vec<Fetch>, &'static str> {
    if payload.len() < PAGE_HEADER_LEN {
        return Err(source.short_message());
    }
    source.validate(payload)?;

    let stride = source.stride().max(1);
    let declared = source.declared_count(payload).unwrap_or(0);
    let body = page_body(payload);
    let present = body.len() / stride;
    if declared > present {
        debug!(
            directory = source.name(),
            declared, present, "directory count exceeds payload, clamping"
        );
    }
    let count = declared.min(present);

    Ok(body[..count * stride]
        .chunks_exact(stride)
        .map(|entry| source.decode(entry))
        .collect())
}

type DiscoveryStep = Transition<DiscoveryState, Discovery>;

impl<T: ScsiTransport, W: Write> Walker<'_, T, W> {
    async fn discovery_step<S: DirectorySource>(
        &mut self,
        source: &S,
        state: DiscoveryState,
    ) -> Result<DiscoveryStep, WalkError> {
        Ok(match state {
            DiscoveryState::FetchDirectory => {
                let ex = self.fetch(source.directory()).await?;
                if ex.is_clean() {
                    Transition::Next(DiscoveryState::Validate(ex))
                } else {
                    if ex.device_error() {
                        info!(directory = source.name(), "device reported an error, nothing to show");
                    }
                    Transition::Done(Discovery::Unavailable)
                }
            },
            DiscoveryState::Validate(ex) => match decode_directory(source, &ex.data) {
                Ok(items) => {
                    debug!(directory = source.name(), entries = items.len(), "directory decoded");
                    Transition::Next(DiscoveryState::FetchItems {
                        items,
                        next: 0,
                        fetched: 0,
                        skipped: 0,
                    })
                },
                Err(message) => {
                    info!(directory = source.name(), "{message}");
                    self.notice(message)?;
                    Transition::Done(Discovery::Malformed)
                },
            },
            DiscoveryState::FetchItems {
                items,
                next,
                mut fetched,
                mut skipped,
            } => {
                let Some(&item) = items.get(next) else {
                    return Ok(Transition::Done(Discovery::Walked { fetched, skipped }));
                };
                match source.skip(item) {
                    Some(message) => {
                        debug!(directory = source.name(), ?item, "skipped");
                        self.notice(message)?;
                        skipped += 1;
                    },
                    None => {
                        self.fetch(item).await?;
                        fetched += 1;
                    },
                }
                Transition::Next(DiscoveryState::FetchItems {
                    items,
                    next: next + 1,
                    fetched,
                    skipped,
                })
            },
        })
    }

    /// Run one directory-driven family to completion.
    pub async fn discover<S: DirectorySource>(&mut self, source: &S) -> Result<Discovery, WalkError> {
        let mut state = DiscoveryState::FetchDirectory;
        loop {
            match self.discovery_step(source, state).await? {
                Transition::Next(next) => state = next,
                Transition::Done(outcome) => {
                    debug!(directory = source.name(), ?outcome, "discovery finished");
                    return Ok(outcome);
                },
            }
        }
    }
}
