//! Walks the SCSI diagnostic surface of a block device and captures every
//! command/response exchange as a replayable CSV record.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Record codec and capture writer/reader.
pub mod capture;
/// Handles configuration, command-line parsing, and logging.
pub mod cfg;
/// CDB fillers for the commands the walker issues.
pub mod control_block;
/// Non-failing decoders over received payloads and sense data.
pub mod response;
/// Device transports: Linux SG_IO and capture replay.
pub mod transport;
/// Family runners, sweeps, discovery and the walk plan.
pub mod walker;
