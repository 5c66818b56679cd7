// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Configuration, command-line parsing and logging.

/// Command-line interface parsing.
pub mod cli;
/// Configuration file parsing and CLI overrides.
pub mod config;
/// Enumerations used in configuration.
pub mod enums;
/// Logger initialization.
pub mod logger;
