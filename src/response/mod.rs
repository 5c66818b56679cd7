// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Page header views and field extractors (VPD, log, diagnostic pages).
pub mod page;
/// Sense-data summaries used for diagnostics.
pub mod sense;
