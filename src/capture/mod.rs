// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Record type and its line codec.
pub mod record;
/// Header-aware record sink and capture reader.
pub mod writer;
