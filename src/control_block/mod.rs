// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

pub mod common;
pub mod inquiry;
pub mod log_sense;
pub mod mode_sense;
pub mod read_capacity;
pub mod read_defect_data;
pub mod receive_diagnostics;
