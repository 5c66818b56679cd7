// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Result of one state-machine step.
pub enum Transition<S, R> {
    Next(S),
    Done(R),
}
