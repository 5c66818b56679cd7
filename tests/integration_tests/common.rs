// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::PathBuf;

use anyhow::{Context, Result};
use scsi_capture_rs::cfg::config::Config;

pub fn test_path() -> String {
    std::env::var("TEST_CONFIG").unwrap_or_else(|_| "tests/config.yaml".into())
}

pub fn load_config() -> Result<Config> {
    let pb = PathBuf::from(test_path());
    let cfg = Config::load_from_file(&pb).with_context(|| format!("failed to load {:?}", pb))?;
    Ok(cfg)
}

/// Device under test, if the environment names one.
pub fn test_device() -> Option<PathBuf> {
    std::env::var_os("TEST_SCSI_DEVICE").map(PathBuf::from)
}
