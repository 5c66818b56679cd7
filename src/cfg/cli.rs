// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Walk the SCSI diagnostic surface of a device and capture every exchange
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "scsi-capture",
    version,
    about = "Walk the SCSI diagnostic surface of a device and capture every exchange",
    after_help = "EXAMPLES:\n    \
        scsi-capture --device /dev/sg1 > disk.csv\n    \
        scsi-capture --config tests/config.yaml --log-config tests/config_logger.yaml\n    \
        scsi-capture --replay disk.csv -o replayed.csv"
)]
pub struct CliArgs {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// YAML logger configuration; logs go to stderr when absent
    #[arg(long, value_name = "FILE")]
    pub log_config: Option<String>,

    /// SCSI generic device node to walk
    #[arg(short, long, value_name = "DEVICE", conflicts_with = "replay")]
    pub device: Option<PathBuf>,

    /// Answer commands from an earlier capture instead of a device
    #[arg(long, value_name = "CAPTURE")]
    pub replay: Option<PathBuf>,

    /// Capture destination (stdout when absent)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Log a hex dump of every command and completion at debug level
    #[arg(long)]
    pub trace: bool,

    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
