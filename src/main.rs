// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;
use scsi_capture_rs::{
    cfg::{
        cli::{CliArgs, resolve_config_path},
        config::Config,
        enums::Backend,
        logger::{init_logger, init_stderr_logger},
    },
    transport::{ScsiTransport, replay::ReplayTransport},
    walker::{WalkStats, Walker, plan::WalkPlan},
};
use tokio::main;
use tracing::{info, warn};

#[main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let _log_guard = match args.log_config.as_deref() {
        Some(path) => init_logger(path)?,
        None => init_stderr_logger()?,
    };

    let config = match args.config.as_deref() {
        Some(rel) => {
            let mut cfg = resolve_config_path(rel)
                .and_then(Config::load_from_file)
                .context("failed to resolve or load config")?;
            cfg.apply_cli(&args)?;
            cfg
        },
        None => Config::from_cli(&args)?,
    };

    let out: Box<dyn Write> = match &config.output.path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {path:?}"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let opts = config.transport.options();
    let stats = match config.transport.backend {
        Backend::ScsiGeneric => {
            let device = config
                .transport
                .device
                .as_deref()
                .context("Device is required for the ScsiGeneric backend")?;
            walk_device(device, opts, out).await?
        },
        Backend::Replay => {
            let capture = config
                .transport
                .capture
                .as_deref()
                .context("Capture is required for the Replay backend")?;
            let mut transport = ReplayTransport::open(capture, opts)?;
            let stats = walk(&mut transport, out).await?;
            if transport.remaining() > 0 {
                warn!(unused = transport.remaining(), "capture holds exchanges the walk never issued");
            }
            stats
        },
    };

    info!(
        records = stats.records(),
        exchanges = stats.exchanges,
        transport_failures = stats.transport_failures,
        device_errors = stats.device_errors,
        notices = stats.notices,
        "walk complete"
    );
    Ok(())
}

async fn walk<T: ScsiTransport>(transport: &mut T, out: Box<dyn Write>) -> Result<WalkStats> {
    let mut walker = Walker::new(transport, out);
    walker
        .run_all(&WalkPlan::standard())
        .await
        .context("walk aborted")?;
    let (stats, _) = walker.finish().context("failed to flush capture")?;
    Ok(stats)
}

#[cfg(target_os = "linux")]
async fn walk_device(
    device: &Path,
    opts: scsi_capture_rs::transport::TransportOptions,
    out: Box<dyn Write>,
) -> Result<WalkStats> {
    let mut transport = scsi_capture_rs::transport::sg::SgTransport::open(device, opts)?;
    info!(device = ?transport.path(), "device opened");
    walk(&mut transport, out).await
}

#[cfg(not(target_os = "linux"))]
async fn walk_device(
    device: &Path,
    _opts: scsi_capture_rs::transport::TransportOptions,
    _out: Box<dyn Write>,
) -> Result<WalkStats> {
    anyhow::bail!("the ScsiGeneric backend needs Linux; cannot open {device:?}")
}
