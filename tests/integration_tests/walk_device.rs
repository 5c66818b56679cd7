// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Integration: walk a real SG device named by `TEST_SCSI_DEVICE`, then
//! replay the capture and compare.

use std::io::Cursor;

use anyhow::Result;
use scsi_capture_rs::{
    capture::{record::HEADER, writer::read_capture},
    cfg::enums::Backend,
    transport::{TransportOptions, replay::ReplayTransport},
    walker::{Walker, plan::WalkPlan},
};

use crate::integration_tests::common::{load_config, test_device};

#[test]
fn sample_config_loads() -> Result<()> {
    let cfg = load_config()?;
    assert_eq!(cfg.transport.backend, Backend::ScsiGeneric);
    assert!(cfg.transport.device.is_some());
    Ok(())
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn walk_then_replay_real_device() -> Result<()> {
    use scsi_capture_rs::transport::sg::SgTransport;

    let Some(device) = test_device() else {
        eprintln!("TEST_SCSI_DEVICE is not set, skipping");
        return Ok(());
    };

    let opts = TransportOptions {
        trace_exchanges: true,
        ..TransportOptions::default()
    };
    let mut sg = SgTransport::open(&device, opts)?;
    let mut walker = Walker::new(&mut sg, Vec::new());
    let stats = walker.run_all(&WalkPlan::standard()).await?;
    let (_, out) = walker.finish()?;
    let capture = String::from_utf8(out)?;

    assert_eq!(capture.lines().next(), Some(HEADER));
    // capacity, inquiry and both sweeps run whatever the device says
    assert!(stats.exchanges >= 2 + 1 + 24 + 64);

    let records = read_capture(Cursor::new(capture.as_bytes()))?;
    let mut replay = ReplayTransport::from_records(records, TransportOptions::default());
    let mut walker = Walker::new(&mut replay, Vec::new());
    walker.run_all(&WalkPlan::standard()).await?;
    let (_, replayed) = walker.finish()?;
    assert_eq!(String::from_utf8(replayed)?, capture);
    Ok(())
}
