// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use hex_literal::hex;
use scsi_capture_rs::walker::plan::{Family, WalkPlan};

use crate::unit_tests::common::{FakeDevice, Reply, data_lines, walk_plan};

#[tokio::test]
async fn mode_sense_sweep_is_sixteen_then_eight() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(hex!("00 00 00 00").to_vec()));
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::ModeSense])).await?;

    assert_eq!(data_lines(&out).len(), 24);
    assert!(dev.issued[..16].iter().all(|c| c[0] == 0x5A && c.len() == 10));
    assert!(dev.issued[16..].iter().all(|c| c[0] == 0x1A && c.len() == 6));

    // (LLBAA=1, DBD=1) x current comes first, (LLBAA=1, DBD=0) x saved last
    assert_eq!(dev.issued[0], hex!("5a 18 3f ff 00 00 00 10 00 00"));
    assert_eq!(dev.issued[1], hex!("5a 18 7f ff 00 00 00 10 00 00"));
    assert_eq!(dev.issued[4], hex!("5a 08 3f ff 00 00 00 10 00 00"));
    assert_eq!(dev.issued[8], hex!("5a 00 3f ff 00 00 00 10 00 00"));
    assert_eq!(dev.issued[15], hex!("5a 10 ff ff 00 00 00 10 00 00"));

    assert_eq!(dev.issued[16], hex!("1a 08 3f ff ff 00"));
    assert_eq!(dev.issued[23], hex!("1a 00 ff ff ff 00"));
    Ok(())
}

#[tokio::test]
async fn mode_sense_sweep_ignores_device_errors() -> Result<()> {
    let mut dev = FakeDevice::refusing();
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::ModeSense])).await?;
    assert_eq!(data_lines(&out).len(), 24);
    assert_eq!(stats.device_errors, 24);
    Ok(())
}

#[tokio::test]
async fn defect_sweep_is_sixty_four() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(hex!("00 1d 00 00 00 00 00 00").to_vec()));
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::DefectData])).await?;

    assert_eq!(data_lines(&out).len(), 64);
    assert!(dev.issued[..32].iter().all(|c| c[0] == 0x37 && c.len() == 10));
    assert!(dev.issued[32..].iter().all(|c| c[0] == 0xB7 && c.len() == 12));

    // format 0, PLIST, count only, then the full list
    assert_eq!(dev.issued[0], hex!("37 00 10 00 00 00 00 00 08 00"));
    assert_eq!(dev.issued[1], hex!("37 00 10 00 00 00 00 02 00 00"));
    // format 0, GLIST
    assert_eq!(dev.issued[2], hex!("37 00 08 00 00 00 00 00 08 00"));
    // format 7, GLIST, full list
    assert_eq!(dev.issued[31], hex!("37 00 0f 00 00 00 00 02 00 00"));
    assert_eq!(dev.issued[32], hex!("b7 10 00 00 00 00 00 00 00 08 00 00"));
    assert_eq!(dev.issued[63], hex!("b7 0f 00 00 00 00 00 00 02 00 00 00"));
    Ok(())
}

#[tokio::test]
async fn defect_sweep_survives_transport_failures() -> Result<()> {
    let mut n = 0usize;
    let mut dev = FakeDevice::new(move |_| {
        n += 1;
        if n % 2 == 0 { Reply::Fail } else { Reply::Good(Vec::new()) }
    });
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::DefectData])).await?;
    assert_eq!(data_lines(&out).len(), 64);
    assert_eq!(stats.transport_failures, 32);
    Ok(())
}
