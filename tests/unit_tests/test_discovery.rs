// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use hex_literal::hex;
use scsi_capture_rs::walker::plan::{Family, WalkPlan};

use crate::unit_tests::common::{FakeDevice, Reply, data_lines, illegal_request, walk_plan};

const LOG_PAGES_DIR: [u8; 10] = hex!("4d 00 40 00 00 00 00 40 00 00");
const LOG_SUBPAGES_DIR: [u8; 10] = hex!("4d 00 40 ff 00 00 00 40 00 00");

#[tokio::test]
async fn log_sense_pages_then_subpages() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        c if c == LOG_PAGES_DIR => Reply::Good(hex!("00 00 00 02 0d 2f").to_vec()),
        c if c == LOG_SUBPAGES_DIR => Reply::Good(hex!("40 ff 00 02 0d 00").to_vec()),
        [0x4D, ..] => Reply::Good(hex!("0d 00 00 00").to_vec()),
        _ => Reply::Fail,
    });
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    assert_eq!(
        data_lines(&out),
        [
            ",4d 00 40 00 00 00 00 40 00 00,,00 00 00 02 0d 2f",
            ",4d 00 4d 00 00 00 00 40 00 00,,0d 00 00 00",
            ",4d 00 6f 00 00 00 00 40 00 00,,0d 00 00 00",
            ",4d 00 40 ff 00 00 00 40 00 00,,40 ff 00 02 0d 00",
            "skipping log page 0d subpage 00 already retrieved,,,",
        ]
    );
    assert_eq!(stats.exchanges, 4);
    assert_eq!(stats.notices, 1);
    Ok(())
}

#[tokio::test]
async fn log_subpages_are_fetched_with_masked_page() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        c if c == LOG_PAGES_DIR => Reply::Good(hex!("00 00 00 00").to_vec()),
        c if c == LOG_SUBPAGES_DIR => Reply::Good(hex!("40 ff 00 04 00 ff 58 01").to_vec()),
        _ => Reply::Good(Vec::new()),
    });
    walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    assert_eq!(dev.issued.len(), 4);
    assert_eq!(dev.issued[2], hex!("4d 00 40 ff 00 00 00 40 00 00"));
    assert_eq!(dev.issued[3], hex!("4d 00 58 01 00 00 00 40 00 00"));
    Ok(())
}

#[tokio::test]
async fn log_pass_one_header_mismatch_stops_family() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(hex!("0d 00 00 01 0d").to_vec()));
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    let lines = data_lines(&out);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "expected to receive log page 0 subpage 0,,,");
    assert_eq!(dev.issued.len(), 1);
    Ok(())
}

#[tokio::test]
async fn log_pass_two_header_mismatch_is_reported() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        c if c == LOG_PAGES_DIR => Reply::Good(hex!("00 00 00 00").to_vec()),
        _ => Reply::Good(hex!("00 00 00 00").to_vec()),
    });
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    let lines = data_lines(&out);
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[2],
        "expected to receive log page 0 (spf=1) subpage 0xff,,,"
    );
    Ok(())
}

#[tokio::test]
async fn short_directory_is_one_message() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(hex!("00 00 00").to_vec()));
    let (out, _) =
        walk_plan(&mut dev, &WalkPlan::only([Family::ReceiveDiagnostics])).await?;

    assert_eq!(
        data_lines(&out),
        [
            ",1c 01 00 40 00 00,,00 00 00",
            "receive diagnostics list must have at least 4 bytes,,,",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn directory_device_error_is_one_record() -> Result<()> {
    for family in [
        Family::ExtendedInquiry,
        Family::LogSense,
        Family::ReceiveDiagnostics,
    ] {
        let mut dev = FakeDevice::refusing();
        let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([family])).await?;
        assert_eq!(data_lines(&out).len(), 1, "{family}");
        assert_eq!(stats.device_errors, 1);
    }
    Ok(())
}

#[tokio::test]
async fn directory_transport_failure_is_one_record() -> Result<()> {
    let mut dev = FakeDevice::failing();
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::ExtendedInquiry])).await?;
    assert_eq!(
        data_lines(&out),
        ["failed to submit command,12 01 00 02 00 00,,"]
    );
    Ok(())
}

#[tokio::test]
async fn vpd_directory_yields_one_plus_n() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        [0x12, 0x01, 0x00, ..] => Reply::Good(hex!("00 00 00 03 00 80 83").to_vec()),
        [0x12, 0x01, 0x80, ..] => Reply::Check(illegal_request()),
        [0x12, 0x01, page, ..] => Reply::Good(vec![0x00, *page, 0x00, 0x00]),
        _ => Reply::Fail,
    });
    let (out, stats) =
        walk_plan(&mut dev, &WalkPlan::only([Family::ExtendedInquiry])).await?;

    let lines = data_lines(&out);
    assert_eq!(lines.len(), 4);
    assert_eq!(
        dev.issued,
        [
            hex!("12 01 00 02 00 00"),
            hex!("12 01 00 02 00 00"),
            hex!("12 01 80 02 00 00"),
            hex!("12 01 83 02 00 00"),
        ]
    );
    // item device error is recorded and iteration goes on
    assert!(lines[2].starts_with(",12 01 80 02 00 00,70 00 05"));
    assert_eq!(lines[3], ",12 01 83 02 00 00,,00 83 00 00");
    assert_eq!(stats.device_errors, 1);
    Ok(())
}

#[tokio::test]
async fn oversized_count_is_clamped() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        [0x1C, 0x01, 0x00, ..] => Reply::Good(hex!("00 00 00 c8 01 02").to_vec()),
        _ => Reply::Good(Vec::new()),
    });
    let (out, _) =
        walk_plan(&mut dev, &WalkPlan::only([Family::ReceiveDiagnostics])).await?;

    assert_eq!(data_lines(&out).len(), 3);
    assert_eq!(dev.issued[1], hex!("1c 01 01 40 00 00"));
    assert_eq!(dev.issued[2], hex!("1c 01 02 40 00 00"));
    Ok(())
}

#[tokio::test]
async fn item_transport_failure_does_not_stop_iteration() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        [0x1C, 0x01, 0x00, ..] => Reply::Good(hex!("00 00 00 02 01 02").to_vec()),
        [0x1C, 0x01, 0x01, ..] => Reply::Fail,
        _ => Reply::Good(hex!("02 00 00 00").to_vec()),
    });
    let (out, stats) =
        walk_plan(&mut dev, &WalkPlan::only([Family::ReceiveDiagnostics])).await?;

    assert_eq!(
        data_lines(&out),
        [
            ",1c 01 00 40 00 00,,00 00 00 02 01 02",
            "failed to submit command,1c 01 01 40 00 00,,",
            ",1c 01 02 40 00 00,,02 00 00 00",
        ]
    );
    assert_eq!(stats.transport_failures, 1);
    Ok(())
}

#[tokio::test]
async fn refused_subpage_directory_ends_after_pass_one() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        c if c == LOG_PAGES_DIR => Reply::Good(hex!("00 00 00 02 0d 2f").to_vec()),
        c if c == LOG_SUBPAGES_DIR => Reply::Check(illegal_request()),
        [0x4D, ..] => Reply::Good(hex!("0d 00 00 00").to_vec()),
        _ => Reply::Fail,
    });
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    let lines = data_lines(&out);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], ",4d 00 4d 00 00 00 00 40 00 00,,0d 00 00 00");
    assert_eq!(lines[2], ",4d 00 6f 00 00 00 00 40 00 00,,0d 00 00 00");
    assert!(lines[3].starts_with(",4d 00 40 ff 00 00 00 40 00 00,70 00 05"));
    assert_eq!(dev.issued.len(), 4);
    assert_eq!(stats.device_errors, 1);
    assert_eq!(stats.notices, 0);
    Ok(())
}

#[tokio::test]
async fn failed_page_directory_skips_subpage_pass() -> Result<()> {
    let mut dev = FakeDevice::failing();
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::LogSense])).await?;

    assert_eq!(
        data_lines(&out),
        ["failed to submit command,4d 00 40 00 00 00 00 40 00 00,,"]
    );
    assert_eq!(dev.issued, [LOG_PAGES_DIR.to_vec()]);
    assert_eq!(stats.transport_failures, 1);
    Ok(())
}

#[tokio::test]
async fn short_vpd_directory_is_reported() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb {
        [0x12, 0x01, 0x00, ..] => Reply::Good(hex!("00 00").to_vec()),
        _ => Reply::Fail,
    });
    let (out, stats) =
        walk_plan(&mut dev, &WalkPlan::only([Family::ExtendedInquiry])).await?;

    assert_eq!(
        data_lines(&out),
        [
            ",12 01 00 02 00 00,,00 00",
            "vpd page list must have at least 4 bytes,,,",
        ]
    );
    assert_eq!(dev.issued.len(), 1);
    assert_eq!(stats.notices, 1);
    Ok(())
}
