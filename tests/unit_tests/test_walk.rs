// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::io::{self, Write};

use anyhow::Result;
use hex_literal::hex;
use scsi_capture_rs::{
    capture::record::HEADER,
    walker::{
        WalkError, Walker,
        exchange::SUBMIT_FAILED_MESSAGE,
        plan::{Family, WalkPlan},
    },
};

use crate::unit_tests::common::{FakeDevice, Reply, data_lines, walk_plan};

// capacity 2, inquiry 1, vpd directory 1, log directory 1,
// mode sense 16 + 8, diagnostics directory 1, defect data 64
const DIRECTORY_LESS_WALK: usize = 2 + 1 + 1 + 1 + 24 + 1 + 64;

#[tokio::test]
async fn header_comes_first_even_if_everything_fails() -> Result<()> {
    let mut dev = FakeDevice::failing();
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::standard()).await?;

    assert_eq!(out.lines().next(), Some(HEADER));
    let lines = data_lines(&out);
    assert_eq!(lines.len(), DIRECTORY_LESS_WALK);
    for line in &lines {
        let fields: Vec<_> = line.split(',').collect();
        assert_eq!(fields.len(), 4, "{line}");
        assert_eq!(fields[0], SUBMIT_FAILED_MESSAGE);
        assert!(!fields[1].is_empty());
        assert_eq!(fields[2], "");
        assert_eq!(fields[3], "");
    }
    assert_eq!(stats.transport_failures, DIRECTORY_LESS_WALK);
    assert_eq!(stats.device_errors, 0);
    assert_eq!(stats.records(), DIRECTORY_LESS_WALK);
    Ok(())
}

#[tokio::test]
async fn refusing_device_is_data_not_fault() -> Result<()> {
    let mut dev = FakeDevice::refusing();
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::standard()).await?;

    let lines = data_lines(&out);
    assert_eq!(lines.len(), DIRECTORY_LESS_WALK);
    assert!(lines.iter().all(|l| l.starts_with(',') && !l.split(',').nth(2).unwrap_or("").is_empty()));
    assert_eq!(stats.device_errors, DIRECTORY_LESS_WALK);
    assert_eq!(stats.transport_failures, 0);
    Ok(())
}

#[tokio::test]
async fn capacity_family_emits_two_clean_records() -> Result<()> {
    let mut dev = FakeDevice::new(|cdb| match cdb[0] {
        0x25 => Reply::Good(hex!("00 ff ff ff 00 00 02 00").to_vec()),
        0x9E => Reply::Good(hex!(
            "00 00 00 00 00 ff ff ff 00 00 02 00 00 00 00 00
             00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
        )
        .to_vec()),
        _ => Reply::Fail,
    });
    let (out, stats) = walk_plan(&mut dev, &WalkPlan::only([Family::Capacity])).await?;

    assert_eq!(
        data_lines(&out),
        [
            ",25 00 00 00 00 00 00 00 00 00,,00 ff ff ff 00 00 02 00",
            concat!(
                ",9e 10 00 00 00 00 00 00 00 00 00 00 02 00 00 00,,",
                "00 00 00 00 00 ff ff ff 00 00 02 00 00 00 00 00 ",
                "00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
            ),
        ]
    );
    assert_eq!(stats.exchanges, 2);
    Ok(())
}

#[tokio::test]
async fn responses_are_cut_to_capacity() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(vec![0xAB; 64]));
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::Capacity])).await?;
    let first = data_lines(&out)[0];
    let data = first.rsplit(',').next().unwrap_or("");
    assert_eq!(data.split(' ').count(), 8);
    Ok(())
}

#[tokio::test]
async fn standard_inquiry_cdb() -> Result<()> {
    let mut dev = FakeDevice::new(|_| Reply::Good(Vec::new()));
    let (out, _) = walk_plan(&mut dev, &WalkPlan::only([Family::Inquiry])).await?;
    assert_eq!(data_lines(&out), [",12 00 00 02 00 00,,"]);
    Ok(())
}

#[tokio::test]
async fn families_run_in_plan_order() -> Result<()> {
    let mut dev = FakeDevice::refusing();
    walk_plan(&mut dev, &WalkPlan::standard()).await?;

    let mut opcodes: Vec<u8> = dev.issued.iter().map(|c| c[0]).collect();
    opcodes.dedup();
    assert_eq!(
        opcodes,
        [0x25, 0x9E, 0x12, 0x4D, 0x5A, 0x1A, 0x1C, 0x37, 0xB7]
    );
    Ok(())
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn output_failure_aborts_the_walk() {
    let mut dev = FakeDevice::failing();
    let mut walker = Walker::new(&mut dev, BrokenPipe);
    let res = walker.run_all(&WalkPlan::standard()).await;
    assert!(matches!(res, Err(WalkError::Output(_))));
    drop(walker);
    assert!(dev.issued.is_empty());
}
