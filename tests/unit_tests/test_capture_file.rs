// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, io::BufReader, path::PathBuf};

use anyhow::Result;
use scsi_capture_rs::{
    capture::{
        record::{HEADER, Record},
        writer::{RecordWriter, read_capture},
    },
    transport::{Direction, ScsiTransport, TransportOptions, replay::ReplayTransport},
};

fn temp_capture(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("scsi-capture-{}-{name}.csv", std::process::id()))
}

#[test]
fn sample_capture_parses() -> Result<()> {
    let file = fs::File::open("tests/fixtures/sample_capture.csv")?;
    let records = read_capture(BufReader::new(file))?;

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].cdb, vec![0x25, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert!(records[1].sense.starts_with(&[0x70, 0x00, 0x05]));
    assert!(records[2].is_notice());
    assert_eq!(records[3].message, "failed to submit command");
    Ok(())
}

#[test]
fn header_is_required() {
    let res = read_capture(",25,,\n".as_bytes());
    assert!(res.is_err());
}

#[test]
fn notice_commas_do_not_break_fields() -> Result<()> {
    let mut w = RecordWriter::new(Vec::new());
    w.write(&Record::notice("one, two\nthree"))?;
    let out = String::from_utf8(w.into_inner())?;
    assert_eq!(out, format!("{HEADER}\none; two three,,,\n"));
    Ok(())
}

#[tokio::test]
async fn replay_transport_opens_a_file() -> Result<()> {
    let path = temp_capture("open");
    fs::write(
        &path,
        format!("{HEADER}\n,12 00 00 02 00 00,,00 00 05 02\n"),
    )?;

    let mut t = ReplayTransport::open(&path, TransportOptions::default())?;
    t.submit(&[0x12, 0, 0, 2, 0, 0], 512, Direction::FromDevice).await?;
    let c = t.read_result().await?;
    assert_eq!(c.data, vec![0x00, 0x00, 0x05, 0x02]);
    assert!(c.sense.is_none());

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn missing_capture_is_an_error() {
    let res = ReplayTransport::open(temp_capture("missing"), TransportOptions::default());
    assert!(res.is_err());
}
