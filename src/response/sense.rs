use std::fmt;

use anyhow::{Result, anyhow, bail};

/// Fixed-format sense-data needs at least 14 bytes to reach ASC/ASCQ.
pub const FIXED_MIN_LEN: usize = 14;
/// Descriptor-format sense-data header is 8 bytes.
pub const DESCRIPTOR_MIN_LEN: usize = 8;

/// Sense data layout as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseFormat {
    Fixed,
    Descriptor,
}

/// Key / ASC / ASCQ triple extracted from either sense format (SPC-4 § 4.5).
///
/// The walker records raw sense bytes verbatim; this view only feeds logs.
#[derive(Default, PartialEq, Eq, Clone, Copy)]
pub struct SenseSummary {
    pub response_code: u8,
    pub deferred: bool,
    pub sense_key: u8,
    pub asc: u8,
    pub ascq: u8,
    pub format: Option<SenseFormat>,
}

impl SenseSummary {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let b0 = *buf.first().ok_or_else(|| anyhow!("empty sense buffer"))?;
        let response_code = b0 & 0x7F;

        match response_code {
            0x70 | 0x71 => {
                if buf.len() < FIXED_MIN_LEN {
                    bail!("fixed sense too small: {} < {FIXED_MIN_LEN}", buf.len());
                }
                Ok(Self {
                    response_code,
                    deferred: response_code == 0x71,
                    sense_key: buf[2] & 0x0F,
                    asc: buf[12],
                    ascq: buf[13],
                    format: Some(SenseFormat::Fixed),
                })
            },
            0x72 | 0x73 => {
                if buf.len() < DESCRIPTOR_MIN_LEN {
                    bail!(
                        "descriptor sense too small: {} < {DESCRIPTOR_MIN_LEN}",
                        buf.len()
                    );
                }
                Ok(Self {
                    response_code,
                    deferred: response_code == 0x73,
                    sense_key: buf[1] & 0x0F,
                    asc: buf[2],
                    ascq: buf[3],
                    format: Some(SenseFormat::Descriptor),
                })
            },
            other => bail!("unknown sense response code {other:#04x}"),
        }
    }

    pub fn sense_key_str(&self) -> &'static str {
        SENSE_KEY_DESCRIPTIONS
            .get(self.sense_key as usize)
            .copied()
            .unwrap_or("Invalid sense key")
    }
}

impl fmt::Debug for SenseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenseSummary")
            .field(
                "response_code",
                &format_args!("{:#04x}", self.response_code),
            )
            .field("deferred", &self.deferred)
            .field("sense_key", &format_args!("{:#x}", self.sense_key))
            .field("key", &self.sense_key_str())
            .field("asc", &format_args!("{:#04x}", self.asc))
            .field("ascq", &format_args!("{:#04x}", self.ascq))
            .field("description", &asc_ascq_to_str(self.asc, self.ascq))
            .finish()
    }
}

pub const SENSE_KEY_DESCRIPTIONS: [&str; 16] = [
    "No Sense",
    "Recovered Error",
    "Not Ready",
    "Medium Error",
    "Hardware Error",
    "Illegal Request",
    "Unit Attention",
    "Data Protect",
    "Blank Check",
    "Vendor specific",
    "Copy Aborted",
    "Aborted Command",
    "Equal",
    "Volume Overflow",
    "Miscompare",
    "Completed",
];

/// Return the SPC-4 description for a given ASC/ASCQ pair.
///
/// * If the pair is not present in the table, returns `"UNSPECIFIED /
///   vendor specific"`.
#[inline]
pub fn asc_ascq_to_str(asc: u8, ascq: u8) -> &'static str {
    hot_table(asc, ascq).unwrap_or("UNSPECIFIED / vendor specific")
}

fn hot_table(asc: u8, ascq: u8) -> Option<&'static str> {
    Some(match (asc, ascq) {
        (0x00, 0x00) => "No additional sense information",
        (0x04, 0x01) => "Logical unit is in process of becoming ready",
        (0x1C, 0x00) => "Defect list not found",
        (0x1C, 0x01) => "Primary defect list not found",
        (0x1C, 0x02) => "Grown defect list not found",
        (0x20, 0x00) => "Invalid command operation code",
        (0x24, 0x00) => "Invalid field in CDB",
        (0x25, 0x00) => "Logical unit not supported",
        (0x29, 0x00) => "Power on, reset, or bus device reset occurred",
        (0x35, 0x01) => "Unsupported enclosure function",
        (0x3A, 0x00) => "Medium not present",
        _ => return None,
    })
}
