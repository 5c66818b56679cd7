// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    cfg::{
        cli::CliArgs,
        enums::{Backend, YesNo},
    },
    transport::TransportOptions,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Where commands go and how they are traced.
    pub transport: TransportConfig,
    /// Where the capture is written.
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TransportConfig {
    #[serde(rename = "Backend")]
    pub backend: Backend,

    #[serde(default, rename = "Device", skip_serializing_if = "Option::is_none")]
    /// Device node, ScsiGeneric only.
    pub device: Option<PathBuf>,

    #[serde(default, rename = "Capture", skip_serializing_if = "Option::is_none")]
    /// Earlier capture, Replay only.
    pub capture: Option<PathBuf>,

    #[serde(
        default = "default_timeout",
        rename = "TimeoutSecs",
        with = "serde_secs"
    )]
    pub timeout: Duration,

    #[serde(default, rename = "TraceExchanges")]
    pub trace_exchanges: YesNo,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct OutputConfig {
    #[serde(default, rename = "Path", skip_serializing_if = "Option::is_none")]
    /// Capture file; stdout when absent.
    pub path: Option<PathBuf>,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl TransportConfig {
    pub fn options(&self) -> TransportOptions {
        TransportOptions {
            trace_exchanges: self.trace_exchanges.as_bool(),
            timeout: self.timeout,
        }
    }
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_yaml(&s)
    }

    pub fn from_yaml(s: &str) -> Result<Self> {
        let mut cfg: Config =
            serde_yaml::from_str(s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Builds the configuration from `args` alone.
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let backend = match (&args.device, &args.replay) {
            (Some(_), None) => Backend::ScsiGeneric,
            (None, Some(_)) => Backend::Replay,
            (Some(_), Some(_)) => bail!("--device and --replay are mutually exclusive"),
            (None, None) => bail!("no config file given: pass --device or --replay"),
        };
        let mut cfg = Config {
            transport: TransportConfig {
                backend,
                device: None,
                capture: None,
                timeout: DEFAULT_TIMEOUT,
                trace_exchanges: YesNo::No,
            },
            output: OutputConfig::default(),
        };
        cfg.apply_cli(args)?;
        Ok(cfg)
    }

    /// Overrides file values with whatever `args` sets.
    pub fn apply_cli(&mut self, args: &CliArgs) -> Result<()> {
        let t = &mut self.transport;
        if let Some(dev) = &args.device {
            t.backend = Backend::ScsiGeneric;
            t.device = Some(dev.clone());
        }
        if let Some(cap) = &args.replay {
            t.backend = Backend::Replay;
            t.capture = Some(cap.clone());
        }
        if let Some(secs) = args.timeout {
            t.timeout = Duration::from_secs(secs);
        }
        if args.trace {
            t.trace_exchanges = YesNo::Yes;
        }
        if let Some(out) = &args.output {
            self.output.path = Some(out.clone());
        }
        self.validate_and_normalize()
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        let t = &mut self.transport;
        match t.backend {
            Backend::ScsiGeneric => {
                ensure!(
                    t.device.as_ref().is_some_and(|p| !p.as_os_str().is_empty()),
                    "Device is required for the ScsiGeneric backend"
                );
                t.capture = None;
            },
            Backend::Replay => {
                ensure!(
                    t.capture.as_ref().is_some_and(|p| !p.as_os_str().is_empty()),
                    "Capture is required for the Replay backend"
                );
                t.device = None;
            },
        }
        ensure!(t.timeout >= Duration::from_secs(1), "TimeoutSecs must be >= 1");

        if self.output.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.output.path = None;
        }
        Ok(())
    }
}

/// Serde helpers for representing `Duration` as a number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
