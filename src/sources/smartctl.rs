// Per-device health from smartctl
//
// Unlike the other sources this one is not loaded up front: the joiner asks
// for a health record per row, passing whatever it has correlated so far.

use super::{CsvFragment, DfRecord, DmidecodeRecord, HpArrayMap, PartedRecord, ScsiRecord};
use crate::command::CommandRunner;
use crate::{SourceError, SourceResult};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartctlRecord {
    pub device: String,
    pub model: String,
    pub serial: String,
    pub capacity_bytes: Option<u64>,
    /// 0 for solid state.
    pub rotation_rate: Option<u32>,
    pub health: String,
    pub temperature_celsius: Option<u32>,
}

impl CsvFragment for SmartctlRecord {
    const COLUMNS: &'static [&'static str] = &[
        "smart_device",
        "smart_model",
        "smart_serial",
        "smart_capacity",
        "smart_rpm",
        "smart_health",
        "smart_temp",
    ];

    fn values(&self) -> Vec<String> {
        let opt = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
        vec![
            self.device.clone(),
            self.model.clone(),
            self.serial.clone(),
            opt(self.capacity_bytes),
            opt(self.rotation_rate.map(u64::from)),
            self.health.clone(),
            opt(self.temperature_celsius.map(u64::from)),
        ]
    }
}

/// Everything the joiner knows about one row when it asks for health.
#[derive(Debug, Clone, Copy)]
pub struct HealthQuery<'a> {
    pub mount: &'a DfRecord,
    pub scsi: Option<&'a ScsiRecord>,
    pub partition: Option<&'a PartedRecord>,
    pub system: &'a DmidecodeRecord,
    pub hp: Option<&'a HpArrayMap>,
}

impl HealthQuery<'_> {
    /// Physical device to inspect: the SCSI device, else the disk under the
    /// partition, else the disk under the mount. Software devices (md,
    /// device-mapper) and network filesystems have no S.M.A.R.T. data.
    pub fn target_device(&self) -> Option<&str> {
        let candidate = self
            .scsi
            .map(|s| s.device.as_str())
            .or_else(|| self.partition.map(|p| p.devpath.as_str()))
            .or_else(|| Some(self.mount.devname.as_str()).filter(|d| !d.is_empty()))?;

        let physical = candidate.starts_with("/dev/")
            && !candidate.starts_with("/dev/md")
            && !candidate.starts_with("/dev/mapper/")
            && !candidate.starts_with("/dev/dm-")
            && !candidate.starts_with("/dev/loop");

        physical.then_some(candidate)
    }
}

pub trait HealthSource {
    fn inspect(&mut self, query: &HealthQuery<'_>) -> Option<SmartctlRecord>;
}

impl<F> HealthSource for F
where
    F: FnMut(&HealthQuery<'_>) -> Option<SmartctlRecord>,
{
    fn inspect(&mut self, query: &HealthQuery<'_>) -> Option<SmartctlRecord> {
        self(query)
    }
}

/// Health lookups backed by smartctl, one invocation per device per run.
pub struct SmartctlInspector<'r> {
    runner: &'r dyn CommandRunner,
    program: String,
    cache: HashMap<String, Option<SmartctlRecord>>,
}

impl<'r> SmartctlInspector<'r> {
    pub fn new(runner: &'r dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            cache: HashMap::new(),
        }
    }

    fn query_device(&self, device: &str) -> SourceResult<SmartctlRecord> {
        // smartctl's exit status is a bit mask that is non-zero for merely
        // worrying drives, so judge by whether the JSON parses
        let output = self.runner.run(&self.program, &["-H", "-i", "-A", "-j", device])?;
        if output.stdout.trim().is_empty() {
            return output.into_stdout(&self.program).map(|_| SmartctlRecord::default());
        }
        parse_smartctl_json(device, &output.stdout)
    }
}

impl HealthSource for SmartctlInspector<'_> {
    fn inspect(&mut self, query: &HealthQuery<'_>) -> Option<SmartctlRecord> {
        let device = query.target_device()?;

        if let Some(drive) = query.hp.and_then(|hp| hp.first(device)) {
            return Some(SmartctlRecord {
                device: device.to_string(),
                model: format!("{} logical drive {}", drive.controller, drive.logical_drive),
                health: drive.status.clone(),
                ..SmartctlRecord::default()
            });
        }

        if query.system.is_virtual() {
            return None;
        }

        if let Some(cached) = self.cache.get(device) {
            return cached.clone();
        }

        let record = match self.query_device(device) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(device, error = %e, "No S.M.A.R.T. data");
                None
            }
        };
        self.cache.insert(device.to_string(), record.clone());
        record
    }
}

#[derive(Debug, Deserialize)]
struct SmartctlJson {
    model_name: Option<String>,
    scsi_model_name: Option<String>,
    serial_number: Option<String>,
    user_capacity: Option<Capacity>,
    rotation_rate: Option<u32>,
    smart_status: Option<SmartStatus>,
    temperature: Option<Temperature>,
    smartctl: Option<SmartctlMeta>,
}

#[derive(Debug, Deserialize)]
struct Capacity {
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SmartStatus {
    passed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    current: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SmartctlMeta {
    #[serde(default)]
    messages: Vec<SmartctlMessage>,
}

#[derive(Debug, Deserialize)]
struct SmartctlMessage {
    string: String,
    severity: Option<String>,
}

/// Parse `smartctl -j` output for `device`.
pub fn parse_smartctl_json(device: &str, text: &str) -> SourceResult<SmartctlRecord> {
    let parsed: SmartctlJson = serde_json::from_str(text)?;

    let health = match parsed.smart_status.and_then(|s| s.passed) {
        Some(true) => "PASSED".to_string(),
        Some(false) => "FAILED".to_string(),
        None => "UNKNOWN".to_string(),
    };

    let error = parsed
        .smartctl
        .iter()
        .flat_map(|meta| meta.messages.iter())
        .find(|m| m.severity.as_deref() == Some("error"));

    // An error with no identity at all means the device was never opened
    let identified = parsed.model_name.is_some()
        || parsed.scsi_model_name.is_some()
        || parsed.serial_number.is_some()
        || health != "UNKNOWN";
    match error {
        Some(error) if !identified => {
            return Err(SourceError::Malformed {
                what: "smartctl",
                detail: error.string.clone(),
            });
        }
        Some(error) => {
            tracing::debug!(device, message = %error.string, "smartctl reported an error");
        }
        None => {}
    }

    Ok(SmartctlRecord {
        device: device.to_string(),
        model: parsed
            .model_name
            .or(parsed.scsi_model_name)
            .unwrap_or_default(),
        serial: parsed.serial_number.unwrap_or_default(),
        capacity_bytes: parsed.user_capacity.and_then(|c| c.bytes),
        rotation_rate: parsed.rotation_rate,
        health,
        temperature_celsius: parsed.temperature.and_then(|t| t.current),
    })
}
