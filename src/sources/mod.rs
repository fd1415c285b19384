// Data sources
//
// Organized structure:
// - md.rs: software RAID arrays from /proc/mdstat
// - scsi.rs: SCSI devices from lsscsi
// - parted.rs: partition tables from parted
// - df.rs: mounted filesystems from df
// - tgtd.rs: iSCSI target exports from tgtadm
// - blkid.rs: block-device identifiers from blkid
// - dmidecode.rs / hp.rs: per-host context records
// - smartctl.rs: per-device health, looked up during reconciliation

pub mod blkid;
pub mod df;
pub mod dmidecode;
pub mod hp;
pub mod md;
pub mod parted;
pub mod scsi;
pub mod smartctl;
pub mod tgtd;

pub use blkid::BlkidRecord;
pub use df::DfRecord;
pub use dmidecode::DmidecodeRecord;
pub use hp::{HpArrayMap, HpLogicalDrive};
pub use md::MdRecord;
pub use parted::PartedRecord;
pub use scsi::ScsiRecord;
pub use smartctl::{HealthQuery, HealthSource, SmartctlInspector, SmartctlRecord};
pub use tgtd::TgtdRecord;

use crate::SourceResult;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

/// Identifier → records for one source. Ordered so that every traversal over
/// a map is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap<R> {
    entries: BTreeMap<String, Vec<R>>,
}

impl<R> Default for SourceMap<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<R> SourceMap<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single record for `key`, replacing anything already there.
    pub fn insert(&mut self, key: impl Into<String>, record: R) {
        self.entries.insert(key.into(), vec![record]);
    }

    /// Append a record under `key` (one-to-many sources).
    pub fn push(&mut self, key: impl Into<String>, record: R) {
        self.entries.entry(key.into()).or_default().push(record);
    }

    pub fn all(&self, key: &str) -> &[R] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, key: &str) -> Option<&R> {
        self.all(key).first()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Identifiers in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.entries.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R, K: Into<String>> FromIterator<(K, R)> for SourceMap<R> {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, record) in iter {
            map.push(key, record);
        }
        map
    }
}

/// Column layout and rendering shared by every record type that appears in
/// the output table.
pub trait CsvFragment {
    /// Column names, in output order.
    const COLUMNS: &'static [&'static str];

    /// Field values, one per entry of `COLUMNS`.
    fn values(&self) -> Vec<String>;

    fn header() -> String
    where
        Self: Sized,
    {
        Self::COLUMNS.join(",")
    }

    /// Row fragment for `record`, or empty placeholders when the source had
    /// nothing for this row.
    fn csv(record: Option<&Self>) -> String
    where
        Self: Sized,
    {
        match record {
            Some(record) => record
                .values()
                .iter()
                .map(|value| sanitize(value))
                .collect::<Vec<_>>()
                .join(","),
            None => ",".repeat(Self::COLUMNS.len().saturating_sub(1)),
        }
    }
}

/// Keep a field inside its cell.
pub fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ',' => ';',
            '\n' | '\r' => ' ',
            other => other,
        })
        .collect()
}

lazy_static! {
    static ref PARTITION_P_SUFFIX: Regex =
        Regex::new(r"^(/dev/(?:nvme\d+n\d+|mmcblk\d+|md\d+|loop\d+|nbd\d+))p\d+$")
            .expect("valid regex");
    static ref PARTITION_DIGIT_SUFFIX: Regex =
        Regex::new(r"^(/dev/(?:sd|hd|vd|xvd)[a-z]+)\d+$").expect("valid regex");
}

/// Whole-device path for a partition path (`/dev/sda2` → `/dev/sda`,
/// `/dev/nvme0n1p1` → `/dev/nvme0n1`). Anything else is returned unchanged.
pub fn whole_device(name: &str) -> String {
    for pattern in [&*PARTITION_P_SUFFIX, &*PARTITION_DIGIT_SUFFIX] {
        if let Some(caps) = pattern.captures(name) {
            return caps[1].to_string();
        }
    }
    name.to_string()
}

/// Path of partition `number` on `device` (`/dev/sda` + 1 → `/dev/sda1`,
/// `/dev/nvme0n1` + 1 → `/dev/nvme0n1p1`).
pub fn partition_path(device: &str, number: u32) -> String {
    if device.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{}p{}", device, number)
    } else {
        format!("{}{}", device, number)
    }
}

/// Turn a source load result into its map, degrading failures to an empty
/// map so one broken tool never aborts the inventory.
pub fn or_empty<R>(name: &str, result: SourceResult<SourceMap<R>>) -> SourceMap<R> {
    match result {
        Ok(map) => {
            tracing::debug!(source = name, entries = map.len(), "Loaded source");
            map
        }
        Err(e) => {
            tracing::warn!(source = name, error = %e, "Source unavailable, continuing without it");
            SourceMap::new()
        }
    }
}

/// Value of a `Key: value` line in tool output.
pub(crate) fn extract_field(output: &str, field_name: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(field_name))
        .map(|value| value.trim().to_string())
}
