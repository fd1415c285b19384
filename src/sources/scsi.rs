// SCSI devices from lsscsi

use super::{CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;
use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScsiRecord {
    /// host:channel:target:lun
    pub hctl: String,
    pub kind: String,
    pub vendor: String,
    pub model: String,
    pub revision: String,
    pub device: String,
}

impl CsvFragment for ScsiRecord {
    const COLUMNS: &'static [&'static str] = &[
        "scsi_hctl",
        "scsi_type",
        "scsi_vendor",
        "scsi_model",
        "scsi_rev",
        "scsi_device",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.hctl.clone(),
            self.kind.clone(),
            self.vendor.clone(),
            self.model.clone(),
            self.revision.clone(),
            self.device.clone(),
        ]
    }
}

lazy_static! {
    static ref LSSCSI_LINE: Regex =
        Regex::new(r"^\[(\d+:\d+:\d+:\d+)\]\s+(\S+)\s+(.*?)\s+(/dev/\S+|-)\s*$").expect("valid regex");
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<ScsiRecord>> {
    let program = &config.tools.lsscsi;
    let stdout = runner.run(program, &[])?.into_stdout(program)?;
    Ok(parse_lsscsi(&stdout))
}

/// Parse `lsscsi` output, keyed by device path. Entries without a device node
/// (enclosures, controllers) are dropped.
pub fn parse_lsscsi(text: &str) -> SourceMap<ScsiRecord> {
    let mut map = SourceMap::new();

    for line in text.lines() {
        let Some(caps) = LSSCSI_LINE.captures(line.trim_end()) else {
            continue;
        };

        let device = &caps[4];
        if device == "-" {
            continue;
        }

        let (vendor, model, revision) = split_identity(&caps[3]);
        map.insert(
            device,
            ScsiRecord {
                hctl: caps[1].to_string(),
                kind: caps[2].to_string(),
                vendor,
                model,
                revision,
                device: device.to_string(),
            },
        );
    }

    map
}

// Vendor is the first word and revision the last; the model is what remains.
fn split_identity(identity: &str) -> (String, String, String) {
    let words: Vec<&str> = identity.split_whitespace().collect();
    match words.as_slice() {
        [] => (String::new(), String::new(), String::new()),
        [vendor] => (vendor.to_string(), String::new(), String::new()),
        [vendor, revision] => (vendor.to_string(), String::new(), revision.to_string()),
        [vendor, model @ .., revision] => {
            (vendor.to_string(), model.join(" "), revision.to_string())
        }
    }
}
