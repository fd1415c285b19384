// HP Smart Array context from `ssacli ctrl all show config detail`
//
// Only loaded on HP hardware. The logical drives are keyed by the OS disk
// they surface as, so the health lookup can recognise controller volumes.

use super::{CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

pub type HpArrayMap = SourceMap<HpLogicalDrive>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HpLogicalDrive {
    pub controller: String,
    pub slot: String,
    pub array: String,
    pub logical_drive: String,
    pub size: String,
    pub fault_tolerance: String,
    pub status: String,
    pub disk_name: String,
}

impl CsvFragment for HpLogicalDrive {
    const COLUMNS: &'static [&'static str] = &[
        "hp_controller",
        "hp_slot",
        "hp_array",
        "hp_logicaldrive",
        "hp_size",
        "hp_raid",
        "hp_status",
        "hp_diskname",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.controller.clone(),
            self.slot.clone(),
            self.array.clone(),
            self.logical_drive.clone(),
            self.size.clone(),
            self.fault_tolerance.clone(),
            self.status.clone(),
            self.disk_name.clone(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<HpArrayMap> {
    let program = &config.tools.ssacli;
    let stdout = runner
        .run(program, &["ctrl", "all", "show", "config", "detail"])?
        .into_stdout(program)?;
    Ok(parse_ssacli(&stdout))
}

pub fn parse_ssacli(text: &str) -> HpArrayMap {
    let mut map = SourceMap::new();
    let mut controller = String::new();
    let mut slot = String::new();
    let mut array = String::new();
    let mut current: Option<HpLogicalDrive> = None;

    for line in text.lines() {
        let line = line.trim();

        // Smart Array P440ar in Slot 0 (Embedded)
        if line.starts_with("Smart Array") || line.starts_with("HPE Smart Array") {
            finish(current.take(), &mut map);
            match line.split_once(" in Slot ") {
                Some((name, rest)) => {
                    controller = name.trim().to_string();
                    slot = rest.split_whitespace().next().unwrap_or_default().to_string();
                }
                None => {
                    controller = line.to_string();
                    slot.clear();
                }
            }
            array.clear();
            continue;
        }

        if let Some(name) = line.strip_prefix("Array:") {
            finish(current.take(), &mut map);
            array = name.trim().to_string();
            continue;
        }

        if let Some(id) = line.strip_prefix("Logical Drive:") {
            finish(current.take(), &mut map);
            current = Some(HpLogicalDrive {
                controller: controller.clone(),
                slot: slot.clone(),
                array: array.clone(),
                logical_drive: id.trim().to_string(),
                ..HpLogicalDrive::default()
            });
            continue;
        }

        // Physical drive sections carry their own Size/Status lines
        if line.starts_with("physicaldrive") || line.starts_with("Unassigned") {
            finish(current.take(), &mut map);
            continue;
        }

        let Some(drive) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();

        match key.trim() {
            "Size" => drive.size = value,
            "Fault Tolerance" => drive.fault_tolerance = value,
            "Status" => drive.status = value,
            "Disk Name" => drive.disk_name = value,
            _ => {}
        }
    }

    finish(current, &mut map);
    map
}

// Logical drives not presented to the OS have no disk name and are dropped
fn finish(drive: Option<HpLogicalDrive>, map: &mut HpArrayMap) {
    if let Some(drive) = drive.filter(|d| !d.disk_name.is_empty()) {
        map.insert(drive.disk_name.clone(), drive);
    }
}

/// Secondary per-host table listing every controller logical drive.
pub fn dump(map: &HpArrayMap, host: &str) -> String {
    let mut out = format!("box,{}\n", HpLogicalDrive::header());
    for drive in map.records() {
        out.push_str(&format!("{},{}\n", host, HpLogicalDrive::csv(Some(drive))));
    }
    out
}
