// Partition tables from `parted -s -m -l`
//
// Machine-readable output is one block per disk:
//
//   BYT;
//   /dev/sda:500GB:scsi:512:4096:gpt:ATA Samsung SSD 860:;
//   1:1049kB:538MB:537MB:fat32:EFI System Partition:boot, esp;
//
// Records are keyed by the disk path. A disk without a partition table
// ("loop" label) yields a single record whose path is the disk itself.

use super::{partition_path, CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartedRecord {
    pub path: String,
    /// Disk holding the partition.
    pub devpath: String,
    pub number: u32,
    pub start: String,
    pub end: String,
    pub size: String,
    pub filesystem: String,
    pub name: String,
    pub flags: String,
    pub table: String,
    /// Container partitions (msdos extended) never produce rows.
    pub skip: bool,
}

impl CsvFragment for PartedRecord {
    const COLUMNS: &'static [&'static str] = &[
        "parted_path",
        "parted_devpath",
        "parted_number",
        "parted_start",
        "parted_end",
        "parted_size",
        "parted_fs",
        "parted_name",
        "parted_flags",
        "parted_table",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.path.clone(),
            self.devpath.clone(),
            self.number.to_string(),
            self.start.clone(),
            self.end.clone(),
            self.size.clone(),
            self.filesystem.clone(),
            self.name.clone(),
            self.flags.clone(),
            self.table.clone(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<PartedRecord>> {
    let program = &config.tools.parted;
    // parted exits non-zero when any disk has an unrecognised label, while
    // still listing the others.
    let output = runner.run(program, &["-s", "-m", "-l"])?;
    if !output.success && output.stdout.trim().is_empty() {
        return output.into_stdout(program).map(|_| SourceMap::new());
    }
    Ok(parse_parted(&output.stdout))
}

pub fn parse_parted(text: &str) -> SourceMap<PartedRecord> {
    let mut map = SourceMap::new();
    let mut disk: Option<(String, String)> = None;
    let mut partitions: Vec<PartedRecord> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line == "BYT;" || line == "CHS;" || line == "CYL;" {
            continue;
        }

        let line = line.strip_suffix(';').unwrap_or(line);
        let fields: Vec<&str> = line.split(':').collect();

        if fields[0].starts_with('/') {
            flush_disk(&mut map, disk.take(), std::mem::take(&mut partitions));
            let table = fields.get(5).copied().unwrap_or_default().to_string();
            disk = Some((fields[0].to_string(), table));
            continue;
        }

        let Some((devpath, table)) = disk.as_ref() else {
            continue;
        };
        let Ok(number) = fields[0].parse::<u32>() else {
            continue;
        };

        let field = |i: usize| fields.get(i).map(|f| f.trim().to_string()).unwrap_or_default();
        let path = if table == "loop" {
            devpath.clone()
        } else {
            partition_path(devpath, number)
        };

        partitions.push(PartedRecord {
            path,
            devpath: devpath.clone(),
            number,
            start: field(1),
            end: field(2),
            size: field(3),
            filesystem: field(4),
            name: field(5),
            flags: field(6),
            table: table.clone(),
            skip: false,
        });
    }

    flush_disk(&mut map, disk, partitions);
    map
}

fn flush_disk(map: &mut SourceMap<PartedRecord>, disk: Option<(String, String)>, mut partitions: Vec<PartedRecord>) {
    let Some((devpath, table)) = disk else {
        return;
    };

    if table == "msdos" {
        mark_extended(&mut partitions);
    }

    for partition in partitions {
        map.push(devpath.clone(), partition);
    }
}

// A primary slot whose range holds a logical partition (number >= 5) is the
// extended container.
fn mark_extended(partitions: &mut [PartedRecord]) {
    let logical: Vec<(u64, u64)> = partitions
        .iter()
        .filter(|p| p.number >= 5)
        .filter_map(|p| Some((parse_size(&p.start)?, parse_size(&p.end)?)))
        .collect();

    for partition in partitions.iter_mut().filter(|p| p.number <= 4) {
        let (Some(start), Some(end)) = (parse_size(&partition.start), parse_size(&partition.end)) else {
            continue;
        };
        partition.skip = logical.iter().any(|&(s, e)| s >= start && e <= end);
    }
}

/// Parse a parted size such as `1049kB`, `500GB` or `0.00B` into bytes.
/// parted prints SI units.
pub fn parse_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text.find(|c: char| c.is_ascii_alphabetic())?;
    let (number, unit) = text.split_at(split);
    let number: f64 = number.parse().ok()?;

    let multiplier: f64 = match unit {
        "B" => 1.0,
        "kB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        "PB" => 1e15,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((number * multiplier).round() as u64)
}
