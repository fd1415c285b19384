// Block-device identifiers from `blkid`

use super::{CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;
use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlkidRecord {
    /// Identifier the record is keyed by.
    pub name: String,
    /// Device name as blkid printed it.
    pub devname: String,
    pub uuid: String,
    pub label: String,
    pub fstype: String,
    pub partuuid: String,
}

impl CsvFragment for BlkidRecord {
    const COLUMNS: &'static [&'static str] = &[
        "blkid_name",
        "blkid_devname",
        "blkid_uuid",
        "blkid_label",
        "blkid_type",
        "blkid_partuuid",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.devname.clone(),
            self.uuid.clone(),
            self.label.clone(),
            self.fstype.clone(),
            self.partuuid.clone(),
        ]
    }
}

lazy_static! {
    static ref TAG: Regex = Regex::new(r#"([A-Z_]+)="([^"]*)""#).expect("valid regex");
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<BlkidRecord>> {
    let program = &config.tools.blkid;
    let output = runner.run(program, &[])?;
    // Exit status 2 means no tagged devices at all
    if output.status == Some(2) {
        return Ok(SourceMap::new());
    }
    Ok(parse_blkid(&output.into_stdout(program)?))
}

/// Parse `blkid` output:
/// `/dev/sda1: UUID="..." TYPE="ext4" PARTUUID="..."`
pub fn parse_blkid(text: &str) -> SourceMap<BlkidRecord> {
    let mut map = SourceMap::new();

    for line in text.lines() {
        let Some((device, tags)) = line.split_once(": ") else {
            continue;
        };
        let device = device.trim();
        if device.is_empty() {
            continue;
        }

        let mut record = BlkidRecord {
            name: device.to_string(),
            devname: device.to_string(),
            ..BlkidRecord::default()
        };

        for caps in TAG.captures_iter(tags) {
            let value = caps[2].to_string();
            match &caps[1] {
                "UUID" => record.uuid = value,
                "LABEL" => record.label = value,
                "TYPE" => record.fstype = value,
                "PARTUUID" => record.partuuid = value,
                _ => {}
            }
        }

        map.insert(device, record);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLKID: &str = r#"/dev/sda1: UUID="7A1B-22C3" BLOCK_SIZE="512" TYPE="vfat" PARTLABEL="EFI System Partition" PARTUUID="0f1e2d3c-01"
/dev/sda2: UUID="3e6be9de-8139-11d1-9106-a43f08d823a6" BLOCK_SIZE="4096" TYPE="ext4" PARTUUID="0f1e2d3c-02"
/dev/md0: LABEL="data vol" UUID="9b0f5c1e-2f7a-4c55-8d2c-1b5e7d9a0c11" BLOCK_SIZE="512" TYPE="xfs"
/dev/sdb1: UUID="a1b2c3d4-e5f6-a7b8-c9d0-e1f2a3b4c5d6" UUID_SUB="11111111-2222-3333-4444-555555555555" LABEL="host:0" TYPE="linux_raid_member" PARTUUID="deadbeef-01"
"#;

    #[test]
    fn test_parse_blkid() {
        let map = parse_blkid(BLKID);
        assert_eq!(map.len(), 4);

        let sda2 = map.first("/dev/sda2").unwrap();
        assert_eq!(sda2.name, "/dev/sda2");
        assert_eq!(sda2.devname, "/dev/sda2");
        assert_eq!(sda2.uuid, "3e6be9de-8139-11d1-9106-a43f08d823a6");
        assert_eq!(sda2.fstype, "ext4");
        assert_eq!(sda2.partuuid, "0f1e2d3c-02");
        assert!(sda2.label.is_empty());
    }

    #[test]
    fn test_parse_blkid_label_with_space_and_sub_uuid() {
        let map = parse_blkid(BLKID);
        assert_eq!(map.first("/dev/md0").unwrap().label, "data vol");

        let member = map.first("/dev/sdb1").unwrap();
        assert_eq!(member.uuid, "a1b2c3d4-e5f6-a7b8-c9d0-e1f2a3b4c5d6");
        assert_eq!(member.label, "host:0");
        assert_eq!(member.fstype, "linux_raid_member");
    }
}
