// iSCSI target exports from `tgtadm --lld iscsi --op show --mode target`

use super::{CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TgtdRecord {
    /// Backing-store path; the identifier this export is keyed by.
    pub key: String,
    pub tid: u32,
    pub iqn: String,
    pub lun: u32,
    pub size: String,
    /// Backing block device. Empty for file-backed stores, which cannot be
    /// cross-checked against mounts.
    pub target_path: String,
}

impl CsvFragment for TgtdRecord {
    const COLUMNS: &'static [&'static str] = &[
        "tgtd_key",
        "tgtd_tid",
        "tgtd_iqn",
        "tgtd_lun",
        "tgtd_size",
        "tgtd_targetpath",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.tid.to_string(),
            self.iqn.clone(),
            self.lun.to_string(),
            self.size.clone(),
            self.target_path.clone(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<TgtdRecord>> {
    let program = &config.tools.tgtadm;
    let stdout = runner
        .run(program, &["--lld", "iscsi", "--op", "show", "--mode", "target"])?
        .into_stdout(program)?;
    Ok(parse_tgtadm(&stdout))
}

pub fn parse_tgtadm(text: &str) -> SourceMap<TgtdRecord> {
    let mut map = SourceMap::new();
    let mut target: Option<(u32, String)> = None;
    let mut lun: Option<u32> = None;
    let mut size = String::new();

    for line in text.lines() {
        let line = line.trim();

        // Target 1: iqn.2024-01.com.example:storage.disk1
        if let Some(rest) = line.strip_prefix("Target ") {
            target = rest.split_once(':').and_then(|(tid, iqn)| {
                Some((tid.trim().parse().ok()?, iqn.trim().to_string()))
            });
            lun = None;
            continue;
        }

        if let Some(rest) = line.strip_prefix("LUN:") {
            lun = rest.trim().parse().ok();
            size.clear();
            continue;
        }

        // Size: 10737 MB, Block size: 512
        if let Some(rest) = line.strip_prefix("Size:") {
            size = rest.split(',').next().unwrap_or_default().trim().to_string();
            continue;
        }

        let Some(path) = line.strip_prefix("Backing store path:").map(str::trim) else {
            continue;
        };
        let (Some((tid, iqn)), Some(lun)) = (target.as_ref(), lun) else {
            continue;
        };
        if path.is_empty() || path == "None" {
            continue;
        }

        map.insert(
            path,
            TgtdRecord {
                key: path.to_string(),
                tid: *tid,
                iqn: iqn.clone(),
                lun,
                size: size.clone(),
                target_path: if path.starts_with("/dev/") {
                    path.to_string()
                } else {
                    String::new()
                },
            },
        );
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    const TGTADM: &str = "\
Target 1: iqn.2024-01.com.example:storage.disk1
    System information:
        Driver: iscsi
        State: ready
    I_T nexus information:
    LUN information:
        LUN: 0
            Type: controller
            SCSI ID: IET     00010000
            Size: 0 MB, Block size: 1
            Backing store type: null
            Backing store path: None
        LUN: 1
            Type: disk
            SCSI ID: IET     00010001
            Size: 10737 MB, Block size: 512
            Backing store type: rdwr
            Backing store path: /dev/sdd1
    Account information:
    ACL information:
        ALL
Target 2: iqn.2024-01.com.example:storage.images
    LUN information:
        LUN: 0
            Type: controller
            Backing store path: None
        LUN: 1
            Type: disk
            Size: 2147 MB, Block size: 512
            Backing store path: /srv/iscsi/vm01.img
";

    #[test]
    fn test_parse_block_backed_export() {
        let map = parse_tgtadm(TGTADM);
        let export = map.first("/dev/sdd1").unwrap();
        assert_eq!(export.tid, 1);
        assert_eq!(export.iqn, "iqn.2024-01.com.example:storage.disk1");
        assert_eq!(export.lun, 1);
        assert_eq!(export.size, "10737 MB");
        assert_eq!(export.target_path, "/dev/sdd1");
    }

    #[test]
    fn test_parse_file_backed_export_has_empty_target_path() {
        let map = parse_tgtadm(TGTADM);
        let export = map.first("/srv/iscsi/vm01.img").unwrap();
        assert_eq!(export.tid, 2);
        assert_eq!(export.size, "2147 MB");
        assert!(export.target_path.is_empty());
    }

    #[test]
    fn test_controller_luns_are_skipped() {
        let map = parse_tgtadm(TGTADM);
        assert_eq!(map.len(), 2);
        assert!(map.records().all(|r| r.lun == 1));
    }

    #[test]
    fn test_iqn_with_colons_is_kept_whole() {
        let map = parse_tgtadm("Target 7: iqn.2001-04.com.example:a:b\n LUN: 1\n Backing store path: /dev/sdz\n");
        assert_eq!(map.first("/dev/sdz").unwrap().iqn, "iqn.2001-04.com.example:a:b");
    }
}
