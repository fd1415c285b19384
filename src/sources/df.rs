// Mounted filesystems from `df -P -T`

use super::{whole_device, CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfRecord {
    /// Filesystem source as df reports it (`/dev/sda2`, `nas:/export`).
    pub name: String,
    /// Whole device holding the filesystem (`/dev/sda`). Same as `name` when
    /// the source is not a partition.
    pub devname: String,
    pub fstype: String,
    pub size_kb: Option<u64>,
    pub used_kb: Option<u64>,
    pub avail_kb: Option<u64>,
    pub capacity: String,
    pub mount_point: String,
}

impl DfRecord {
    /// Stand-in mount carrying only a name, used when a row has to describe
    /// a raw or whole device.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl CsvFragment for DfRecord {
    const COLUMNS: &'static [&'static str] = &[
        "df_name",
        "df_devname",
        "df_type",
        "df_size_kb",
        "df_used_kb",
        "df_avail_kb",
        "df_capacity",
        "df_mount",
    ];

    fn values(&self) -> Vec<String> {
        let kb = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
        vec![
            self.name.clone(),
            self.devname.clone(),
            self.fstype.clone(),
            kb(self.size_kb),
            kb(self.used_kb),
            kb(self.avail_kb),
            self.capacity.clone(),
            self.mount_point.clone(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<DfRecord>> {
    let program = &config.tools.df;
    // df exits 1 when a single mount is unreadable (stale NFS); keep the rest
    let output = runner.run(program, &["-P", "-T"])?;
    if !output.success {
        if output.stdout.trim().is_empty() {
            return output.into_stdout(program).map(|_| SourceMap::new());
        }
        tracing::warn!(stderr = %output.stderr.trim(), "df reported errors, using partial output");
    }
    Ok(parse_df(&output.stdout, config))
}

/// Parse `df -P -T` output, keyed by whole device so every mounted
/// partition of a disk lands under the disk's identifier.
pub fn parse_df(text: &str, config: &InventoryConfig) -> SourceMap<DfRecord> {
    let mut map = SourceMap::new();

    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 7 {
            continue;
        }

        let fstype = fields[1];
        if config.is_excluded_fs(fstype) {
            continue;
        }

        let name = fields[0].to_string();
        let devname = whole_device(&name);

        map.push(
            devname.clone(),
            DfRecord {
                name,
                devname,
                fstype: fstype.to_string(),
                size_kb: fields[2].parse().ok(),
                used_kb: fields[3].parse().ok(),
                avail_kb: fields[4].parse().ok(),
                capacity: fields[5].to_string(),
                mount_point: fields[6..].join(" "),
            },
        );
    }

    map
}
