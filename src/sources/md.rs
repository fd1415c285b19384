// Software RAID arrays from /proc/mdstat

use super::{CsvFragment, SourceMap};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdRecord {
    /// Array device, e.g. `/dev/md0`.
    pub name: String,
    pub state: String,
    pub level: String,
    /// Member devices as `/dev/...` paths, in slot order.
    pub members: Vec<String>,
    pub blocks: Option<u64>,
    /// `[2/2] [UU]` style member status.
    pub status: String,
    pub degraded: bool,
}

impl CsvFragment for MdRecord {
    const COLUMNS: &'static [&'static str] = &[
        "md_name",
        "md_state",
        "md_level",
        "md_members",
        "md_blocks",
        "md_status",
        "md_degraded",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.state.clone(),
            self.level.clone(),
            self.members.join(" "),
            self.blocks.map(|b| b.to_string()).unwrap_or_default(),
            self.status.clone(),
            self.degraded.to_string(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<SourceMap<MdRecord>> {
    let text = runner.read_file(&config.tools.mdstat)?;
    Ok(parse_mdstat(&text))
}

/// Parse /proc/mdstat, keyed by array device path.
pub fn parse_mdstat(text: &str) -> SourceMap<MdRecord> {
    let mut arrays: Vec<MdRecord> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Personalities") || line.starts_with("unused") {
            continue;
        }

        if line.starts_with("md") {
            if let Some(record) = parse_array_line(line) {
                arrays.push(record);
            }
            continue;
        }

        // Continuation lines belong to the most recent array
        let Some(current) = arrays.last_mut() else {
            continue;
        };

        if line.contains(" blocks") {
            current.blocks = line
                .split_whitespace()
                .next()
                .and_then(|count| count.parse().ok());

            if let Some(start) = line.find('[') {
                current.status = line[start..].trim().to_string();
                current.degraded = current.status.contains('_');
            }
        }
    }

    arrays
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect()
}

// md0 : active raid1 sdb1[1] sda1[0]
// md127 : inactive sdc[0](S)
fn parse_array_line(line: &str) -> Option<MdRecord> {
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    let mut parts = rest.split_whitespace();
    let state = parts.next()?.to_string();

    let mut level = String::new();
    let mut members: Vec<(u32, String)> = Vec::new();

    for part in parts {
        if let Some((device, slot)) = part.split_once('[') {
            let slot = slot
                .split(']')
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(u32::MAX);
            members.push((slot, format!("/dev/{}", device)));
        } else if level.is_empty() && !part.starts_with('(') {
            level = part.to_string();
        }
    }

    members.sort();

    Some(MdRecord {
        name: format!("/dev/{}", name),
        state,
        level,
        members: members.into_iter().map(|(_, device)| device).collect(),
        blocks: None,
        status: String::new(),
        degraded: false,
    })
}
