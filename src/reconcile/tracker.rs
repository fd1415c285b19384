// Per-run visited sets
//
// Created empty at the start of a reconciliation pass and owned by it. Keys
// are identifiers as they appear in the source maps.

use std::collections::{HashMap, HashSet};

/// Why an identifier is not joined again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already processed as a traversal identifier.
    PrimaryDone,
    /// Reached earlier through a partition path matching an export.
    ExportIndirection,
    /// Already consumed as a mount by an emitted join.
    MountConsumed,
}

#[derive(Debug, Clone, Default)]
pub struct DedupTracker {
    primary_done: HashSet<String>,
    export_done: HashSet<String>,
    blkid_resolved: HashSet<String>,
    mount_usage: HashMap<String, usize>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// First reason, in check order, that `key` denotes something already
    /// emitted through another path.
    pub fn skip_reason(&self, key: &str) -> Option<SkipReason> {
        if self.primary_done.contains(key) {
            Some(SkipReason::PrimaryDone)
        } else if self.export_done.contains(key) {
            Some(SkipReason::ExportIndirection)
        } else if self.mount_usage(key) > 0 {
            Some(SkipReason::MountConsumed)
        } else {
            None
        }
    }

    pub fn mark_primary_done(&mut self, key: &str) {
        self.primary_done.insert(key.to_string());
    }

    pub fn is_primary_done(&self, key: &str) -> bool {
        self.primary_done.contains(key)
    }

    pub fn mark_export_done(&mut self, key: &str) {
        self.export_done.insert(key.to_string());
    }

    pub fn is_export_done(&self, key: &str) -> bool {
        self.export_done.contains(key)
    }

    pub fn mark_blkid_resolved(&mut self, devname: &str) {
        self.blkid_resolved.insert(devname.to_string());
    }

    pub fn is_blkid_resolved(&self, devname: &str) -> bool {
        self.blkid_resolved.contains(devname)
    }

    /// Record one more use of the mount named `name`; returns the new count.
    pub fn count_mount(&mut self, name: &str) -> usize {
        let count = self.mount_usage.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn mount_usage(&self, name: &str) -> usize {
        self.mount_usage.get(name).copied().unwrap_or(0)
    }
}
