// Ordered, first-match-wins rule tables used by the joiner
//
// Mount normalization decides whether a (mount, partition) pairing describes
// one device, and under which name. Block-id resolution picks the most
// specific layer that blkid knows about.

use crate::sources::{BlkidRecord, DfRecord, MdRecord, PartedRecord, ScsiRecord, SourceMap};

/// What the row's mount record looks like to the normalization rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub mount: Option<&'a DfRecord>,
    pub scsi: Option<&'a ScsiRecord>,
    pub partition: Option<&'a PartedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Row is consistent as it stands.
    Keep,
    /// Replace the mount with a stand-in carrying only this name.
    Rename(String),
    /// Mount and partition describe unrelated devices.
    Invalid,
}

impl Verdict {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid)
    }
}

pub struct NormalizationRule {
    pub name: &'static str,
    pub matches: fn(&RuleInput<'_>) -> bool,
    pub verdict: fn(&RuleInput<'_>) -> Verdict,
}

pub const NORMALIZATION_RULES: &[NormalizationRule] = &[
    NormalizationRule {
        name: "mount-absent",
        matches: mount_absent,
        verdict: keep,
    },
    NormalizationRule {
        name: "mount-unnamed",
        matches: mount_unnamed,
        verdict: name_after_scsi_device,
    },
    NormalizationRule {
        name: "mount-is-device",
        matches: mount_is_device,
        verdict: keep,
    },
    NormalizationRule {
        name: "partition-absent",
        matches: partition_absent,
        verdict: keep,
    },
    NormalizationRule {
        name: "partition-unnamed",
        matches: partition_unnamed,
        verdict: keep,
    },
    NormalizationRule {
        name: "partition-is-device",
        matches: partition_is_device,
        verdict: keep,
    },
    NormalizationRule {
        name: "partition-mismatch",
        matches: partition_mismatch,
        verdict: promote_or_invalidate,
    },
];

/// Name reported when no rule matches: the partition is the mounted one.
pub const CONSISTENT: &str = "consistent";

/// Evaluate the normalization rules; returns the matching rule's name and
/// its verdict.
pub fn normalize(input: &RuleInput<'_>) -> (&'static str, Verdict) {
    NORMALIZATION_RULES
        .iter()
        .find(|rule| (rule.matches)(input))
        .map(|rule| (rule.name, (rule.verdict)(input)))
        .unwrap_or((CONSISTENT, Verdict::Keep))
}

fn keep(_: &RuleInput<'_>) -> Verdict {
    Verdict::Keep
}

fn mount_absent(input: &RuleInput<'_>) -> bool {
    input.mount.is_none()
}

fn mount_unnamed(input: &RuleInput<'_>) -> bool {
    input.mount.is_some_and(|m| m.name.is_empty())
}

// A raw device with no filesystem stands in as its own mount
fn name_after_scsi_device(input: &RuleInput<'_>) -> Verdict {
    match input.scsi {
        Some(scsi) => Verdict::Rename(scsi.device.clone()),
        None => Verdict::Keep,
    }
}

fn mount_is_device(input: &RuleInput<'_>) -> bool {
    input.mount.is_some_and(|m| m.devname == m.name)
}

fn partition_absent(input: &RuleInput<'_>) -> bool {
    input.partition.is_none()
}

fn partition_unnamed(input: &RuleInput<'_>) -> bool {
    input.partition.is_some_and(|p| p.path.is_empty())
}

fn partition_is_device(input: &RuleInput<'_>) -> bool {
    input.partition.is_some_and(|p| p.devpath == p.path)
}

fn partition_mismatch(input: &RuleInput<'_>) -> bool {
    match (input.mount, input.partition) {
        (Some(mount), Some(partition)) => partition.path != mount.name,
        _ => false,
    }
}

// A partition of the mount's whole device is reported at whole-device
// granularity; anything else pairs unrelated devices.
fn promote_or_invalidate(input: &RuleInput<'_>) -> Verdict {
    match (input.mount, input.partition) {
        (Some(mount), Some(partition)) if partition.path.starts_with(&mount.devname) => {
            Verdict::Rename(mount.devname.clone())
        }
        _ => Verdict::Invalid,
    }
}

/// Layers a row can be looked up by in the blkid map.
#[derive(Debug, Clone, Copy)]
pub struct BlkidInput<'a> {
    pub partition: Option<&'a PartedRecord>,
    pub scsi: Option<&'a ScsiRecord>,
    pub mount: &'a DfRecord,
    pub md: Option<&'a MdRecord>,
}

pub struct BlkidRule {
    pub name: &'static str,
    pub key: for<'a> fn(&BlkidInput<'a>) -> Option<&'a str>,
}

/// Most specific layer first: a partition's own identifiers beat the disk's.
pub const BLKID_RULES: &[BlkidRule] = &[
    BlkidRule {
        name: "partition-path",
        key: partition_path,
    },
    BlkidRule {
        name: "scsi-device",
        key: scsi_device,
    },
    BlkidRule {
        name: "mount-name",
        key: mount_name,
    },
    BlkidRule {
        name: "md-array",
        key: md_array,
    },
];

pub fn resolve_blkid<'m>(
    blkid: &'m SourceMap<BlkidRecord>,
    input: &BlkidInput<'_>,
) -> Option<(&'static str, &'m BlkidRecord)> {
    BLKID_RULES.iter().find_map(|rule| {
        let key = (rule.key)(input)?;
        blkid.first(key).map(|record| (rule.name, record))
    })
}

fn partition_path<'a>(input: &BlkidInput<'a>) -> Option<&'a str> {
    input.partition.map(|p| p.path.as_str())
}

fn scsi_device<'a>(input: &BlkidInput<'a>) -> Option<&'a str> {
    input.scsi.map(|s| s.device.as_str())
}

fn mount_name<'a>(input: &BlkidInput<'a>) -> Option<&'a str> {
    Some(input.mount.name.as_str())
}

fn md_array<'a>(input: &BlkidInput<'a>) -> Option<&'a str> {
    input.md.map(|m| m.name.as_str())
}
