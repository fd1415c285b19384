// Traversal order for the joiner

use crate::inventory::Inventory;
use std::collections::BTreeSet;

/// Which source contributed an identifier to the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// md, SCSI or parted: the devices the inventory is about.
    Primary,
    Mount,
    Export,
    /// Known through blkid enumeration; only reached once every more
    /// fundamental source has been walked.
    BlockId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier<'a> {
    pub key: &'a str,
    pub tier: Tier,
}

impl Identifier<'_> {
    pub fn is_fallback(&self) -> bool {
        self.tier == Tier::BlockId
    }
}

/// Sorted, deduplicated primary identifiers first, then every mount, export
/// and blkid identifier in that order. Later tiers may repeat earlier keys;
/// the dedup tracker decides what to do with them.
pub fn aggregate_keys(inventory: &Inventory) -> Vec<Identifier<'_>> {
    let primary: BTreeSet<&str> = inventory
        .md
        .keys()
        .chain(inventory.scsi.keys())
        .chain(inventory.parted.keys())
        .collect();

    tagged(primary.into_iter(), Tier::Primary)
        .chain(tagged(inventory.df.keys(), Tier::Mount))
        .chain(tagged(inventory.tgtd.keys(), Tier::Export))
        .chain(tagged(inventory.blkid.keys(), Tier::BlockId))
        .collect()
}

fn tagged<'a>(keys: impl Iterator<Item = &'a str>, tier: Tier) -> impl Iterator<Item = Identifier<'a>> {
    keys.map(move |key| Identifier { key, tier })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{BlkidRecord, DfRecord, MdRecord, PartedRecord, ScsiRecord, TgtdRecord};

    #[test]
    fn test_primary_keys_sorted_and_deduplicated() {
        let mut inventory = Inventory::default();
        inventory.scsi.insert("/dev/sdb", ScsiRecord::default());
        inventory.scsi.insert("/dev/sda", ScsiRecord::default());
        inventory.parted.push("/dev/sda", PartedRecord::default());
        inventory.md.insert("/dev/md0", MdRecord::default());

        let keys: Vec<&str> = aggregate_keys(&inventory).iter().map(|id| id.key).collect();
        assert_eq!(keys, vec!["/dev/md0", "/dev/sda", "/dev/sdb"]);
    }

    #[test]
    fn test_later_tiers_appended_in_order_with_repeats() {
        let mut inventory = Inventory::default();
        inventory.scsi.insert("/dev/sda", ScsiRecord::default());
        inventory.df.push("/dev/sda", DfRecord::default());
        inventory.df.push("nas:/home", DfRecord::default());
        inventory.tgtd.insert("/dev/sdd1", TgtdRecord::default());
        inventory.blkid.insert("/dev/sda", BlkidRecord::default());

        let ids = aggregate_keys(&inventory);
        let summary: Vec<(&str, Tier)> = ids.iter().map(|id| (id.key, id.tier)).collect();
        assert_eq!(
            summary,
            vec![
                ("/dev/sda", Tier::Primary),
                ("/dev/sda", Tier::Mount),
                ("nas:/home", Tier::Mount),
                ("/dev/sdd1", Tier::Export),
                ("/dev/sda", Tier::BlockId),
            ]
        );
        assert!(ids.last().unwrap().is_fallback());
        assert!(!ids[0].is_fallback());
    }

    #[test]
    fn test_empty_inventory() {
        assert!(aggregate_keys(&Inventory::default()).is_empty());
    }
}
