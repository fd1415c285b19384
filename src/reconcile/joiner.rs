// Cross-source joiner
//
// Walks the aggregated identifiers once, fanning each one out over its mount
// and partition candidates. Every decision that suppresses or rewrites a row
// is logged at debug level with the identifier that caused it.

use super::keys::aggregate_keys;
use super::render::{self, Row, INVALID_MARKER};
use super::rules::{normalize, resolve_blkid, BlkidInput, RuleInput, Verdict};
use super::tracker::DedupTracker;
use crate::inventory::Inventory;
use crate::sources::{DfRecord, HealthQuery, HealthSource, PartedRecord, TgtdRecord};
use std::borrow::Cow;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Value of the leading `box` column.
    pub host: String,
    /// Emit rejected rows (marked) and prefix every row with its join trace.
    pub verbose: bool,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Header plus one line per emitted row, newline terminated.
    pub output: String,
    pub emitted: usize,
    /// Rows the normalization rules rejected and normal mode dropped.
    pub suppressed: usize,
    /// Block-id devices no emitted row claimed, in identifier order.
    pub unused_blkid: Vec<String>,
    pub tracker: DedupTracker,
}

/// Zero candidates become a single absent candidate so the fan-out still
/// produces a row.
fn candidates<R>(records: &[R]) -> Vec<Option<&R>> {
    if records.is_empty() {
        vec![None]
    } else {
        records.iter().map(Some).collect()
    }
}

/// Join every source in `inventory` into one table.
pub fn reconcile<H>(inventory: &Inventory, health: &mut H, options: &ReconcileOptions) -> Reconciliation
where
    H: HealthSource + ?Sized,
{
    let mut pass = Reconciliation::default();
    pass.output.push_str(&render::header());
    pass.output.push('\n');

    let identifiers = aggregate_keys(inventory);
    info!(identifiers = identifiers.len(), verbose = options.verbose, "Reconciling sources");

    for id in identifiers {
        let key = id.key;

        if id.is_fallback() {
            if !pass.tracker.is_blkid_resolved(key) {
                info!(device = key, "unused blkid");
                pass.unused_blkid.push(key.to_string());
            }
            continue;
        }

        if let Some(reason) = pass.tracker.skip_reason(key) {
            debug!(key, ?reason, tier = ?id.tier, "Identifier already covered");
            continue;
        }
        pass.tracker.mark_primary_done(key);

        for mount in candidates(inventory.df.all(key)) {
            let mut partitions = inventory.parted.all(key);
            if partitions.is_empty() {
                if let Some(mount) = mount {
                    partitions = inventory.parted.all(&mount.name);
                }
            }

            for partition in candidates(partitions) {
                join_one(inventory, health, options, &mut pass, key, mount, partition);
            }
        }
    }

    info!(
        emitted = pass.emitted,
        suppressed = pass.suppressed,
        "Reconciliation complete"
    );
    pass
}

fn join_one<H>(
    inventory: &Inventory,
    health: &mut H,
    options: &ReconcileOptions,
    pass: &mut Reconciliation,
    key: &str,
    mount: Option<&DfRecord>,
    partition: Option<&PartedRecord>,
) where
    H: HealthSource + ?Sized,
{
    if let Some(p) = partition.filter(|p| p.skip) {
        debug!(key, partition = %p.path, "Skipping container partition");
        return;
    }

    let md = inventory.md.first(key);
    let scsi = inventory.scsi.first(key);

    let export = export_for(inventory, pass, key, partition);

    let mount = match (mount, export) {
        (Some(m), Some(t)) if !t.target_path.is_empty() && t.target_path != m.name => {
            debug!(key, mount = %m.name, target = %t.target_path, "Export disagrees with mount, dropping mount");
            None
        }
        _ => mount,
    };

    let mount: Cow<'_, DfRecord> = match mount {
        Some(m) => {
            pass.tracker.count_mount(&m.name);
            Cow::Borrowed(m)
        }
        None => Cow::Owned(DfRecord::default()),
    };

    let blkid = resolve_blkid(
        &inventory.blkid,
        &BlkidInput {
            partition,
            scsi,
            mount: &mount,
            md,
        },
    );

    let prefix = options
        .verbose
        .then(|| render::diagnostic_prefix(key, &mount, partition, export));

    let (rule, verdict) = normalize(&RuleInput {
        mount: Some(&mount),
        scsi,
        partition,
    });
    let invalid = verdict.is_invalid();
    let mount = match verdict {
        Verdict::Rename(name) => {
            debug!(key, rule, name = %name, "Mount renamed");
            Cow::Owned(DfRecord::named(name))
        }
        Verdict::Keep | Verdict::Invalid => mount,
    };

    let smart = health.inspect(&HealthQuery {
        mount: &mount,
        scsi,
        partition,
        system: &inventory.dmidecode,
        hp: inventory.hp.as_ref(),
    });

    if invalid && !options.verbose {
        debug!(key, rule, mount = %mount.name, "Dropping inconsistent row");
        pass.suppressed += 1;
        return;
    }

    if let Some((_, record)) = blkid {
        pass.tracker.mark_blkid_resolved(&record.devname);
    }

    let row = Row {
        host: &options.host,
        system: &inventory.dmidecode,
        mount: &mount,
        md,
        scsi,
        partition,
        health: smart.as_ref(),
        export,
        blkid: blkid.map(|(_, record)| record),
    };

    if let Some(prefix) = prefix {
        pass.output.push_str(&prefix);
    }
    if invalid {
        pass.output.push_str(INVALID_MARKER);
    }
    pass.output.push_str(&row.render());
    pass.output.push('\n');
    pass.emitted += 1;
}

/// Export at the identifier, overridden by one at the partition's own path.
fn export_for<'i>(
    inventory: &'i Inventory,
    pass: &mut Reconciliation,
    key: &str,
    partition: Option<&PartedRecord>,
) -> Option<&'i TgtdRecord> {
    let by_partition = partition.and_then(|p| inventory.tgtd.first(&p.path).map(|t| (p, t)));
    match by_partition {
        Some((p, t)) => {
            pass.tracker.mark_export_done(&p.path);
            Some(t)
        }
        None => inventory.tgtd.first(key),
    }
}
