// Reconciliation of the per-source maps into one row per device

pub mod joiner;
pub mod keys;
pub mod render;
pub mod rules;
pub mod tracker;

pub use joiner::{reconcile, ReconcileOptions, Reconciliation};
pub use keys::{aggregate_keys, Identifier, Tier};
pub use rules::{normalize, resolve_blkid, Verdict};
pub use tracker::{DedupTracker, SkipReason};
