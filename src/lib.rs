// Storage inventory: collects md, SCSI, parted, df, tgtd and blkid facts and
// reconciles them into one CSV row per storage entity.

pub mod command;
pub mod config;
pub mod inventory;
pub mod reconcile;
pub mod report;
pub mod sources;

// Re-export the pieces the binary wires together
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use config::InventoryConfig;
pub use inventory::Inventory;
pub use reconcile::{reconcile, ReconcileOptions, Reconciliation};

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single data source. Never fatal: loaders turn it into an
/// empty map at the collection boundary.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {what} output: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Local host name, used as the first column of every row and in output
/// file names.
pub fn hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Hostname lookup failed");
            "localhost".to_string()
        }
    }
}
