// Output artifacts
//
// The table goes to `<odir>/<prefix>.<host>.csv`, or stdout when no output
// directory was given. The HP dump, when there is one, goes next to it.

use crate::config::OutputConfig;
use crate::{InventoryError, InventoryResult};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    fn display_path(&self) -> PathBuf {
        match self {
            Destination::Stdout => PathBuf::from("/dev/stdout"),
            Destination::File(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub table: Destination,
    pub hp_dump: PathBuf,
}

impl ReportPaths {
    pub fn resolve(odir: Option<&Path>, host: &str, output: &OutputConfig) -> Self {
        match odir {
            Some(dir) => Self {
                table: Destination::File(dir.join(format!("{}.{}.csv", output.file_prefix, host))),
                hp_dump: dir.join(format!("hp.{}.csv", host)),
            },
            None => Self {
                table: Destination::Stdout,
                hp_dump: output.hp_debug_file.clone(),
            },
        }
    }
}

/// Write the table, then the HP dump if present. Either failure is fatal.
pub fn write_report(paths: &ReportPaths, table: &str, hp_dump: Option<&str>) -> InventoryResult<()> {
    let write_error = |path: PathBuf| move |source: std::io::Error| InventoryError::Write { path, source };

    match &paths.table {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(table.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(write_error(paths.table.display_path()))?;
        }
        Destination::File(path) => {
            std::fs::write(path, table).map_err(write_error(path.clone()))?;
            tracing::info!(path = %path.display(), "Wrote inventory table");
        }
    }

    if let Some(dump) = hp_dump {
        std::fs::write(&paths.hp_dump, dump).map_err(write_error(paths.hp_dump.clone()))?;
        tracing::info!(path = %paths.hp_dump.display(), "Wrote HP array dump");
    }

    Ok(())
}
