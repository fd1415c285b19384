// Runtime configuration
//
// Layering: built-in defaults, then an optional TOML file, then STORINV__*
// environment variables.

use crate::InventoryResult;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment prefix, e.g. `STORINV__TOOLS__SMARTCTL=/usr/local/sbin/smartctl`.
pub const ENV_PREFIX: &str = "STORINV";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct InventoryConfig {
    pub tools: ToolPaths,
    pub df: DfConfig,
    pub output: OutputConfig,
}

/// Programs and files each source reads from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub mdstat: PathBuf,
    pub lsscsi: String,
    pub parted: String,
    pub df: String,
    pub tgtadm: String,
    pub blkid: String,
    pub dmidecode: String,
    pub ssacli: String,
    pub smartctl: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            mdstat: PathBuf::from("/proc/mdstat"),
            lsscsi: "lsscsi".to_string(),
            parted: "parted".to_string(),
            df: "df".to_string(),
            tgtadm: "tgtadm".to_string(),
            blkid: "blkid".to_string(),
            dmidecode: "dmidecode".to_string(),
            ssacli: "ssacli".to_string(),
            smartctl: "smartctl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DfConfig {
    /// Filesystem types that never describe storage (pseudo and in-memory
    /// filesystems).
    pub exclude_types: Vec<String>,
}

impl Default for DfConfig {
    fn default() -> Self {
        const EXCLUDED_FS_TYPES: &[&str] = &[
            "autofs",
            "binfmt_misc",
            "bpf",
            "cgroup",
            "cgroup2",
            "configfs",
            "debugfs",
            "devpts",
            "devtmpfs",
            "efivarfs",
            "fusectl",
            "hugetlbfs",
            "mqueue",
            "nsfs",
            "overlay",
            "proc",
            "pstore",
            "ramfs",
            "rpc_pipefs",
            "securityfs",
            "squashfs",
            "sysfs",
            "tmpfs",
            "tracefs",
        ];

        Self {
            exclude_types: EXCLUDED_FS_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Table file name is `<file_prefix>.<host>.csv` inside the output directory.
    pub file_prefix: String,
    /// Where the HP array dump goes when the table is written to stdout.
    pub hp_debug_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "storinv".to_string(),
            hp_debug_file: PathBuf::from("hp.dbg"),
        }
    }
}

impl InventoryConfig {
    /// Load configuration. An explicitly named file must exist; the per-user
    /// default file is optional.
    pub fn load(explicit: Option<&Path>) -> InventoryResult<Self> {
        let mut builder = ::config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(::config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    tracing::debug!(path = %path.display(), "Looking for config file");
                    builder = builder.add_source(::config::File::from(path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `<user config dir>/storinv/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "storinv")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn is_excluded_fs(&self, fstype: &str) -> bool {
        self.df.exclude_types.iter().any(|t| t == fstype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = InventoryConfig::default();
        assert_eq!(config.tools.mdstat, PathBuf::from("/proc/mdstat"));
        assert_eq!(config.tools.smartctl, "smartctl");
        assert_eq!(config.output.file_prefix, "storinv");
        assert!(config.is_excluded_fs("tmpfs"));
        assert!(!config.is_excluded_fs("ext4"));
        assert!(!config.is_excluded_fs("nfs4"));
    }

    #[test]
    #[serial]
    fn test_load_file_overrides_defaults() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
[tools]
smartctl = "/opt/smartmontools/bin/smartctl"

[output]
file_prefix = "qsdata"
"#
        )?;

        let config = InventoryConfig::load(Some(file.path()))?;
        assert_eq!(config.tools.smartctl, "/opt/smartmontools/bin/smartctl");
        assert_eq!(config.tools.lsscsi, "lsscsi");
        assert_eq!(config.output.file_prefix, "qsdata");
        assert_eq!(config.output.hp_debug_file, PathBuf::from("hp.dbg"));
        assert!(config.is_excluded_fs("proc"));

        Ok(())
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_error() {
        let result = InventoryConfig::load(Some(Path::new("/nonexistent/storinv.toml")));
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() -> anyhow::Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[tools]\nblkid = \"/sbin/blkid\"")?;

        std::env::set_var("STORINV__TOOLS__BLKID", "/usr/sbin/blkid");
        let config = InventoryConfig::load(Some(file.path()));
        std::env::remove_var("STORINV__TOOLS__BLKID");

        assert_eq!(config?.tools.blkid, "/usr/sbin/blkid");
        Ok(())
    }
}
