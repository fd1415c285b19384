// Inventory collection
//
// Loads every source once, in a fixed order, before reconciliation starts.
// A source that cannot be read contributes nothing; the run continues.

use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::sources::{
    self, or_empty, BlkidRecord, DfRecord, DmidecodeRecord, HpArrayMap, MdRecord, PartedRecord,
    ScsiRecord, SourceMap, TgtdRecord,
};
use tracing::{info, warn};

/// Fully materialized snapshot of every source for one host.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub dmidecode: DmidecodeRecord,
    /// Only collected on HP hardware.
    pub hp: Option<HpArrayMap>,
    pub md: SourceMap<MdRecord>,
    pub scsi: SourceMap<ScsiRecord>,
    pub parted: SourceMap<PartedRecord>,
    pub df: SourceMap<DfRecord>,
    pub tgtd: SourceMap<TgtdRecord>,
    pub blkid: SourceMap<BlkidRecord>,
}

impl Inventory {
    pub fn collect(runner: &dyn CommandRunner, config: &InventoryConfig) -> Self {
        let dmidecode = sources::dmidecode::load(runner, config).unwrap_or_else(|e| {
            warn!(source = "dmidecode", error = %e, "Source unavailable, continuing without it");
            DmidecodeRecord::default()
        });

        let hp = if dmidecode.is_hp() {
            info!(manufacturer = %dmidecode.manufacturer, "HP hardware, reading Smart Array config");
            Some(or_empty("hp", sources::hp::load(runner, config)))
        } else {
            None
        };

        let inventory = Self {
            md: or_empty("md", sources::md::load(runner, config)),
            scsi: or_empty("scsi", sources::scsi::load(runner, config)),
            parted: or_empty("parted", sources::parted::load(runner, config)),
            df: or_empty("df", sources::df::load(runner, config)),
            tgtd: or_empty("tgtd", sources::tgtd::load(runner, config)),
            blkid: or_empty("blkid", sources::blkid::load(runner, config)),
            dmidecode,
            hp,
        };

        info!(
            md = inventory.md.len(),
            scsi = inventory.scsi.len(),
            parted = inventory.parted.len(),
            df = inventory.df.len(),
            tgtd = inventory.tgtd.len(),
            blkid = inventory.blkid.len(),
            "Inventory collected"
        );
        inventory
    }

    /// Secondary HP table, when HP data was collected and non-empty.
    pub fn hp_dump(&self, host: &str) -> Option<String> {
        self.hp
            .as_ref()
            .filter(|map| !map.is_empty())
            .map(|map| sources::hp::dump(map, host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockCommandRunner};
    use crate::SourceError;

    const DMIDECODE_HP: &str = "\
System Information
\tManufacturer: HPE
\tProduct Name: ProLiant DL380 Gen10
\tSerial Number: CZJ9120ABC
";

    const SSACLI: &str = "\
Smart Array P408i-a SR Gen10 in Slot 0 (Embedded)
   Slot: 0

   Array: A
      Logical Drive: 1
         Size: 1.09 TB
         Fault Tolerance: 1
         Status: OK
         Disk Name: /dev/sda
";

    fn everything_fails(runner: &mut MockCommandRunner) {
        runner.expect_read_file().returning(|path| {
            Err(SourceError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });
    }

    #[test]
    fn test_collect_survives_every_source_failing() {
        let mut runner = MockCommandRunner::new();
        everything_fails(&mut runner);
        runner
            .expect_run()
            .returning(|_, _| Ok(CommandOutput::failure(127, "not found")));

        let inventory = Inventory::collect(&runner, &InventoryConfig::default());

        assert_eq!(inventory.dmidecode, DmidecodeRecord::default());
        assert!(inventory.hp.is_none());
        assert!(inventory.md.is_empty());
        assert!(inventory.scsi.is_empty());
        assert!(inventory.df.is_empty());
        assert!(inventory.blkid.is_empty());
    }

    #[test]
    fn test_hp_only_loaded_on_hp_hardware() {
        let mut runner = MockCommandRunner::new();
        everything_fails(&mut runner);
        runner
            .expect_run()
            .withf(|program, _| program == "dmidecode")
            .returning(|_, _| Ok(CommandOutput::success(DMIDECODE_HP)));
        runner
            .expect_run()
            .withf(|program, _| program == "ssacli")
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success(SSACLI)));
        runner
            .expect_run()
            .withf(|program, _| program != "dmidecode" && program != "ssacli")
            .returning(|_, _| Ok(CommandOutput::success("")));

        let inventory = Inventory::collect(&runner, &InventoryConfig::default());

        assert!(inventory.dmidecode.is_hp());
        let hp = inventory.hp.as_ref().unwrap();
        assert!(hp.contains_key("/dev/sda"));

        let dump = inventory.hp_dump("db01").unwrap();
        assert!(dump.starts_with("box,"));
        assert!(dump.lines().nth(1).unwrap().starts_with("db01,"));
    }

    #[test]
    fn test_no_hp_dump_without_hp_data() {
        let inventory = Inventory::default();
        assert!(inventory.hp_dump("db01").is_none());

        let inventory = Inventory {
            hp: Some(HpArrayMap::new()),
            ..Default::default()
        };
        assert!(inventory.hp_dump("db01").is_none());
    }
}
