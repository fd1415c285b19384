// System vendor context from `dmidecode -t system`

use super::{extract_field, CsvFragment};
use crate::command::CommandRunner;
use crate::config::InventoryConfig;
use crate::SourceResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmidecodeRecord {
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
}

impl DmidecodeRecord {
    /// HP and HPE servers carry Smart Array controllers whose logical drives
    /// are described by ssacli rather than smartctl.
    pub fn is_hp(&self) -> bool {
        let vendor = self.manufacturer.trim();
        vendor == "HP" || vendor == "HPE" || vendor.starts_with("Hewlett-Packard")
    }

    /// Virtual machines expose disks without S.M.A.R.T. data.
    pub fn is_virtual(&self) -> bool {
        const VIRTUAL_MARKERS: &[&str] = &[
            "QEMU",
            "KVM",
            "VMware",
            "VirtualBox",
            "Virtual Machine",
            "Xen",
            "Bochs",
        ];

        VIRTUAL_MARKERS
            .iter()
            .any(|marker| self.manufacturer.contains(marker) || self.product.contains(marker))
    }
}

impl CsvFragment for DmidecodeRecord {
    const COLUMNS: &'static [&'static str] = &["dmi_manufacturer", "dmi_product", "dmi_serial"];

    fn values(&self) -> Vec<String> {
        vec![
            self.manufacturer.clone(),
            self.product.clone(),
            self.serial.clone(),
        ]
    }
}

pub fn load(runner: &dyn CommandRunner, config: &InventoryConfig) -> SourceResult<DmidecodeRecord> {
    let program = &config.tools.dmidecode;
    let stdout = runner.run(program, &["-t", "system"])?.into_stdout(program)?;
    Ok(parse_dmidecode(&stdout))
}

pub fn parse_dmidecode(text: &str) -> DmidecodeRecord {
    let field = |name: &str| {
        extract_field(text, name)
            .filter(|value| value != "Not Specified")
            .unwrap_or_default()
    };

    DmidecodeRecord {
        manufacturer: field("Manufacturer:"),
        product: field("Product Name:"),
        serial: field("Serial Number:"),
    }
}
