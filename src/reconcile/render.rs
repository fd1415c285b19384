// Row synthesizer and header builder
//
// Header and rows both walk COLUMN_ORDER, so a source's fragment can only
// ever appear in one position.

use crate::sources::{
    BlkidRecord, CsvFragment, DfRecord, DmidecodeRecord, MdRecord, PartedRecord, ScsiRecord,
    SmartctlRecord, TgtdRecord,
};

/// Leading host column.
pub const HOST_COLUMN: &str = "box";

/// Marker prefixed to rows the normalization rules rejected (verbose only).
pub const INVALID_MARKER: &str = "!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    System,
    Mount,
    Raid,
    Scsi,
    Partition,
    Health,
    Export,
    BlockId,
}

pub const COLUMN_ORDER: [Section; 8] = [
    Section::System,
    Section::Mount,
    Section::Raid,
    Section::Scsi,
    Section::Partition,
    Section::Health,
    Section::Export,
    Section::BlockId,
];

impl Section {
    fn header(self) -> String {
        match self {
            Section::System => DmidecodeRecord::header(),
            Section::Mount => DfRecord::header(),
            Section::Raid => MdRecord::header(),
            Section::Scsi => ScsiRecord::header(),
            Section::Partition => PartedRecord::header(),
            Section::Health => SmartctlRecord::header(),
            Section::Export => TgtdRecord::header(),
            Section::BlockId => BlkidRecord::header(),
        }
    }
}

/// Full header line, without the trailing newline.
pub fn header() -> String {
    std::iter::once(HOST_COLUMN.to_string())
        .chain(COLUMN_ORDER.iter().map(|section| section.header()))
        .collect::<Vec<_>>()
        .join(",")
}

/// One joined row. Every source is optional except the mount, which the
/// joiner always synthesizes.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub host: &'a str,
    pub system: &'a DmidecodeRecord,
    pub mount: &'a DfRecord,
    pub md: Option<&'a MdRecord>,
    pub scsi: Option<&'a ScsiRecord>,
    pub partition: Option<&'a PartedRecord>,
    pub health: Option<&'a SmartctlRecord>,
    pub export: Option<&'a TgtdRecord>,
    pub blkid: Option<&'a BlkidRecord>,
}

impl Row<'_> {
    fn fragment(&self, section: Section) -> String {
        match section {
            Section::System => DmidecodeRecord::csv(Some(self.system)),
            Section::Mount => DfRecord::csv(Some(self.mount)),
            Section::Raid => MdRecord::csv(self.md),
            Section::Scsi => ScsiRecord::csv(self.scsi),
            Section::Partition => PartedRecord::csv(self.partition),
            Section::Health => SmartctlRecord::csv(self.health),
            Section::Export => TgtdRecord::csv(self.export),
            Section::BlockId => BlkidRecord::csv(self.blkid),
        }
    }

    /// Render the row, without the trailing newline.
    pub fn render(&self) -> String {
        std::iter::once(crate::sources::sanitize(self.host))
            .chain(COLUMN_ORDER.iter().map(|&section| self.fragment(section)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Verbose-mode trace of how a row was joined.
pub fn diagnostic_prefix(
    key: &str,
    mount: &DfRecord,
    partition: Option<&PartedRecord>,
    export: Option<&TgtdRecord>,
) -> String {
    format!(
        "kk={}/dfName={}/dfDevname={}/parted={}/tgtpath={}:",
        key,
        mount.name,
        mount.devname,
        partition.map(|p| p.path.as_str()).unwrap_or("nil"),
        export.map(|t| t.target_path.as_str()).unwrap_or("nil"),
    )
}
