/// Captured tool output for a small database host: two SATA disks, one
/// partition exported over iSCSI, and an optical drive.
use super::mock_commands::FixtureRunner;
use storage_inventory::CommandOutput;

pub const DMIDECODE: &str = "\
# dmidecode 3.3
Getting SMBIOS data from sysfs.
SMBIOS 3.2.0 present.

Handle 0x0100, DMI type 1, 27 bytes
System Information
\tManufacturer: Dell Inc.
\tProduct Name: PowerEdge R740
\tVersion: Not Specified
\tSerial Number: 7XK2Q33
";

pub const DMIDECODE_HP: &str = "\
System Information
\tManufacturer: HPE
\tProduct Name: ProLiant DL380 Gen10
\tSerial Number: CZJ9120ABC
";

pub const MDSTAT_EMPTY: &str = "\
Personalities :
unused devices: <none>
";

pub const LSSCSI: &str = "\
[0:0:0:0]    disk    ATA      Samsung SSD 870  2B6Q  /dev/sda
[1:0:0:0]    disk    ATA      ST4000NM0035-1V4 TN05  /dev/sdb
[2:0:0:0]    cd/dvd  HL-DT-ST DVD+-RW GHB0N    A1C0  /dev/sr0
";

pub const PARTED: &str = "\
BYT;
/dev/sda:500GB:scsi:512:512:gpt:ATA Samsung SSD 870:;
1:1049kB:538MB:537MB:fat32:EFI System Partition:boot, esp;
2:538MB:500GB:500GB:ext4::;

BYT;
/dev/sdb:4001GB:scsi:512:4096:gpt:ATA ST4000NM0035-1V4:;
1:1049kB:4001GB:4001GB::data:;
";

pub const DF: &str = "\
Filesystem     Type     1024-blocks      Used Available Capacity Mounted on
udev           devtmpfs     8112340         0   8112340       0% /dev
/dev/sda2      ext4       479596204 123456789 331708540      28% /
/dev/sda1      vfat          523248      6228    517020       2% /boot/efi
tmpfs          tmpfs        1628724      2188   1626536       1% /run
";

pub const TGTADM: &str = "\
Target 1: iqn.2024-01.com.example:db01.data
    System information:
        Driver: iscsi
        State: ready
    LUN information:
        LUN: 0
            Type: controller
            Size: 0 MB, Block size: 1
            Backing store path: None
        LUN: 1
            Type: disk
            Size: 4000787 MB, Block size: 512
            Backing store type: rdwr
            Backing store path: /dev/sdb1
";

pub const BLKID: &str = r#"/dev/sda1: UUID="7A1B-2C3D" TYPE="vfat" PARTLABEL="EFI System Partition" PARTUUID="0b1c2d3e-01"
/dev/sda2: UUID="f3e1c6a4-9b1d-4c55-8c1e-2d7f6a0b9e11" TYPE="ext4" PARTUUID="0b1c2d3e-02"
/dev/sdb1: PARTLABEL="data" PARTUUID="5e6f7a8b-01"
/dev/sr0: UUID="2024-02-16-23-52-30-00" LABEL="Ubuntu-Server 24.04 LTS amd64" TYPE="iso9660"
"#;

pub const SMARTCTL_SDA: &str = r#"{
  "smartctl": { "version": [7, 3], "exit_status": 0 },
  "device": { "name": "/dev/sda", "type": "sat" },
  "model_name": "Samsung SSD 870 EVO 500GB",
  "serial_number": "S6PXNM0T401234",
  "user_capacity": { "bytes": 500107862016 },
  "rotation_rate": 0,
  "smart_status": { "passed": true },
  "temperature": { "current": 29 }
}"#;

pub const SMARTCTL_SDB: &str = r#"{
  "smartctl": { "version": [7, 3], "exit_status": 0 },
  "device": { "name": "/dev/sdb", "type": "sat" },
  "model_name": "ST4000NM0035-1V4107",
  "serial_number": "ZC1A2B3C",
  "user_capacity": { "bytes": 4000787030016 },
  "rotation_rate": 7200,
  "smart_status": { "passed": true },
  "temperature": { "current": 34 }
}"#;

pub const SSACLI: &str = "\
HPE Smart Array P408i-a SR Gen10 in Slot 0 (Embedded)
   Slot: 0
   Controller Status: OK

   Array: A
      Interface Type: SAS
      Status: OK

      Logical Drive: 1
         Size: 1.09 TB
         Fault Tolerance: 1
         Status: OK
         Disk Name: /dev/sda

      physicaldrive 1I:1:1
         Status: OK
         Size: 1.2 TB
";

pub const SMARTCTL_ARGS: &str = "smartctl -H -i -A -j";

/// Every tool on the host answers with its captured output.
pub fn db_host() -> FixtureRunner {
    let mut runner = FixtureRunner::new();
    runner
        .register_file("/proc/mdstat", MDSTAT_EMPTY)
        .register("dmidecode -t system", CommandOutput::success(DMIDECODE))
        .register("lsscsi", CommandOutput::success(LSSCSI))
        .register("parted -s -m -l", CommandOutput::success(PARTED))
        .register("df -P -T", CommandOutput::success(DF))
        .register(
            "tgtadm --lld iscsi --op show --mode target",
            CommandOutput::success(TGTADM),
        )
        .register("blkid", CommandOutput::success(BLKID))
        .register(
            &format!("{} /dev/sda", SMARTCTL_ARGS),
            CommandOutput::success(SMARTCTL_SDA),
        )
        .register(
            &format!("{} /dev/sdb", SMARTCTL_ARGS),
            CommandOutput::success(SMARTCTL_SDB),
        )
        .register(
            &format!("{} /dev/sr0", SMARTCTL_ARGS),
            CommandOutput::failure(2, "Smartctl open device: /dev/sr0 failed: Operation not permitted"),
        );
    runner
}

/// Same host on HP hardware: the first disk is a Smart Array logical drive.
pub fn hp_host() -> FixtureRunner {
    let mut runner = db_host();
    runner
        .register("dmidecode -t system", CommandOutput::success(DMIDECODE_HP))
        .register(
            "ssacli ctrl all show config detail",
            CommandOutput::success(SSACLI),
        );
    runner
}
