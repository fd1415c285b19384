use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use storage_inventory::report::{write_report, ReportPaths};
use storage_inventory::sources::SmartctlInspector;
use storage_inventory::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storinv")]
#[command(about = "Reconcile md, SCSI, partition, mount, iSCSI and blkid data into one row per device")]
#[command(version)]
struct Cli {
    /// Write `<prefix>.<host>.csv` (and the HP dump) into this directory
    /// instead of printing the table
    #[arg(long, value_name = "DIR")]
    odir: Option<PathBuf>,

    /// Trace every join and keep rejected rows, marked with `!`
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: per-user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host name for the `box` column and output file names
    #[arg(long, env = "STORINV_HOSTNAME")]
    hostname: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    if !nix::unistd::geteuid().is_root() {
        tracing::warn!("Not running as root; dmidecode, smartctl and parted output may be incomplete");
    }

    let config = InventoryConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let host = cli.hostname.clone().unwrap_or_else(hostname);

    let runner = SystemCommandRunner;
    let inventory = Inventory::collect(&runner, &config);

    let mut health = SmartctlInspector::new(&runner, config.tools.smartctl.clone());
    let options = ReconcileOptions {
        host: host.clone(),
        verbose: cli.verbose,
    };
    let result = reconcile(&inventory, &mut health, &options);

    let paths = ReportPaths::resolve(cli.odir.as_deref(), &host, &config.output);
    let hp_dump = inventory.hp_dump(&host);
    write_report(&paths, &result.output, hp_dump.as_deref())?;

    Ok(())
}

// Logs go to stderr so the table on stdout stays machine readable.
fn init_logging(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
