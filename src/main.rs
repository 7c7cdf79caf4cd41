use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use ibmcloud_vpc_inventory::config::InventoryConfig;
use ibmcloud_vpc_inventory::ibm::{auth, http::HttpClient};
use ibmcloud_vpc_inventory::inventory;

/// Ansible dynamic inventory for IBM Cloud VPC
#[derive(Parser, Debug)]
#[command(name = "ibmcloud-vpc-inventory", version, about, long_about = None)]
struct Args {
    /// List hosts in the configured VPC region(s). Listing is the only
    /// action; the flag is accepted for ansible compatibility.
    #[arg(long)]
    list: bool,

    /// Alternate ini file with grouping switches and API parameters
    #[arg(long, short = 'i')]
    inifile: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Logs go to a file so stdout stays reserved for the inventory JSON.
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        eprintln!("Warning: failed to open log file {}", log_path.display());
        return None;
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ibmcloud-vpc-inventory started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir
            .join("ibmcloud-vpc-inventory")
            .join("inventory.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ibmcloud-vpc-inventory").join("inventory.log");
    }
    PathBuf::from("ibmcloud-vpc-inventory.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    // Single exit point: every failure below propagates here and terminates
    // the run with a diagnostic, with no partial inventory on stdout.
    if let Err(err) = run(&args).await {
        tracing::error!("Run failed: {:#}", err);
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    if !args.list {
        tracing::debug!("--list not passed; listing is the only supported action");
    }

    let ini_path = args
        .inifile
        .clone()
        .unwrap_or_else(InventoryConfig::default_path);
    let cfg = InventoryConfig::load(&ini_path)?;

    let api_key = auth::api_key_from_env()?;
    let http = HttpClient::new()?;
    let token = auth::get_iam_token(&http, &api_key).await?;

    let endpoints = inventory::Endpoints::default();
    let inv = inventory::run(&http, &token, &cfg, &endpoints).await?;
    println!("{}", inv.render()?);

    Ok(())
}
