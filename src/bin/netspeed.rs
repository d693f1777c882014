use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::sync::Arc;

use clap::Parser;
use log::{debug, info, warn};
use netspeed::{
    CounterReader, DisplayConfig, InterfaceResolver, MemorySettings, MonotonicClock, ProcNetDev,
    RateSampler, SpeedIndicator, UnitMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Show download/upload speed of the active network interface", long_about = None)]
struct Cli {
    /// Seconds between updates (at least 0.5)
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,

    /// Unit for rates: auto, kb or mb
    #[arg(short, long, default_value_t = UnitMode::Auto)]
    unit: UnitMode,

    /// Hide the download rate
    #[arg(long)]
    no_download: bool,

    /// Hide the upload rate
    #[arg(long)]
    no_upload: bool,

    /// Monitor this interface instead of the default-route one
    #[arg(short = 'I', long)]
    interface: Option<String>,

    /// Exit after this many updates (0 runs until Ctrl-C)
    #[arg(short, long, default_value_t = 0)]
    count: u64,

    /// Statistics table in /proc/net/dev format
    #[arg(long, default_value = netspeed::interface::PROC_NET_DEV)]
    stats_path: PathBuf,
}

enum Event {
    Updated,
    Interrupted,
}

fn main() -> netspeed::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DisplayConfig {
        show_download: !cli.no_download,
        show_upload: !cli.no_upload,
        unit_mode: cli.unit,
        update_interval_secs: cli.interval,
    };
    let settings = MemorySettings::from_config(&config)?;

    let resolver = cli
        .interface
        .map_or_else(InterfaceResolver::default, InterfaceResolver::pinned);
    let stats = ProcNetDev::with_path(&cli.stats_path);
    debug!("Reading counters from {}", stats.path().display());
    let reader = CounterReader::new(stats);
    let sampler = RateSampler::new(resolver, reader, MonotonicClock::new());
    match sampler.interface() {
        Some(iface) => info!("Monitoring {iface}"),
        None => warn!("No active interface found yet"),
    }

    let (tx, rx) = channel();
    let updates = tx.clone();
    let surface = Arc::new(move |text: &str| {
        println!("{text}");
        let _ = updates.send(Event::Updated);
    });

    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Interrupted);
    }) {
        warn!("Failed to set Ctrl-C handler: {e}");
    }

    let mut indicator = SpeedIndicator::enable(Arc::new(settings), surface, sampler)?;

    // The first push is the placeholder shown at enable time
    let mut seen: u64 = 0;
    while let Ok(event) = rx.recv() {
        match event {
            Event::Updated => {
                seen += 1;
                if cli.count > 0 && seen > cli.count {
                    break;
                }
            }
            Event::Interrupted => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    indicator.disable();
    Ok(())
}
