mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;

use love_paths::config::ClientConfig;
use love_paths::engine::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "love-paths")]
#[command(about = "Desktop client for the Love Paths story mini-app")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API origin, overrides the settings file
    #[arg(long)]
    api: Option<String>,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(ClientConfig::default_path);
    let mut config = ClientConfig::load_from(&config_path);
    if let Some(api) = cli.api {
        config.api_base = api;
    }

    info!(
        "Starting Love Paths v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api_base
    );
    let transport = HttpTransport::new(&config.api_base, config.request_timeout())?;

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Love Paths",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ui::app::MyApp::new(cc, config, config_path, transport)))
        }),
    )
    .map_err(|e| anyhow!("ui error: {e}"))
}

fn init_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    // RUST_LOG still wins when set
    builder.parse_default_env();
    builder.init();
}
