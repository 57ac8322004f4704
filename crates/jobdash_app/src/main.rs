mod platform;

use clap::Parser;
use jobdash_logging::{dash_info, dash_warn, LevelFilter};

use platform::config::{AppConfig, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path();
    let (config, config_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let config = config.with_cli(&cli);

    jobdash_logging::initialize(config.log_destination.into(), LevelFilter::Info);
    if let Some(err) = config_error {
        dash_warn!("Using default configuration: {}", err);
    }
    dash_info!("Starting jobdash against {}", config.api_base_url);

    platform::run_app(config)
}
