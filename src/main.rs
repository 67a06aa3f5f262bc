use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use stark_account::cli::{self, Cli};
use stark_account::config::AccountConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match AccountConfig::load(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    cli.apply_overrides(&mut config);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !found {
        warn!("Config file not found at '{}'. Using defaults.", cli.config);
    }

    if let Err(e) = cli::run(&cli, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
