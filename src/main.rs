use anyhow::Result;
use defect_analyzer::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration comes first so its log level can seed the subscriber
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = match config.server.logs.env_filter(rust_log) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting defect analyzer on port {}", config.server.port);

    server::run(config).await?;

    Ok(())
}
