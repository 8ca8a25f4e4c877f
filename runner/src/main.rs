mod runner;

use anyhow::Result;
use runner::RunConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so stdout carries only snapshots
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runner=info,sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunConfig::from_env()?;

    tracing::info!("Starting fox and rabbit simulation");
    tracing::debug!("Configuration: {:?}", config);

    runner::run(config)
}
