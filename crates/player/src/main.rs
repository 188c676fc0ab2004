//! Checkers player - terminal client binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkers_player::config::{load_dotenv, PlayerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkers_player=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PlayerConfig::from_env()?;
    checkers_player::runner::run(config).await
}
