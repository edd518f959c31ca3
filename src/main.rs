use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skycast::driver::Driver;
use skycast::{OpenMeteoClient, SkycastConfig, SystemClock, WeatherPredictor, logging, web};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Watch,
}

fn parse_mode() -> Result<Mode> {
    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => Ok(Mode::Serve),
        Some("watch") => Ok(Mode::Watch),
        Some(other) => bail!("Unknown command '{other}'. Usage: skycast [serve|watch]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mode = parse_mode()?;
    let config = SkycastConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;
    info!("SkyCast v{} starting in {:?} mode", skycast::VERSION, mode);

    let source = OpenMeteoClient::new(&config.weather).context("Failed to create weather client")?;
    let mut predictor = WeatherPredictor::new(&config, Arc::new(source), Arc::new(SystemClock));

    match predictor.initialize().await {
        Ok(summary) => info!(
            "Weather predictor initialized with {} readings",
            summary.accepted
        ),
        Err(e) => warn!(
            "Weather predictor initialization failed, starting with {} readings: {}",
            predictor.store().len(),
            e
        ),
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                cancel.cancel();
            }
        }
    });

    match mode {
        Mode::Serve => {
            web::run(&config.server, predictor.into_shared(), cancel)
                .await
                .context("Web server failed")?;
        }
        Mode::Watch => {
            Driver::new(predictor.into_shared(), &config.driver)
                .run(cancel)
                .await?;
        }
    }

    Ok(())
}
