mod alerts;
mod api;
mod error;
mod logger;
mod monitor;
mod notify;
mod scrape;
mod settings;

use alerts::cooldown::{CooldownGate, FileStateStore};
use api::fetcher::HttpFetcher;
use error::MortgageAlertError;
use log::{error, info};
use monitor::RateMonitor;
use notify::{desktop, email::GmailNotifier};
use settings::{RawSettings, Settings};

/// Records a startup failure in the configured log before `main` returns it.
fn fatal<E: std::fmt::Display>(e: E) -> E {
    error!("{}", e);
    e
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), MortgageAlertError> {
    // Values already in the environment win over .env
    dotenv::dotenv().ok();

    let raw = RawSettings::from_env()?;
    let handler = raw.log_handler();
    logger::init(handler.clone().unwrap_or_default())?;
    if let Err(bad) = handler {
        error!("Invalid log handler {:?}. Defaulting to 'file'", bad);
    }

    let settings = Settings::try_from(raw).map_err(fatal)?;
    info!(
        "Checking {} for {} ({})",
        settings.source_url, settings.product, settings.rate_type
    );

    let monitor = RateMonitor::new(
        &settings,
        Box::new(HttpFetcher::new().map_err(fatal)?),
        Box::new(GmailNotifier::new(&settings.email).map_err(fatal)?),
        CooldownGate::new(Box::new(FileStateStore::new(&settings.notification_file))),
        desktop::for_platform(std::env::consts::OS),
    );

    let outcome = monitor.run().await;
    info!("Run finished: {:?}", outcome);
    Ok(())
}
