//! One pass of the rate check: skip gate, fetch, parse, evaluate, cooldown,
//! render, send, persist.

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};

use crate::alerts::cooldown::CooldownGate;
use crate::alerts::threshold::format_percent;
use crate::api::fetcher::PageFetcher;
use crate::notify::desktop::LocalAlert;
use crate::notify::email::Notifier;
use crate::notify::template::EmailTemplate;
use crate::scrape::rates;
use crate::settings::Settings;

const LAYOUT_ALERT_TITLE: &str = "Mortgage Rate Alert failed to run.";
const LAYOUT_ALERT_MESSAGE: &str = "Rate table looks altered, the page layout has changed.";

/// How a run ended. Every variant is a normal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped,
    FetchFailed,
    LayoutChanged,
    ProductMissing,
    WithinThresholds,
    Suppressed,
    TemplateFailed,
    SendFailed,
    Notified,
}

pub struct RateMonitor<'a> {
    settings: &'a Settings,
    fetcher: Box<dyn PageFetcher>,
    notifier: Box<dyn Notifier>,
    cooldown: CooldownGate,
    local_alert: Box<dyn LocalAlert>,
}

impl<'a> RateMonitor<'a> {
    pub fn new(
        settings: &'a Settings,
        fetcher: Box<dyn PageFetcher>,
        notifier: Box<dyn Notifier>,
        cooldown: CooldownGate,
        local_alert: Box<dyn LocalAlert>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            notifier,
            cooldown,
            local_alert,
        }
    }

    pub async fn run(&self) -> RunOutcome {
        self.run_at(Local::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Local>) -> RunOutcome {
        let settings = self.settings;

        if let Some(skip) = &settings.skip_schedule {
            if skip.matches(&now) {
                info!("Schedule ignored at {:?}", skip.as_str());
                return RunOutcome::Skipped;
            }
        }

        let body = match self.fetcher.fetch(&settings.source_url).await {
            Ok(body) => body,
            Err(e) => {
                error!("{}", e);
                return RunOutcome::FetchFailed;
            }
        };

        let page = match rates::parse_page(&body) {
            Ok(page) => page,
            Err(e) => {
                error!("Unable to read rates from {}: {}", settings.source_url, e);
                if let Err(e) = self.local_alert.alert(LAYOUT_ALERT_TITLE, LAYOUT_ALERT_MESSAGE) {
                    error!("Desktop notification failed: {}", e);
                }
                return RunOutcome::LayoutChanged;
            }
        };

        if page.is_current(now.date_naive()) {
            info!("{}", page.updated.as_deref().unwrap_or_default());
        } else {
            warn!("{:?} returned outdated information.", settings.source_url.as_str());
        }

        let product = settings.product.label();
        let Some(record) = page.table.get(product) else {
            error!("{:?} is not listed on {}", product, settings.source_url);
            return RunOutcome::ProductMissing;
        };
        let rate = settings.rate_type.select(record);
        let title = format!(
            "{} for {}: {}%",
            settings.rate_type,
            product,
            format_percent(rate)
        );
        info!("{}", title);

        let decision = settings.thresholds.evaluate(rate, &now);
        let Some(subject) = decision.subject else {
            debug!("{:?}", page.table);
            return RunOutcome::WithinThresholds;
        };

        let timestamp = now.timestamp_millis() as f64 / 1000.0;
        if self.cooldown.is_suppressed(timestamp) {
            return RunOutcome::Suppressed;
        }

        let rendered = match EmailTemplate::load(&settings.email_template)
            .and_then(|template| template.render(&page.table, &title))
        {
            Ok(rendered) => rendered,
            Err(e) => {
                error!("{:?}: {}", settings.email_template, e);
                return RunOutcome::TemplateFailed;
            }
        };

        match self.notifier.send(&subject, &rendered).await {
            Ok(response) => {
                info!("{}", response);
                if let Err(e) = self.cooldown.mark_sent(timestamp) {
                    error!("Failed to record notification time: {}", e);
                }
                RunOutcome::Notified
            }
            Err(e) => {
                error!("{}", e);
                RunOutcome::SendFailed
            }
        }
    }
}
