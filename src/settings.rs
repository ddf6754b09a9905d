//! Process configuration.
//!
//! Values come from the environment (after `.env` has been merged in by
//! `main`). Keys are matched case-insensitively. Every field is read as an
//! optional string first and then validated: some bad values fall back to a
//! default with a logged error, others stop the process.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use config::{Config, Environment};
use lettre::Address;
use log::{error, warn};
use serde::Deserialize;
use url::Url;

use crate::alerts::schedule::SkipSchedule;
use crate::alerts::threshold::Thresholds;
use crate::error::SettingsError;
use crate::scrape::rates::RateRecord;

pub const DEFAULT_SOURCE_URL: &str = "https://www.nerdwallet.com/mortgages/mortgage-rates";
pub const DEFAULT_MIN_THRESHOLD: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Product {
    #[default]
    Fixed30,
    Fixed20,
    Fixed15,
    Fixed10,
    Arm7,
    Arm5,
    Arm3,
    Fixed30Fha,
    Fixed30Va,
}

impl Product {
    pub const ALL: [Product; 9] = [
        Product::Fixed30,
        Product::Fixed20,
        Product::Fixed15,
        Product::Fixed10,
        Product::Arm7,
        Product::Arm5,
        Product::Arm3,
        Product::Fixed30Fha,
        Product::Fixed30Va,
    ];

    /// Row label used on the rate page.
    pub fn label(&self) -> &'static str {
        match self {
            Product::Fixed30 => "30-year fixed-rate",
            Product::Fixed20 => "20-year fixed-rate",
            Product::Fixed15 => "15-year fixed-rate",
            Product::Fixed10 => "10-year fixed-rate",
            Product::Arm7 => "7-year ARM",
            Product::Arm5 => "5-year ARM",
            Product::Arm3 => "3-year ARM",
            Product::Fixed30Fha => "30-year fixed-rate FHA",
            Product::Fixed30Va => "30-year fixed-rate VA",
        }
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateType {
    #[default]
    InterestRate,
    Apr,
}

impl RateType {
    pub fn label(&self) -> &'static str {
        match self {
            RateType::InterestRate => "Interest rate",
            RateType::Apr => "APR",
        }
    }

    pub fn select(&self, record: &RateRecord) -> f64 {
        match self {
            RateType::InterestRate => record.interest_rate,
            RateType::Apr => record.apr,
        }
    }
}

impl FromStr for RateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Interest rate" => Ok(RateType::InterestRate),
            "APR" => Ok(RateType::Apr),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogHandler {
    #[default]
    File,
    Stream,
}

impl FromStr for LogHandler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(LogHandler::File),
            "stream" => Ok(LogHandler::Stream),
            _ => Err(s.to_string()),
        }
    }
}

/// Unvalidated values as found in the environment.
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    pub source_url: Option<String>,
    pub product: Option<String>,
    pub type_of_rate: Option<String>,
    pub min_threshold: Option<String>,
    pub max_threshold: Option<String>,
    pub skip_schedule: Option<String>,
    pub gmail_user: Option<String>,
    pub gmail_pass: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: Option<String>,
    pub sender_name: Option<String>,
    pub email_template: Option<String>,
    pub notification_file: Option<String>,
    pub log_handler: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_threshold(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl RawSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_source(Environment::default())
    }

    pub fn from_source(source: Environment) -> Result<Self, SettingsError> {
        Ok(Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<RawSettings>()?)
    }

    /// Read before logging is up, so the caller reports the bad value.
    pub fn log_handler(&self) -> Result<LogHandler, String> {
        present(&self.log_handler).map_or(Ok(LogHandler::default()), |v| v.parse())
    }
}

#[derive(Clone)]
pub struct EmailSettings {
    pub gmail_user: Address,
    pub gmail_pass: String,
    pub recipient: Address,
    pub smtp_host: String,
    pub sender_name: String,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("gmail_user", &self.gmail_user)
            .field("gmail_pass", &"********")
            .field("recipient", &self.recipient)
            .field("smtp_host", &self.smtp_host)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

/// Validated configuration, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_url: Url,
    pub product: Product,
    pub rate_type: RateType,
    pub thresholds: Thresholds,
    pub skip_schedule: Option<SkipSchedule>,
    pub email: EmailSettings,
    pub email_template: PathBuf,
    pub notification_file: PathBuf,
}

impl TryFrom<RawSettings> for Settings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let source_url = present(&raw.source_url).unwrap_or(DEFAULT_SOURCE_URL);
        let source_url = Url::parse(source_url)
            .map_err(|e| SettingsError::InvalidUrl(source_url.to_string(), e))?;

        let product = match present(&raw.product) {
            Some(value) => value.parse::<Product>().unwrap_or_else(|bad| {
                error!(
                    "Invalid type of mortgage {:?}. Defaulting to {:?}",
                    bad,
                    Product::default().label()
                );
                Product::default()
            }),
            None => Product::default(),
        };

        let rate_type = match present(&raw.type_of_rate) {
            Some(value) => value.parse::<RateType>().unwrap_or_else(|bad| {
                error!(
                    "Invalid type of rate {:?}. Defaulting to {:?}",
                    bad,
                    RateType::default().label()
                );
                RateType::default()
            }),
            None => RateType::default(),
        };

        let thresholds = thresholds(&raw)?;

        let skip_schedule = present(&raw.skip_schedule).map(SkipSchedule::new);
        if let Some(skip) = &skip_schedule {
            if let Err(e) = skip.validate() {
                error!("Invalid skip schedule {:?}: {}", skip.as_str(), e);
            }
        }

        let gmail_user = present(&raw.gmail_user).ok_or(SettingsError::Missing("GMAIL_USER"))?;
        let gmail_pass = present(&raw.gmail_pass).ok_or(SettingsError::Missing("GMAIL_PASS"))?;
        let recipient = present(&raw.recipient).unwrap_or(gmail_user);

        let email = EmailSettings {
            gmail_user: address(gmail_user, "GMAIL_USER")?,
            gmail_pass: gmail_pass.to_string(),
            recipient: address(recipient, "RECIPIENT")?,
            smtp_host: present(&raw.smtp_host).unwrap_or("smtp.gmail.com").to_string(),
            sender_name: present(&raw.sender_name)
                .unwrap_or("Mortgage Rate Alert")
                .to_string(),
        };

        Ok(Settings {
            source_url,
            product,
            rate_type,
            thresholds,
            skip_schedule,
            email,
            email_template: PathBuf::from(
                present(&raw.email_template).unwrap_or("email_template.html"),
            ),
            notification_file: PathBuf::from(
                present(&raw.notification_file).unwrap_or("last_notify.txt"),
            ),
        })
    }
}

fn address(value: &str, key: &'static str) -> Result<Address, SettingsError> {
    value
        .parse::<Address>()
        .map_err(|_| SettingsError::InvalidAddress(value.to_string(), key))
}

fn thresholds(raw: &RawSettings) -> Result<Thresholds, SettingsError> {
    let min = present(&raw.min_threshold).map(|value| {
        parse_threshold(value).unwrap_or_else(|| {
            error!(
                "Invalid minimum threshold {:?}. Defaulting to {}",
                value, DEFAULT_MIN_THRESHOLD
            );
            DEFAULT_MIN_THRESHOLD
        })
    });

    let max = present(&raw.max_threshold).and_then(|value| {
        let parsed = parse_threshold(value);
        if parsed.is_none() {
            error!("Invalid max threshold {:?}. Defaulting to None", value);
        }
        parsed
    });

    match (min, max) {
        (None, None) => Err(SettingsError::MissingThreshold),
        (Some(_), Some(_)) => {
            warn!("both minimum and maximum threshold are present. alert will fire only for one of it.");
            Ok(Thresholds { min, max })
        }
        _ => Ok(Thresholds { min, max }),
    }
}
