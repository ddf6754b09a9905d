use thiserror::Error;

#[derive(Error, Debug)]
pub enum MortgageAlertError {
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    #[error("Fetcher error: {0}")]
    FetchError(#[from] FetchError),

    #[error("Notifier error: {0}")]
    NotifyError(#[from] NotifyError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Startup configuration problems. Every variant stops the process.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("either min or max threshold is required")]
    MissingThreshold,

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid source url {0:?}: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("invalid email address {0:?} for {1}")]
    InvalidAddress(String, &'static str),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// The page no longer has the shape the normalizer understands.
#[derive(Error, Debug, PartialEq)]
pub enum LayoutError {
    #[error("expected exactly one rate table, found {0}")]
    TableCount(usize),

    #[error("row {row} has {cells} cells, expected at least 3")]
    ShortRow { row: usize, cells: usize },

    #[error("unreadable rate {value:?} for {product:?}")]
    BadRate { product: String, value: String },
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt timestamp {0:?}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: &'static str,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}
