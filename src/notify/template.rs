//! Email body rendering with minijinja.

use std::fs;
use std::path::Path;

use minijinja::{context, Environment, UndefinedBehavior};

use crate::error::TemplateError;
use crate::scrape::rates::RateTable;

/// An HTML template that receives `result` (product label to
/// `{interest_rate, apr}`) and `title`.
pub struct EmailTemplate {
    env: Environment<'static>,
    source: String,
}

impl EmailTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self {
            env,
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    pub fn render(&self, result: &RateTable, title: &str) -> Result<String, TemplateError> {
        log::debug!("Rendering email template for {} products", result.len());
        Ok(self
            .env
            .render_str(&self.source, context! { result => result, title => title })?)
    }
}
