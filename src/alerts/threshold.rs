use chrono::{DateTime, Local};

/// Configured bounds. Both ends are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub below: bool,
    pub above: bool,
    pub subject: Option<String>,
}

/// Percent figure as shown in subjects and titles. Whole numbers keep one
/// decimal place (`5.0`, `7.1`).
pub fn format_percent(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

impl Thresholds {
    pub fn is_below(&self, rate: f64) -> bool {
        self.min.map_or(false, |min| rate <= min)
    }

    pub fn is_above(&self, rate: f64) -> bool {
        self.max.map_or(false, |max| rate >= max)
    }

    /// Checks `rate` against both bounds and picks the email subject.
    /// Overlapping bounds are accepted and produce the generic subject.
    pub fn evaluate(&self, rate: f64, now: &DateTime<Local>) -> Decision {
        let below = self.is_below(rate);
        let above = self.is_above(rate);
        let stamp = now.format("%c");

        let subject = match (below, above) {
            (true, true) => Some(format!("Mortgage Rate alert: {}", stamp)),
            (true, false) => Some(format!(
                "Mortgage Rates below {}% - {}",
                format_percent(self.min.unwrap_or_default()),
                stamp
            )),
            (false, true) => Some(format!(
                "Mortgage Rates above {}% - {}",
                format_percent(self.max.unwrap_or_default()),
                stamp
            )),
            (false, false) => None,
        };

        Decision {
            below,
            above,
            subject,
        }
    }
}
