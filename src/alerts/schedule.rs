use chrono::{DateTime, Local, NaiveTime};

const SKIP_FORMAT: &str = "%I:%M %p";

/// Wall-clock time of day (`HH:MM AM/PM`) at which a run is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipSchedule {
    at: String,
}

impl SkipSchedule {
    pub fn new(at: impl Into<String>) -> Self {
        Self { at: at.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.at
    }

    pub fn validate(&self) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(&self.at, SKIP_FORMAT)
    }

    /// Plain string comparison against the formatted clock, so a value that
    /// failed validation simply never matches.
    pub fn matches(&self, now: &DateTime<Local>) -> bool {
        now.format(SKIP_FORMAT).to_string() == self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn matches_same_minute() {
        let skip = SkipSchedule::new("09:00 PM");
        let now = Local.with_ymd_and_hms(2024, 3, 14, 21, 0, 42).unwrap();
        assert!(skip.matches(&now));
    }

    #[test]
    fn ignores_other_minutes() {
        let skip = SkipSchedule::new("09:00 PM");
        let morning = Local.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap();
        let later = Local.with_ymd_and_hms(2024, 3, 14, 21, 1, 0).unwrap();
        assert!(!skip.matches(&morning));
        assert!(!skip.matches(&later));
    }

    #[test]
    fn validate_rejects_24_hour_clock() {
        assert!(SkipSchedule::new("07:15 AM").validate().is_ok());
        assert!(SkipSchedule::new("21:00").validate().is_err());
        assert!(SkipSchedule::new("noon").validate().is_err());
    }
}
