//! Turns the scraped rate listing into a [`RateTable`].
//!
//! The page carries exactly one `<table>`: the first column names the loan
//! product, the next two hold the interest rate and the APR as percentages
//! (`"6.75%"`). A `<time>` element states when the figures were published
//! (`"Accurate as of 03/14/2024."`).

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::LayoutError;
use crate::scrape::html;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RateRecord {
    pub interest_rate: f64,
    pub apr: f64,
}

/// Product label to rates, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rows: Vec<(String, RateRecord)>,
}

impl RateTable {
    /// Later rows replace earlier ones with the same label.
    pub fn insert(&mut self, product: String, record: RateRecord) {
        match self.rows.iter_mut().find(|(label, _)| *label == product) {
            Some((_, existing)) => *existing = record,
            None => self.rows.push((product, record)),
        }
    }

    pub fn get(&self, product: &str) -> Option<&RateRecord> {
        self.rows
            .iter()
            .find(|(label, _)| label == product)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RateRecord)> {
        self.rows.iter().map(|(label, record)| (label.as_str(), record))
    }
}

impl Serialize for RateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, record) in self.iter() {
            map.serialize_entry(label, record)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatePage {
    /// Raw text of the page's `<time>` element, if it has one.
    pub updated: Option<String>,
    pub table: RateTable,
}

impl RatePage {
    /// True when the page says it was refreshed on `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.updated
            .as_deref()
            .map_or(false, |updated| published_on(updated) == today.format("%m/%d/%Y").to_string())
    }
}

/// `"Accurate as of 03/14/2024."` -> `"03/14/2024"`
pub fn published_on(updated: &str) -> String {
    updated
        .replace("Accurate as of", "")
        .replace('.', "")
        .trim()
        .to_string()
}

/// `"6.75%"` -> `6.75`. Anything outside `[0, 100)` is rejected.
pub fn parse_percent(value: &str) -> Option<f64> {
    let rate = value.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
    (0.0..100.0).contains(&rate).then_some(rate)
}

pub fn parse_page(doc: &str) -> Result<RatePage, LayoutError> {
    let updated = html::elements(doc, "time").first().map(|el| html::text(el));

    let tables = html::count_open_tags(doc, "table");
    if tables != 1 {
        return Err(LayoutError::TableCount(tables));
    }
    let table = html::elements(doc, "table")
        .into_iter()
        .next()
        .ok_or(LayoutError::TableCount(0))?;

    Ok(RatePage {
        updated,
        table: normalize(table)?,
    })
}

/// Builds the rate mapping from a single `<table>` element.
pub fn normalize(table: &str) -> Result<RateTable, LayoutError> {
    let mut rates = RateTable::default();

    for (index, row) in html::elements(table, "tr").into_iter().enumerate() {
        let cells = html::row_cells(row);
        if cells.is_empty() || cells.iter().all(|c| c.header) {
            continue;
        }
        if cells.len() < 3 {
            return Err(LayoutError::ShortRow {
                row: index,
                cells: cells.len(),
            });
        }

        let product = cells[0].text.clone();
        let rate = |value: &str| {
            parse_percent(value).ok_or_else(|| LayoutError::BadRate {
                product: product.clone(),
                value: value.to_string(),
            })
        };
        let record = RateRecord {
            interest_rate: rate(&cells[1].text)?,
            apr: rate(&cells[2].text)?,
        };
        rates.insert(product, record);
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <p><time datetime="2024-03-14">Accurate as of 03/14/2024.</time></p>
          <table class="rates">
            <thead>
              <tr><th>Product</th><th>Interest rate</th><th>APR</th></tr>
            </thead>
            <tbody>
              <tr><td>30-year fixed-rate</td><td>7.10%</td><td>7.25%</td></tr>
              <tr><td>15-year fixed-rate</td><td>6.38%</td><td>6.62%</td></tr>
              <tr><th scope="row">5-year ARM</th><td><span>6.20%</span></td><td>7.51%</td></tr>
            </tbody>
          </table>
        </body></html>
    "#;

    #[test]
    fn parses_rates_and_timestamp() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.updated.as_deref(), Some("Accurate as of 03/14/2024."));
        assert_eq!(page.table.len(), 3);
        assert_eq!(
            page.table.get("30-year fixed-rate"),
            Some(&RateRecord {
                interest_rate: 7.10,
                apr: 7.25
            })
        );
        assert_eq!(page.table.get("5-year ARM").unwrap().interest_rate, 6.20);
        assert!(page.table.get("7-year ARM").is_none());
    }

    #[test]
    fn keys_and_values_stay_in_range() {
        let page = parse_page(PAGE).unwrap();
        let labels: Vec<&str> = page.table.iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec!["30-year fixed-rate", "15-year fixed-rate", "5-year ARM"]
        );
        for (_, record) in page.table.iter() {
            assert!((0.0..100.0).contains(&record.interest_rate));
            assert!((0.0..100.0).contains(&record.apr));
        }
    }

    #[test]
    fn staleness_compares_calendar_date() {
        let page = parse_page(PAGE).unwrap();
        assert!(page.is_current(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()));
        assert!(!page.is_current(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));

        let undated = RatePage {
            updated: None,
            table: RateTable::default(),
        };
        assert!(!undated.is_current(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()));
    }

    #[test]
    fn rejects_missing_or_extra_tables() {
        assert_eq!(
            parse_page("<html><body>No rates today</body></html>"),
            Err(LayoutError::TableCount(0))
        );
        let doubled = format!("{}<table><tr><td>x</td></tr></table>", PAGE);
        assert_eq!(parse_page(&doubled), Err(LayoutError::TableCount(2)));
    }

    #[test]
    fn rejects_short_rows() {
        let table = "<table><tr><td>30-year fixed-rate</td><td>7.10%</td></tr></table>";
        assert_eq!(
            normalize(table),
            Err(LayoutError::ShortRow { row: 0, cells: 2 })
        );
    }

    #[test]
    fn rejects_unreadable_rates() {
        let table = "<table><tr><td>3-year ARM</td><td>N/A</td><td>6.9%</td></tr></table>";
        assert_eq!(
            normalize(table),
            Err(LayoutError::BadRate {
                product: "3-year ARM".into(),
                value: "N/A".into()
            })
        );
        assert_eq!(parse_percent("100%"), None);
        assert_eq!(parse_percent("-0.5%"), None);
        assert_eq!(parse_percent(" 6.75% "), Some(6.75));
    }

    #[test]
    fn serializes_in_page_order() {
        let page = parse_page(PAGE).unwrap();
        let json = serde_json::to_string(&page.table).unwrap();
        assert!(json.starts_with(r#"{"30-year fixed-rate":{"interest_rate":7.1,"apr":7.25}"#));
    }
}
