//! Typed transaction rows and lenient field parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

/// Cell spellings that read as "no value", matching common CSV exports
const MISSING_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// True when a raw cell carries no value
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    MISSING_MARKERS.contains(&trimmed)
}

/// Parse a timestamp in any of the accepted layouts; `None` when unparseable
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let trimmed = cell.trim();
    if is_missing(trimmed) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Outcome of coercing a cell to a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Value(f64),
    /// The cell was missing, non-numeric or non-finite
    Invalid,
}

impl Numeric {
    pub fn parse(cell: &str) -> Self {
        match cell.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Numeric::Value(value),
            _ => Numeric::Invalid,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(value) => Some(value),
            Numeric::Invalid => None,
        }
    }

    /// Lenient coercion used by cleaning: failures count as zero
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

/// Customer identifier.
///
/// Integral float spellings ("17850.0") collapse to the integer form so a
/// customer exported by a float-typed tool groups with its integer rows.
/// Numeric ids order numerically and sort before textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// `None` for a missing cell
    pub fn parse(cell: &str) -> Option<Self> {
        if is_missing(cell) {
            return None;
        }
        let trimmed = cell.trim();
        let normalized = match trimmed.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value.abs() < 1e15
                    && trimmed.contains(['.', 'e', 'E']) =>
            {
                format!("{}", value as i64)
            }
            _ => trimmed.to_string(),
        };
        Some(CustomerId(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One transaction line with every field parsed leniently
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub invoice: Option<String>,
    pub invoice_date: Option<NaiveDateTime>,
    pub quantity: Numeric,
    pub price: Numeric,
    pub customer_id: Option<CustomerId>,
    pub country: Option<String>,
}

/// A transaction that passed cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTransaction {
    pub invoice: String,
    pub invoice_date: NaiveDateTime,
    pub quantity: f64,
    pub price: f64,
    pub customer_id: CustomerId,
    pub country: Option<String>,
    /// `quantity * price`, always positive
    pub total_price: f64,
}

impl From<&CleanedTransaction> for TransactionRecord {
    fn from(row: &CleanedTransaction) -> Self {
        TransactionRecord {
            invoice: Some(row.invoice.clone()),
            invoice_date: Some(row.invoice_date),
            quantity: Numeric::Value(row.quantity),
            price: Numeric::Value(row.price),
            customer_id: Some(row.customer_id.clone()),
            country: row.country.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2010, 12, 1)
            .unwrap()
            .and_hms_opt(8, 26, 0)
            .unwrap();

        assert_eq!(parse_timestamp("2010-12-01 08:26:00"), Some(expected));
        assert_eq!(parse_timestamp("2010-12-01T08:26:00"), Some(expected));
        assert_eq!(parse_timestamp("2010-12-01T08:26:00Z"), Some(expected));
        assert_eq!(parse_timestamp("12/1/2010 8:26"), Some(expected));
        assert_eq!(parse_timestamp(" 2010-12-01 08:26 "), Some(expected));
    }

    #[test]
    fn test_parse_date_only() {
        let midnight = NaiveDate::from_ymd_opt(2023, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-01-10"), Some(midnight));
        assert_eq!(parse_timestamp("1/10/2023"), Some(midnight));
    }

    #[test]
    fn test_unparseable_timestamp_is_missing() {
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2023-13-45"), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Numeric::parse(" 2.5 "), Numeric::Value(2.5));
        assert_eq!(Numeric::parse("-3"), Numeric::Value(-3.0));
        assert_eq!(Numeric::parse("abc"), Numeric::Invalid);
        assert_eq!(Numeric::parse(""), Numeric::Invalid);
        assert_eq!(Numeric::parse("inf"), Numeric::Invalid);
        assert_eq!(Numeric::parse("NaN").or_zero(), 0.0);
    }

    #[test]
    fn test_customer_id_normalization() {
        assert_eq!(CustomerId::parse("17850.0").unwrap().as_str(), "17850");
        assert_eq!(CustomerId::parse(" 17850 ").unwrap().as_str(), "17850");
        assert_eq!(CustomerId::parse("C-42").unwrap().as_str(), "C-42");
        assert_eq!(CustomerId::parse("12.5").unwrap().as_str(), "12.5");
        assert!(CustomerId::parse("").is_none());
        assert!(CustomerId::parse("NaN").is_none());
    }

    #[test]
    fn test_customer_id_ordering() {
        let mut ids: Vec<CustomerId> = ["b", "10", "9", "a", "100.0"]
            .iter()
            .filter_map(|s| CustomerId::parse(s))
            .collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(CustomerId::as_str).collect();
        assert_eq!(sorted, vec!["9", "10", "100", "a", "b"]);
    }
}
