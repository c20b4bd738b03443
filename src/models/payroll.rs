//! Payroll month and payroll record models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PayrollError;

/// A calendar month identifying a payroll run, written `MM~YYYY`.
///
/// Months order chronologically.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollMonth;
///
/// let month: PayrollMonth = "03~2026".parse().unwrap();
/// assert_eq!(month.month(), 3);
/// assert_eq!(month.year(), 2026);
/// assert_eq!(month.to_string(), "03~2026");
/// assert!("2026-03".parse::<PayrollMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayrollMonth {
    year: i32,
    month: u32,
}

impl PayrollMonth {
    /// Creates a month, returning `None` unless `month` is 1-12 and `year` has four digits.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if (1..=12).contains(&month) && (1000..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Returns the month number (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the four-digit year.
    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for PayrollMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}~{:04}", self.month, self.year)
    }
}

impl FromStr for PayrollMonth {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PayrollError::InvalidMonth {
            value: s.to_string(),
        };

        let (month, year) = s.split_once('~').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 4 {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        Self::new(month, year).ok_or_else(invalid)
    }
}

impl TryFrom<String> for PayrollMonth {
    type Error = PayrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayrollMonth> for String {
    fn from(month: PayrollMonth) -> Self {
        month.to_string()
    }
}

/// A persisted payroll for one employee and one month.
///
/// Records are created by the batch orchestrator and are read-only
/// afterwards; regeneration deletes and recreates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The organization that ran the payroll.
    pub organization_id: String,
    /// The employee paid.
    pub employee_id: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// Basic salary plus allowances.
    pub gross_salary: Decimal,
    /// Non-tax deductions, including meal consumption.
    pub total_deductions: Decimal,
    /// PAYE tax withheld.
    pub income_tax: Decimal,
    /// Take-home pay. May be negative; see the breakdown warnings.
    pub net_salary: Decimal,
    /// Storage path of the payslip PDF.
    pub payroll_pdf: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_months() {
        let january: PayrollMonth = "01~2026".parse().unwrap();
        assert_eq!((january.month(), january.year()), (1, 2026));

        let december: PayrollMonth = "12~1999".parse().unwrap();
        assert_eq!((december.month(), december.year()), (12, 1999));
    }

    #[test]
    fn test_reject_malformed_months() {
        for value in ["13~2026", "00~2026", "1~2026", "01-2026", "01~26", "aa~2026", "", "~"] {
            match value.parse::<PayrollMonth>() {
                Err(PayrollError::InvalidMonth { value: rejected }) => assert_eq!(rejected, value),
                other => panic!("Expected InvalidMonth for {:?}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_months_order_chronologically() {
        let dec_2025: PayrollMonth = "12~2025".parse().unwrap();
        let jan_2026: PayrollMonth = "01~2026".parse().unwrap();
        let feb_2026: PayrollMonth = "02~2026".parse().unwrap();
        assert!(dec_2025 < jan_2026);
        assert!(jan_2026 < feb_2026);
    }

    #[test]
    fn test_month_serializes_as_string() {
        let month = PayrollMonth::new(7, 2026).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"07~2026\"");

        let parsed: PayrollMonth = serde_json::from_str("\"07~2026\"").unwrap();
        assert_eq!(parsed, month);
    }

    #[test]
    fn test_invalid_month_fails_to_deserialize() {
        assert!(serde_json::from_str::<PayrollMonth>("\"2026-07\"").is_err());
    }
}
