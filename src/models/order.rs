//! Meal order and date range models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// A meal order placed by an employee at the cafeteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier for the order.
    pub id: String,
    /// The organization the cafeteria belongs to.
    pub organization_id: String,
    /// The employee who placed the order.
    pub employee_id: String,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// The price charged for the order.
    pub price: Decimal,
}

/// An inclusive window of time, used as the meal-cost period of a payroll.
///
/// On the wire a range is the two-element array `[startISO, endISO]`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
///
/// let range: DateRange =
///     serde_json::from_str(r#"["2026-01-01T00:00:00Z", "2026-01-31T23:59:59Z"]"#).unwrap();
/// assert!(range.contains("2026-01-31T23:59:59Z".parse().unwrap()));
/// assert!(!range.contains("2026-02-01T00:00:00Z".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(DateTime<Utc>, DateTime<Utc>)", into = "(DateTime<Utc>, DateTime<Utc>)")]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range, rejecting one that ends before it starts.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> PayrollResult<Self> {
        if end < start {
            return Err(PayrollError::InvalidDateRange {
                message: format!("range end {} is before start {}", end, start),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns the first instant of the range.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the last instant of the range.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Checks whether an instant falls within the range, inclusive of both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

impl TryFrom<(DateTime<Utc>, DateTime<Utc>)> for DateRange {
    type Error = PayrollError;

    fn try_from((start, end): (DateTime<Utc>, DateTime<Utc>)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<DateRange> for (DateTime<Utc>, DateTime<Utc>) {
    fn from(range: DateRange) -> Self {
        (range.start, range.end)
    }
}
