//! Employee and organization models.
//!
//! An [`Organization`] is the tenant boundary: every employee, adjustment,
//! tax slab and payroll record belongs to exactly one organization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tenant of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization.
    pub id: String,
    /// Display name printed on payslips.
    pub name: String,
}

/// Represents an employee whose salary is processed by the payroll engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The organization the employee belongs to.
    pub organization_id: String,
    /// The employee's full name.
    pub name: String,
    /// Optional job title shown on the payslip.
    #[serde(default)]
    pub designation: Option<String>,
    /// Monthly basic salary before adjustments.
    pub basic_salary: Decimal,
}

impl Employee {
    /// Returns true if `needle` appears in the employee's id or name, ignoring case.
    ///
    /// An empty needle matches every employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     organization_id: "org_acme".to_string(),
    ///     name: "Nimal Perera".to_string(),
    ///     designation: None,
    ///     basic_salary: Decimal::new(50000, 0),
    /// };
    /// assert!(employee.matches_search("perera"));
    /// assert!(employee.matches_search("EMP_0"));
    /// assert!(!employee.matches_search("silva"));
    /// ```
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.id.to_lowercase().contains(&needle)
            || self.name.to_lowercase().contains(&needle)
    }
}
