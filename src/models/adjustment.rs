//! Salary adjustment models.
//!
//! An adjustment either increases pay (an allowance) or decreases it (a
//! deduction), and is either a percentage of basic salary or a fixed value.
//! General adjustments apply to every employee of an organization; individual
//! adjustments apply to a single employee.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// Label of the employer trust fund contribution.
pub const ETF_LABEL: &str = "ETF";

/// Label of the employer provident fund contribution.
pub const EMPLOYER_FUND_LABEL: &str = "EmployerFund";

/// Whether an adjustment adds to or subtracts from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    /// Increases gross pay.
    Allowance,
    /// Decreases net pay.
    Deduction,
}

/// How an adjustment's amount is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentBasis {
    /// The amount is a percentage of basic salary.
    Percentage,
    /// The amount is a flat monetary value.
    FixedValue,
}

/// The terms of a salary adjustment, independent of its scope.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Adjustment, AdjustmentBasis, AdjustmentDirection};
/// use rust_decimal::Decimal;
///
/// let epf = Adjustment {
///     label: "EPF".to_string(),
///     amount: Decimal::new(8, 0),
///     direction: AdjustmentDirection::Deduction,
///     basis: AdjustmentBasis::Percentage,
///     tax_exempt: false,
/// };
/// assert!(epf.validate().is_ok());
/// assert!(!epf.is_employer_contribution());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Human-readable label (e.g. "EPF", "Festival Bonus").
    pub label: String,
    /// Percentage rate or monetary value, depending on `basis`.
    pub amount: Decimal,
    /// Allowance or deduction.
    pub direction: AdjustmentDirection,
    /// Percentage or fixed value.
    pub basis: AdjustmentBasis,
    /// Allowances excluded from PAYE taxable income.
    #[serde(default)]
    pub tax_exempt: bool,
}

impl Adjustment {
    /// Checks that the adjustment amount is non-negative.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.amount < Decimal::ZERO {
            return Err(PayrollError::InvalidAdjustment {
                label: self.label.clone(),
                message: format!("amount must not be negative (got {})", self.amount),
            });
        }
        if self.label.trim().is_empty() {
            return Err(PayrollError::InvalidAdjustment {
                label: self.label.clone(),
                message: "label must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true for the employer-side ETF and EmployerFund contributions.
    pub fn is_employer_contribution(&self) -> bool {
        self.label == ETF_LABEL || self.label == EMPLOYER_FUND_LABEL
    }
}

/// An organization-wide adjustment applied to every employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryAdjustment {
    /// Unique identifier for the adjustment.
    pub id: String,
    /// The owning organization.
    pub organization_id: String,
    /// The adjustment terms.
    #[serde(flatten)]
    pub adjustment: Adjustment,
}

/// An adjustment applied to a single employee, such as a bonus or a fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualSalaryAdjustment {
    /// Unique identifier for the adjustment row.
    pub id: String,
    /// The owning organization.
    pub organization_id: String,
    /// The employee the adjustment applies to.
    pub employee_id: String,
    /// The adjustment terms.
    #[serde(flatten)]
    pub adjustment: Adjustment,
}

/// Input for creating the same individual adjustment for several employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualAdjustmentInput {
    /// Identifier prefix for the expanded rows.
    pub id: String,
    /// Employees receiving the adjustment.
    pub employee_ids: Vec<String>,
    /// The adjustment terms.
    #[serde(flatten)]
    pub adjustment: Adjustment,
}

impl IndividualAdjustmentInput {
    /// Expands the input into one row per employee.
    ///
    /// Row ids are `{id}-{employee_id}`. Duplicate employee ids produce a
    /// single row.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{
    ///     Adjustment, AdjustmentBasis, AdjustmentDirection, IndividualAdjustmentInput,
    /// };
    /// use rust_decimal::Decimal;
    ///
    /// let input = IndividualAdjustmentInput {
    ///     id: "bonus".to_string(),
    ///     employee_ids: vec!["emp_001".to_string(), "emp_002".to_string()],
    ///     adjustment: Adjustment {
    ///         label: "Festival Bonus".to_string(),
    ///         amount: Decimal::new(5000, 0),
    ///         direction: AdjustmentDirection::Allowance,
    ///         basis: AdjustmentBasis::FixedValue,
    ///         tax_exempt: false,
    ///     },
    /// };
    ///
    /// let rows = input.expand("org_acme").unwrap();
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows[1].id, "bonus-emp_002");
    /// ```
    pub fn expand(&self, organization_id: &str) -> PayrollResult<Vec<IndividualSalaryAdjustment>> {
        self.adjustment.validate()?;

        let mut rows: Vec<IndividualSalaryAdjustment> = Vec::with_capacity(self.employee_ids.len());
        for employee_id in &self.employee_ids {
            if rows.iter().any(|row| &row.employee_id == employee_id) {
                continue;
            }
            rows.push(IndividualSalaryAdjustment {
                id: format!("{}-{}", self.id, employee_id),
                organization_id: organization_id.to_string(),
                employee_id: employee_id.clone(),
                adjustment: self.adjustment.clone(),
            });
        }
        Ok(rows)
    }
}
