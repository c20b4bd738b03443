//! Adjustment aggregation functionality.
//!
//! This module partitions an employee's individual adjustments and the
//! organization's general adjustments into the four buckets consumed by the
//! salary calculator, and separates out employer-side contributions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    Adjustment, AdjustmentBasis, AdjustmentDirection, AdjustmentSource, EmployerContribution,
    IndividualSalaryAdjustment, SalaryAdjustment,
};

/// The label under which meal-order costs are deducted.
pub const MEAL_CONSUMPTION_LABEL: &str = "Meal Consumption";

/// A single adjustment ready for calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// The adjustment label.
    pub label: String,
    /// Percentage rate or monetary value, depending on the bucket.
    pub amount: Decimal,
    /// Where the line came from.
    pub source: AdjustmentSource,
    /// Whether the line is excluded from taxable income.
    pub tax_exempt: bool,
}

impl AdjustmentLine {
    fn from_adjustment(adjustment: &Adjustment, source: AdjustmentSource) -> Self {
        Self {
            label: adjustment.label.clone(),
            amount: adjustment.amount,
            source,
            tax_exempt: adjustment.tax_exempt,
        }
    }
}

/// An employee's adjustments partitioned by direction and basis.
///
/// Within every bucket the individual lines come before the general ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjustmentBuckets {
    /// Allowances expressed as a percentage of basic salary.
    pub allowance_percentage: Vec<AdjustmentLine>,
    /// Allowances expressed as a fixed value.
    pub allowance_value: Vec<AdjustmentLine>,
    /// Deductions expressed as a percentage of basic salary.
    pub deduction_percentage: Vec<AdjustmentLine>,
    /// Deductions expressed as a fixed value.
    pub deduction_value: Vec<AdjustmentLine>,
}

impl AdjustmentBuckets {
    fn bucket_mut(
        &mut self,
        direction: AdjustmentDirection,
        basis: AdjustmentBasis,
    ) -> &mut Vec<AdjustmentLine> {
        match (direction, basis) {
            (AdjustmentDirection::Allowance, AdjustmentBasis::Percentage) => {
                &mut self.allowance_percentage
            }
            (AdjustmentDirection::Allowance, AdjustmentBasis::FixedValue) => {
                &mut self.allowance_value
            }
            (AdjustmentDirection::Deduction, AdjustmentBasis::Percentage) => {
                &mut self.deduction_percentage
            }
            (AdjustmentDirection::Deduction, AdjustmentBasis::FixedValue) => {
                &mut self.deduction_value
            }
        }
    }

    fn push(&mut self, adjustment: &Adjustment, source: AdjustmentSource) {
        self.bucket_mut(adjustment.direction, adjustment.basis)
            .push(AdjustmentLine::from_adjustment(adjustment, source));
    }

    /// Appends the employee's meal consumption as a fixed-value deduction.
    ///
    /// The line is added even when the cost is zero so the payslip always
    /// shows it.
    pub fn push_meal_cost(&mut self, cost: Decimal) {
        self.deduction_value.push(AdjustmentLine {
            label: MEAL_CONSUMPTION_LABEL.to_string(),
            amount: cost,
            source: AdjustmentSource::MealConsumption,
            tax_exempt: false,
        });
    }

    /// Returns the total number of lines across all buckets.
    pub fn len(&self) -> usize {
        self.allowance_percentage.len()
            + self.allowance_value.len()
            + self.deduction_percentage.len()
            + self.deduction_value.len()
    }

    /// Returns true if every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions adjustments into buckets for one employee.
///
/// Individual adjustments are filtered to `employee_id`; general adjustments
/// apply to everyone. `ETF` and `EmployerFund` deductions are left out
/// because they are paid by the employer.
///
/// # Arguments
///
/// * `employee_id` - The employee being processed
/// * `general` - The organization's general adjustments
/// * `individual` - All individual adjustments of the organization
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_adjustments;
/// use payroll_engine::models::{
///     Adjustment, AdjustmentBasis, AdjustmentDirection, IndividualSalaryAdjustment,
///     SalaryAdjustment,
/// };
/// use rust_decimal::Decimal;
///
/// let general = vec![SalaryAdjustment {
///     id: "adj_transport".to_string(),
///     organization_id: "org_acme".to_string(),
///     adjustment: Adjustment {
///         label: "Transport".to_string(),
///         amount: Decimal::new(3000, 0),
///         direction: AdjustmentDirection::Allowance,
///         basis: AdjustmentBasis::FixedValue,
///         tax_exempt: false,
///     },
/// }];
/// let individual = vec![IndividualSalaryAdjustment {
///     id: "bonus-emp_001".to_string(),
///     organization_id: "org_acme".to_string(),
///     employee_id: "emp_001".to_string(),
///     adjustment: Adjustment {
///         label: "Bonus".to_string(),
///         amount: Decimal::new(5000, 0),
///         direction: AdjustmentDirection::Allowance,
///         basis: AdjustmentBasis::FixedValue,
///         tax_exempt: false,
///     },
/// }];
///
/// let buckets = aggregate_adjustments("emp_001", &general, &individual);
/// let labels: Vec<&str> = buckets.allowance_value.iter().map(|l| l.label.as_str()).collect();
/// assert_eq!(labels, vec!["Bonus", "Transport"]);
/// ```
pub fn aggregate_adjustments(
    employee_id: &str,
    general: &[SalaryAdjustment],
    individual: &[IndividualSalaryAdjustment],
) -> AdjustmentBuckets {
    let mut buckets = AdjustmentBuckets::default();

    let individual_rows = individual
        .iter()
        .filter(|row| row.employee_id == employee_id)
        .map(|row| (&row.adjustment, AdjustmentSource::Individual));
    let general_rows = general
        .iter()
        .map(|row| (&row.adjustment, AdjustmentSource::General));

    for (adjustment, source) in individual_rows.chain(general_rows) {
        if is_employer_deduction(adjustment) {
            continue;
        }
        buckets.push(adjustment, source);
    }

    buckets
}

fn is_employer_deduction(adjustment: &Adjustment) -> bool {
    adjustment.direction == AdjustmentDirection::Deduction && adjustment.is_employer_contribution()
}

/// An employer contribution rate taken from the general adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributionRate {
    /// The contribution label.
    pub label: String,
    /// Percentage of basic salary or a fixed value.
    pub basis: AdjustmentBasis,
    /// The rate or value.
    pub amount: Decimal,
}

impl EmployerContributionRate {
    /// Resolves the contribution against an employee's basic salary.
    pub fn resolve(&self, basic_salary: Decimal) -> EmployerContribution {
        match self.basis {
            AdjustmentBasis::Percentage => EmployerContribution {
                label: self.label.clone(),
                rate: Some(self.amount),
                amount: basic_salary * self.amount / Decimal::ONE_HUNDRED,
            },
            AdjustmentBasis::FixedValue => EmployerContribution {
                label: self.label.clone(),
                rate: None,
                amount: self.amount,
            },
        }
    }
}

/// Returns the general adjustments that represent employer contributions.
pub fn employer_contributions(general: &[SalaryAdjustment]) -> Vec<EmployerContributionRate> {
    general
        .iter()
        .map(|row| &row.adjustment)
        .filter(|a| is_employer_deduction(a))
        .map(|a| EmployerContributionRate {
            label: a.label.clone(),
            basis: a.basis,
            amount: a.amount,
        })
        .collect()
}
