//! Salary calculation result models.
//!
//! This module contains the [`SalaryBreakdown`] type and its associated
//! structures that capture all outputs of a salary calculation: resolved
//! allowances and deductions, PAYE bands, totals, and an audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AdjustmentBasis;

/// Where an adjustment line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentSource {
    /// An employee-specific adjustment.
    Individual,
    /// An organization-wide adjustment.
    General,
    /// Meal orders consumed during the payroll window.
    MealConsumption,
}

/// An allowance or deduction after its amount has been resolved against
/// basic salary.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AdjustmentBasis, AdjustmentSource, ResolvedAdjustment};
/// use rust_decimal::Decimal;
///
/// let epf = ResolvedAdjustment {
///     label: "EPF".to_string(),
///     basis: AdjustmentBasis::Percentage,
///     rate: Some(Decimal::new(8, 0)),
///     amount: Decimal::new(4000, 0),
///     source: AdjustmentSource::General,
/// };
/// assert_eq!(epf.amount, Decimal::new(4000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAdjustment {
    /// The adjustment label.
    pub label: String,
    /// Percentage or fixed value.
    pub basis: AdjustmentBasis,
    /// The percentage rate, for percentage adjustments.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rate: Option<Decimal>,
    /// The monetary amount.
    pub amount: Decimal,
    /// Where the line came from.
    pub source: AdjustmentSource,
}

/// The tax charged within one PAYE slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBandCharge {
    /// Start of the slab.
    pub lower_bound: Decimal,
    /// End of the slab, `None` if open-ended.
    pub upper_bound: Option<Decimal>,
    /// Slab rate in percent.
    pub rate: Decimal,
    /// Income falling inside the slab.
    pub taxable_amount: Decimal,
    /// Tax charged on that income.
    pub tax: Decimal,
}

/// An employer-side contribution printed on the payslip for information.
///
/// Employer contributions are never subtracted from the employee's pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContribution {
    /// The contribution label ("ETF" or "EmployerFund").
    pub label: String,
    /// The percentage rate, for percentage contributions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rate: Option<Decimal>,
    /// The contribution amount.
    pub amount: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate results that are valid but need HR attention, such
/// as a negative net salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete result of a salary calculation for one employee.
///
/// The totals always satisfy
/// `net_salary == gross_salary - total_deductions - income_tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Resolved allowances, individual entries first.
    pub allowances: Vec<ResolvedAdjustment>,
    /// Resolved non-tax deductions, individual entries first.
    pub deductions: Vec<ResolvedAdjustment>,
    /// Sum of all allowances.
    pub total_allowances: Decimal,
    /// Basic salary plus allowances.
    pub gross_salary: Decimal,
    /// Gross salary less tax-exempt allowances.
    pub taxable_income: Decimal,
    /// PAYE tax withheld.
    pub income_tax: Decimal,
    /// Tax charged per slab.
    pub tax_bands: Vec<TaxBandCharge>,
    /// Sum of all non-tax deductions.
    pub total_deductions: Decimal,
    /// Take-home pay.
    pub net_salary: Decimal,
    /// Audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl SalaryBreakdown {
    /// Returns true if any warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.audit_trace.warnings.iter().any(|w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_breakdown() -> SalaryBreakdown {
        SalaryBreakdown {
            basic_salary: dec("50000"),
            allowances: vec![ResolvedAdjustment {
                label: "Transport".to_string(),
                basis: AdjustmentBasis::Percentage,
                rate: Some(dec("10")),
                amount: dec("5000"),
                source: AdjustmentSource::General,
            }],
            deductions: vec![ResolvedAdjustment {
                label: "Meal Consumption".to_string(),
                basis: AdjustmentBasis::FixedValue,
                rate: None,
                amount: dec("2000"),
                source: AdjustmentSource::MealConsumption,
            }],
            total_allowances: dec("5000"),
            gross_salary: dec("55000"),
            taxable_income: dec("55000"),
            income_tax: dec("0"),
            tax_bands: vec![],
            total_deductions: dec("2000"),
            net_salary: dec("53000"),
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_breakdown_serialization_round_trip() {
        let breakdown = create_breakdown();
        let json = serde_json::to_string(&breakdown).unwrap();
        let parsed: SalaryBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(breakdown, parsed);
    }

    #[test]
    fn test_fixed_value_line_omits_rate() {
        let json = serde_json::to_value(create_breakdown()).unwrap();
        assert!(json["deductions"][0].get("rate").is_none());
        assert_eq!(json["deductions"][0]["source"], "meal_consumption");
        assert_eq!(json["allowances"][0]["rate"], "10");
    }

    #[test]
    fn test_has_warning() {
        let mut breakdown = create_breakdown();
        assert!(!breakdown.has_warning("NEGATIVE_NET_SALARY"));

        breakdown.audit_trace.warnings.push(AuditWarning {
            code: "NEGATIVE_NET_SALARY".to_string(),
            message: "Net salary is negative".to_string(),
            severity: "high".to_string(),
        });
        assert!(breakdown.has_warning("NEGATIVE_NET_SALARY"));
    }
}
