//! Salary calculation.
//!
//! This module turns an employee's basic salary, adjustment buckets and the
//! organization's tax table into a [`SalaryBreakdown`].
//!
//! Percentage allowances and deductions are both taken against basic salary,
//! never against gross, so deductions do not compound on allowances.
//! Arithmetic is exact; rounding for display happens when the payslip is
//! rendered.

use rust_decimal::Decimal;

use crate::models::{
    AdjustmentBasis, AuditStep, AuditTrace, AuditWarning, ResolvedAdjustment, SalaryBreakdown,
    TaxTable,
};

use super::adjustment_buckets::{AdjustmentBuckets, AdjustmentLine};
use super::paye_tax::calculate_paye_tax;

/// Warning code raised when deductions and tax exceed gross salary.
pub const NEGATIVE_NET_SALARY: &str = "NEGATIVE_NET_SALARY";

fn resolve_percentage(line: &AdjustmentLine, basic_salary: Decimal) -> ResolvedAdjustment {
    ResolvedAdjustment {
        label: line.label.clone(),
        basis: AdjustmentBasis::Percentage,
        rate: Some(line.amount),
        amount: basic_salary * line.amount / Decimal::ONE_HUNDRED,
        source: line.source,
    }
}

fn resolve_value(line: &AdjustmentLine) -> ResolvedAdjustment {
    ResolvedAdjustment {
        label: line.label.clone(),
        basis: AdjustmentBasis::FixedValue,
        rate: None,
        amount: line.amount,
        source: line.source,
    }
}

fn resolve_bucket_pair(
    percentage: &[AdjustmentLine],
    value: &[AdjustmentLine],
    basic_salary: Decimal,
) -> Vec<ResolvedAdjustment> {
    percentage
        .iter()
        .map(|line| resolve_percentage(line, basic_salary))
        .chain(value.iter().map(resolve_value))
        .collect()
}

/// Calculates an employee's salary breakdown.
///
/// # Arguments
///
/// * `basic_salary` - The employee's monthly basic salary
/// * `buckets` - The employee's adjustments, including meal consumption
/// * `tax_table` - The organization's PAYE slabs
///
/// # Returns
///
/// A [`SalaryBreakdown`] where
/// `net_salary == gross_salary - total_deductions - income_tax`.
/// A negative net salary is passed through unchanged and flagged with a
/// `NEGATIVE_NET_SALARY` warning.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{calculate_salary, AdjustmentBuckets, AdjustmentLine};
/// use payroll_engine::models::{AdjustmentSource, TaxTable};
/// use rust_decimal::Decimal;
///
/// let mut buckets = AdjustmentBuckets::default();
/// buckets.allowance_percentage.push(AdjustmentLine {
///     label: "COLA".to_string(),
///     amount: Decimal::new(10, 0),
///     source: AdjustmentSource::General,
///     tax_exempt: false,
/// });
/// buckets.push_meal_cost(Decimal::new(2000, 0));
///
/// let breakdown = calculate_salary(Decimal::new(50000, 0), &buckets, &TaxTable::empty());
/// assert_eq!(breakdown.gross_salary, Decimal::new(55000, 0));
/// assert_eq!(breakdown.total_deductions, Decimal::new(2000, 0));
/// assert_eq!(breakdown.income_tax, Decimal::ZERO);
/// assert_eq!(breakdown.net_salary, Decimal::new(53000, 0));
/// ```
pub fn calculate_salary(
    basic_salary: Decimal,
    buckets: &AdjustmentBuckets,
    tax_table: &TaxTable,
) -> SalaryBreakdown {
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();

    // Allowances
    let allowances = resolve_bucket_pair(
        &buckets.allowance_percentage,
        &buckets.allowance_value,
        basic_salary,
    );
    let total_allowances: Decimal = allowances.iter().map(|a| a.amount).sum();
    let allowance_rate_total: Decimal = buckets.allowance_percentage.iter().map(|l| l.amount).sum();
    let gross_salary = basic_salary + total_allowances;

    steps.push(AuditStep {
        step_number: 1,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "percentage_allowance_rate": allowance_rate_total.normalize().to_string(),
            "fixed_allowance_count": buckets.allowance_value.len()
        }),
        output: serde_json::json!({
            "total_allowances": total_allowances.normalize().to_string(),
            "gross_salary": gross_salary.normalize().to_string()
        }),
        reasoning: format!(
            "{} basic + {} allowances = {} gross",
            basic_salary.normalize(),
            total_allowances.normalize(),
            gross_salary.normalize()
        ),
    });

    // Non-tax deductions
    let deductions = resolve_bucket_pair(
        &buckets.deduction_percentage,
        &buckets.deduction_value,
        basic_salary,
    );
    let total_deductions: Decimal = deductions.iter().map(|d| d.amount).sum();
    let deduction_rate_total: Decimal = buckets.deduction_percentage.iter().map(|l| l.amount).sum();

    steps.push(AuditStep {
        step_number: 2,
        rule_id: "deductions".to_string(),
        rule_name: "Salary Deductions".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.normalize().to_string(),
            "percentage_deduction_rate": deduction_rate_total.normalize().to_string(),
            "fixed_deduction_count": buckets.deduction_value.len()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.normalize().to_string()
        }),
        reasoning: format!(
            "{}% of basic {} plus fixed deductions = {}",
            deduction_rate_total.normalize(),
            basic_salary.normalize(),
            total_deductions.normalize()
        ),
    });

    // PAYE
    let tax_exempt: Decimal = buckets
        .allowance_percentage
        .iter()
        .filter(|line| line.tax_exempt)
        .map(|line| resolve_percentage(line, basic_salary).amount)
        .chain(
            buckets
                .allowance_value
                .iter()
                .filter(|line| line.tax_exempt)
                .map(|line| line.amount),
        )
        .sum();
    let taxable_income = gross_salary - tax_exempt;
    let paye = calculate_paye_tax(taxable_income, tax_table, 3);
    steps.push(paye.audit_step);

    let net_salary = gross_salary - total_deductions - paye.income_tax;

    steps.push(AuditStep {
        step_number: 4,
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string(),
            "income_tax": paye.income_tax.normalize().to_string()
        }),
        output: serde_json::json!({
            "net_salary": net_salary.normalize().to_string()
        }),
        reasoning: format!(
            "{} gross - {} deductions - {} tax = {} net",
            gross_salary.normalize(),
            total_deductions.normalize(),
            paye.income_tax.normalize(),
            net_salary.normalize()
        ),
    });

    if net_salary < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: NEGATIVE_NET_SALARY.to_string(),
            message: format!(
                "Deductions and tax exceed gross salary by {}",
                (-net_salary).normalize()
            ),
            severity: "high".to_string(),
        });
    }

    SalaryBreakdown {
        basic_salary,
        allowances,
        deductions,
        total_allowances,
        gross_salary,
        taxable_income,
        income_tax: paye.income_tax,
        tax_bands: paye.bands,
        total_deductions,
        net_salary,
        audit_trace: AuditTrace { steps, warnings },
    }
}
