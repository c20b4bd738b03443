//! Progressive PAYE tax calculation.
//!
//! Each slab's rate applies only to the part of taxable income that falls
//! within that slab's bounds; the slab charges are summed.

use rust_decimal::Decimal;

use crate::models::{AuditStep, TaxBandCharge, TaxTable};

/// The result of applying a tax table, including the charged bands and audit step.
#[derive(Debug, Clone)]
pub struct PayeTaxResult {
    /// The total income tax.
    pub income_tax: Decimal,
    /// The slabs holding part of the income, in ascending order.
    pub bands: Vec<TaxBandCharge>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates PAYE income tax on `taxable_income`.
///
/// Slabs that contain none of the income are omitted from `bands`; a
/// zero-rate slab holding part of the income is listed with zero tax.
/// An empty table yields zero tax. Taxable income at or below zero is
/// never taxed.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_paye_tax;
/// use payroll_engine::models::{PayeTaxSlab, TaxTable};
/// use rust_decimal::Decimal;
///
/// let table = TaxTable::new(vec![
///     PayeTaxSlab {
///         lower_bound: Decimal::ZERO,
///         upper_bound: Some(Decimal::new(100000, 0)),
///         rate: Decimal::ZERO,
///     },
///     PayeTaxSlab {
///         lower_bound: Decimal::new(100000, 0),
///         upper_bound: None,
///         rate: Decimal::new(10, 0),
///     },
/// ])
/// .unwrap();
///
/// let result = calculate_paye_tax(Decimal::new(150000, 0), &table, 1);
/// assert_eq!(result.income_tax, Decimal::new(5000, 0));
/// ```
pub fn calculate_paye_tax(
    taxable_income: Decimal,
    table: &TaxTable,
    step_number: u32,
) -> PayeTaxResult {
    let bands: Vec<TaxBandCharge> = table
        .slabs()
        .iter()
        .filter_map(|slab| {
            let portion = slab.portion_of(taxable_income);
            if portion.is_zero() {
                return None;
            }
            Some(TaxBandCharge {
                lower_bound: slab.lower_bound,
                upper_bound: slab.upper_bound,
                rate: slab.rate,
                taxable_amount: portion,
                tax: portion * slab.rate / Decimal::ONE_HUNDRED,
            })
        })
        .collect();

    let income_tax: Decimal = bands.iter().map(|band| band.tax).sum();

    let reasoning = if table.is_empty() {
        "No PAYE tax slabs configured - no income tax withheld".to_string()
    } else {
        let parts: Vec<String> = bands
            .iter()
            .map(|band| {
                format!(
                    "{} × {}%",
                    band.taxable_amount.normalize(),
                    band.rate.normalize()
                )
            })
            .collect();
        if parts.is_empty() {
            format!(
                "Taxable income {} falls in no taxed slab",
                taxable_income.normalize()
            )
        } else {
            format!("{} = {}", parts.join(" + "), income_tax.normalize())
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "paye_tax".to_string(),
        rule_name: "PAYE Income Tax".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable_income.normalize().to_string(),
            "slab_count": table.slabs().len()
        }),
        output: serde_json::json!({
            "income_tax": income_tax.normalize().to_string(),
            "bands_charged": bands.len()
        }),
        reasoning,
    };

    PayeTaxResult {
        income_tax,
        bands,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayeTaxSlab;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn slab(lower: &str, upper: Option<&str>, rate: &str) -> PayeTaxSlab {
        PayeTaxSlab {
            lower_bound: dec(lower),
            upper_bound: upper.map(dec),
            rate: dec(rate),
        }
    }

    fn two_slab_table() -> TaxTable {
        TaxTable::new(vec![
            slab("0", Some("100000"), "0"),
            slab("100000", None, "10"),
        ])
        .unwrap()
    }

    fn graduated_table() -> TaxTable {
        TaxTable::new(vec![
            slab("0", Some("100000"), "0"),
            slab("100000", Some("141667"), "6"),
            slab("141667", Some("183333"), "12"),
            slab("183333", Some("225000"), "18"),
            slab("225000", Some("266667"), "24"),
            slab("266667", Some("308333"), "30"),
            slab("308333", None, "36"),
        ])
        .unwrap()
    }

    /// PT-001: only the income above the threshold is taxed
    #[test]
    fn test_pt_001_progressive_not_flat() {
        let result = calculate_paye_tax(dec("150000"), &two_slab_table(), 1);

        assert_eq!(result.income_tax, dec("5000"));
        assert_ne!(result.income_tax, dec("15000"));
        assert_eq!(result.bands.len(), 2);
        assert_eq!(result.bands[0].taxable_amount, dec("100000"));
        assert_eq!(result.bands[0].tax, dec("0"));
        assert_eq!(result.bands[1].taxable_amount, dec("50000"));
    }

    /// PT-002: income inside the tax-free slab pays nothing
    #[test]
    fn test_pt_002_income_below_threshold() {
        let result = calculate_paye_tax(dec("80000"), &two_slab_table(), 1);
        assert_eq!(result.income_tax, dec("0"));
        assert_eq!(result.bands.len(), 1);
        assert_eq!(result.bands[0].taxable_amount, dec("80000"));
    }

    /// PT-003: empty table yields zero tax
    #[test]
    fn test_pt_003_empty_table() {
        let result = calculate_paye_tax(dec("500000"), &TaxTable::empty(), 7);
        assert_eq!(result.income_tax, dec("0"));
        assert_eq!(result.audit_step.step_number, 7);
        assert!(result.audit_step.reasoning.contains("No PAYE tax slabs"));
    }

    /// PT-004: income spanning several slabs
    #[test]
    fn test_pt_004_graduated_slabs() {
        // 41667 × 6% + 41666 × 12% + 16667 × 18%
        // = 2500.02 + 4999.92 + 3000.06 = 10500.00
        let result = calculate_paye_tax(dec("200000"), &graduated_table(), 1);

        assert_eq!(result.bands.len(), 4);
        assert_eq!(result.bands[1].tax, dec("2500.02"));
        assert_eq!(result.bands[2].tax, dec("4999.92"));
        assert_eq!(result.bands[3].tax, dec("3000.06"));
        assert_eq!(result.income_tax, dec("10500.00"));
    }

    /// PT-005: income exactly on a boundary
    #[test]
    fn test_pt_005_boundary_income() {
        let result = calculate_paye_tax(dec("100000"), &two_slab_table(), 1);
        assert_eq!(result.income_tax, dec("0"));
    }

    #[test]
    fn test_negative_taxable_income_is_not_taxed() {
        let result = calculate_paye_tax(dec("-100"), &two_slab_table(), 1);
        assert_eq!(result.income_tax, dec("0"));
        assert!(result.bands.is_empty());
        assert!(result.audit_step.reasoning.contains("no taxed slab"));
    }

    #[test]
    fn test_audit_step_records_inputs() {
        let result = calculate_paye_tax(dec("150000"), &two_slab_table(), 3);
        assert_eq!(result.audit_step.rule_id, "paye_tax");
        assert_eq!(result.audit_step.input["taxable_income"], "150000");
        assert_eq!(result.audit_step.output["income_tax"], "5000");
    }

    proptest! {
        #[test]
        fn prop_tax_never_exceeds_top_rate_share(income in 0i64..10_000_000i64) {
            let income = Decimal::from(income);
            let result = calculate_paye_tax(income, &graduated_table(), 1);
            prop_assert!(result.income_tax >= Decimal::ZERO);
            prop_assert!(result.income_tax <= income * dec("0.36"));
        }

        #[test]
        fn prop_tax_is_monotonic(income in 0i64..5_000_000i64, raise in 0i64..100_000i64) {
            let table = graduated_table();
            let lower = calculate_paye_tax(Decimal::from(income), &table, 1).income_tax;
            let higher = calculate_paye_tax(Decimal::from(income + raise), &table, 1).income_tax;
            prop_assert!(higher >= lower);
        }

        #[test]
        fn prop_band_portions_sum_to_income(income in 0i64..10_000_000i64) {
            let income = Decimal::from(income);
            let result = calculate_paye_tax(income, &graduated_table(), 1);
            let covered: Decimal = result.bands.iter().map(|b| b.taxable_amount).sum();
            prop_assert_eq!(covered, income);
        }
    }
}
