//! PAYE tax slab models.
//!
//! A [`TaxTable`] is an ordered, validated set of [`PayeTaxSlab`]s defining
//! an organization's progressive income tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// One bracket of a progressive tax table.
///
/// The rate applies to the part of taxable income between `lower_bound`
/// (inclusive) and `upper_bound` (exclusive). A missing upper bound means
/// the slab is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeTaxSlab {
    /// Start of the bracket.
    pub lower_bound: Decimal,
    /// End of the bracket, or `None` for the top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Tax rate in percent.
    pub rate: Decimal,
}

impl PayeTaxSlab {
    /// Returns the portion of `income` that falls inside this slab.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PayeTaxSlab;
    /// use rust_decimal::Decimal;
    ///
    /// let slab = PayeTaxSlab {
    ///     lower_bound: Decimal::new(100000, 0),
    ///     upper_bound: Some(Decimal::new(141667, 0)),
    ///     rate: Decimal::new(6, 0),
    /// };
    /// assert_eq!(slab.portion_of(Decimal::new(120000, 0)), Decimal::new(20000, 0));
    /// assert_eq!(slab.portion_of(Decimal::new(90000, 0)), Decimal::ZERO);
    /// ```
    pub fn portion_of(&self, income: Decimal) -> Decimal {
        let ceiling = match self.upper_bound {
            Some(upper) if upper < income => upper,
            _ => income,
        };
        (ceiling - self.lower_bound).max(Decimal::ZERO)
    }
}

/// A validated, ascending set of PAYE tax slabs.
///
/// Slabs must not overlap, only the last slab may be open-ended, and every
/// rate lies between 0 and 100 percent. An empty table is valid and means
/// no income tax is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TaxTable {
    slabs: Vec<PayeTaxSlab>,
}

impl TaxTable {
    /// Builds a tax table from unordered slabs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTaxTable` if any slab is inverted, overlaps its
    /// neighbour, has an out-of-range rate, or if an open-ended slab is not
    /// the last one.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{PayeTaxSlab, TaxTable};
    /// use rust_decimal::Decimal;
    ///
    /// let table = TaxTable::new(vec![
    ///     PayeTaxSlab {
    ///         lower_bound: Decimal::new(100000, 0),
    ///         upper_bound: None,
    ///         rate: Decimal::new(10, 0),
    ///     },
    ///     PayeTaxSlab {
    ///         lower_bound: Decimal::ZERO,
    ///         upper_bound: Some(Decimal::new(100000, 0)),
    ///         rate: Decimal::ZERO,
    ///     },
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.slabs()[0].lower_bound, Decimal::ZERO);
    /// ```
    pub fn new(mut slabs: Vec<PayeTaxSlab>) -> PayrollResult<Self> {
        let hundred = Decimal::ONE_HUNDRED;

        for slab in &slabs {
            if slab.rate < Decimal::ZERO || slab.rate > hundred {
                return Err(PayrollError::InvalidTaxTable {
                    message: format!(
                        "rate {} for slab starting at {} is outside 0-100",
                        slab.rate, slab.lower_bound
                    ),
                });
            }
            if slab.lower_bound < Decimal::ZERO {
                return Err(PayrollError::InvalidTaxTable {
                    message: format!("lower bound {} is negative", slab.lower_bound),
                });
            }
            if let Some(upper) = slab.upper_bound {
                if upper <= slab.lower_bound {
                    return Err(PayrollError::InvalidTaxTable {
                        message: format!(
                            "upper bound {} is not above lower bound {}",
                            upper, slab.lower_bound
                        ),
                    });
                }
            }
        }

        slabs.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));

        for pair in slabs.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            match current.upper_bound {
                None => {
                    return Err(PayrollError::InvalidTaxTable {
                        message: format!(
                            "open-ended slab starting at {} is followed by another slab",
                            current.lower_bound
                        ),
                    });
                }
                Some(upper) if upper > next.lower_bound => {
                    return Err(PayrollError::InvalidTaxTable {
                        message: format!(
                            "slab ending at {} overlaps slab starting at {}",
                            upper, next.lower_bound
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self { slabs })
    }

    /// Returns a table with no slabs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the slabs in ascending order.
    pub fn slabs(&self) -> &[PayeTaxSlab] {
        &self.slabs
    }

    /// Returns true if the table has no slabs.
    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_slabs_are_sorted() {
        let table = TaxTable::new(vec![
            slab("200000", None, "12"),
            slab("0", Some("100000"), "0"),
            slab("100000", Some("200000"), "6"),
        ])
        .unwrap();

        let lowers: Vec<Decimal> = table.slabs().iter().map(|s| s.lower_bound).collect();
        assert_eq!(lowers, vec![dec("0"), dec("100000"), dec("200000")]);
    }

    #[test]
    fn test_gaps_between_slabs_are_allowed() {
        let table = TaxTable::new(vec![
            slab("0", Some("50000"), "0"),
            slab("80000", None, "10"),
        ]);
        assert!(table.is_ok());
    }

    #[test]
    fn test_overlapping_slabs_are_rejected() {
        let result = TaxTable::new(vec![
            slab("0", Some("120000"), "0"),
            slab("100000", None, "10"),
        ]);
        assert!(matches!(result, Err(PayrollError::InvalidTaxTable { .. })));
    }

    #[test]
    fn test_open_ended_slab_must_be_last() {
        let result = TaxTable::new(vec![slab("0", None, "0"), slab("100000", None, "10")]);
        assert!(matches!(result, Err(PayrollError::InvalidTaxTable { .. })));
    }

    #[test]
    fn test_rate_above_hundred_is_rejected() {
        let result = TaxTable::new(vec![slab("0", None, "101")]);
        assert!(matches!(result, Err(PayrollError::InvalidTaxTable { .. })));
    }

    #[test]
    fn test_inverted_slab_is_rejected() {
        let result = TaxTable::new(vec![slab("5000", Some("1000"), "5")]);
        assert!(matches!(result, Err(PayrollError::InvalidTaxTable { .. })));
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = TaxTable::new(vec![]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table, TaxTable::empty());
    }

    #[test]
    fn test_portion_of_open_ended_slab() {
        let top = slab("100000", None, "10");
        assert_eq!(top.portion_of(dec("150000")), dec("50000"));
        assert_eq!(top.portion_of(dec("100000")), dec("0"));
    }

    #[test]
    fn test_deserialize_slab_without_upper_bound() {
        let yaml = "lower_bound: \"100000\"\nrate: \"10\"\n";
        let parsed: PayeTaxSlab = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.upper_bound, None);
        assert_eq!(parsed.rate, dec("10"));
    }
}
