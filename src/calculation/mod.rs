//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions that turn an employee's inputs
//! into pay: adjustment aggregation into buckets, meal-cost resolution,
//! progressive PAYE tax, and the salary calculation that combines them.

mod adjustment_buckets;
mod meal_cost;
mod paye_tax;
mod salary;

pub use adjustment_buckets::{
    AdjustmentBuckets, AdjustmentLine, EmployerContributionRate, MEAL_CONSUMPTION_LABEL,
    aggregate_adjustments, employer_contributions,
};
pub use meal_cost::{resolve_meal_cost, sum_meal_cost};
pub use paye_tax::{PayeTaxResult, calculate_paye_tax};
pub use salary::{NEGATIVE_NET_SALARY, calculate_salary};
