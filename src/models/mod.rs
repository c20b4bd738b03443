//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod employee;
mod order;
mod payroll;
mod salary_breakdown;
mod tax_slab;

pub use adjustment::{
    Adjustment, AdjustmentBasis, AdjustmentDirection, EMPLOYER_FUND_LABEL, ETF_LABEL,
    IndividualAdjustmentInput, IndividualSalaryAdjustment, SalaryAdjustment,
};
pub use employee::{Employee, Organization};
pub use order::{DateRange, Order};
pub use payroll::{PayrollMonth, PayrollRecord};
pub use salary_breakdown::{
    AdjustmentSource, AuditStep, AuditTrace, AuditWarning, EmployerContribution,
    ResolvedAdjustment, SalaryBreakdown, TaxBandCharge,
};
pub use tax_slab::{PayeTaxSlab, TaxTable};
