//! Payroll batch processing.
//!
//! A batch generates one payroll record per employee of an organization for
//! a month. Whether the first failing employee stops the batch or is merely
//! reported is chosen by the [`FailurePolicy`].

mod orchestrator;
mod report;

pub use orchestrator::{BatchRequest, PayrollBatch, PayrollPreview, delete_month};
pub use report::{BatchReport, EmployeeOutcome, FailurePolicy, OutcomeStatus};
