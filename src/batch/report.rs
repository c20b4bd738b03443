//! Per-employee batch outcomes.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;
use crate::models::{PayrollMonth, PayrollRecord};

/// What a batch does when one employee fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure and skip the remaining employees.
    #[default]
    Abort,
    /// Record the failure and carry on with the next employee.
    Isolate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Isolate => "isolate",
        })
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "isolate" => Ok(Self::Isolate),
            other => Err(format!(
                "unknown failure policy '{}': expected abort or isolate",
                other
            )),
        }
    }
}

/// The result of processing one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A payslip was stored and a record persisted.
    Generated,
    /// Processing failed; nothing was persisted.
    Failed,
    /// Not attempted because the batch aborted earlier.
    Skipped,
}

/// One line of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeOutcome {
    /// The employee processed.
    pub employee_id: String,
    /// What happened.
    pub status: OutcomeStatus,
    /// Net salary of the persisted record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub net_salary: Option<Decimal>,
    /// Payslip path of the persisted record.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payroll_pdf: Option<String>,
    /// Why processing failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl EmployeeOutcome {
    pub(crate) fn generated(record: &PayrollRecord) -> Self {
        Self {
            employee_id: record.employee_id.clone(),
            status: OutcomeStatus::Generated,
            net_salary: Some(record.net_salary),
            payroll_pdf: Some(record.payroll_pdf.clone()),
            error: None,
        }
    }

    pub(crate) fn failed(employee_id: &str, error: &PayrollError) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            status: OutcomeStatus::Failed,
            net_salary: None,
            payroll_pdf: None,
            error: Some(error.to_string()),
        }
    }

    pub(crate) fn skipped(employee_id: &str) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            status: OutcomeStatus::Skipped,
            net_salary: None,
            payroll_pdf: None,
            error: None,
        }
    }
}

/// The summary of a payroll batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// The organization processed.
    pub organization_id: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// The failure policy the batch ran under.
    pub policy: FailurePolicy,
    /// True if the batch stopped at a failure.
    pub aborted: bool,
    /// Number of records persisted.
    pub generated: usize,
    /// Number of employees that failed.
    pub failed: usize,
    /// Number of employees not attempted.
    pub skipped: usize,
    /// One entry per employee, in processing order.
    pub outcomes: Vec<EmployeeOutcome>,
    /// Wall-clock duration of the batch.
    pub duration_ms: u64,
}

impl BatchReport {
    pub(crate) fn new(
        organization_id: &str,
        month: PayrollMonth,
        policy: FailurePolicy,
        outcomes: Vec<EmployeeOutcome>,
        duration_ms: u64,
    ) -> Self {
        let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();
        let generated = count(OutcomeStatus::Generated);
        let failed = count(OutcomeStatus::Failed);
        let skipped = count(OutcomeStatus::Skipped);

        Self {
            organization_id: organization_id.to_string(),
            month,
            policy,
            aborted: policy == FailurePolicy::Abort && failed > 0,
            generated,
            failed,
            skipped,
            outcomes,
            duration_ms,
        }
    }

    /// Returns the first failed outcome, if any.
    pub fn first_failure(&self) -> Option<&EmployeeOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.status == OutcomeStatus::Failed)
    }

    /// Returns the outcome for an employee.
    pub fn outcome(&self, employee_id: &str) -> Option<&EmployeeOutcome> {
        self.outcomes.iter().find(|o| o.employee_id == employee_id)
    }
}
