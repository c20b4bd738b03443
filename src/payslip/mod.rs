//! Payslip generation.
//!
//! A payslip is rendered to PDF from an employee's [`SalaryBreakdown`] and
//! uploaded to object storage under a path derived from the employee id and
//! payroll month. The same path is stored on the payroll record and used to
//! sign download links.

mod render;

pub use render::{format_money, render_payslip};

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::PayrollResult;
use crate::models::{Employee, EmployerContribution, Organization, PayrollMonth, SalaryBreakdown};
use crate::storage::{ObjectStore, PDF_CONTENT_TYPE};

/// Everything printed on one payslip.
#[derive(Debug, Clone)]
pub struct PayslipDocument {
    /// The paying organization.
    pub organization: Organization,
    /// The employee paid.
    pub employee: Employee,
    /// The payroll month.
    pub month: PayrollMonth,
    /// The calculated salary.
    pub breakdown: SalaryBreakdown,
    /// Employer-side contributions, printed for information only.
    pub employer_contributions: Vec<EmployerContribution>,
    /// When the payslip was produced.
    pub generated_at: DateTime<Utc>,
}

/// Returns the storage path of an employee's payslip for a month.
///
/// # Examples
///
/// ```
/// use payroll_engine::payslip::payslip_path;
///
/// let month = "01~2026".parse().unwrap();
/// assert_eq!(payslip_path("emp_001", month), "emp_001/emp_001-01~2026.pdf");
/// ```
pub fn payslip_path(employee_id: &str, month: PayrollMonth) -> String {
    format!("{0}/{0}-{1}.pdf", employee_id, month)
}

/// Renders payslips and uploads them to an injected store.
#[derive(Clone)]
pub struct PayslipGenerator {
    store: Arc<dyn ObjectStore>,
}

impl PayslipGenerator {
    /// Creates a generator writing to `store`.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Returns the store payslips are written to.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Renders and uploads a payslip, returning its storage path.
    ///
    /// Nothing is uploaded if rendering fails.
    pub async fn generate(&self, document: &PayslipDocument) -> PayrollResult<String> {
        let bytes = render_payslip(document)?;
        let path = payslip_path(&document.employee.id, document.month);
        let size = bytes.len();

        self.store.upload(&path, bytes, PDF_CONTENT_TYPE).await?;

        tracing::debug!(
            employee_id = %document.employee.id,
            month = %document.month,
            path = %path,
            bytes = size,
            backend = self.store.backend_tag(),
            "Uploaded payslip"
        );
        Ok(path)
    }

    /// Deletes a previously generated payslip. Returns false if it was already gone.
    pub async fn discard(&self, path: &str) -> PayrollResult<bool> {
        self.store.delete(path).await
    }
}
