//! The payroll batch orchestrator.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::report::{BatchReport, EmployeeOutcome, FailurePolicy};
use crate::calculation::{
    EmployerContributionRate, NEGATIVE_NET_SALARY, aggregate_adjustments, calculate_salary,
    employer_contributions, resolve_meal_cost,
};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    DateRange, Employee, EmployerContribution, IndividualSalaryAdjustment, Organization,
    PayrollMonth, PayrollRecord, SalaryAdjustment, SalaryBreakdown, TaxTable,
};
use crate::payslip::{PayslipDocument, PayslipGenerator, payslip_path};
use crate::repository::PayrollRepository;
use crate::storage::ObjectStore;

/// Identifies the payroll to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// The organization to process.
    pub organization_id: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// The window whose meal orders are deducted.
    pub meal_window: DateRange,
}

/// A salary calculated for one employee without storing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPreview {
    /// The employee calculated.
    pub employee_id: String,
    /// The employee's name.
    pub employee_name: String,
    /// The payroll month.
    pub month: PayrollMonth,
    /// The full calculation.
    pub breakdown: SalaryBreakdown,
    /// Employer contributions that would be printed on the payslip.
    pub employer_contributions: Vec<EmployerContribution>,
}

/// Rows fetched once per batch and shared by every employee.
struct BatchInputs {
    organization: Organization,
    general: Vec<SalaryAdjustment>,
    individual: Vec<IndividualSalaryAdjustment>,
    tax_table: TaxTable,
    employer_rates: Vec<EmployerContributionRate>,
}

/// Generates and persists one payroll per employee of an organization.
///
/// Employees are processed one at a time in ascending id order. For each
/// one the orchestrator aggregates adjustments, resolves the meal cost,
/// calculates the salary, renders and uploads the payslip, then persists
/// the record. A record is only persisted once its payslip is stored.
#[derive(Clone)]
pub struct PayrollBatch {
    repository: Arc<dyn PayrollRepository>,
    generator: PayslipGenerator,
    policy: FailurePolicy,
}

impl PayrollBatch {
    /// Creates an orchestrator.
    pub fn new(
        repository: Arc<dyn PayrollRepository>,
        generator: PayslipGenerator,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            repository,
            generator,
            policy,
        }
    }

    /// Returns a copy of this orchestrator using a different failure policy.
    pub fn with_policy(&self, policy: FailurePolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Returns the failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    async fn load_inputs(&self, organization_id: &str) -> PayrollResult<BatchInputs> {
        let organization = self
            .repository
            .find_organization(organization_id)
            .await?
            .ok_or_else(|| PayrollError::OrganizationNotFound {
                organization_id: organization_id.to_string(),
            })?;

        let general = self.repository.salary_adjustments(organization_id).await?;
        let individual = self.repository.individual_adjustments(organization_id).await?;
        let tax_table = TaxTable::new(self.repository.tax_slabs(organization_id).await?)?;
        let employer_rates = employer_contributions(&general);

        Ok(BatchInputs {
            organization,
            general,
            individual,
            tax_table,
            employer_rates,
        })
    }

    async fn calculate(
        &self,
        inputs: &BatchInputs,
        employee: &Employee,
        meal_window: &DateRange,
    ) -> PayrollResult<SalaryBreakdown> {
        let mut buckets = aggregate_adjustments(&employee.id, &inputs.general, &inputs.individual);
        let meal_cost = resolve_meal_cost(
            self.repository.as_ref(),
            &inputs.organization.id,
            &employee.id,
            meal_window,
        )
        .await?;
        buckets.push_meal_cost(meal_cost);

        Ok(calculate_salary(
            employee.basic_salary,
            &buckets,
            &inputs.tax_table,
        ))
    }

    fn contributions_for(inputs: &BatchInputs, employee: &Employee) -> Vec<EmployerContribution> {
        inputs
            .employer_rates
            .iter()
            .map(|rate| rate.resolve(employee.basic_salary))
            .collect()
    }

    async fn process_employee(
        &self,
        inputs: &BatchInputs,
        employee: &Employee,
        request: &BatchRequest,
    ) -> PayrollResult<PayrollRecord> {
        // An existing payslip must not be overwritten before the insert rejects it.
        if self
            .repository
            .find_payroll(&employee.id, request.month)
            .await?
            .is_some()
        {
            return Err(PayrollError::PayrollExists {
                employee_id: employee.id.clone(),
                month: request.month.to_string(),
            });
        }

        let breakdown = self.calculate(inputs, employee, &request.meal_window).await?;
        if breakdown.has_warning(NEGATIVE_NET_SALARY) {
            warn!(
                organization_id = %request.organization_id,
                employee_id = %employee.id,
                month = %request.month,
                net_salary = %breakdown.net_salary,
                "Net salary is negative"
            );
        }

        let document = PayslipDocument {
            organization: inputs.organization.clone(),
            employee: employee.clone(),
            month: request.month,
            employer_contributions: Self::contributions_for(inputs, employee),
            breakdown,
            generated_at: Utc::now(),
        };
        let payroll_pdf = self.generator.generate(&document).await?;

        let breakdown = document.breakdown;
        let record = PayrollRecord {
            id: Uuid::new_v4(),
            organization_id: request.organization_id.clone(),
            employee_id: employee.id.clone(),
            month: request.month,
            gross_salary: breakdown.gross_salary,
            total_deductions: breakdown.total_deductions,
            income_tax: breakdown.income_tax,
            net_salary: breakdown.net_salary,
            payroll_pdf,
            created_at: document.generated_at,
        };

        if let Err(insert_error) = self.repository.insert_payroll(record.clone()).await {
            if let Err(cleanup_error) = self.generator.discard(&record.payroll_pdf).await {
                warn!(
                    employee_id = %employee.id,
                    path = %record.payroll_pdf,
                    error = %cleanup_error,
                    "Failed to remove payslip of unpersisted payroll"
                );
            }
            return Err(insert_error);
        }

        Ok(record)
    }

    /// Runs the payroll for every employee of an organization.
    ///
    /// Fails before touching any employee if the organization is unknown
    /// or its tax table is invalid. Failures of individual employees are
    /// reported in the [`BatchReport`]; under [`FailurePolicy::Abort`] the
    /// employees after the first failure are reported as skipped.
    pub async fn run(&self, request: &BatchRequest) -> PayrollResult<BatchReport> {
        let started = Instant::now();
        let inputs = self.load_inputs(&request.organization_id).await?;

        let mut employees = self.repository.employees(&request.organization_id).await?;
        employees.sort_by(|a, b| a.id.cmp(&b.id));

        info!(
            organization_id = %request.organization_id,
            month = %request.month,
            employee_count = employees.len(),
            policy = %self.policy,
            "Starting payroll batch"
        );

        let mut outcomes: Vec<EmployeeOutcome> = Vec::with_capacity(employees.len());
        let mut halted = false;

        for employee in &employees {
            if halted {
                outcomes.push(EmployeeOutcome::skipped(&employee.id));
                continue;
            }

            match self.process_employee(&inputs, employee, request).await {
                Ok(record) => {
                    info!(
                        organization_id = %request.organization_id,
                        employee_id = %employee.id,
                        month = %request.month,
                        net_salary = %record.net_salary,
                        "Payroll generated"
                    );
                    outcomes.push(EmployeeOutcome::generated(&record));
                }
                Err(err) => {
                    error!(
                        organization_id = %request.organization_id,
                        employee_id = %employee.id,
                        month = %request.month,
                        error = %err,
                        "Payroll generation failed"
                    );
                    outcomes.push(EmployeeOutcome::failed(&employee.id, &err));
                    halted = self.policy == FailurePolicy::Abort;
                }
            }
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = BatchReport::new(
            &request.organization_id,
            request.month,
            self.policy,
            outcomes,
            duration_ms,
        );

        info!(
            organization_id = %report.organization_id,
            month = %report.month,
            generated = report.generated,
            failed = report.failed,
            skipped = report.skipped,
            aborted = report.aborted,
            duration_ms = report.duration_ms,
            "Payroll batch finished"
        );

        Ok(report)
    }

    /// Calculates one employee's salary without rendering or persisting anything.
    pub async fn preview(
        &self,
        organization_id: &str,
        employee_id: &str,
        month: PayrollMonth,
        meal_window: &DateRange,
    ) -> PayrollResult<PayrollPreview> {
        let inputs = self.load_inputs(organization_id).await?;
        let employee = self
            .repository
            .find_employee(organization_id, employee_id)
            .await?
            .ok_or_else(|| PayrollError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;

        let breakdown = self.calculate(&inputs, &employee, meal_window).await?;

        Ok(PayrollPreview {
            employee_id: employee.id.clone(),
            employee_name: employee.name.clone(),
            month,
            employer_contributions: Self::contributions_for(&inputs, &employee),
            breakdown,
        })
    }
}

/// Deletes every payroll of an organization for a month, payslips included.
///
/// Missing payslips are ignored and store failures are logged without
/// blocking the record deletion. Returns the number of records deleted.
pub async fn delete_month(
    repository: &dyn PayrollRepository,
    store: &dyn ObjectStore,
    organization_id: &str,
    month: PayrollMonth,
) -> PayrollResult<usize> {
    let removed = repository
        .delete_payrolls_for_month(organization_id, month)
        .await?;

    for record in &removed {
        let path = if record.payroll_pdf.is_empty() {
            payslip_path(&record.employee_id, record.month)
        } else {
            record.payroll_pdf.clone()
        };
        match store.delete(&path).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(employee_id = %record.employee_id, path = %path, "Payslip already absent");
            }
            Err(err) => {
                warn!(
                    employee_id = %record.employee_id,
                    path = %path,
                    error = %err,
                    "Failed to delete payslip"
                );
            }
        }
    }

    info!(
        organization_id,
        month = %month,
        deleted = removed.len(),
        "Deleted payroll month"
    );
    Ok(removed.len())
}
