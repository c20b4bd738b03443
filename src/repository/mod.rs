//! Persistence seam for the payroll pipeline.
//!
//! The batch orchestrator and the HTTP layer only talk to storage through
//! [`PayrollRepository`]. Every query is scoped by organization id.

mod memory;

pub use memory::{InMemoryRepository, RepositorySeed};

use async_trait::async_trait;

use crate::error::PayrollResult;
use crate::models::{
    DateRange, Employee, IndividualSalaryAdjustment, Order, Organization, PayeTaxSlab,
    PayrollMonth, PayrollRecord, SalaryAdjustment,
};

/// Read and write access to the rows the payroll pipeline consumes and produces.
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Looks up an organization.
    async fn find_organization(&self, organization_id: &str)
    -> PayrollResult<Option<Organization>>;

    /// Lists every employee of an organization, ordered by id.
    async fn employees(&self, organization_id: &str) -> PayrollResult<Vec<Employee>>;

    /// Looks up one employee of an organization.
    async fn find_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
    ) -> PayrollResult<Option<Employee>>;

    /// Lists the organization-wide adjustments.
    async fn salary_adjustments(&self, organization_id: &str)
    -> PayrollResult<Vec<SalaryAdjustment>>;

    /// Lists the individual adjustments of every employee of an organization.
    async fn individual_adjustments(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Vec<IndividualSalaryAdjustment>>;

    /// Lists the PAYE slabs of an organization in storage order.
    async fn tax_slabs(&self, organization_id: &str) -> PayrollResult<Vec<PayeTaxSlab>>;

    /// Lists an employee's orders placed within `range`.
    async fn orders_for_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
        range: &DateRange,
    ) -> PayrollResult<Vec<Order>>;

    /// Stores a new payroll record.
    ///
    /// Fails with `PayrollExists` if the employee already has a record for
    /// the month.
    async fn insert_payroll(&self, record: PayrollRecord) -> PayrollResult<()>;

    /// Looks up the record of an employee for a month.
    async fn find_payroll(
        &self,
        employee_id: &str,
        month: PayrollMonth,
    ) -> PayrollResult<Option<PayrollRecord>>;

    /// Lists the records of an organization, newest month first.
    async fn payrolls_for_organization(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Vec<PayrollRecord>>;

    /// Lists the records of one employee, newest month first.
    async fn payrolls_for_employee(&self, employee_id: &str) -> PayrollResult<Vec<PayrollRecord>>;

    /// Deletes the records of an organization for a month and returns them.
    async fn delete_payrolls_for_month(
        &self,
        organization_id: &str,
        month: PayrollMonth,
    ) -> PayrollResult<Vec<PayrollRecord>>;
}
