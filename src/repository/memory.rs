//! In-memory repository backed by a tokio `RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PayrollRepository;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    DateRange, Employee, IndividualSalaryAdjustment, Order, Organization, PayeTaxSlab,
    PayrollMonth, PayrollRecord, SalaryAdjustment,
};

/// All rows belonging to one organization.
#[derive(Debug, Clone)]
pub struct RepositorySeed {
    /// The organization.
    pub organization: Organization,
    /// Its employees.
    pub employees: Vec<Employee>,
    /// Organization-wide adjustments.
    pub salary_adjustments: Vec<SalaryAdjustment>,
    /// Per-employee adjustments, already expanded to one row per employee.
    pub individual_adjustments: Vec<IndividualSalaryAdjustment>,
    /// PAYE slabs.
    pub tax_slabs: Vec<PayeTaxSlab>,
    /// Placed meal orders.
    pub orders: Vec<Order>,
}

#[derive(Debug, Default)]
struct RepositoryState {
    organizations: HashMap<String, Organization>,
    employees: Vec<Employee>,
    salary_adjustments: Vec<SalaryAdjustment>,
    individual_adjustments: Vec<IndividualSalaryAdjustment>,
    tax_slabs: HashMap<String, Vec<PayeTaxSlab>>,
    orders: Vec<Order>,
    payrolls: Vec<PayrollRecord>,
}

/// A [`PayrollRepository`] holding every row in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given organizations.
    pub fn from_seeds(seeds: impl IntoIterator<Item = RepositorySeed>) -> Self {
        let mut repository = Self::new();
        for seed in seeds {
            repository.add_seed(seed);
        }
        repository
    }

    /// Adds one organization and its rows.
    pub fn add_seed(&mut self, seed: RepositorySeed) {
        let state = self.state.get_mut();
        let organization_id = seed.organization.id.clone();
        state
            .organizations
            .insert(organization_id.clone(), seed.organization);
        state.employees.extend(seed.employees);
        state.employees.sort_by(|a, b| a.id.cmp(&b.id));
        state.salary_adjustments.extend(seed.salary_adjustments);
        state.individual_adjustments.extend(seed.individual_adjustments);
        state
            .tax_slabs
            .entry(organization_id)
            .or_default()
            .extend(seed.tax_slabs);
        state.orders.extend(seed.orders);
    }

    /// Records a placed order.
    pub async fn add_order(&self, order: Order) {
        self.state.write().await.orders.push(order);
    }

    /// Returns the number of stored payroll records.
    pub async fn payroll_count(&self) -> usize {
        self.state.read().await.payrolls.len()
    }
}

fn newest_first(records: &mut [PayrollRecord]) {
    records.sort_by(|a, b| {
        b.month
            .cmp(&a.month)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
}

#[async_trait]
impl PayrollRepository for InMemoryRepository {
    async fn find_organization(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Option<Organization>> {
        Ok(self
            .state
            .read()
            .await
            .organizations
            .get(organization_id)
            .cloned())
    }

    async fn employees(&self, organization_id: &str) -> PayrollResult<Vec<Employee>> {
        Ok(self
            .state
            .read()
            .await
            .employees
            .iter()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
    ) -> PayrollResult<Option<Employee>> {
        Ok(self
            .state
            .read()
            .await
            .employees
            .iter()
            .find(|e| e.organization_id == organization_id && e.id == employee_id)
            .cloned())
    }

    async fn salary_adjustments(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Vec<SalaryAdjustment>> {
        Ok(self
            .state
            .read()
            .await
            .salary_adjustments
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn individual_adjustments(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Vec<IndividualSalaryAdjustment>> {
        Ok(self
            .state
            .read()
            .await
            .individual_adjustments
            .iter()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn tax_slabs(&self, organization_id: &str) -> PayrollResult<Vec<PayeTaxSlab>> {
        Ok(self
            .state
            .read()
            .await
            .tax_slabs
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn orders_for_employee(
        &self,
        organization_id: &str,
        employee_id: &str,
        range: &DateRange,
    ) -> PayrollResult<Vec<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .iter()
            .filter(|o| {
                o.organization_id == organization_id
                    && o.employee_id == employee_id
                    && range.contains(o.placed_at)
            })
            .cloned()
            .collect())
    }

    async fn insert_payroll(&self, record: PayrollRecord) -> PayrollResult<()> {
        let mut state = self.state.write().await;
        let duplicate = state
            .payrolls
            .iter()
            .any(|p| p.employee_id == record.employee_id && p.month == record.month);
        if duplicate {
            return Err(PayrollError::PayrollExists {
                employee_id: record.employee_id,
                month: record.month.to_string(),
            });
        }
        state.payrolls.push(record);
        Ok(())
    }

    async fn find_payroll(
        &self,
        employee_id: &str,
        month: PayrollMonth,
    ) -> PayrollResult<Option<PayrollRecord>> {
        Ok(self
            .state
            .read()
            .await
            .payrolls
            .iter()
            .find(|p| p.employee_id == employee_id && p.month == month)
            .cloned())
    }

    async fn payrolls_for_organization(
        &self,
        organization_id: &str,
    ) -> PayrollResult<Vec<PayrollRecord>> {
        let mut records: Vec<PayrollRecord> = self
            .state
            .read()
            .await
            .payrolls
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn payrolls_for_employee(&self, employee_id: &str) -> PayrollResult<Vec<PayrollRecord>> {
        let mut records: Vec<PayrollRecord> = self
            .state
            .read()
            .await
            .payrolls
            .iter()
            .filter(|p| p.employee_id == employee_id)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn delete_payrolls_for_month(
        &self,
        organization_id: &str,
        month: PayrollMonth,
    ) -> PayrollResult<Vec<PayrollRecord>> {
        let mut state = self.state.write().await;
        let (removed, kept): (Vec<PayrollRecord>, Vec<PayrollRecord>) = state
            .payrolls
            .drain(..)
            .partition(|p| p.organization_id == organization_id && p.month == month);
        state.payrolls = kept;
        Ok(removed)
    }
}
