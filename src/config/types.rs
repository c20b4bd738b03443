//! Configuration types for the payroll service.
//!
//! This module contains the strongly-typed structures deserialized from the
//! service settings file and the per-organization seed files.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::batch::FailurePolicy;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    Adjustment, Employee, IndividualAdjustmentInput, Order, Organization, PayeTaxSlab,
    SalaryAdjustment, TaxTable,
};
use crate::repository::RepositorySeed;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Which object store holds payslips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process memory; payslips are lost on restart.
    #[default]
    Memory,
    /// Files under `storage.root`.
    Local,
}

/// Payslip storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// The store backend.
    pub backend: StorageBackend,
    /// Root directory of the local backend.
    pub root: PathBuf,
    /// Base of the download links handed to clients.
    pub public_base_url: String,
    /// HMAC key for download links.
    pub signing_secret: String,
    /// Lifetime of a download link in seconds.
    pub url_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            root: PathBuf::from("./data/payslips"),
            public_base_url: "http://localhost:3000".to_string(),
            signing_secret: "change-me".to_string(),
            url_ttl_seconds: 900,
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// What to do when one employee fails.
    pub failure_policy: FailurePolicy,
}

/// Contents of `service.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Payslip storage settings.
    pub storage: StorageConfig,
    /// Batch processing settings.
    pub batch: BatchConfig,
}

/// An employee entry in a seed file. The organization is implied by the file.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeSeed {
    /// Employee id, unique across every organization.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Optional job title.
    #[serde(default)]
    pub designation: Option<String>,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
}

/// A general adjustment entry in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentSeed {
    /// Adjustment id.
    pub id: String,
    /// The adjustment terms.
    #[serde(flatten)]
    pub adjustment: Adjustment,
}

/// A placed order entry in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSeed {
    /// Order id.
    pub id: String,
    /// The ordering employee.
    pub employee_id: String,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// Price charged.
    pub price: Decimal,
}

/// Contents of one `organizations/*.yaml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationSeed {
    /// The organization.
    pub organization: Organization,
    /// Its employees.
    #[serde(default)]
    pub employees: Vec<EmployeeSeed>,
    /// Organization-wide adjustments.
    #[serde(default)]
    pub adjustments: Vec<AdjustmentSeed>,
    /// Adjustments for listed employees.
    #[serde(default)]
    pub individual_adjustments: Vec<IndividualAdjustmentInput>,
    /// PAYE slabs.
    #[serde(default)]
    pub tax_slabs: Vec<PayeTaxSlab>,
    /// Placed meal orders.
    #[serde(default)]
    pub orders: Vec<OrderSeed>,
}

impl OrganizationSeed {
    /// Validates the seed and converts it into repository rows.
    ///
    /// Rejects duplicate employee ids, negative or unlabeled adjustments,
    /// inconsistent tax slabs, negative prices and references to unknown
    /// employees.
    pub fn into_repository_seed(self, path: &str) -> PayrollResult<RepositorySeed> {
        let invalid = |message: String| PayrollError::ConfigParseError {
            path: path.to_string(),
            message,
        };
        let organization_id = self.organization.id.clone();
        if organization_id.trim().is_empty() {
            return Err(invalid("organization id must not be empty".to_string()));
        }

        let mut employees: Vec<Employee> = Vec::with_capacity(self.employees.len());
        for seed in self.employees {
            if employees.iter().any(|e| e.id == seed.id) {
                return Err(invalid(format!("duplicate employee id '{}'", seed.id)));
            }
            if seed.basic_salary < Decimal::ZERO {
                return Err(invalid(format!(
                    "employee '{}' has a negative basic salary",
                    seed.id
                )));
            }
            employees.push(Employee {
                id: seed.id,
                organization_id: organization_id.clone(),
                name: seed.name,
                designation: seed.designation,
                basic_salary: seed.basic_salary,
            });
        }
        let known = |employee_id: &str| employees.iter().any(|e| e.id == employee_id);

        let mut salary_adjustments = Vec::with_capacity(self.adjustments.len());
        for seed in self.adjustments {
            seed.adjustment.validate()?;
            salary_adjustments.push(SalaryAdjustment {
                id: seed.id,
                organization_id: organization_id.clone(),
                adjustment: seed.adjustment,
            });
        }

        let mut individual_adjustments = Vec::new();
        for input in &self.individual_adjustments {
            if let Some(unknown) = input.employee_ids.iter().find(|id| !known(id)) {
                return Err(invalid(format!(
                    "individual adjustment '{}' names unknown employee '{}'",
                    input.id, unknown
                )));
            }
            individual_adjustments.extend(input.expand(&organization_id)?);
        }

        // Validated here so a broken table fails at startup, not mid-batch.
        TaxTable::new(self.tax_slabs.clone())?;

        let mut orders = Vec::with_capacity(self.orders.len());
        for seed in self.orders {
            if !known(&seed.employee_id) {
                return Err(invalid(format!(
                    "order '{}' names unknown employee '{}'",
                    seed.id, seed.employee_id
                )));
            }
            if seed.price < Decimal::ZERO {
                return Err(invalid(format!("order '{}' has a negative price", seed.id)));
            }
            orders.push(Order {
                id: seed.id,
                organization_id: organization_id.clone(),
                employee_id: seed.employee_id,
                placed_at: seed.placed_at,
                price: seed.price,
            });
        }

        Ok(RepositorySeed {
            organization: self.organization,
            employees,
            salary_adjustments,
            individual_adjustments,
            tax_slabs: self.tax_slabs,
            orders,
        })
    }
}
