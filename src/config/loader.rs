//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! settings and organization seed data from YAML files.

use std::fs;
use std::path::Path;

use crate::batch::FailurePolicy;
use crate::error::{PayrollError, PayrollResult};
use crate::repository::{InMemoryRepository, RepositorySeed};

use super::types::{OrganizationSeed, ServiceConfig};

/// Environment variable overriding `server.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "PAYROLL_BIND_ADDRESS";
/// Environment variable overriding `storage.root`.
pub const ENV_STORAGE_ROOT: &str = "PAYROLL_STORAGE_ROOT";
/// Environment variable overriding `storage.public_base_url`.
pub const ENV_PUBLIC_BASE_URL: &str = "PAYROLL_PUBLIC_BASE_URL";
/// Environment variable overriding `storage.signing_secret`.
pub const ENV_SIGNING_SECRET: &str = "PAYROLL_SIGNING_SECRET";
/// Environment variable overriding `batch.failure_policy`.
pub const ENV_FAILURE_POLICY: &str = "PAYROLL_FAILURE_POLICY";

/// Loads and provides access to the service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/demo/
/// ├── service.yaml        # Server, storage and batch settings
/// └── organizations/
///     └── acme.yaml       # One organization with its employees,
///                         # adjustments, tax slabs and orders
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/demo").unwrap();
/// println!("Listening on {}", loader.service().server.bind_address);
/// println!("Organizations: {}", loader.seeds().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    service: ServiceConfig,
    seeds: Vec<RepositorySeed>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if `service.yaml` or the `organizations`
    /// directory is missing, and `ConfigParseError` if any file has invalid
    /// YAML, a duplicate organization, or inconsistent seed data.
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let service = Self::load_yaml::<ServiceConfig>(&path.join("service.yaml"))?;
        let seeds = Self::load_organizations(&path.join("organizations"))?;

        Ok(Self { service, seeds })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every organization seed file, in file name order.
    ///
    /// Employee ids key payrolls and payslip paths across organizations, so
    /// an id may be seeded by only one of them.
    fn load_organizations(dir: &Path) -> PayrollResult<Vec<RepositorySeed>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| PayrollError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| PayrollError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut seeds: Vec<RepositorySeed> = Vec::with_capacity(paths.len());
        for path in paths {
            let path_str = path.display().to_string();
            let seed = Self::load_yaml::<OrganizationSeed>(&path)?.into_repository_seed(&path_str)?;

            if seeds
                .iter()
                .any(|s| s.organization.id == seed.organization.id)
            {
                return Err(PayrollError::ConfigParseError {
                    path: path_str,
                    message: format!("duplicate organization '{}'", seed.organization.id),
                });
            }
            for employee in &seed.employees {
                if let Some(owner) = seeds
                    .iter()
                    .find(|s| s.employees.iter().any(|e| e.id == employee.id))
                {
                    return Err(PayrollError::ConfigParseError {
                        path: path_str,
                        message: format!(
                            "employee '{}' is already seeded by organization '{}'",
                            employee.id, owner.organization.id
                        ),
                    });
                }
            }
            seeds.push(seed);
        }

        Ok(seeds)
    }

    /// Applies `PAYROLL_*` overrides read through `lookup`.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`; tests pass a map.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseError` if the failure policy override is not
    /// `abort` or `isolate`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> PayrollResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BIND_ADDRESS) {
            self.service.server.bind_address = value;
        }
        if let Some(value) = lookup(ENV_STORAGE_ROOT) {
            self.service.storage.root = value.into();
        }
        if let Some(value) = lookup(ENV_PUBLIC_BASE_URL) {
            self.service.storage.public_base_url = value;
        }
        if let Some(value) = lookup(ENV_SIGNING_SECRET) {
            self.service.storage.signing_secret = value;
        }
        if let Some(value) = lookup(ENV_FAILURE_POLICY) {
            self.service.batch.failure_policy =
                value
                    .parse::<FailurePolicy>()
                    .map_err(|message| PayrollError::ConfigParseError {
                        path: ENV_FAILURE_POLICY.to_string(),
                        message,
                    })?;
        }
        Ok(())
    }

    /// Returns the service settings.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Returns the validated organization seeds.
    pub fn seeds(&self) -> &[RepositorySeed] {
        &self.seeds
    }

    /// Builds an in-memory repository holding every loaded organization.
    pub fn repository(&self) -> InMemoryRepository {
        InMemoryRepository::from_seeds(self.seeds.iter().cloned())
    }
}
