//! Configuration loading for the payroll service.
//!
//! This module loads the service settings (`service.yaml`) and the
//! organization seed files that populate the in-memory repository.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/demo").unwrap();
//! println!("Loaded {} organizations", config.seeds().len());
//! ```

mod loader;
mod types;

pub use loader::{
    ConfigLoader, ENV_BIND_ADDRESS, ENV_FAILURE_POLICY, ENV_PUBLIC_BASE_URL, ENV_SIGNING_SECRET,
    ENV_STORAGE_ROOT,
};
pub use types::{
    AdjustmentSeed, BatchConfig, EmployeeSeed, OrderSeed, OrganizationSeed, ServerConfig,
    ServiceConfig, StorageBackend, StorageConfig,
};
