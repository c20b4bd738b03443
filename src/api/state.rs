//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::batch::{FailurePolicy, PayrollBatch};
use crate::payslip::PayslipGenerator;
use crate::repository::PayrollRepository;
use crate::storage::{ObjectStore, UrlSigner};

/// Shared application state.
///
/// Holds the injected repository and object store, the signer that
/// verifies download links, and the batch orchestrator built over them.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn PayrollRepository>,
    store: Arc<dyn ObjectStore>,
    signer: Arc<UrlSigner>,
    batch: PayrollBatch,
    url_ttl: Duration,
}

impl AppState {
    /// Creates the application state.
    ///
    /// `signer` must be the one the store issues links with, or every
    /// download through `/files` is refused.
    pub fn new(
        repository: Arc<dyn PayrollRepository>,
        store: Arc<dyn ObjectStore>,
        signer: UrlSigner,
        policy: FailurePolicy,
        url_ttl: Duration,
    ) -> Self {
        let batch = PayrollBatch::new(
            repository.clone(),
            PayslipGenerator::new(store.clone()),
            policy,
        );
        Self {
            repository,
            store,
            signer: Arc::new(signer),
            batch,
            url_ttl,
        }
    }

    /// Returns the payroll repository.
    pub fn repository(&self) -> &dyn PayrollRepository {
        self.repository.as_ref()
    }

    /// Returns the payslip store.
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Returns the download link signer.
    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// Returns the batch orchestrator with the configured failure policy.
    pub fn batch(&self) -> &PayrollBatch {
        &self.batch
    }

    /// Returns how long issued download links stay valid.
    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }
}
