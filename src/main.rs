//! payroll-engine service binary.
//!
//! Loads the YAML configuration directory, seeds the in-memory repository,
//! builds the configured payslip store and serves the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::{ConfigLoader, StorageBackend};
use payroll_engine::storage::{LocalObjectStore, MemoryObjectStore, ObjectStore, UrlSigner};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_CONFIG_DIR: &str = "./config/demo";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payroll_engine=info".into()),
        )
        .init();

    let config_dir = std::env::var("PAYROLL_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

    let mut loader = ConfigLoader::load(&config_dir)?;
    loader.apply_env_overrides(|name| std::env::var(name).ok())?;
    let service = loader.service().clone();

    tracing::info!(
        config_dir = %config_dir.display(),
        organizations = loader.seeds().len(),
        backend = ?service.storage.backend,
        policy = %service.batch.failure_policy,
        "Loaded configuration"
    );

    let signer = UrlSigner::new(
        service.storage.signing_secret.as_bytes(),
        service.storage.public_base_url.clone(),
    );
    let store: Arc<dyn ObjectStore> = match service.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryObjectStore::new(signer.clone())),
        StorageBackend::Local => {
            tokio::fs::create_dir_all(&service.storage.root).await?;
            Arc::new(LocalObjectStore::new(
                service.storage.root.clone(),
                signer.clone(),
            ))
        }
    };

    let state = AppState::new(
        Arc::new(loader.repository()),
        store,
        signer,
        service.batch.failure_policy,
        Duration::from_secs(service.storage.url_ttl_seconds),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&service.server.bind_address).await?;
    tracing::info!("payroll-engine listening on {}", service.server.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
