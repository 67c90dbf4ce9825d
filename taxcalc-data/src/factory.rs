//! [`RepositoryFactory`] implementations for the bundled data sources.

use std::path::Path;

use async_trait::async_trait;
use taxcalc_core::db::{RepositoryFactory, RepositoryRegistry, SourceConfig};
use taxcalc_core::{RepositoryError, TaxRepository, TaxTable};
use tracing::info;

use crate::loader::{TaxTableLoader, TaxTableLoaderError};
use crate::memory::InMemoryRepository;

fn loader_error(err: TaxTableLoaderError) -> RepositoryError {
    match err {
        TaxTableLoaderError::Repository(e) => e,
        other => RepositoryError::Data(other.to_string()),
    }
}

fn repository(tables: Vec<TaxTable>) -> Result<Box<dyn TaxRepository>, RepositoryError> {
    Ok(Box::new(InMemoryRepository::from_tables(tables)?))
}

async fn read_location(config: &SourceConfig) -> Result<Vec<u8>, RepositoryError> {
    if config.location.trim().is_empty() {
        return Err(RepositoryError::Configuration(format!(
            "backend '{}' needs a file location",
            config.backend
        )));
    }
    let path = Path::new(&config.location);
    tokio::fs::read(path)
        .await
        .map_err(|e| RepositoryError::Connection(format!("cannot read {}: {e}", path.display())))
}

/// Empty repository; tables are inserted later.
pub struct MemoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &SourceConfig) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        Ok(Box::new(InMemoryRepository::new()))
    }
}

/// Repository preloaded with the tables compiled into this crate.
pub struct BundledFactory;

#[async_trait]
impl RepositoryFactory for BundledFactory {
    fn backend_name(&self) -> &'static str {
        "bundled"
    }

    async fn create(&self, _config: &SourceConfig) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let tables = crate::bundled_tables().map_err(loader_error)?;
        info!(tables = tables.len(), "using bundled tax tables");
        repository(tables)
    }
}

/// Repository loaded from a JSON tax-table file.
pub struct JsonFileFactory;

#[async_trait]
impl RepositoryFactory for JsonFileFactory {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    async fn create(&self, config: &SourceConfig) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let bytes = read_location(config).await?;
        let tables = TaxTableLoader::parse_json(bytes.as_slice()).map_err(loader_error)?;
        info!(location = %config.location, tables = tables.len(), "loaded JSON tax tables");
        repository(tables)
    }
}

/// Repository loaded from a CSV bracket file.
pub struct CsvFileFactory;

#[async_trait]
impl RepositoryFactory for CsvFileFactory {
    fn backend_name(&self) -> &'static str {
        "csv"
    }

    async fn create(&self, config: &SourceConfig) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let bytes = read_location(config).await?;
        let tables = TaxTableLoader::read_csv(bytes.as_slice()).map_err(loader_error)?;
        info!(location = %config.location, tables = tables.len(), "loaded CSV tax tables");
        repository(tables)
    }
}

/// Registry with every backend this crate provides.
pub fn default_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryFactory));
    registry.register(Box::new(BundledFactory));
    registry.register(Box::new(JsonFileFactory));
    registry.register(Box::new(CsvFileFactory));
    registry
}
