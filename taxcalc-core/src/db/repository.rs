use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BracketSchedule, FilingStatusCode, StateCode, StateTaxTable, TaxTable};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    Data(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Read/write access to bracket tables.
///
/// Implementations hand out owned copies; tables are small and read-only
/// once loaded.
#[async_trait]
pub trait TaxRepository: Send + Sync {
    // Tax years
    async fn list_tax_years(&self) -> Result<Vec<i32>, RepositoryError>;
    async fn get_tax_table(&self, tax_year: i32) -> Result<TaxTable, RepositoryError>;

    // Federal schedules
    async fn get_federal_brackets(
        &self,
        tax_year: i32,
        filing_status: FilingStatusCode,
    ) -> Result<BracketSchedule, RepositoryError>;

    // States
    async fn list_states(&self, tax_year: i32) -> Result<Vec<StateCode>, RepositoryError>;
    async fn get_state_tax(
        &self,
        tax_year: i32,
        state: &StateCode,
    ) -> Result<StateTaxTable, RepositoryError>;

    // Loading
    /// Stores `table`, replacing any table already held for its tax year.
    /// The table is validated first; invalid tables are rejected with
    /// [`RepositoryError::Data`].
    async fn insert_tax_table(&self, table: TaxTable) -> Result<(), RepositoryError>;
    async fn delete_tax_table(&self, tax_year: i32) -> Result<(), RepositoryError>;
}
