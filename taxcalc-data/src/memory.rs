use std::collections::BTreeMap;

use async_trait::async_trait;
use taxcalc_core::{
    BracketSchedule, FilingStatusCode, RepositoryError, StateCode, StateTaxTable, TaxRepository,
    TaxTable,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local [`TaxRepository`] holding one [`TaxTable`] per tax year.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<BTreeMap<i32, TaxTable>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from already-parsed tables. Later tables replace
    /// earlier ones for the same tax year.
    pub fn from_tables(tables: impl IntoIterator<Item = TaxTable>) -> Result<Self, RepositoryError> {
        let mut map = BTreeMap::new();
        for table in tables {
            table
                .validate()
                .map_err(|e| RepositoryError::Data(e.to_string()))?;
            map.insert(table.tax_year, table);
        }
        Ok(Self {
            tables: RwLock::new(map),
        })
    }

    async fn with_table<T>(
        &self,
        tax_year: i32,
        f: impl FnOnce(&TaxTable) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let tables = self.tables.read().await;
        let table = tables
            .get(&tax_year)
            .ok_or_else(|| RepositoryError::NotFound(format!("tax year {tax_year}")))?;
        f(table)
    }
}

#[async_trait]
impl TaxRepository for InMemoryRepository {
    async fn list_tax_years(&self) -> Result<Vec<i32>, RepositoryError> {
        Ok(self.tables.read().await.keys().copied().collect())
    }

    async fn get_tax_table(&self, tax_year: i32) -> Result<TaxTable, RepositoryError> {
        self.with_table(tax_year, |table| Ok(table.clone())).await
    }

    async fn get_federal_brackets(
        &self,
        tax_year: i32,
        filing_status: FilingStatusCode,
    ) -> Result<BracketSchedule, RepositoryError> {
        self.with_table(tax_year, |table| {
            table.federal_schedule(filing_status).cloned().ok_or_else(|| {
                RepositoryError::NotFound(format!(
                    "federal brackets for {filing_status} in {tax_year}"
                ))
            })
        })
        .await
    }

    async fn list_states(&self, tax_year: i32) -> Result<Vec<StateCode>, RepositoryError> {
        self.with_table(tax_year, |table| Ok(table.states.keys().cloned().collect()))
            .await
    }

    async fn get_state_tax(
        &self,
        tax_year: i32,
        state: &StateCode,
    ) -> Result<StateTaxTable, RepositoryError> {
        self.with_table(tax_year, |table| {
            table
                .state(state)
                .cloned()
                .ok_or_else(|| RepositoryError::NotFound(format!("state {state} in {tax_year}")))
        })
        .await
    }

    async fn insert_tax_table(&self, table: TaxTable) -> Result<(), RepositoryError> {
        table
            .validate()
            .map_err(|e| RepositoryError::Data(e.to_string()))?;
        debug!(tax_year = table.tax_year, "storing tax table");
        self.tables.write().await.insert(table.tax_year, table);
        Ok(())
    }

    async fn delete_tax_table(&self, tax_year: i32) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .remove(&tax_year)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("tax year {tax_year}")))
    }
}
