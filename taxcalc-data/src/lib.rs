//! Bracket-table data for `taxcalc`: CSV/JSON loading, the in-memory
//! repository and the factories that build repositories from a
//! [`SourceConfig`](taxcalc_core::db::SourceConfig).

pub mod factory;
pub mod loader;
pub mod memory;

pub use factory::{BundledFactory, CsvFileFactory, JsonFileFactory, MemoryFactory, default_registry};
pub use loader::{BracketRecord, TaxTableLoader, TaxTableLoaderError};
pub use memory::InMemoryRepository;

use taxcalc_core::TaxTable;

/// Tax tables compiled into the binary, in the JSON format read by
/// [`TaxTableLoader::parse_json`].
pub const BUNDLED_TAX_TABLES: &str = include_str!("../data/tax_tables_2023.json");

/// Parse and validate [`BUNDLED_TAX_TABLES`].
pub fn bundled_tables() -> Result<Vec<TaxTable>, TaxTableLoaderError> {
    TaxTableLoader::parse_json(BUNDLED_TAX_TABLES.as_bytes())
}
