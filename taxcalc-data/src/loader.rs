//! Bracket-table loading from CSV and JSON.
//!
//! ## CSV format
//!
//! One row per bracket, in schedule order:
//!
//! | Column          | Notes |
//! |-----------------|-------|
//! | `tax_year`      | e.g. `2023` |
//! | `jurisdiction`  | `federal` or a two-letter state key |
//! | `name`          | state name; empty for federal rows |
//! | `tax_type`      | `graduated`, `flat` or `none`; required on state rows |
//! | `filing_status` | `single` or `married` |
//! | `rate`          | fraction, e.g. `0.22` |
//! | `lower`         | bracket floor |
//! | `upper`         | bracket ceiling; empty for the top bracket |
//!
//! A state without income tax is declared by a single row with
//! `tax_type = none` and empty `filing_status`, `rate`, `lower` and `upper`.
//!
//! ## JSON format
//!
//! An array of [`TaxTable`] values:
//!
//! ```json
//! [{
//!   "tax_year": 2023,
//!   "federal": { "single": [{ "rate": 0.10, "lower": 0, "upper": 11000 }, ...] },
//!   "states": { "TX": { "name": "Texas", "tax_type": "none" } }
//! }]
//! ```

use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use taxcalc_core::{
    BracketSchedule, BracketScheduleError, FilingStatusCode, Jurisdiction, RepositoryError,
    StateCode, StateTaxTable, TaxBracket, TaxRepository, TaxTable, TaxTableError, TaxType,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("row {row}: invalid jurisdiction '{value}'")]
    InvalidJurisdiction { row: usize, value: String },

    #[error("row {row}: invalid filing status '{value}'")]
    InvalidFilingStatus { row: usize, value: String },

    #[error("row {row}: invalid tax type '{value}'")]
    InvalidTaxType { row: usize, value: String },

    #[error("row {row}: missing value for '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: state {state} was already declared with a different tax type or name")]
    ConflictingState { row: usize, state: StateCode },

    #[error("{tax_year} {jurisdiction} {filing_status}: {source}")]
    InvalidSchedule {
        tax_year: i32,
        jurisdiction: Jurisdiction,
        filing_status: FilingStatusCode,
        #[source]
        source: BracketScheduleError,
    },

    #[error("Invalid tax table: {0}")]
    InvalidTable(#[from] TaxTableError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

impl From<serde_json::Error> for TaxTableLoaderError {
    fn from(err: serde_json::Error) -> Self {
        TaxTableLoaderError::JsonParse(err.to_string())
    }
}

/// A single row of the bracket CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub jurisdiction: String,
    pub name: Option<String>,
    pub tax_type: Option<String>,
    pub filing_status: Option<String>,
    pub rate: Option<Decimal>,
    pub lower: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl BracketRecord {
    fn filing_status(
        &self,
        row: usize,
    ) -> Result<FilingStatusCode, TaxTableLoaderError> {
        let value = self
            .filing_status
            .as_deref()
            .ok_or(TaxTableLoaderError::MissingField {
                row,
                field: "filing_status",
            })?;
        FilingStatusCode::parse(value).ok_or_else(|| TaxTableLoaderError::InvalidFilingStatus {
            row,
            value: value.to_string(),
        })
    }

    fn bracket(
        &self,
        row: usize,
    ) -> Result<TaxBracket, TaxTableLoaderError> {
        let rate = self
            .rate
            .ok_or(TaxTableLoaderError::MissingField { row, field: "rate" })?;
        let lower = self
            .lower
            .ok_or(TaxTableLoaderError::MissingField { row, field: "lower" })?;
        Ok(TaxBracket::new(rate, lower, self.upper))
    }

    /// A `none` state declaration carries no bracket.
    fn is_declaration_only(&self) -> bool {
        self.filing_status.is_none() && self.rate.is_none() && self.lower.is_none()
    }
}

#[derive(Default)]
struct YearDraft {
    federal: BTreeMap<FilingStatusCode, Vec<TaxBracket>>,
    states: BTreeMap<StateCode, StateDraft>,
}

struct StateDraft {
    name: String,
    tax_type: TaxType,
    brackets: BTreeMap<FilingStatusCode, Vec<TaxBracket>>,
}

fn build_schedules(
    tax_year: i32,
    jurisdiction: &Jurisdiction,
    drafts: BTreeMap<FilingStatusCode, Vec<TaxBracket>>,
) -> Result<BTreeMap<FilingStatusCode, BracketSchedule>, TaxTableLoaderError> {
    drafts
        .into_iter()
        .map(|(filing_status, brackets)| {
            BracketSchedule::new(brackets)
                .map(|schedule| (filing_status, schedule))
                .map_err(|source| TaxTableLoaderError::InvalidSchedule {
                    tax_year,
                    jurisdiction: jurisdiction.clone(),
                    filing_status,
                    source,
                })
        })
        .collect()
}

/// Loader for bracket tables.
///
/// Parsing and assembly are pure; [`TaxTableLoader::load`] writes the result
/// through any [`TaxRepository`].
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse bracket rows from a CSV reader.
    pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TaxTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and validate an array of tax tables from a JSON reader.
    pub fn parse_json<R: Read>(reader: R) -> Result<Vec<TaxTable>, TaxTableLoaderError> {
        let tables: Vec<TaxTable> = serde_json::from_reader(reader)?;
        for table in &tables {
            table.validate()?;
        }
        Ok(tables)
    }

    /// Group CSV rows into one validated [`TaxTable`] per tax year.
    ///
    /// Rows keep their file order within each schedule; out-of-order or
    /// non-contiguous brackets are rejected, not sorted.
    pub fn assemble(records: &[BracketRecord]) -> Result<Vec<TaxTable>, TaxTableLoaderError> {
        let mut years: BTreeMap<i32, YearDraft> = BTreeMap::new();

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let jurisdiction = Jurisdiction::parse(&record.jurisdiction).map_err(|_| {
                TaxTableLoaderError::InvalidJurisdiction {
                    row,
                    value: record.jurisdiction.clone(),
                }
            })?;
            let year = years.entry(record.tax_year).or_default();

            match jurisdiction {
                Jurisdiction::Federal => {
                    let filing_status = record.filing_status(row)?;
                    year.federal
                        .entry(filing_status)
                        .or_default()
                        .push(record.bracket(row)?);
                }
                Jurisdiction::State(code) => {
                    let raw_type = record
                        .tax_type
                        .as_deref()
                        .ok_or(TaxTableLoaderError::MissingField {
                            row,
                            field: "tax_type",
                        })?;
                    let tax_type = TaxType::parse(raw_type).ok_or_else(|| {
                        TaxTableLoaderError::InvalidTaxType {
                            row,
                            value: raw_type.to_string(),
                        }
                    })?;
                    let name = record.name.clone().unwrap_or_else(|| code.to_string());

                    let state = year.states.entry(code.clone()).or_insert_with(|| StateDraft {
                        name: name.clone(),
                        tax_type,
                        brackets: BTreeMap::new(),
                    });
                    if state.tax_type != tax_type || state.name != name {
                        return Err(TaxTableLoaderError::ConflictingState { row, state: code });
                    }

                    if !record.is_declaration_only() {
                        let filing_status = record.filing_status(row)?;
                        state
                            .brackets
                            .entry(filing_status)
                            .or_default()
                            .push(record.bracket(row)?);
                    }
                }
            }
        }

        let mut tables = Vec::with_capacity(years.len());
        for (tax_year, draft) in years {
            let federal = build_schedules(tax_year, &Jurisdiction::Federal, draft.federal)?;

            let mut states = BTreeMap::new();
            for (code, state) in draft.states {
                let jurisdiction = Jurisdiction::State(code.clone());
                let brackets = build_schedules(tax_year, &jurisdiction, state.brackets)?;
                states.insert(
                    code,
                    StateTaxTable {
                        name: state.name,
                        tax_type: state.tax_type,
                        brackets,
                    },
                );
            }

            let table = TaxTable {
                tax_year,
                federal,
                states,
            };
            table.validate()?;
            debug!(tax_year, brackets = table.bracket_count(), "assembled tax table");
            tables.push(table);
        }

        Ok(tables)
    }

    /// Parse and assemble a CSV reader in one step.
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TaxTable>, TaxTableLoaderError> {
        let records = Self::parse_csv(reader)?;
        Self::assemble(&records)
    }

    /// Render `tables` in the JSON format read by [`TaxTableLoader::parse_json`].
    pub fn to_json(tables: &[TaxTable]) -> Result<String, TaxTableLoaderError> {
        for table in tables {
            table.validate()?;
        }
        Ok(serde_json::to_string_pretty(tables)?)
    }

    /// Store `tables` in `repo`, replacing any existing table for the same
    /// tax year, and return the number of brackets stored.
    ///
    /// Every table is validated before the repository is touched, so an
    /// invalid table leaves all stored years as they were. Loading the same
    /// tables twice leaves the repository unchanged.
    pub async fn load<R: TaxRepository + ?Sized>(
        repo: &R,
        tables: &[TaxTable],
    ) -> Result<usize, TaxTableLoaderError> {
        for table in tables {
            table.validate()?;
        }

        let mut inserted = 0;
        for table in tables {
            repo.insert_tax_table(table.clone()).await?;
            inserted += table.bracket_count();
            info!(
                tax_year = table.tax_year,
                brackets = table.bracket_count(),
                states = table.states.len(),
                "loaded tax table"
            );
        }

        Ok(inserted)
    }
}
