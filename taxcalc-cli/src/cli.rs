use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use taxcalc_core::calculations::StateTaxMethod;
use taxcalc_core::db::SourceConfig;
use taxcalc_core::{FilingStatusCode, Jurisdiction, StateCode};

use crate::config::AppConfig;
use crate::utils::{ParseCurrencyError, parse_currency};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Progressive income-tax calculator.
///
/// Loads federal and state bracket tables from the configured source and
/// computes the tax owed on an income.
#[derive(Debug, Parser)]
#[command(name = "taxcalc", version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Table source backend: bundled, memory, json or csv.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Path handed to the backend. The backend is inferred from a `.json`
    /// or `.csv` extension when `--backend` is not given.
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Tax year whose tables are used.
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// How state brackets are applied: flat or marginal.
    #[arg(long, global = true, value_parser = parse_state_method)]
    pub state_method: Option<StateTaxMethod>,

    /// Log level or EnvFilter directive. `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct IncomeArgs {
    /// Income, e.g. `50000`, `$50,000.00` or `1,234.5`.
    #[arg(long, allow_hyphen_values = true, value_parser = parse_income)]
    pub income: Decimal,

    /// Filing status: single or married.
    #[arg(long, value_parser = parse_filing_status)]
    pub status: Option<FilingStatusCode>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Federal tax with a per-bracket breakdown.
    Federal(IncomeArgs),

    /// State tax for one state.
    State {
        #[command(flatten)]
        income: IncomeArgs,

        /// Two-letter state key, e.g. CA.
        #[arg(long, value_parser = StateCode::parse)]
        state: StateCode,
    },

    /// Federal plus optional state tax.
    Estimate {
        #[command(flatten)]
        income: IncomeArgs,

        /// Two-letter state key, e.g. CA.
        #[arg(long, value_parser = StateCode::parse)]
        state: Option<StateCode>,
    },

    /// Print a bracket schedule.
    Brackets {
        /// `federal` or a two-letter state key.
        #[arg(long, default_value = "federal", value_parser = Jurisdiction::parse)]
        jurisdiction: Jurisdiction,

        /// Filing status: single or married.
        #[arg(long, value_parser = parse_filing_status)]
        status: Option<FilingStatusCode>,
    },

    /// List the tax years the source holds.
    Years,

    /// List the states known for the tax year.
    States,

    /// Load the source and report what it contains.
    Validate,
}

fn parse_income(s: &str) -> Result<Decimal, ParseCurrencyError> {
    parse_currency(s)
}

fn parse_filing_status(s: &str) -> Result<FilingStatusCode, String> {
    FilingStatusCode::parse(s)
        .ok_or_else(|| format!("unknown filing status '{s}'; expected single or married"))
}

fn parse_state_method(s: &str) -> Result<StateTaxMethod, String> {
    StateTaxMethod::parse(s)
        .ok_or_else(|| format!("unknown state method '{s}'; expected flat or marginal"))
}

// ─── resolved settings ───────────────────────────────────────────────────────

/// Configuration after applying flags over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub state_method: StateTaxMethod,
    pub source: SourceConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

fn infer_backend(location: &str) -> Option<&'static str> {
    match Path::new(location).extension()?.to_str()? {
        ext if ext.eq_ignore_ascii_case("json") => Some("json"),
        ext if ext.eq_ignore_ascii_case("csv") => Some("csv"),
        _ => None,
    }
}

impl Cli {
    pub fn settings(
        &self,
        config: AppConfig,
    ) -> Settings {
        let mut source = SourceConfig::from(config.source);
        if let Some(location) = &self.source {
            source.location = location.clone();
            if let Some(backend) = infer_backend(location) {
                source.backend = backend.to_string();
            }
        }
        if let Some(backend) = &self.backend {
            source.backend = backend.to_ascii_lowercase();
        }

        Settings {
            tax_year: self.year.unwrap_or(config.tax_year),
            filing_status: config.filing_status,
            state_method: self.state_method.unwrap_or(config.state_method),
            source,
            log_level: self.log_level.clone().unwrap_or(config.logging.level),
            log_file: self.log_file.clone().or(config.logging.file),
        }
    }
}
