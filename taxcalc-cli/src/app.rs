use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use taxcalc_core::calculations::{HouseholdTaxEstimator, HouseholdTaxRequest};
use taxcalc_core::db::SourceConfig;
use taxcalc_core::{Jurisdiction, TaxRepository, TaxType};
use taxcalc_data::default_registry;
use tracing::{debug, info};

use crate::cli::{Command, IncomeArgs, Settings};
use crate::report;

/// Builds the repository named by `source` from the default registry.
pub async fn open_repository(source: &SourceConfig) -> Result<Arc<dyn TaxRepository>> {
    debug!(backend = %source.backend, location = %source.location, "opening tax table source");
    let registry = default_registry();
    let repo = registry
        .create(source)
        .await
        .with_context(|| format!("Failed to open '{}' tax table source", source.backend))?;
    Ok(Arc::from(repo))
}

/// Runs `command` and returns the text to print.
pub async fn run(
    command: &Command,
    settings: &Settings,
) -> Result<String> {
    let repo = open_repository(&settings.source).await?;
    execute(command, settings, repo).await
}

/// Runs `command` against an already opened repository.
pub async fn execute(
    command: &Command,
    settings: &Settings,
    repo: Arc<dyn TaxRepository>,
) -> Result<String> {
    let tax_year = settings.tax_year;
    let estimator = HouseholdTaxEstimator::new(repo.clone()).with_state_method(settings.state_method);
    let status_of = |args: &IncomeArgs| args.status.unwrap_or(settings.filing_status);

    match command {
        Command::Federal(args) => {
            let filing_status = status_of(args);
            let result = estimator
                .federal(tax_year, filing_status, args.income)
                .await
                .context("Federal tax calculation failed")?;
            Ok(report::federal(tax_year, filing_status, &result))
        }
        Command::State { income, state } => {
            let filing_status = status_of(income);
            let result = estimator
                .state(tax_year, filing_status, income.income, state)
                .await
                .with_context(|| format!("State tax calculation failed for {state}"))?;
            Ok(report::state(tax_year, filing_status, &result))
        }
        Command::Estimate { income, state } => {
            let request = HouseholdTaxRequest {
                tax_year,
                filing_status: status_of(income),
                household_income: income.income,
                state: state.clone(),
            };
            let estimate = estimator
                .estimate(&request)
                .await
                .context("Tax estimate failed")?;
            info!(total_tax = %estimate.total_tax, "estimate complete");
            Ok(report::estimate(&estimate))
        }
        Command::Brackets {
            jurisdiction,
            status,
        } => {
            let filing_status = status.unwrap_or(settings.filing_status);
            match jurisdiction {
                Jurisdiction::Federal => {
                    let schedule = repo
                        .get_federal_brackets(tax_year, filing_status)
                        .await
                        .context("Failed to read federal brackets")?;
                    Ok(report::schedule(tax_year, jurisdiction, filing_status, &schedule))
                }
                Jurisdiction::State(code) => {
                    let table = repo
                        .get_state_tax(tax_year, code)
                        .await
                        .with_context(|| format!("Failed to read {code} brackets"))?;
                    if table.tax_type == TaxType::None {
                        return Ok(report::untaxed_state(tax_year, code, &table));
                    }
                    let schedule = table.schedule(filing_status).ok_or_else(|| {
                        anyhow!("{code} has no {filing_status} brackets for {tax_year}")
                    })?;
                    Ok(report::schedule(tax_year, jurisdiction, filing_status, schedule))
                }
            }
        }
        Command::Years => {
            let years = repo.list_tax_years().await.context("Failed to list tax years")?;
            Ok(report::years(&years))
        }
        Command::States => {
            let table = repo
                .get_tax_table(tax_year)
                .await
                .with_context(|| format!("Failed to read tax table for {tax_year}"))?;
            Ok(report::states(tax_year, &table))
        }
        Command::Validate => {
            let mut tables = Vec::new();
            for year in repo.list_tax_years().await.context("Failed to list tax years")? {
                let table = repo
                    .get_tax_table(year)
                    .await
                    .with_context(|| format!("Failed to read tax table for {year}"))?;
                table
                    .validate()
                    .with_context(|| format!("Tax table for {year} is invalid"))?;
                tables.push(table);
            }
            Ok(report::validation(&tables))
        }
    }
}
