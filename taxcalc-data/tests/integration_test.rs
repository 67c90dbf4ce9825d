//! Integration tests for loading the bundled tax tables into a repository.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use taxcalc_core::calculations::{HouseholdTaxEstimator, HouseholdTaxRequest, StateTaxMethod};
use taxcalc_core::{
    FilingStatusCode, RepositoryError, StateCode, TaxRepository, TaxTableError, TaxType,
};
use taxcalc_data::{InMemoryRepository, TaxTableLoader, TaxTableLoaderError, bundled_tables};

const CSV_2023: &str = include_str!("../data/tax_brackets_2023.csv");

async fn loaded_repo() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    let tables = TaxTableLoader::read_csv(CSV_2023.as_bytes()).expect("Failed to read CSV");
    TaxTableLoader::load(&repo, &tables)
        .await
        .expect("Failed to load tables");
    repo
}

fn state(code: &str) -> StateCode {
    StateCode::parse(code).unwrap()
}

#[test]
fn test_csv_and_json_describe_the_same_tables() {
    let from_csv = TaxTableLoader::read_csv(CSV_2023.as_bytes()).unwrap();
    let from_json = bundled_tables().unwrap();

    assert_eq!(from_csv, from_json);
}

#[tokio::test]
async fn test_load_counts_every_bracket() {
    let repo = InMemoryRepository::new();
    let tables = bundled_tables().unwrap();

    let inserted = TaxTableLoader::load(&repo, &tables).await.unwrap();

    // 7 + 7 federal, 9 + 9 California, one each for the three flat states
    // and both filing statuses.
    assert_eq!(inserted, 38);
}

#[tokio::test]
async fn test_load_twice_is_idempotent() {
    let repo = loaded_repo().await;
    let before = repo.get_tax_table(2023).await.unwrap();

    let tables = bundled_tables().unwrap();
    TaxTableLoader::load(&repo, &tables).await.unwrap();

    assert_eq!(repo.list_tax_years().await.unwrap(), vec![2023]);
    assert_eq!(repo.get_tax_table(2023).await.unwrap(), before);
}

#[tokio::test]
async fn test_load_and_retrieve_single_brackets() {
    let repo = loaded_repo().await;

    let schedule = repo
        .get_federal_brackets(2023, FilingStatusCode::Single)
        .await
        .expect("Failed to get single brackets");
    let brackets = schedule.brackets();

    assert_eq!(brackets.len(), 7);
    assert_eq!(brackets[0].lower, dec!(0));
    assert_eq!(brackets[0].upper, Some(dec!(11000)));
    assert_eq!(brackets[0].rate, dec!(0.10));
    assert_eq!(brackets[6].lower, dec!(578125));
    assert_eq!(brackets[6].upper, None);
    assert_eq!(brackets[6].rate, dec!(0.37));
}

#[tokio::test]
async fn test_states_are_listed_in_key_order() {
    let repo = loaded_repo().await;

    let states: Vec<String> = repo
        .list_states(2023)
        .await
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect();

    assert_eq!(states, vec!["CA", "CO", "IL", "NC", "TX", "WA"]);
}

#[tokio::test]
async fn test_state_tax_types() {
    let repo = loaded_repo().await;

    let california = repo.get_state_tax(2023, &state("CA")).await.unwrap();
    let colorado = repo.get_state_tax(2023, &state("CO")).await.unwrap();
    let texas = repo.get_state_tax(2023, &state("TX")).await.unwrap();

    assert_eq!(california.tax_type, TaxType::Graduated);
    assert_eq!(california.schedule(FilingStatusCode::Married).unwrap().len(), 9);
    assert_eq!(colorado.tax_type, TaxType::Flat);
    assert_eq!(colorado.schedule(FilingStatusCode::Single).unwrap().top_rate(), dec!(0.044));
    assert_eq!(texas.tax_type, TaxType::None);
    assert!(texas.brackets.is_empty());
}

#[tokio::test]
async fn test_unknown_tax_year_is_not_found() {
    let repo = loaded_repo().await;

    let result = repo.get_federal_brackets(2019, FilingStatusCode::Single).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn test_invalid_csv_leaves_repository_untouched() {
    let repo = loaded_repo().await;
    let bad = "tax_year,jurisdiction,name,tax_type,filing_status,rate,lower,upper\n\
               2023,federal,,,single,0.10,0,11000\n";

    let err = TaxTableLoader::read_csv(bad.as_bytes()).unwrap_err();

    assert!(matches!(err, TaxTableLoaderError::InvalidSchedule { .. }));
    assert_eq!(
        repo.get_federal_brackets(2023, FilingStatusCode::Single)
            .await
            .unwrap()
            .len(),
        7
    );
}

#[tokio::test]
async fn test_invalid_table_keeps_stored_year() {
    let repo = loaded_repo().await;
    let before = repo.get_tax_table(2023).await.unwrap();

    let mut broken = before.clone();
    broken.federal.remove(&FilingStatusCode::Married);
    let mut next_year = before.clone();
    next_year.tax_year = 2024;

    let err = TaxTableLoader::load(&repo, &[next_year, broken]).await.unwrap_err();

    assert!(matches!(
        err,
        TaxTableLoaderError::InvalidTable(TaxTableError::MissingFederalSchedule { tax_year: 2023, .. })
    ));
    assert_eq!(repo.list_tax_years().await.unwrap(), vec![2023]);
    assert_eq!(repo.get_tax_table(2023).await.unwrap(), before);
}

#[tokio::test]
async fn test_household_estimate_from_loaded_tables() {
    let repo: Arc<dyn TaxRepository> = Arc::new(loaded_repo().await);
    let estimator = HouseholdTaxEstimator::new(repo);

    let estimate = estimator
        .estimate(&HouseholdTaxRequest {
            tax_year: 2023,
            filing_status: FilingStatusCode::Single,
            household_income: dec!(50000),
            state: Some(state("IL")),
        })
        .await
        .unwrap();

    assert_eq!(estimate.federal.total_tax, dec!(6307.5));
    assert_eq!(estimate.state.as_ref().and_then(|s| s.tax), Some(dec!(2475)));
    assert_eq!(estimate.total_tax, dec!(8782.5));
}

#[tokio::test]
async fn test_california_flat_and_marginal_methods_differ() {
    let repo: Arc<dyn TaxRepository> = Arc::new(loaded_repo().await);
    let california = state("CA");

    let flat = HouseholdTaxEstimator::new(repo.clone())
        .state(2023, FilingStatusCode::Single, dec!(30000), &california)
        .await
        .unwrap();
    let marginal = HouseholdTaxEstimator::new(repo)
        .with_state_method(StateTaxMethod::Marginal)
        .state(2023, FilingStatusCode::Single, dec!(30000), &california)
        .await
        .unwrap();

    // 30000 falls in the 4% bracket: flat 1200; marginal 104.12 + 285.44 + 212.64.
    assert_eq!(flat.tax, Some(dec!(1200)));
    assert_eq!(marginal.tax, Some(dec!(602.20)));
    assert_eq!(marginal.name, "California");
}
