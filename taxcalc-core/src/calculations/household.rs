//! Combined federal and state estimate for one household.
//!
//! [`HouseholdTaxEstimator`] is handed the repository it reads bracket tables
//! from; it holds no data of its own and every call is independent.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::calculator::{CalculationError, TaxComputationInput, TaxComputationResult};
use crate::calculations::common::effective_rate;
use crate::calculations::state::StateTaxMethod;
use crate::db::{RepositoryError, TaxRepository};
use crate::models::{FilingStatusCode, StateCode, TaxType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What the caller knows about the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdTaxRequest {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub household_income: Decimal,
    pub state: Option<StateCode>,
}

/// State portion of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxResult {
    pub state: StateCode,
    pub name: String,
    pub tax_type: TaxType,
    pub method: StateTaxMethod,
    /// `None` when no bracket applies to the income.
    pub tax: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdTaxEstimate {
    pub request: HouseholdTaxRequest,
    pub federal: TaxComputationResult,
    pub state: Option<StateTaxResult>,
    /// Federal plus state tax; a state with no applicable bracket adds zero.
    pub total_tax: Decimal,
    pub effective_rate: Option<Decimal>,
}

pub struct HouseholdTaxEstimator {
    repository: Arc<dyn TaxRepository>,
    state_method: StateTaxMethod,
}

impl HouseholdTaxEstimator {
    pub fn new(repository: Arc<dyn TaxRepository>) -> Self {
        Self {
            repository,
            state_method: StateTaxMethod::default(),
        }
    }

    pub fn with_state_method(
        mut self,
        state_method: StateTaxMethod,
    ) -> Self {
        self.state_method = state_method;
        self
    }

    pub fn state_method(&self) -> StateTaxMethod {
        self.state_method
    }

    /// Federal tax alone.
    ///
    /// # Errors
    ///
    /// Negative income, or the schedule cannot be read from the repository.
    pub async fn federal(
        &self,
        tax_year: i32,
        filing_status: FilingStatusCode,
        income: Decimal,
    ) -> Result<TaxComputationResult, EstimateError> {
        if income < Decimal::ZERO {
            return Err(CalculationError::NegativeIncome(income).into());
        }
        let schedule = self
            .repository
            .get_federal_brackets(tax_year, filing_status)
            .await?;
        Ok(TaxComputationInput::new(income, &schedule).compute()?)
    }

    /// State tax alone, using this estimator's [`StateTaxMethod`].
    ///
    /// A state without an income tax yields `Some(0)`.
    pub async fn state(
        &self,
        tax_year: i32,
        filing_status: FilingStatusCode,
        income: Decimal,
        state: &StateCode,
    ) -> Result<StateTaxResult, EstimateError> {
        if income < Decimal::ZERO {
            return Err(CalculationError::NegativeIncome(income).into());
        }
        let table = self.repository.get_state_tax(tax_year, state).await?;

        let tax = match table.tax_type {
            TaxType::None => Some(Decimal::ZERO),
            TaxType::Graduated | TaxType::Flat => {
                let schedule = table.schedule(filing_status).ok_or_else(|| {
                    RepositoryError::NotFound(format!(
                        "{state} {filing_status} brackets for {tax_year}"
                    ))
                })?;
                self.state_method.compute(income, schedule.brackets())
            }
        };

        if tax.is_none() {
            warn!(%state, %income, %filing_status, "no state bracket applies to income");
        }

        Ok(StateTaxResult {
            state: state.clone(),
            name: table.name,
            tax_type: table.tax_type,
            method: self.state_method,
            tax,
        })
    }

    /// Federal and (optionally) state tax for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::Calculation`] for a negative income and
    /// [`EstimateError::Repository`] when a schedule is missing.
    pub async fn estimate(
        &self,
        request: &HouseholdTaxRequest,
    ) -> Result<HouseholdTaxEstimate, EstimateError> {
        debug!(
            tax_year = request.tax_year,
            filing_status = %request.filing_status,
            state = ?request.state,
            "estimating household tax"
        );

        let income = request.household_income;
        let federal = self
            .federal(request.tax_year, request.filing_status, income)
            .await?;

        let state = match &request.state {
            Some(code) => Some(
                self.state(request.tax_year, request.filing_status, income, code)
                    .await?,
            ),
            None => None,
        };

        let state_tax = state
            .as_ref()
            .and_then(|result| result.tax)
            .unwrap_or(Decimal::ZERO);
        let total_tax = federal.total_tax + state_tax;

        Ok(HouseholdTaxEstimate {
            request: request.clone(),
            federal,
            state,
            total_tax,
            effective_rate: effective_rate(total_tax, income),
        })
    }
}
