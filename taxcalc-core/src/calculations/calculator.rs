//! Validated entry point for a single progressive tax computation.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxcalc_core::{BracketSchedule, TaxBracket};
//! use taxcalc_core::calculations::TaxComputationInput;
//!
//! let schedule = BracketSchedule::new(vec![
//!     TaxBracket::new(dec!(0.10), dec!(0), Some(dec!(11000))),
//!     TaxBracket::new(dec!(0.12), dec!(11000), Some(dec!(44725))),
//!     TaxBracket::new(dec!(0.22), dec!(44725), None),
//! ])
//! .unwrap();
//!
//! let result = TaxComputationInput::new(dec!(50000), &schedule).compute().unwrap();
//!
//! assert_eq!(result.total_tax, dec!(6307.5));
//! assert_eq!(result.marginal_rate, Some(dec!(0.22)));
//! assert_eq!(result.effective_rate, Some(dec!(0.12615)));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::effective_rate;
use crate::calculations::progressive::{BracketSlice, progressive_slices};
use crate::models::BracketSchedule;

/// Errors raised before a computation is attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("income must be non-negative, got {0}")]
    NegativeIncome(Decimal),
}

/// One income to tax under one schedule.
#[derive(Debug, Clone, Copy)]
pub struct TaxComputationInput<'a> {
    pub income: Decimal,
    pub schedule: &'a BracketSchedule,
}

/// Outcome of [`TaxComputationInput::compute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    pub income: Decimal,
    pub total_tax: Decimal,
    /// Rate on the last dollar; `None` when nothing was taxed.
    pub marginal_rate: Option<Decimal>,
    /// `total_tax / income`; `None` for zero income.
    pub effective_rate: Option<Decimal>,
    /// Taxed slice per bracket, lowest bracket first.
    pub breakdown: Vec<BracketSlice>,
}

impl<'a> TaxComputationInput<'a> {
    pub fn new(
        income: Decimal,
        schedule: &'a BracketSchedule,
    ) -> Self {
        Self { income, schedule }
    }

    /// Computes total tax, marginal and effective rates, and the per-bracket
    /// breakdown.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::NegativeIncome`] if `income` is below zero.
    pub fn compute(&self) -> Result<TaxComputationResult, CalculationError> {
        if self.income < Decimal::ZERO {
            return Err(CalculationError::NegativeIncome(self.income));
        }

        let breakdown: Vec<BracketSlice> =
            progressive_slices(self.income, self.schedule.brackets()).collect();
        let total_tax: Decimal = breakdown.iter().map(|slice| slice.tax).sum();
        let marginal_rate = breakdown.last().map(|slice| slice.rate);

        debug!(
            income = %self.income,
            %total_tax,
            brackets_used = breakdown.len(),
            "computed progressive tax"
        );

        Ok(TaxComputationResult {
            income: self.income,
            total_tax,
            marginal_rate,
            effective_rate: effective_rate(total_tax, self.income),
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::progressive::compute_progressive_tax;
    use crate::models::TaxBracket;

    fn schedule_married_2023() -> BracketSchedule {
        BracketSchedule::new(vec![
            TaxBracket::new(dec!(0.10), dec!(0), Some(dec!(22000))),
            TaxBracket::new(dec!(0.12), dec!(22000), Some(dec!(89450))),
            TaxBracket::new(dec!(0.22), dec!(89450), Some(dec!(190750))),
            TaxBracket::new(dec!(0.24), dec!(190750), Some(dec!(364200))),
            TaxBracket::new(dec!(0.32), dec!(364200), Some(dec!(462500))),
            TaxBracket::new(dec!(0.35), dec!(462500), Some(dec!(693750))),
            TaxBracket::new(dec!(0.37), dec!(693750), None),
        ])
        .unwrap()
    }

    #[test]
    fn compute_matches_raw_progressive_tax() {
        let schedule = schedule_married_2023();

        for income in [dec!(0), dec!(1), dec!(22000), dec!(150000), dec!(2500000)] {
            let result = TaxComputationInput::new(income, &schedule).compute().unwrap();

            assert_eq!(
                result.total_tax,
                compute_progressive_tax(income, schedule.brackets())
            );
        }
    }

    #[test]
    fn compute_married_household() {
        let schedule = schedule_married_2023();

        let result = TaxComputationInput::new(dec!(100000), &schedule)
            .compute()
            .unwrap();

        // 2200 + 8094 + 10550 * 0.22
        assert_eq!(result.total_tax, dec!(12615));
        assert_eq!(result.marginal_rate, Some(dec!(0.22)));
        assert_eq!(result.effective_rate, Some(dec!(0.12615)));
        assert_eq!(result.breakdown.len(), 3);
    }

    #[test]
    fn compute_zero_income_has_no_rates() {
        let schedule = schedule_married_2023();

        let result = TaxComputationInput::new(dec!(0), &schedule).compute().unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.marginal_rate, None);
        assert_eq!(result.effective_rate, None);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn compute_rejects_negative_income() {
        let schedule = schedule_married_2023();

        assert_eq!(
            TaxComputationInput::new(dec!(-1), &schedule).compute(),
            Err(CalculationError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn breakdown_sums_to_total() {
        let schedule = schedule_married_2023();

        let result = TaxComputationInput::new(dec!(987654.32), &schedule)
            .compute()
            .unwrap();
        let slices_total: Decimal = result.breakdown.iter().map(|s| s.tax).sum();
        let taxed_income: Decimal = result.breakdown.iter().map(|s| s.taxable_amount).sum();

        assert_eq!(slices_total, result.total_tax);
        assert_eq!(taxed_income, dec!(987654.32));
    }
}
