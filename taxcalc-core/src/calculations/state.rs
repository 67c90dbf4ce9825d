//! State income tax.
//!
//! State tax is looked up rather than accumulated: the single bracket that
//! contains the income is found and its rate is applied to the whole income.
//! This holds even for states whose data is labelled `graduated`.
//! [`StateTaxMethod::Marginal`] is available for callers that want the
//! progressive treatment instead.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxcalc_core::TaxBracket;
//! use taxcalc_core::calculations::compute_state_tax;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0.05), dec!(0), Some(dec!(10000))),
//!     TaxBracket::new(dec!(0.07), dec!(10000), None),
//! ];
//!
//! assert_eq!(compute_state_tax(dec!(15000), &brackets), Some(dec!(1050)));
//! assert_eq!(compute_state_tax(dec!(0), &brackets), None);
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::progressive::compute_progressive_tax;
use crate::models::TaxBracket;

/// Flat-rate-by-bracket state tax.
///
/// Finds the first bracket with `lower < income <= upper` (`upper` of `None`
/// is unbounded) and returns `income * rate`. Returns `None` when no bracket
/// matches, which includes zero or negative income and an empty list.
pub fn compute_state_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Option<Decimal> {
    brackets
        .iter()
        .find(|bracket| bracket.contains(income))
        .map(|bracket| income * bracket.rate)
}

/// How a state bracket schedule is applied to an income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateTaxMethod {
    /// Matched bracket's rate on the entire income ([`compute_state_tax`]).
    #[default]
    Flat,
    /// Progressive, like federal tax.
    Marginal,
}

impl StateTaxMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Marginal => "marginal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "marginal" => Some(Self::Marginal),
            _ => None,
        }
    }

    /// Applies this method to `income`.
    ///
    /// Both methods return `None` when no bracket contains `income`.
    pub fn compute(
        &self,
        income: Decimal,
        brackets: &[TaxBracket],
    ) -> Option<Decimal> {
        match self {
            Self::Flat => compute_state_tax(income, brackets),
            Self::Marginal => brackets
                .iter()
                .any(|bracket| bracket.contains(income))
                .then(|| compute_progressive_tax(income, brackets)),
        }
    }
}

impl fmt::Display for StateTaxMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
