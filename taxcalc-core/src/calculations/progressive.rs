//! Progressive (marginal) tax over an ordered bracket list.
//!
//! Each bracket's rate applies only to the slice of income that falls
//! between its bounds. With the 2023 single-filer federal brackets, an
//! income of $50,000 is taxed as
//!
//! | Bracket            | Rate | Slice    | Tax     |
//! |--------------------|------|----------|---------|
//! | 0 – 11,000         | 10%  | 11,000   | 1,100   |
//! | 11,000 – 44,725    | 12%  | 33,725   | 4,047   |
//! | 44,725 – 95,375    | 22%  | 5,275    | 1,160.5 |
//!
//! for a total of 6,307.5.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxcalc_core::TaxBracket;
//! use taxcalc_core::calculations::compute_progressive_tax;
//!
//! let brackets = vec![
//!     TaxBracket::new(dec!(0.10), dec!(0), Some(dec!(11000))),
//!     TaxBracket::new(dec!(0.12), dec!(11000), Some(dec!(44725))),
//!     TaxBracket::new(dec!(0.22), dec!(44725), Some(dec!(95375))),
//!     TaxBracket::new(dec!(0.24), dec!(95375), None),
//! ];
//!
//! assert_eq!(compute_progressive_tax(dec!(50000), &brackets), dec!(6307.5));
//! ```

use std::slice;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TaxBracket;

/// The part of an income taxed inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Position of the bracket in its schedule.
    pub index: usize,
    pub rate: Decimal,
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

/// Iterator over the taxed slices of an income, see [`progressive_slices`].
#[derive(Debug, Clone)]
pub struct ProgressiveSlices<'a> {
    brackets: std::iter::Enumerate<slice::Iter<'a, TaxBracket>>,
    remaining: Decimal,
}

impl Iterator for ProgressiveSlices<'_> {
    type Item = BracketSlice;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, bracket) in self.brackets.by_ref() {
            if self.remaining <= bracket.lower {
                continue;
            }

            let ceiling = match bracket.upper {
                Some(upper) => self.remaining.min(upper),
                None => self.remaining,
            };
            let taxable_amount = ceiling - bracket.lower;

            // Income at or below this bracket's top is fully taxed; zeroing it
            // keeps a non-monotonic table from taxing the same slice twice.
            if bracket.upper.is_none_or(|upper| self.remaining <= upper) {
                self.remaining = Decimal::ZERO;
            }

            return Some(BracketSlice {
                index,
                rate: bracket.rate,
                lower: bracket.lower,
                upper: bracket.upper,
                taxable_amount,
                tax: taxable_amount * bracket.rate,
            });
        }
        None
    }
}

/// Walks `brackets` in order and yields the slice of `income` taxed in each.
///
/// Brackets that receive no income are skipped. Expects `brackets` ascending
/// and contiguous; see [`compute_progressive_tax`].
pub fn progressive_slices(
    income: Decimal,
    brackets: &[TaxBracket],
) -> ProgressiveSlices<'_> {
    ProgressiveSlices {
        brackets: brackets.iter().enumerate(),
        remaining: income,
    }
}

/// Total progressive tax on `income`.
///
/// `brackets` must be sorted ascending by `lower` with each `lower` equal to
/// the previous `upper`, and only the last bracket unbounded. This is not
/// checked here: a malformed list yields a wrong total rather than an error.
/// Build a [`BracketSchedule`](crate::BracketSchedule) to have the list
/// validated up front.
///
/// A bracket's upper bound is inclusive: an income exactly on a boundary is
/// taxed entirely by the brackets up to and including that boundary.
pub fn compute_progressive_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    progressive_slices(income, brackets)
        .map(|slice| slice.tax)
        .sum()
}

/// Rate applied to the last dollar of `income`.
///
/// `None` when no part of `income` is taxed (zero income, or income at or
/// below the first bracket's floor).
pub fn marginal_rate(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Option<Decimal> {
    progressive_slices(income, brackets)
        .last()
        .map(|slice| slice.rate)
}
