//! Validated bracket schedules.
//!
//! A [`BracketSchedule`] is the only way bracket data reaches the
//! calculators outside of tests: construction checks that the brackets are
//! ordered, contiguous, end in a single unbounded bracket and carry
//! non-decreasing rates in `[0, 1]`. Tables that break any of these rules
//! are rejected instead of producing wrong tax figures later.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TaxBracket;

/// Reasons a bracket list is not a valid progressive schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketScheduleError {
    #[error("bracket schedule is empty")]
    Empty,

    #[error("bracket {index}: rate {rate} is outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },

    #[error("first bracket starts at negative amount {0}")]
    NegativeLowerBound(Decimal),

    #[error("bracket {index}: upper bound does not exceed lower bound")]
    InvertedBounds { index: usize },

    #[error("bracket {index}: lower bound {found} does not continue previous upper bound {expected}")]
    NotContiguous {
        index: usize,
        expected: Decimal,
        found: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeLast { index: usize },

    #[error("last bracket must be unbounded")]
    BoundedTopBracket,

    #[error("bracket {index}: rate decreases from the previous bracket")]
    DecreasingRate { index: usize },
}

/// Ordered, contiguous brackets for one jurisdiction and filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    /// Validates `brackets` and wraps them.
    ///
    /// # Errors
    ///
    /// Returns the first [`BracketScheduleError`] found, scanning in order.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketScheduleError> {
        let first = brackets.first().ok_or(BracketScheduleError::Empty)?;
        if first.lower < Decimal::ZERO {
            return Err(BracketScheduleError::NegativeLowerBound(first.lower));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketScheduleError::RateOutOfRange {
                    index,
                    rate: bracket.rate,
                });
            }

            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(BracketScheduleError::InvertedBounds { index });
                }
                Some(_) if index == last_index => {
                    return Err(BracketScheduleError::BoundedTopBracket);
                }
                None if index != last_index => {
                    return Err(BracketScheduleError::UnboundedBeforeLast { index });
                }
                _ => {}
            }

            if index > 0 {
                let previous = &brackets[index - 1];
                // Checked above: every bracket before the last is bounded.
                let expected = previous.upper.unwrap_or(previous.lower);
                if bracket.lower != expected {
                    return Err(BracketScheduleError::NotContiguous {
                        index,
                        expected,
                        found: bracket.lower,
                    });
                }
                if bracket.rate < previous.rate {
                    return Err(BracketScheduleError::DecreasingRate { index });
                }
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// Whether the schedule has no brackets; never true once constructed.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Rate of the unbounded top bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|bracket| bracket.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// The bracket that contains `income`, if any.
    pub fn bracket_for(
        &self,
        income: Decimal,
    ) -> Option<&TaxBracket> {
        self.brackets.iter().find(|bracket| bracket.contains(income))
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketSchedule {
    type Error = BracketScheduleError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<TaxBracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}

impl AsRef<[TaxBracket]> for BracketSchedule {
    fn as_ref(&self) -> &[TaxBracket] {
        &self.brackets
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket(
        rate: Decimal,
        lower: Decimal,
        upper: Option<Decimal>,
    ) -> TaxBracket {
        TaxBracket::new(rate, lower, upper)
    }

    fn valid_brackets() -> Vec<TaxBracket> {
        vec![
            bracket(dec!(0.10), dec!(0), Some(dec!(11000))),
            bracket(dec!(0.12), dec!(11000), Some(dec!(44725))),
            bracket(dec!(0.22), dec!(44725), None),
        ]
    }

    // =========================================================================
    // accepted schedules
    // =========================================================================

    #[test]
    fn accepts_contiguous_ascending_schedule() {
        let schedule = BracketSchedule::new(valid_brackets()).unwrap();

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.top_rate(), dec!(0.22));
        assert!(!schedule.is_empty());
    }

    #[test]
    fn accepts_single_unbounded_bracket() {
        let schedule = BracketSchedule::new(vec![bracket(dec!(0.0495), dec!(0), None)]).unwrap();

        assert_eq!(schedule.brackets().len(), 1);
    }

    #[test]
    fn accepts_equal_adjacent_rates() {
        let brackets = vec![
            bracket(dec!(0.05), dec!(0), Some(dec!(1000))),
            bracket(dec!(0.05), dec!(1000), None),
        ];

        assert!(BracketSchedule::new(brackets).is_ok());
    }

    #[test]
    fn bracket_for_finds_containing_bracket() {
        let schedule = BracketSchedule::new(valid_brackets()).unwrap();

        assert_eq!(schedule.bracket_for(dec!(50000)).unwrap().rate, dec!(0.22));
        assert_eq!(schedule.bracket_for(dec!(11000)).unwrap().rate, dec!(0.10));
        assert!(schedule.bracket_for(dec!(0)).is_none());
    }

    // =========================================================================
    // rejected schedules
    // =========================================================================

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(BracketSchedule::new(vec![]), Err(BracketScheduleError::Empty));
    }

    #[test]
    fn rejects_rate_above_one() {
        let mut brackets = valid_brackets();
        brackets[1].rate = dec!(1.2);

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::RateOutOfRange {
                index: 1,
                rate: dec!(1.2)
            })
        );
    }

    #[test]
    fn rejects_negative_rate() {
        let mut brackets = valid_brackets();
        brackets[0].rate = dec!(-0.1);

        assert!(matches!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::RateOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_negative_first_lower_bound() {
        let mut brackets = valid_brackets();
        brackets[0].lower = dec!(-5);

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::NegativeLowerBound(dec!(-5)))
        );
    }

    #[test]
    fn rejects_gap_between_brackets() {
        let mut brackets = valid_brackets();
        brackets[1].lower = dec!(12000);

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::NotContiguous {
                index: 1,
                expected: dec!(11000),
                found: dec!(12000),
            })
        );
    }

    #[test]
    fn rejects_out_of_order_brackets() {
        let mut brackets = valid_brackets();
        brackets.swap(0, 1);

        assert!(BracketSchedule::new(brackets).is_err());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let brackets = vec![
            bracket(dec!(0.10), dec!(500), Some(dec!(100))),
            bracket(dec!(0.12), dec!(100), None),
        ];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::InvertedBounds { index: 0 })
        );
    }

    #[test]
    fn rejects_unbounded_bracket_before_last() {
        let brackets = vec![
            bracket(dec!(0.10), dec!(0), None),
            bracket(dec!(0.12), dec!(11000), None),
        ];

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::UnboundedBeforeLast { index: 0 })
        );
    }

    #[test]
    fn rejects_bounded_top_bracket() {
        let mut brackets = valid_brackets();
        brackets[2].upper = Some(dec!(95375));

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::BoundedTopBracket)
        );
    }

    #[test]
    fn rejects_decreasing_rate() {
        let mut brackets = valid_brackets();
        brackets[2].rate = dec!(0.11);

        assert_eq!(
            BracketSchedule::new(brackets),
            Err(BracketScheduleError::DecreasingRate { index: 2 })
        );
    }

    // =========================================================================
    // serde
    // =========================================================================

    #[test]
    fn deserialization_validates_the_schedule() {
        let good = r#"[
            {"rate": 0.05, "lower": 0, "upper": 10000},
            {"rate": 0.07, "lower": 10000, "upper": null}
        ]"#;
        let gap = r#"[
            {"rate": 0.05, "lower": 0, "upper": 10000},
            {"rate": 0.07, "lower": 20000, "upper": null}
        ]"#;

        let schedule: BracketSchedule = serde_json::from_str(good).unwrap();
        assert_eq!(schedule.len(), 2);

        let rejected: Result<BracketSchedule, _> = serde_json::from_str(gap);
        assert!(rejected.is_err());
    }
}
