//! Rounding and rate helpers shared by the calculators and their callers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds an amount to cents, halves away from zero.
///
/// Calculations stay exact; this is applied when amounts are presented.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxcalc_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1160.505)), dec!(1160.51));
/// assert_eq!(round_half_up(dec!(6307.5)), dec!(6307.50));
/// assert_eq!(round_half_up(dec!(-2.345)), dec!(-2.35));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Effective tax rate, `total_tax / income`.
///
/// Returns `None` when `income` is zero or negative, where no meaningful
/// rate exists.
///
/// ```
/// use rust_decimal_macros::dec;
/// use taxcalc_core::calculations::common::effective_rate;
///
/// assert_eq!(effective_rate(dec!(500), dec!(5000)), Some(dec!(0.1)));
/// assert_eq!(effective_rate(dec!(0), dec!(0)), None);
/// ```
pub fn effective_rate(
    total_tax: Decimal,
    income: Decimal,
) -> Option<Decimal> {
    if income <= Decimal::ZERO {
        return None;
    }
    total_tax.checked_div(income)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(4047.004)), dec!(4047.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(1160.505)), dec!(1160.51));
    }

    #[test]
    fn round_half_up_rounds_negative_midpoint_away_from_zero() {
        assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn round_half_up_keeps_whole_amounts() {
        assert_eq!(round_half_up(dec!(500)), dec!(500));
    }

    // =========================================================================
    // effective_rate tests
    // =========================================================================

    #[test]
    fn effective_rate_divides_tax_by_income() {
        assert_eq!(effective_rate(dec!(6307.5), dec!(50000)), Some(dec!(0.12615)));
    }

    #[test]
    fn effective_rate_is_none_for_zero_income() {
        assert_eq!(effective_rate(dec!(0), dec!(0)), None);
    }

    #[test]
    fn effective_rate_is_none_for_negative_income() {
        assert_eq!(effective_rate(dec!(10), dec!(-100)), None);
    }

    #[test]
    fn effective_rate_is_zero_when_no_tax_owed() {
        assert_eq!(effective_rate(dec!(0), dec!(1000)), Some(dec!(0)));
    }
}
