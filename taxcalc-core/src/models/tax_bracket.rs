use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate segment of a bracket schedule.
///
/// `upper` is `None` for the top, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Rate as a fraction (e.g. `0.22` for 22%).
    pub rate: Decimal,
    pub lower: Decimal,
    #[serde(default)]
    pub upper: Option<Decimal>,
}

impl TaxBracket {
    pub fn new(
        rate: Decimal,
        lower: Decimal,
        upper: Option<Decimal>,
    ) -> Self {
        Self { rate, lower, upper }
    }

    /// Whether `income` falls in this bracket: above `lower`, at or below `upper`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.lower && self.upper.is_none_or(|upper| income <= upper)
    }

    /// Width of the bracket, `None` when unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.upper.map(|upper| upper - self.lower)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn contains_excludes_lower_and_includes_upper() {
        let bracket = TaxBracket::new(dec!(0.12), dec!(11000), Some(dec!(44725)));

        assert!(!bracket.contains(dec!(11000)));
        assert!(bracket.contains(dec!(11000.01)));
        assert!(bracket.contains(dec!(44725)));
        assert!(!bracket.contains(dec!(44725.01)));
    }

    #[test]
    fn contains_is_open_ended_for_top_bracket() {
        let bracket = TaxBracket::new(dec!(0.37), dec!(578125), None);

        assert!(bracket.contains(dec!(100000000)));
        assert!(!bracket.contains(dec!(578125)));
    }

    #[test]
    fn width_of_bounded_and_unbounded_brackets() {
        assert_eq!(
            TaxBracket::new(dec!(0.10), dec!(0), Some(dec!(11000))).width(),
            Some(dec!(11000))
        );
        assert_eq!(TaxBracket::new(dec!(0.37), dec!(578125), None).width(), None);
    }

    #[test]
    fn deserializes_null_and_missing_upper_as_unbounded() {
        let explicit: TaxBracket =
            serde_json::from_str(r#"{"rate": 0.07, "lower": 10000, "upper": null}"#).unwrap();
        let missing: TaxBracket = serde_json::from_str(r#"{"rate": 0.07, "lower": 10000}"#).unwrap();

        assert_eq!(explicit.upper, None);
        assert_eq!(missing, explicit);
        assert_eq!(explicit.rate, dec!(0.07));
    }
}
