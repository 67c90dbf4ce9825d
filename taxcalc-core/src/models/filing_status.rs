use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatusCode {
    Single,
    Married,
}

impl FilingStatusCode {
    /// Every filing status a complete bracket table must cover.
    pub const ALL: [FilingStatusCode; 2] = [Self::Single, Self::Married];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
        }
    }

    /// Parses a filing status selector. Surrounding whitespace and case are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::Single),
            "married" => Some(Self::Married),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_known_codes() {
        assert_eq!(FilingStatusCode::parse("single"), Some(FilingStatusCode::Single));
        assert_eq!(FilingStatusCode::parse("married"), Some(FilingStatusCode::Married));
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(FilingStatusCode::parse("  Married "), Some(FilingStatusCode::Married));
        assert_eq!(FilingStatusCode::parse("SINGLE"), Some(FilingStatusCode::Single));
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(FilingStatusCode::parse("MFJ"), None);
        assert_eq!(FilingStatusCode::parse(""), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for code in FilingStatusCode::ALL {
            assert_eq!(FilingStatusCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&FilingStatusCode::Married).unwrap();

        assert_eq!(json, "\"married\"");
    }
}
