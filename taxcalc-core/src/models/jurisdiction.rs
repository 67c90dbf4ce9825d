use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a two-letter state key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid state code '{0}': expected two ASCII letters")]
pub struct InvalidStateCode(pub String);

/// Two-letter state key used to select a state bracket table (e.g. `CA`).
///
/// Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    pub fn parse(s: &str) -> Result<Self, InvalidStateCode> {
        let trimmed = s.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidStateCode(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StateCode {
    type Error = InvalidStateCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The taxing authority a bracket schedule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Jurisdiction {
    Federal,
    State(StateCode),
}

impl Jurisdiction {
    /// Parses `federal` (any case) or a two-letter state key.
    pub fn parse(s: &str) -> Result<Self, InvalidStateCode> {
        if s.trim().eq_ignore_ascii_case("federal") {
            Ok(Self::Federal)
        } else {
            StateCode::parse(s).map(Self::State)
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Federal => f.write_str("federal"),
            Self::State(code) => fmt::Display::fmt(code, f),
        }
    }
}

/// How a state levies income tax, as declared by the bracket data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    Graduated,
    Flat,
    None,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Graduated => "graduated",
            Self::Flat => "flat",
            Self::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graduated" => Some(Self::Graduated),
            "flat" => Some(Self::Flat),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}
