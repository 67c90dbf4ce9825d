use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BracketSchedule, FilingStatusCode, StateCode, TaxType};

/// Reasons a tax table is incomplete or inconsistent with its tax types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxTableError {
    #[error("tax year {tax_year}: no federal schedule for filing status '{filing_status}'")]
    MissingFederalSchedule {
        tax_year: i32,
        filing_status: FilingStatusCode,
    },

    #[error("tax year {tax_year}: state {state} has no schedule for filing status '{filing_status}'")]
    MissingStateSchedule {
        tax_year: i32,
        state: StateCode,
        filing_status: FilingStatusCode,
    },

    #[error("tax year {tax_year}: state {state} is flat but its '{filing_status}' schedule has {count} brackets")]
    FlatStateWithMultipleBrackets {
        tax_year: i32,
        state: StateCode,
        filing_status: FilingStatusCode,
        count: usize,
    },

    #[error("tax year {tax_year}: state {state} has no income tax but lists brackets")]
    UntaxedStateWithBrackets { tax_year: i32, state: StateCode },
}

/// Income-tax rules of one state for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTaxTable {
    pub name: String,
    pub tax_type: TaxType,
    #[serde(default)]
    pub brackets: BTreeMap<FilingStatusCode, BracketSchedule>,
}

impl StateTaxTable {
    pub fn schedule(
        &self,
        filing_status: FilingStatusCode,
    ) -> Option<&BracketSchedule> {
        self.brackets.get(&filing_status)
    }
}

/// Every bracket schedule known for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    pub tax_year: i32,
    pub federal: BTreeMap<FilingStatusCode, BracketSchedule>,
    #[serde(default)]
    pub states: BTreeMap<StateCode, StateTaxTable>,
}

impl TaxTable {
    pub fn federal_schedule(
        &self,
        filing_status: FilingStatusCode,
    ) -> Option<&BracketSchedule> {
        self.federal.get(&filing_status)
    }

    pub fn state(
        &self,
        state: &StateCode,
    ) -> Option<&StateTaxTable> {
        self.states.get(state)
    }

    /// Total number of brackets across the federal and state schedules.
    pub fn bracket_count(&self) -> usize {
        let federal: usize = self.federal.values().map(BracketSchedule::len).sum();
        let states: usize = self
            .states
            .values()
            .flat_map(|state| state.brackets.values())
            .map(BracketSchedule::len)
            .sum();
        federal + states
    }

    /// Checks that every filing status is covered and that each state's
    /// brackets agree with its declared [`TaxType`].
    ///
    /// Individual schedules are already valid by construction; this only
    /// checks the table as a whole.
    pub fn validate(&self) -> Result<(), TaxTableError> {
        for filing_status in FilingStatusCode::ALL {
            if !self.federal.contains_key(&filing_status) {
                return Err(TaxTableError::MissingFederalSchedule {
                    tax_year: self.tax_year,
                    filing_status,
                });
            }
        }

        for (code, state) in &self.states {
            match state.tax_type {
                TaxType::None => {
                    if !state.brackets.is_empty() {
                        return Err(TaxTableError::UntaxedStateWithBrackets {
                            tax_year: self.tax_year,
                            state: code.clone(),
                        });
                    }
                }
                TaxType::Graduated | TaxType::Flat => {
                    for filing_status in FilingStatusCode::ALL {
                        let schedule = state.schedule(filing_status).ok_or_else(|| {
                            TaxTableError::MissingStateSchedule {
                                tax_year: self.tax_year,
                                state: code.clone(),
                                filing_status,
                            }
                        })?;
                        if state.tax_type == TaxType::Flat && schedule.len() > 1 {
                            return Err(TaxTableError::FlatStateWithMultipleBrackets {
                                tax_year: self.tax_year,
                                state: code.clone(),
                                filing_status,
                                count: schedule.len(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
