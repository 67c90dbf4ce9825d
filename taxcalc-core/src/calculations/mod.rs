//! Income tax calculations.
//!
//! [`progressive`] and [`state`] hold the pure bracket arithmetic.
//! [`calculator`] wraps it for validated schedules, and [`household`]
//! combines federal and state tax using schedules read from a
//! [`TaxRepository`](crate::TaxRepository).

pub mod calculator;
pub mod common;
pub mod household;
pub mod progressive;
pub mod state;

pub use calculator::{CalculationError, TaxComputationInput, TaxComputationResult};
pub use household::{
    EstimateError, HouseholdTaxEstimate, HouseholdTaxEstimator, HouseholdTaxRequest, StateTaxResult,
};
pub use progressive::{BracketSlice, compute_progressive_tax, marginal_rate, progressive_slices};
pub use state::{StateTaxMethod, compute_state_tax};
