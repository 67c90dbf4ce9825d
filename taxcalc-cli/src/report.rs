//! Plain-text rendering of results for the terminal.

use std::fmt::Write;

use taxcalc_core::calculations::{HouseholdTaxEstimate, StateTaxResult, TaxComputationResult};
use taxcalc_core::{
    BracketSchedule, FilingStatusCode, Jurisdiction, StateCode, StateTaxTable, TaxTable, TaxType,
};

use crate::utils::{format_money, format_optional_money, format_rate};

const LABEL_WIDTH: usize = 16;

fn line(
    out: &mut String,
    label: &str,
    value: impl AsRef<str>,
) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{:<LABEL_WIDTH$}{}", format!("{label}:"), value.as_ref());
}

fn range(
    lower: rust_decimal::Decimal,
    upper: Option<rust_decimal::Decimal>,
) -> String {
    match upper {
        Some(upper) => format!("{} - {}", format_money(lower), format_money(upper)),
        None => format!("{} and up", format_money(lower)),
    }
}

pub fn federal(
    tax_year: i32,
    filing_status: FilingStatusCode,
    result: &TaxComputationResult,
) -> String {
    let mut out = String::new();
    line(&mut out, "Tax year", tax_year.to_string());
    line(&mut out, "Filing status", filing_status.as_str());
    line(&mut out, "Income", format_money(result.income));
    line(&mut out, "Federal tax", format_money(result.total_tax));
    line(&mut out, "Marginal rate", format_rate(result.marginal_rate));
    line(&mut out, "Effective rate", format_rate(result.effective_rate));

    if !result.breakdown.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:>7}  {:<30}  {:>16}  {:>14}", "Rate", "Bracket", "Taxed", "Tax");
        for slice in &result.breakdown {
            let _ = writeln!(
                out,
                "{:>7}  {:<30}  {:>16}  {:>14}",
                format_rate(Some(slice.rate)),
                range(slice.lower, slice.upper),
                format_money(slice.taxable_amount),
                format_money(slice.tax),
            );
        }
    }
    out
}

pub fn state(
    tax_year: i32,
    filing_status: FilingStatusCode,
    result: &StateTaxResult,
) -> String {
    let mut out = String::new();
    line(&mut out, "Tax year", tax_year.to_string());
    line(&mut out, "Filing status", filing_status.as_str());
    line(&mut out, "State", format!("{} ({})", result.name, result.state));
    line(&mut out, "Tax type", result.tax_type.as_str());
    line(&mut out, "Method", result.method.as_str());
    line(&mut out, "State tax", state_tax_text(result));
    out
}

fn state_tax_text(result: &StateTaxResult) -> String {
    match result.tax {
        Some(tax) => format_money(tax),
        None => "no bracket applies".to_string(),
    }
}

pub fn estimate(estimate: &HouseholdTaxEstimate) -> String {
    let request = &estimate.request;
    let mut out = String::new();
    line(&mut out, "Tax year", request.tax_year.to_string());
    line(&mut out, "Filing status", request.filing_status.as_str());
    line(&mut out, "Income", format_money(request.household_income));
    line(&mut out, "Federal tax", format_money(estimate.federal.total_tax));
    if let Some(state) = &estimate.state {
        let basis = match state.tax_type {
            TaxType::None => TaxType::None.as_str(),
            TaxType::Graduated | TaxType::Flat => state.method.as_str(),
        };
        line(
            &mut out,
            "State tax",
            format!("{} ({}, {basis})", state_tax_text(state), state.state),
        );
    }
    line(&mut out, "Total tax", format_money(estimate.total_tax));
    line(&mut out, "Effective rate", format_rate(estimate.effective_rate));
    out
}

pub fn schedule(
    tax_year: i32,
    jurisdiction: &Jurisdiction,
    filing_status: FilingStatusCode,
    schedule: &BracketSchedule,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{tax_year} {jurisdiction} brackets ({filing_status})");
    for bracket in schedule.brackets() {
        let _ = writeln!(
            out,
            "{:>7}  {}",
            format_rate(Some(bracket.rate)),
            range(bracket.lower, bracket.upper)
        );
    }
    out
}

pub fn untaxed_state(
    tax_year: i32,
    code: &StateCode,
    table: &StateTaxTable,
) -> String {
    format!("{tax_year} {code} brackets: {} has no income tax\n", table.name)
}

pub fn years(years: &[i32]) -> String {
    if years.is_empty() {
        return "no tax tables loaded\n".to_string();
    }
    years.iter().map(|year| format!("{year}\n")).collect()
}

pub fn states(
    tax_year: i32,
    table: &TaxTable,
) -> String {
    if table.states.is_empty() {
        return format!("no states in {tax_year}\n");
    }
    table
        .states
        .iter()
        .map(|(code, state)| format!("{code}  {:<10} {}\n", state.tax_type.as_str(), state.name))
        .collect()
}

pub fn validation(tables: &[TaxTable]) -> String {
    let mut out = String::new();
    for table in tables {
        let _ = writeln!(
            out,
            "{}: ok ({} brackets, {} states)",
            table.tax_year,
            table.bracket_count(),
            table.states.len()
        );
    }
    let _ = writeln!(out, "{} tax tables valid", tables.len());
    out
}
