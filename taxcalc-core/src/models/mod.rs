mod bracket_schedule;
mod filing_status;
mod jurisdiction;
mod tax_bracket;
mod tax_table;

pub use bracket_schedule::{BracketSchedule, BracketScheduleError};
pub use filing_status::FilingStatusCode;
pub use jurisdiction::{InvalidStateCode, Jurisdiction, StateCode, TaxType};
pub use tax_bracket::TaxBracket;
pub use tax_table::{StateTaxTable, TaxTable, TaxTableError};
