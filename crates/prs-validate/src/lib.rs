pub mod coerce;
pub mod validator;

pub use coerce::{parse_boolean, parse_date_iso, parse_number};
pub use validator::{ValidationResult, Validator};
