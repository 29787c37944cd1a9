//! Pure validators used to gate form steps.
//!
//! Each function is total: bad input yields `false` or `None`, never a panic
//! or an error value.

mod date;
mod email;
mod phone;

pub use date::{format_date, parse_date, parse_date_relative_to, DATE_FORMAT};
pub use email::validate_email;
pub use phone::validate_phone;
