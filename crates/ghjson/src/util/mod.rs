//! Utility modules for ghjson.

pub mod number;
pub mod priority;

pub use number::{decimal_places, format_fixed, format_number, parse_number};
pub use priority::{PriorityList, Ranked};
