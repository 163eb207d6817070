//! Export functionality.

mod csv;

pub use csv::*;
