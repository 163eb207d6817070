//! Domain models for chemo-care.

mod profile;
mod record;
mod reference;

pub use profile::*;
pub use record::*;
pub use reference::*;
