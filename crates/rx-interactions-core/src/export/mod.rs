//! Flat-record serialization and audit export.

mod audit;
mod flat;

pub use audit::*;
pub use flat::*;
