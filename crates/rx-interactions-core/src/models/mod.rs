//! Domain models for drug-interaction checking.

mod check;
mod rule;
mod severity;

pub use check::*;
pub use rule::*;
pub use severity::*;

pub(crate) use check::UnsealedRecord;
