//! Shared building blocks: platform constraints, error taxonomy and integer helpers.

/// Platform constraints and small value types shared by every stage.
pub mod core;
/// Error taxonomy used by engine APIs.
pub mod error;
pub(crate) mod math;
