//! Post-encode checks over a finished tile batch.

/// Per-tile byte budget.
pub mod budget;
