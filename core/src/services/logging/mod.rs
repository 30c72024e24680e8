//! Audit logging: a level-filtered, size-rotated, append-only file writer.

mod rotating;

#[cfg(test)]
mod tests;

pub use hl_shared::types::LogLevel;
pub use rotating::{format_entry, RotatingLogger};
