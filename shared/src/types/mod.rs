//! Type definitions shared between crates

pub mod log_level;

pub use log_level::LogLevel;
