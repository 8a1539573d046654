//! Utility functions for display formatting.

pub mod format;

pub use format::{format_date, format_datetime, format_energy, format_optional_datetime, truncate_string};
