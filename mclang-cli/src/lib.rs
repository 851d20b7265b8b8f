//! CLI library for testing purposes

pub mod prefs;
pub mod scan;
pub mod validation;

pub use prefs::Preferences;
pub use scan::{ScanOptions, resolve_run_options, run_scan_command};
