#![forbid(unsafe_code)]
//! Find untranslated keys in Minecraft mod packages.
//!
//! For every mod archive (`.jar`) in a directory, the English reference
//! document (`assets/<namespace>/lang/en_us.json`) is compared against a
//! target-language document (for example `ru_ru.json`). Keys that are missing
//! or blank in the target are written to `<output>/<mod_id>/diff.json`
//! together with both source documents; fully translated mods leave no output
//! behind.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mclang::{RunOptions, batch, traits::LogSink};
//!
//! let opts = RunOptions::new("mods", "output").with_target_lang("zh_cn");
//! let summary = batch::run(&opts, &mut LogSink)?;
//! for report in &summary.reports {
//!     println!("{}: {}", report.mod_id, report.outcome);
//! }
//! # Ok::<(), mclang::Error>(())
//! ```
//!
//! The pieces can also be used on their own:
//!
//! ```rust
//! use mclang::{diff, parse};
//!
//! let reference = parse(br#"{"a": "Hi"}"#)?;
//! let target = parse(b"")?;
//! assert_eq!(diff(&reference, &target).get("a"), Some("Hi"));
//! # Ok::<(), mclang::Error>(())
//! ```

pub mod archive;
pub mod batch;
pub mod diff;
pub mod error;
pub mod options;
pub mod parser;
pub mod report;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    archive::{JarArchive, LangResources, MemoryArchive, locate_resources},
    batch::run,
    diff::diff,
    error::Error,
    options::{CancelFlag, RunOptions},
    parser::parse,
    traits::{ArchiveSource, LogSink, NullSink, ProgressEvent, ProgressSink},
    types::{DiffResult, ModArchive, ModOutcome, ModReport, RunSummary, TranslationMap},
};
