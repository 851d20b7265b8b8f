//! Seams of the pipeline: where archive bytes come from and where progress
//! goes.

use std::{fs, path::Path};

use crate::{
    error::Error,
    types::{ModOutcome, ModReport, RunSummary},
};

/// A trait for decoding a translation document from raw bytes.
///
/// # Example
///
/// ```rust
/// use mclang::{TranslationMap, traits::Parser};
/// let map = TranslationMap::from_str(r#"{"block.foo.bar": "Bar"}"#)?;
/// assert_eq!(map.get("block.foo.bar"), Some("Bar"));
/// Ok::<(), mclang::Error>(())
/// ```
pub trait Parser {
    /// Parse from raw bytes (any supported text encoding).
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let bytes = fs::read(path).map_err(Error::Io)?;
        Self::from_bytes(&bytes)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_bytes(s.as_bytes())
    }
}

/// Anything that can list entry names and hand out entry bytes.
///
/// Implemented by [`crate::archive::JarArchive`] for real mod packages and by
/// [`crate::archive::MemoryArchive`] for fixtures.
///
/// # Example
///
/// ```rust
/// use mclang::archive::MemoryArchive;
/// use mclang::traits::ArchiveSource;
///
/// let mut archive = MemoryArchive::new()
///     .with_entry("assets/foo/lang/en_us.json", r#"{"a":"Hi"}"#);
/// assert_eq!(archive.entry_names(), vec!["assets/foo/lang/en_us.json"]);
/// assert!(archive.read_entry("missing.json").is_err());
/// ```
pub trait ArchiveSource {
    /// All entry names in archive order.
    fn entry_names(&self) -> Vec<String>;

    /// Raw bytes of `name`, or [`Error::EntryNotFound`].
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, Error>;
}

/// Something that happened during a batch run.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// Archives were enumerated and processing is about to begin.
    Started { input_dir: &'a Path, archives: usize },
    /// Processing of one mod begins. `index` is zero-based.
    ModStarted {
        index: usize,
        total: usize,
        mod_id: &'a str,
    },
    /// A recoverable problem that does not change the mod's outcome category.
    Warning { mod_id: &'a str, message: String },
    /// One mod is done.
    ModFinished(&'a ModReport),
    /// The run was stopped between mods.
    Cancelled { remaining: usize },
    /// The run is over.
    Finished(&'a RunSummary),
}

/// Receives [`ProgressEvent`]s in order. Front ends adapt this to whatever
/// they display.
pub trait ProgressSink {
    fn on_event(&mut self, event: ProgressEvent<'_>);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent<'_>),
{
    fn on_event(&mut self, event: ProgressEvent<'_>) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&mut self, _event: ProgressEvent<'_>) {}
}

/// Forwards events to `tracing`, one line per mod outcome plus a summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_event(&mut self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started {
                input_dir,
                archives,
            } => {
                tracing::info!(event = "run_started", input_dir = %input_dir.display(), archives);
            }
            ProgressEvent::ModStarted {
                index,
                total,
                mod_id,
            } => {
                tracing::debug!(event = "mod_started", mod_id, index = index + 1, total);
            }
            ProgressEvent::Warning { mod_id, message } => {
                tracing::warn!(event = "mod_warning", mod_id, "{}", message);
            }
            ProgressEvent::ModFinished(report) => match &report.outcome {
                ModOutcome::Complete => {
                    tracing::info!(event = "mod_complete", mod_id = %report.mod_id, "all keys translated");
                }
                ModOutcome::Partial { .. } => {
                    tracing::info!(event = "mod_partial", mod_id = %report.mod_id, "{}", report.outcome);
                }
                other => {
                    tracing::warn!(event = "mod_not_diffed", mod_id = %report.mod_id, outcome = other.label(), "{}", other);
                }
            },
            ProgressEvent::Cancelled { remaining } => {
                tracing::warn!(event = "run_cancelled", remaining);
            }
            ProgressEvent::Finished(summary) => {
                tracing::info!(
                    event = "run_finished",
                    scanned = summary.scanned,
                    complete = summary.complete,
                    partial = summary.partial,
                    unwritten = summary.unwritten,
                    skipped = summary.skipped,
                    malformed = summary.malformed
                );
            }
        }
    }
}
