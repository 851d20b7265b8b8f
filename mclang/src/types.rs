//! Core types shared by the reader, parser, diff engine, and batch runner.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered mapping from translation key to translated text.
///
/// Iteration order is the order keys appeared in the source document, which is
/// what makes diffs and written reports reproducible. Deserialization lives in
/// [`crate::parser`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslationMap(IndexMap<String, String>);

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a pair, returning the previous value for `key` if there was one.
    ///
    /// A re-inserted key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TranslationMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Keys missing (or blank) in a target translation, each paired with the
/// reference text a translator needs to translate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffResult(IndexMap<String, String>);

impl DiffResult {
    pub(crate) fn push(&mut self, key: &str, reference_text: &str) {
        self.0.insert(key.to_string(), reference_text.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A single input package file and the mod identifier derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModArchive {
    pub path: PathBuf,
    pub mod_id: String,
}

impl ModArchive {
    /// Builds a `ModArchive` from a path; the mod identifier is the file name
    /// without its package extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mod_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        ModArchive {
            path: path.to_path_buf(),
            mod_id,
        }
    }
}

/// Per-mod result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModOutcome {
    /// Every reference key has a non-blank translation.
    Complete,
    /// Some keys are missing; the report was written.
    Partial { missing: usize },
    /// Some keys are missing but the report could not be written.
    Unwritten { missing: usize, reason: String },
    /// Nothing to compare: unreadable archive or no reference resource.
    Skipped { reason: String },
    /// The reference resource exists but could not be parsed.
    Malformed { reason: String },
}

impl ModOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ModOutcome::Complete => "complete",
            ModOutcome::Partial { .. } => "partial",
            ModOutcome::Unwritten { .. } => "unwritten",
            ModOutcome::Skipped { .. } => "skipped",
            ModOutcome::Malformed { .. } => "malformed",
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ModOutcome::Complete)
    }

    /// Number of missing keys, when a diff was computed.
    pub fn missing(&self) -> Option<usize> {
        match self {
            ModOutcome::Partial { missing } | ModOutcome::Unwritten { missing, .. } => {
                Some(*missing)
            }
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ModOutcome::Unwritten { reason, .. }
            | ModOutcome::Skipped { reason }
            | ModOutcome::Malformed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl Display for ModOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModOutcome::Complete => write!(f, "complete"),
            ModOutcome::Partial { missing } => write!(f, "{} missing key(s)", missing),
            ModOutcome::Unwritten { missing, reason } => {
                write!(f, "{} missing key(s), report not written: {}", missing, reason)
            }
            ModOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
            ModOutcome::Malformed { reason } => write!(f, "malformed: {}", reason),
        }
    }
}

/// What happened to one mod during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModReport {
    pub mod_id: String,
    pub archive: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub outcome: ModOutcome,
    pub reference_keys: usize,
    pub target_keys: usize,
}

impl ModReport {
    pub(crate) fn new(archive: &ModArchive, outcome: ModOutcome) -> Self {
        ModReport {
            mod_id: archive.mod_id.clone(),
            archive: archive.path.clone(),
            namespace: None,
            outcome,
            reference_keys: 0,
            target_keys: 0,
        }
    }
}

/// Totals for a whole run, plus the reports of every mod that was not
/// fully translated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub complete: usize,
    pub partial: usize,
    pub unwritten: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub cancelled: bool,
    pub reports: Vec<ModReport>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: ModReport) {
        self.scanned += 1;
        match report.outcome {
            ModOutcome::Complete => {
                self.complete += 1;
                return;
            }
            ModOutcome::Partial { .. } => self.partial += 1,
            ModOutcome::Unwritten { .. } => self.unwritten += 1,
            ModOutcome::Skipped { .. } => self.skipped += 1,
            ModOutcome::Malformed { .. } => self.malformed += 1,
        }
        self.reports.push(report);
    }

    /// Mods that produced no diff at all.
    pub fn skipped_or_malformed(&self) -> usize {
        self.skipped + self.malformed
    }

    /// Mod identifiers with the given outcome label, in processing order.
    pub fn mods_with(&self, label: &str) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.outcome.label() == label)
            .map(|r| r.mod_id.as_str())
            .collect()
    }

    pub fn find(&self, mod_id: &str) -> Option<&ModReport> {
        self.reports.iter().find(|r| r.mod_id == mod_id)
    }
}
