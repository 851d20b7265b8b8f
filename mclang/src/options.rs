//! Options for a batch run.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

pub const DEFAULT_REFERENCE_LANG: &str = "en_us";
pub const DEFAULT_TARGET_LANG: &str = "ru_ru";
pub const DEFAULT_EXTENSION: &str = "jar";

/// Cooperative stop request, checked by the batch runner between mods.
///
/// Clones share the same flag, so a front end can keep one and hand another
/// to [`RunOptions`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the batch runner needs to know about one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory scanned (non-recursively) for mod archives.
    pub input_dir: PathBuf,
    /// Root under which one folder per mod is written.
    pub output_dir: PathBuf,
    /// Language code being checked, e.g. `ru_ru`.
    pub target_lang: String,
    /// Language code of the authoritative key set.
    pub reference_lang: String,
    /// Archive file extensions to pick up, without the dot.
    pub extensions: Vec<String>,
    pub cancel: CancelFlag,
}

impl RunOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        RunOptions {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            reference_lang: DEFAULT_REFERENCE_LANG.to_string(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            cancel: CancelFlag::default(),
        }
    }

    /// Sets the target language code. Minecraft file names are lowercase, so
    /// the code is lowercased.
    pub fn with_target_lang(mut self, lang: impl AsRef<str>) -> Self {
        self.target_lang = lang.as_ref().trim().to_ascii_lowercase();
        self
    }

    pub fn with_reference_lang(mut self, lang: impl AsRef<str>) -> Self {
        self.reference_lang = lang.as_ref().trim().to_ascii_lowercase();
        self
    }

    /// Replaces the archive extension filter. An empty list keeps the default.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if !extensions.is_empty() {
            self.extensions = extensions;
        }
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// File name used for the target document, e.g. `ru_ru.json`.
    pub fn target_file_name(&self) -> String {
        format!("{}.json", self.target_lang)
    }

    /// File name used for the reference document, e.g. `en_us.json`.
    pub fn reference_file_name(&self) -> String {
        format!("{}.json", self.reference_lang)
    }
}
