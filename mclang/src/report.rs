//! Writing per-mod reports and the run summary to disk.
//!
//! Layout under the output root:
//!
//! ```text
//! <output>/<mod_id>/en_us.json   reference document as read from the archive
//! <output>/<mod_id>/<lang>.json  target document ({} when the mod has none)
//! <output>/<mod_id>/diff.json    missing keys -> reference text
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::Error,
    options::RunOptions,
    types::{DiffResult, RunSummary, TranslationMap},
};

pub const DIFF_FILE_NAME: &str = "diff.json";

/// Folder holding the report of `mod_id`. Identifiers that would escape the
/// output root are rejected.
pub fn mod_output_dir(output_root: &Path, mod_id: &str) -> Result<PathBuf, Error> {
    if mod_id.is_empty()
        || mod_id == "."
        || mod_id == ".."
        || mod_id.contains(['/', '\\'])
    {
        return Err(Error::write(
            output_root.join(mod_id),
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid mod identifier `{}`", mod_id),
            ),
        ));
    }
    Ok(output_root.join(mod_id))
}

/// Writes the three report files of one mod, replacing any from an earlier
/// run. Returns the mod's folder.
pub fn write_mod_report(
    opts: &RunOptions,
    mod_id: &str,
    reference: &TranslationMap,
    target: &TranslationMap,
    diff: &DiffResult,
) -> Result<PathBuf, Error> {
    let dir = mod_output_dir(&opts.output_dir, mod_id)?;
    fs::create_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;

    write_json(&dir.join(opts.reference_file_name()), reference)?;
    write_json(&dir.join(opts.target_file_name()), target)?;
    write_json(&dir.join(DIFF_FILE_NAME), diff)?;

    tracing::debug!(event = "report_written", mod_id, dir = %dir.display(), missing = diff.len());
    Ok(dir)
}

/// Removes the report folder of `mod_id` if one exists. Returns whether
/// anything was removed.
pub fn remove_mod_report(output_root: &Path, mod_id: &str) -> Result<bool, Error> {
    let dir = mod_output_dir(output_root, mod_id)?;
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;
    tracing::debug!(event = "report_removed", mod_id, dir = %dir.display());
    Ok(true)
}

/// Serializes `value` as pretty-printed JSON (two-space indent, non-ASCII kept
/// verbatim, trailing newline). The file is written next to its destination
/// and renamed into place.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), Error> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| Error::write(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::write(path, e)
    })
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    mod_id: &'a str,
    outcome: &'a str,
    missing: Option<usize>,
    reason: Option<&'a str>,
}

/// Writes one CSV row per mod that was not fully translated.
pub fn write_summary_csv(summary: &RunSummary, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for report in &summary.reports {
        writer.serialize(SummaryRow {
            mod_id: &report.mod_id,
            outcome: report.outcome.label(),
            missing: report.outcome.missing(),
            reason: report.outcome.reason(),
        })?;
    }
    writer.flush().map_err(|e| Error::write(path, e))?;
    Ok(())
}
