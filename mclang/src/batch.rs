//! The batch runner: one pass over a directory of mod archives.
//!
//! Mods are processed one at a time, each fully (read, parse, diff, then write
//! or clean up) before the next begins. Per-mod failures become a
//! [`ModOutcome`] and never stop the run; only setup problems (bad input
//! directory, unwritable output root) are returned as errors, and those are
//! detected before any mod is touched.

use std::{collections::HashMap, fs, path::Path};

use crate::{
    archive::{JarArchive, locate_resources},
    diff::diff,
    error::Error,
    options::RunOptions,
    parser::parse,
    report::{DIFF_FILE_NAME, mod_output_dir, remove_mod_report, write_mod_report},
    traits::{ArchiveSource, ProgressEvent, ProgressSink},
    types::{ModArchive, ModOutcome, ModReport, RunSummary, TranslationMap},
};

const WRITE_PROBE_NAME: &str = ".mclang-write-probe";

/// Runs the whole pipeline over `opts.input_dir`, reporting progress to `sink`.
///
/// # Example
///
/// ```rust,no_run
/// use mclang::{RunOptions, batch, traits::LogSink};
///
/// let opts = RunOptions::new("mods", "output").with_target_lang("ru_ru");
/// let summary = batch::run(&opts, &mut LogSink)?;
/// println!("{} of {} mods need translating", summary.partial, summary.scanned);
/// # Ok::<(), mclang::Error>(())
/// ```
pub fn run(opts: &RunOptions, sink: &mut dyn ProgressSink) -> Result<RunSummary, Error> {
    check_setup(opts)?;
    let archives = list_archives(&opts.input_dir, &opts.extensions)?;

    sink.on_event(ProgressEvent::Started {
        input_dir: &opts.input_dir,
        archives: archives.len(),
    });

    let mut summary = RunSummary::default();
    let mut seen_ids: HashMap<String, String> = HashMap::new();
    let total = archives.len();
    for (index, archive) in archives.iter().enumerate() {
        if opts.cancel.is_cancelled() {
            summary.cancelled = true;
            sink.on_event(ProgressEvent::Cancelled {
                remaining: total - index,
            });
            break;
        }
        sink.on_event(ProgressEvent::ModStarted {
            index,
            total,
            mod_id: &archive.mod_id,
        });

        let report = match claim_mod_id(&mut seen_ids, &archive.mod_id) {
            Ok(()) => process_archive(opts, archive, sink),
            Err(reason) => ModReport::new(archive, ModOutcome::Skipped { reason }),
        };
        sink.on_event(ProgressEvent::ModFinished(&report));
        summary.record(report);
    }

    sink.on_event(ProgressEvent::Finished(&summary));
    Ok(summary)
}

/// Records `mod_id` as taken. Output folders are keyed case-insensitively, so
/// an identifier that matches an earlier one up to case is refused.
fn claim_mod_id(seen: &mut HashMap<String, String>, mod_id: &str) -> Result<(), String> {
    let key = mod_id.to_ascii_lowercase();
    match seen.get(&key) {
        None => {
            seen.insert(key, mod_id.to_string());
            Ok(())
        }
        Some(earlier) if earlier == mod_id => Err(format!(
            "another archive already produced mod identifier `{}`",
            mod_id
        )),
        Some(earlier) => Err(format!(
            "mod identifier `{}` differs only by case from `{}`, which would share its output folder",
            mod_id, earlier
        )),
    }
}

/// Opens `archive` from disk and processes it. An unreadable archive is
/// reported as skipped.
pub fn process_archive(
    opts: &RunOptions,
    archive: &ModArchive,
    sink: &mut dyn ProgressSink,
) -> ModReport {
    match JarArchive::open(&archive.path) {
        Ok(mut jar) => process_mod(opts, archive, &mut jar, sink),
        Err(e) => ModReport::new(
            archive,
            ModOutcome::Skipped {
                reason: e.to_string(),
            },
        ),
    }
}

/// Processes one mod whose entries come from `source`: locate, read, parse,
/// diff, then either write the report or remove a stale one.
pub fn process_mod<S: ArchiveSource + ?Sized>(
    opts: &RunOptions,
    archive: &ModArchive,
    source: &mut S,
    sink: &mut dyn ProgressSink,
) -> ModReport {
    let mod_id = archive.mod_id.as_str();
    let mut report = ModReport::new(archive, ModOutcome::Complete);

    if let Err(e) = mod_output_dir(&opts.output_dir, mod_id) {
        report.outcome = ModOutcome::Skipped {
            reason: e.to_string(),
        };
        return report;
    }

    let entries = source.entry_names();
    let Some(found) = locate_resources(
        &entries,
        mod_id,
        &opts.reference_lang,
        &opts.target_lang,
    ) else {
        report.outcome = ModOutcome::Skipped {
            reason: format!("{} not found in archive", opts.reference_file_name()),
        };
        return report;
    };
    report.namespace = Some(found.namespace.clone());

    let reference = match source.read_entry(&found.reference) {
        Ok(bytes) => match parse(&bytes) {
            Ok(map) => map,
            Err(e) => {
                report.outcome = ModOutcome::Malformed {
                    reason: format!("{}: {}", found.reference, e),
                };
                return report;
            }
        },
        Err(e) => {
            report.outcome = ModOutcome::Skipped {
                reason: e.to_string(),
            };
            return report;
        }
    };
    if reference.is_empty() {
        sink.on_event(ProgressEvent::Warning {
            mod_id,
            message: format!("{} is empty, nothing to translate", found.reference),
        });
    }

    let target = match &found.target {
        None => {
            tracing::debug!(event = "target_absent", mod_id, lang = %opts.target_lang);
            TranslationMap::new()
        }
        Some(path) => match source.read_entry(path).and_then(|bytes| parse(&bytes)) {
            Ok(map) => map,
            Err(e) => {
                sink.on_event(ProgressEvent::Warning {
                    mod_id,
                    message: format!("{} treated as empty: {}", path, e),
                });
                TranslationMap::new()
            }
        },
    };

    report.reference_keys = reference.len();
    report.target_keys = target.len();

    let missing = diff(&reference, &target);
    report.outcome = if missing.is_empty() {
        match remove_mod_report(&opts.output_dir, mod_id) {
            Ok(true) => tracing::info!(event = "stale_report_removed", mod_id),
            Ok(false) => {}
            Err(e) => sink.on_event(ProgressEvent::Warning {
                mod_id,
                message: format!("could not remove stale report: {}", e),
            }),
        }
        ModOutcome::Complete
    } else {
        match write_mod_report(opts, mod_id, &reference, &target, &missing) {
            Ok(_) => ModOutcome::Partial {
                missing: missing.len(),
            },
            Err(e) => ModOutcome::Unwritten {
                missing: missing.len(),
                reason: e.to_string(),
            },
        }
    };
    report
}

/// Lists archives directly inside `dir` whose extension is in `extensions`
/// (case-insensitive), sorted by file name.
pub fn list_archives(dir: &Path, extensions: &[String]) -> Result<Vec<ModArchive>, Error> {
    let read_dir = fs::read_dir(dir).map_err(|e| {
        Error::setup(format!("cannot read input directory {}: {}", dir.display(), e))
    })?;

    let mut archives = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(event = "dir_entry_unreadable", error = %e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches {
            archives.push(ModArchive::from_path(path));
        }
    }
    archives.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(archives)
}

/// A language code becomes a file name inside each mod folder, so it must not
/// leave that folder or collide with the diff file.
fn check_lang_code(role: &str, code: &str) -> Result<(), Error> {
    if code.is_empty() {
        return Err(Error::setup(format!("{} language cannot be empty", role)));
    }
    if code.contains(['/', '\\']) || code.contains("..") {
        return Err(Error::setup(format!(
            "{} language `{}` is not a valid file name",
            role, code
        )));
    }
    if format!("{}.json", code).eq_ignore_ascii_case(DIFF_FILE_NAME) {
        return Err(Error::setup(format!(
            "{} language `{}` collides with {}",
            role, code, DIFF_FILE_NAME
        )));
    }
    Ok(())
}

fn check_setup(opts: &RunOptions) -> Result<(), Error> {
    check_lang_code("target", &opts.target_lang)?;
    check_lang_code("reference", &opts.reference_lang)?;
    if opts.target_lang == opts.reference_lang {
        return Err(Error::setup(format!(
            "target language `{}` is the reference language",
            opts.target_lang
        )));
    }

    let input = &opts.input_dir;
    let meta = fs::metadata(input).map_err(|e| {
        Error::setup(format!("input directory {} is not accessible: {}", input.display(), e))
    })?;
    if !meta.is_dir() {
        return Err(Error::setup(format!(
            "input path {} is not a directory",
            input.display()
        )));
    }

    let output = &opts.output_dir;
    fs::create_dir_all(output).map_err(|e| {
        Error::setup(format!("cannot create output directory {}: {}", output.display(), e))
    })?;
    let probe = output.join(WRITE_PROBE_NAME);
    fs::write(&probe, b"").map_err(|e| {
        Error::setup(format!("output directory {} is not writable: {}", output.display(), e))
    })?;
    if let Err(e) = fs::remove_file(&probe) {
        tracing::debug!(event = "write_probe_not_removed", path = %probe.display(), error = %e);
    }
    Ok(())
}
