use crate::prefs::Preferences;
use crate::validation::{validate_extensions, validate_input_dir, validate_language_code, validate_output_dir};
use mclang::{CancelFlag, LogSink, RunOptions, RunSummary, report};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub lang: Option<String>,
    pub reference_lang: String,
    pub extensions: Vec<String>,
    pub json: bool,
    pub summary_csv: Option<PathBuf>,
    pub save_prefs: bool,
}

/// Fill unset options from saved preferences and validate everything.
pub fn resolve_run_options(
    opts: &ScanOptions,
    prefs: &Preferences,
    cancel: CancelFlag,
) -> Result<RunOptions, String> {
    let input = opts
        .input
        .clone()
        .or_else(|| prefs.last_input_dir.clone())
        .ok_or_else(|| {
            "No input directory given and none saved from a previous run".to_string()
        })?;
    validate_input_dir(&input)?;
    validate_output_dir(&opts.output)?;

    let lang = opts
        .lang
        .clone()
        .or_else(|| prefs.last_target_lang.clone())
        .unwrap_or_else(|| mclang::options::DEFAULT_TARGET_LANG.to_string());
    let lang = validate_language_code(&lang)?;
    let reference_lang = validate_language_code(&opts.reference_lang)?;
    if lang == reference_lang {
        return Err(format!(
            "Target language {} is the reference language; nothing to compare",
            lang
        ));
    }
    validate_extensions(&opts.extensions)?;

    Ok(RunOptions::new(input, &opts.output)
        .with_target_lang(lang)
        .with_reference_lang(reference_lang)
        .with_extensions(&opts.extensions)
        .with_cancel(cancel))
}

pub fn render_human(summary: &RunSummary, run: &RunOptions) -> String {
    let mut lines = Vec::new();
    lines.push("=== Missing translations ===".to_string());
    lines.push(format!("Language: {}", run.target_lang));
    lines.push(format!("Output: {}", run.output_dir.display()));
    lines.push(format!("Mods scanned: {}", summary.scanned));
    lines.push(format!("  complete: {}", summary.complete));
    lines.push(format!("  partial: {}", summary.partial));
    if summary.unwritten > 0 {
        lines.push(format!("  partial (report not written): {}", summary.unwritten));
    }
    lines.push(format!(
        "  skipped/malformed: {}",
        summary.skipped_or_malformed()
    ));

    let with_missing: Vec<_> = summary
        .reports
        .iter()
        .filter(|r| r.outcome.missing().is_some())
        .collect();
    if !with_missing.is_empty() {
        lines.push("\nNeeds translation:".to_string());
        for report in with_missing {
            lines.push(format!(
                "  {} ({}/{} keys): {}",
                report.mod_id,
                report.outcome.missing().unwrap_or(0),
                report.reference_keys,
                report.outcome
            ));
        }
    }

    let not_diffed: Vec<_> = summary
        .reports
        .iter()
        .filter(|r| r.outcome.missing().is_none())
        .collect();
    if !not_diffed.is_empty() {
        lines.push("\nNot compared:".to_string());
        for report in not_diffed {
            lines.push(format!("  {}: {}", report.mod_id, report.outcome));
        }
    }

    if summary.cancelled {
        lines.push("\nRun cancelled before all mods were processed.".to_string());
    }

    lines.join("\n")
}

pub fn render_json(summary: &RunSummary) -> Result<String, String> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| format!("Failed to serialize summary JSON: {}", e))
}

/// Runs a scan and prints its summary. Preferences are saved after any run
/// that got past setup.
pub fn run_scan_command(opts: ScanOptions, cancel: CancelFlag) -> Result<RunSummary, String> {
    let prefs = Preferences::load();
    let run = resolve_run_options(&opts, &prefs, cancel)?;

    tracing::info!(
        event = "scan_args",
        input = %run.input_dir.display(),
        output = %run.output_dir.display(),
        lang = %run.target_lang
    );

    let summary = mclang::run(&run, &mut LogSink).map_err(|e| e.to_string())?;

    if opts.save_prefs {
        let updated = Preferences {
            last_input_dir: Some(run.input_dir.clone()),
            last_target_lang: Some(run.target_lang.clone()),
        };
        if let Err(e) = updated.save() {
            tracing::warn!(event = "prefs_not_saved", "{}", e);
        }
    }

    if let Some(path) = &opts.summary_csv {
        report::write_summary_csv(&summary, path).map_err(|e| e.to_string())?;
        tracing::info!(event = "summary_csv_written", path = %path.display());
    }

    if opts.json {
        println!("{}", render_json(&summary)?);
    } else {
        println!("{}", render_human(&summary, &run));
    }

    Ok(summary)
}
