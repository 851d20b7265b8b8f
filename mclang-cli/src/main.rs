use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mclang::CancelFlag;
use mclang_cli::prefs::{Preferences, prefs_path};
use mclang_cli::scan::{ScanOptions, run_scan_command};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "mclang", author, version, about, long_about = None)]
struct Args {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Find untranslated keys in every mod archive of a directory.
    Scan {
        /// Directory containing mod archives (defaults to the last one used)
        input: Option<PathBuf>,

        /// Target language code, e.g. ru_ru or zh_cn (defaults to the last one used, then ru_ru)
        #[arg(short, long)]
        lang: Option<String>,

        /// Directory where per-mod reports are written
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Reference language code
        #[arg(long, default_value = mclang::options::DEFAULT_REFERENCE_LANG)]
        reference_lang: String,

        /// Archive extension to scan for (repeatable)
        #[arg(long = "ext", default_value = mclang::options::DEFAULT_EXTENSION)]
        extensions: Vec<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Also write the run summary as CSV to this file
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Do not remember the input directory and language for next time
        #[arg(long)]
        no_save_prefs: bool,
    },

    /// Show or clear saved preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Print saved preferences
    Show,
    /// Delete saved preferences
    Clear,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn show_prefs() -> Result<(), String> {
    let path = prefs_path().ok_or_else(|| "No config directory available".to_string())?;
    let prefs = Preferences::load_from(&path)?;
    println!("Preferences file: {}", path.display());
    println!(
        "last_input_dir: {}",
        prefs
            .last_input_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "last_target_lang: {}",
        prefs.last_target_lang.as_deref().unwrap_or("(none)")
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    match args.commands {
        Commands::Scan {
            input,
            lang,
            output,
            reference_lang,
            extensions,
            json,
            summary_csv,
            no_save_prefs,
        } => {
            let cancel = CancelFlag::new();
            let handler_flag = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
                tracing::warn!(event = "ctrlc_unavailable", "{}", e);
            }

            let opts = ScanOptions {
                input,
                output,
                lang,
                reference_lang,
                extensions,
                json,
                summary_csv,
                save_prefs: !no_save_prefs,
            };
            match run_scan_command(opts, cancel) {
                Ok(summary) if summary.cancelled => std::process::exit(EXIT_CANCELLED),
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(EXIT_FAILURE);
                }
            }
        }
        Commands::Prefs { action } => {
            let result = match action {
                PrefsAction::Show => show_prefs(),
                PrefsAction::Clear => Preferences::clear().map(|removed| {
                    if removed {
                        println!("Preferences cleared");
                    } else {
                        println!("No saved preferences");
                    }
                }),
            };
            if let Err(e) = result {
                eprintln!("Error: {}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }
}
