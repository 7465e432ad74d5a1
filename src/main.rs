//! # backup-planner
//!
//! A small CLI for preparing folder backups to external drives.
//!
//! ## Features
//!
//! - Measure the total size and file count of folders
//! - Check that backup copies match their sources within a tolerance
//! - Pick which folders fit on a drive, keeping a safety margin free
//! - Human-readable output with a progress spinner, or JSON for scripts
//! - Persistent defaults via `~/.config/backup-planner/config.toml`
//!
//! ## Usage
//!
//! ```bash
//! # Size a few folders
//! backup-planner scan ~/Projects/film_a ~/Projects/film_b
//!
//! # Verify a copy on the backup drive
//! backup-planner compare --pair ~/Projects/film_a /mnt/hd1/film_a
//!
//! # Which folders fit on a 4 TB drive with 10% kept free?
//! backup-planner fit ~/Projects/* --capacity 4 --margin 10
//! ```

mod cli;

use std::path::Path;
use std::process::exit;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use backup_planner::{
    ComparisonResult, DirectoryPair, FitItem, FolderMetrics, NoopObserver, PlannerError,
    ScanObserver, Thresholds, compare, compare_each,
    config::FileConfig,
    fit,
    fitter::adjusted_capacity_bytes,
    logging,
    output::{
        JsonCompareOutput, JsonFitOutput, JsonScanOutput, PairOutcome, print_compare, print_fit,
        print_scan,
    },
    scan_folders,
    utils::format_human,
};
use cli::{Cli, Commands, CompareArgs, ConfigCommand, FitArgs, ScanArgs};

/// Entry point for the backup-planner application.
///
/// Errors from [`inner_main`] are printed to stderr before exiting with a
/// non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("{} {err:#}", "Error:".red());

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// # Errors
///
/// Returns errors from configuration, folder scanning, input validation, or
/// JSON serialization.
fn inner_main() -> Result<()> {
    let args = Cli::parse();
    logging::init_logging(args.verbose(), args.quiet());

    let json_mode = args.json();
    let show_progress = !json_mode && !args.quiet();

    match &args.command {
        Commands::Config { command } => handle_config_command(command),
        Commands::Scan(scan_args) => {
            let config = load_config(json_mode);
            run_scan(scan_args, &config, json_mode, show_progress)
        }
        Commands::Compare(compare_args) => {
            let config = load_config(json_mode);
            run_compare(compare_args, &config, json_mode, show_progress)
        }
        Commands::Fit(fit_args) => {
            let config = load_config(json_mode);
            run_fit(fit_args, &config, json_mode, show_progress)
        }
    }
}

// ── Progress ────────────────────────────────────────────────────────────

/// Spinner that shows the entry being scanned, the folder's position in the
/// batch and the bytes counted so far.
struct SpinnerObserver {
    bar: ProgressBar,
    folder: Option<(usize, usize)>,
}

impl SpinnerObserver {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{prefix}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Scanning...");
        bar.enable_steady_tick(Duration::from_millis(100));

        let spinner = Self { bar, folder: None };
        spinner.set_bytes(0);
        spinner
    }

    fn set_bytes(&self, total_bytes: u64) {
        let size = format_human(total_bytes);
        match self.folder {
            Some((number, total)) => self.bar.set_prefix(format!("{number}/{total} {size}")),
            None => self.bar.set_prefix(size),
        }
    }

    fn finish(&self, summary: Summary) {
        self.bar.finish_and_clear();
        match summary {
            Ok(message) => println!("{}", message.green()),
            Err(message) => println!("{}", message.yellow()),
        }
    }
}

impl ScanObserver for SpinnerObserver {
    fn on_entry(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn on_bytes(&mut self, total_bytes: u64) {
        self.set_bytes(total_bytes);
    }

    fn on_folder(&mut self, number: usize, total: usize) {
        self.folder = Some((number, total));
        self.set_bytes(0);
    }
}

/// Closing line of a progress run: `Ok` when everything succeeded, `Err`
/// when the run stopped early or finished with failures.
type Summary = std::result::Result<&'static str, &'static str>;

/// Run `work` with a spinner when progress is shown, silently otherwise.
fn with_progress<T>(
    show_progress: bool,
    work: impl FnOnce(&mut dyn ScanObserver) -> T,
    summarize: impl FnOnce(&T) -> Summary,
) -> T {
    if show_progress {
        let mut spinner = SpinnerObserver::new();
        let result = work(&mut spinner);
        spinner.finish(summarize(&result));
        result
    } else {
        work(&mut NoopObserver)
    }
}

fn scan_summary<T, E>(result: &std::result::Result<T, E>) -> Summary {
    match result {
        Ok(_) => Ok("✅ Scan complete"),
        Err(_) => Err("Scan stopped"),
    }
}

fn compare_summary(result: &std::result::Result<Vec<PairResult>, PlannerError>) -> Summary {
    match result {
        Ok(outcomes) if outcomes.iter().all(std::result::Result::is_ok) => {
            Ok("✅ Comparison complete")
        }
        Ok(_) => Err("Comparison finished with errors"),
        Err(_) => Err("Comparison stopped"),
    }
}

type PairResult = std::result::Result<ComparisonResult, PlannerError>;

// ── Commands ────────────────────────────────────────────────────────────

const NO_FOLDERS: &str =
    "No folders given. Pass folders on the command line or set `folders` in the config file";

fn run_scan(
    args: &ScanArgs,
    config: &FileConfig,
    json_mode: bool,
    show_progress: bool,
) -> Result<()> {
    let folders = args.folders(config);
    if folders.is_empty() {
        bail!(NO_FOLDERS);
    }

    let metrics = with_progress(
        show_progress,
        |observer| scan_folders(&folders, observer),
        scan_summary,
    )
    .context("Scan aborted")?;

    if json_mode {
        let output = JsonScanOutput::from_metrics(&metrics);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_scan(&metrics);
    }

    Ok(())
}

fn run_compare(
    args: &CompareArgs,
    config: &FileConfig,
    json_mode: bool,
    show_progress: bool,
) -> Result<()> {
    let pairs = args.directory_pairs()?;
    let options = args.compare_options(config)?;

    let outcomes: Vec<PairResult> = with_progress(
        show_progress,
        |observer| {
            if options.keep_going {
                Ok(compare_each(&pairs, options.thresholds, observer))
            } else {
                compare(&pairs, options.thresholds, observer)
                    .map(|results| results.into_iter().map(Ok).collect())
            }
        },
        compare_summary,
    )
    .context("Comparison aborted")?;

    render_compare(&pairs, &outcomes, options.thresholds, json_mode)?;

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} pair(s) could not be compared", pairs.len());
    }

    Ok(())
}

fn render_compare(
    pairs: &[DirectoryPair],
    outcomes: &[PairResult],
    thresholds: Thresholds,
    json_mode: bool,
) -> Result<()> {
    if json_mode {
        let output = JsonCompareOutput::from_outcomes(
            pairs
                .iter()
                .zip(outcomes)
                .map(|(pair, o)| (pair.path_a.as_path(), pair.path_b.as_path(), as_outcome(o))),
            thresholds.size_bytes,
            thresholds.file_count,
        );
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_compare(
            outcomes
                .iter()
                .enumerate()
                .map(|(i, o)| (i + 1, as_outcome(o))),
        );

        let identical = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(r) if r.identical))
            .count();
        println!(
            "{} of {} pair(s) identical",
            identical.to_string().bright_white(),
            pairs.len().to_string().bright_white()
        );
    }

    Ok(())
}

const fn as_outcome(outcome: &PairResult) -> PairOutcome<'_> {
    outcome.as_ref()
}

fn run_fit(
    args: &FitArgs,
    config: &FileConfig,
    json_mode: bool,
    show_progress: bool,
) -> Result<()> {
    let folders = args.folders(config);
    if folders.is_empty() {
        bail!(NO_FOLDERS);
    }
    let options = args.fit_options(config);
    // Reject an unusable capacity or margin before walking any folder.
    adjusted_capacity_bytes(options.capacity_tb, options.safety_margin_percent)?;

    let metrics: Vec<FolderMetrics> = with_progress(
        show_progress,
        |observer| scan_folders(&folders, observer),
        scan_summary,
    )
    .context("Scan aborted")?;

    let items: Vec<FitItem> = metrics.iter().map(FitItem::from).collect();
    let plan = fit(&items, options.capacity_tb, options.safety_margin_percent)?;

    if json_mode {
        let output =
            JsonFitOutput::from_plan(&plan, options.capacity_tb, options.safety_margin_percent);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_scan(&metrics);
        println!();
        print_fit(&plan);
    }

    Ok(())
}

// ── Config subcommand ────────────────────────────────────────────────

/// Default config file template written by `config init`.
const CONFIG_TEMPLATE: &str = r#"# backup-planner configuration
# All values shown are their defaults. Uncomment and change as needed.

# Folders used by `scan` and `fit` when none are passed on the command line
# folders = ["~/Projects/film_a", "~/Projects/film_b"]

[compare]
# Largest size difference (bytes, or a size like "4KiB") still considered identical
# size_threshold = "2000"

# Largest file-count difference still considered identical
# file_count_threshold = 0

# Keep comparing remaining pairs when one pair cannot be scanned
# keep_going = false

[fit]
# Drive capacity in TB (counted as TiB, 2^40 bytes)
# capacity_tb = 1.0

# Percentage of the drive kept free
# safety_margin_percent = 10.0
"#;

/// Dispatch a `config` subcommand.
fn handle_config_command(cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Path => match FileConfig::config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("Could not determine the config directory on this platform"),
        },
        ConfigCommand::Show => show_config()?,
        ConfigCommand::Init => init_config()?,
    }
    Ok(())
}

/// Print the effective configuration (file values merged with defaults).
fn show_config() -> Result<()> {
    let path = FileConfig::config_path();

    let (file_exists, config) = match &path {
        Some(p) if p.exists() => (true, FileConfig::load()?),
        _ => (false, FileConfig::default()),
    };

    match &path {
        Some(p) if file_exists => println!("Config file: {} (found)", p.display()),
        Some(p) => println!(
            "Config file: {} (not found - showing defaults)",
            p.display()
        ),
        None => println!("Config file: (cannot determine path on this platform)"),
    }

    println!();
    println!("{}", format_config(&config));
    Ok(())
}

/// Format a [`FileConfig`] as a human-readable table, showing defaults for `None` fields.
fn format_config(config: &FileConfig) -> String {
    fn show<T: ToString>(val: Option<T>, default: &str) -> String {
        val.map_or_else(|| format!("{default}  (default)"), |v| v.to_string())
    }

    let folders = match config.folders.as_deref() {
        Some(v) if !v.is_empty() => {
            let items: Vec<String> = v.iter().map(|p| format!("\"{}\"", p.display())).collect();
            format!("[{}]", items.join(", "))
        }
        _ => "[]  (default)".to_string(),
    };

    format!(
        "\
folders = {folders}

[compare]
size_threshold       = {size_threshold}
file_count_threshold = {file_count_threshold}
keep_going           = {keep_going}

[fit]
capacity_tb           = {capacity_tb}
safety_margin_percent = {safety_margin_percent}",
        size_threshold = show(
            config
                .compare
                .size_threshold
                .as_deref()
                .map(|s| format!("\"{s}\"")),
            "\"2000\""
        ),
        file_count_threshold = show(config.compare.file_count_threshold, "0"),
        keep_going = show(config.compare.keep_going, "false"),
        capacity_tb = show(config.fit.capacity_tb, "1.0"),
        safety_margin_percent = show(config.fit.safety_margin_percent, "10.0"),
    )
}

/// Write a default config template to the config file path if it does not exist yet.
fn init_config() -> Result<()> {
    let Some(path) = FileConfig::config_path() else {
        bail!("Could not determine the config directory on this platform");
    };

    write_config_template(&path)
}

fn write_config_template(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory {}", parent.display())
        })?;
    }

    std::fs::write(path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    println!("Config file written to: {}", path.display());
    Ok(())
}

/// Load the configuration file, falling back to defaults on failure.
fn load_config(json_mode: bool) -> FileConfig {
    match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            if !json_mode {
                eprintln!("{} {e}", "Warning: Failed to load config file:".yellow());
            }
            log::warn!("using default configuration: {e}");
            FileConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_template_parses_to_defaults() {
        let config: FileConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();

        assert!(config.folders.is_none());
        assert!(config.compare.size_threshold.is_none());
        assert!(config.fit.capacity_tb.is_none());
    }

    #[test]
    fn test_config_template_uncommented_is_valid() {
        let uncommented: String = CONFIG_TEMPLATE
            .lines()
            .map(|line| line.strip_prefix("# ").filter(|l| l.contains(" = ")).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n");

        let config: FileConfig = toml::from_str(&uncommented).unwrap();

        assert_eq!(config.compare.size_threshold.as_deref(), Some("2000"));
        assert_eq!(config.compare.file_count_threshold, Some(0));
        assert_eq!(config.fit.capacity_tb, Some(1.0));
        assert_eq!(config.fit.safety_margin_percent, Some(10.0));
        assert_eq!(config.folders.map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_format_config_defaults() {
        let text = format_config(&FileConfig::default());

        assert!(text.contains("folders = []  (default)"));
        assert!(text.contains("size_threshold       = \"2000\"  (default)"));
        assert!(text.contains("capacity_tb           = 1.0  (default)"));
    }

    #[test]
    fn test_format_config_values() {
        let config: FileConfig =
            toml::from_str("folders = [\"/a\"]\n[fit]\ncapacity_tb = 4.0\n").unwrap();
        let text = format_config(&config);

        assert!(text.contains("folders = [\"/a\"]"));
        assert!(text.contains("capacity_tb           = 4"));
        assert!(text.contains("safety_margin_percent = 10.0  (default)"));
    }

    #[test]
    fn test_fit_rejects_bad_margin_before_scanning() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("never-scanned");
        let argv: Vec<std::ffi::OsString> = vec![
            "backup-planner".into(),
            "fit".into(),
            missing.into_os_string(),
            "--margin".into(),
            "150".into(),
        ];
        let cli = Cli::parse_from(argv);
        let Commands::Fit(fit_args) = &cli.command else {
            panic!("expected the fit subcommand");
        };

        let err = run_fit(fit_args, &FileConfig::default(), true, false).unwrap_err();

        // A scan would have failed on the missing folder instead.
        assert!(matches!(
            err.downcast_ref::<PlannerError>(),
            Some(PlannerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_scan_summary_is_neutral_on_error() {
        let ok: std::result::Result<(), ()> = Ok(());
        let failed: std::result::Result<(), ()> = Err(());

        assert_eq!(scan_summary(&ok), Ok("✅ Scan complete"));
        assert!(scan_summary(&failed).is_err());
    }

    #[test]
    fn test_compare_summary_flags_failed_pairs() {
        let failed_pair = PlannerError::invalid_input("unreadable");

        assert!(compare_summary(&Ok(Vec::new())).is_ok());
        assert_eq!(
            compare_summary(&Ok(vec![Err(failed_pair)])),
            Err("Comparison finished with errors")
        );
        assert_eq!(
            compare_summary(&Err(PlannerError::invalid_input("aborted"))),
            Err("Comparison stopped")
        );
    }

    #[test]
    fn test_write_config_template_creates_file_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        write_config_template(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        std::fs::write(&path, "# edited").unwrap();
        write_config_template(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited");
    }
}
