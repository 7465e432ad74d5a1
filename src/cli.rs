//! Command-line interface definition and argument parsing.
//!
//! This module defines all subcommands, options, and their defaults using
//! [clap](https://docs.rs/clap/). Helper methods accept a [`FileConfig`]
//! reference so that config-file values act as defaults that CLI arguments
//! can override (layered config).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use backup_planner::comparator::{DEFAULT_FILE_COUNT_THRESHOLD, DEFAULT_SIZE_THRESHOLD};
use backup_planner::config::{CompareOptions, FileConfig, FitOptions};
use backup_planner::fitter::{DEFAULT_CAPACITY_TB, DEFAULT_SAFETY_MARGIN_PERCENT};
use backup_planner::utils::parse_size;
use backup_planner::{DirectoryPair, Thresholds};

/// Arguments for `scan`.
#[derive(Args)]
pub struct ScanArgs {
    /// Folders to measure
    ///
    /// Each folder is walked recursively and its total size and file count
    /// are reported. Falls back to `folders` from the config file.
    #[arg(num_args = 0..)]
    folders: Vec<PathBuf>,
}

/// Arguments for `compare`.
#[derive(Args)]
pub struct CompareArgs {
    /// A pair of directories to compare (repeat for more pairs)
    ///
    /// Usually a source folder and its copy on the backup drive:
    /// `--pair ~/Projects/film /mnt/hd1/film`
    #[arg(
        long = "pair",
        num_args = 2,
        value_names = ["DIR_A", "DIR_B"],
        action = ArgAction::Append,
        required = true
    )]
    pairs: Vec<PathBuf>,

    /// Largest size difference still considered identical
    ///
    /// Accepts plain bytes or sizes with units:
    /// - Decimal: KB, MB, GB, TB (base 1000)
    /// - Binary: KiB, MiB, GiB, TiB (base 1024)
    /// - Decimal values: 1.5MB, 0.5KiB
    #[arg(short = 's', long)]
    size_threshold: Option<String>,

    /// Largest file-count difference still considered identical
    #[arg(short = 'f', long)]
    file_count_threshold: Option<u64>,

    /// Keep comparing the remaining pairs when one pair cannot be scanned
    ///
    /// By default the first unreadable directory aborts the whole run.
    #[arg(short = 'k', long)]
    keep_going: bool,
}

/// Arguments for `fit`.
#[derive(Args)]
pub struct FitArgs {
    /// Folders to place on the drive
    ///
    /// Falls back to `folders` from the config file.
    #[arg(num_args = 0..)]
    folders: Vec<PathBuf>,

    /// Drive capacity in TB (1 TB = 2^40 bytes)
    #[arg(short = 'c', long, value_name = "TB")]
    capacity: Option<f64>,

    /// Percentage of the drive to keep free
    #[arg(short = 'm', long, value_name = "PERCENT")]
    margin: Option<f64>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Measure the size and file count of folders
    Scan(ScanArgs),

    /// Check that directory pairs match within tolerances
    Compare(CompareArgs),

    /// Pick the folders that fit on a drive
    Fit(FitArgs),

    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Subcommands for `config`.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,
    /// Write a default config.toml if none exists yet
    Init,
    /// Print the path to the config file
    Path,
}

/// Main command-line interface structure.
#[derive(Parser)]
#[command(name = "backup-planner")]
#[command(about = "Size, compare and pack folders for backups to external drives")]
#[command(version)]
#[command(author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print a single JSON document instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Increase log detail on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors and hide the progress spinner
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Whether `--json` structured output mode is enabled.
    #[must_use]
    pub const fn json(&self) -> bool {
        self.json
    }

    #[must_use]
    pub const fn verbose(&self) -> u8 {
        self.verbose
    }

    #[must_use]
    pub const fn quiet(&self) -> bool {
        self.quiet
    }
}

/// CLI folders win; otherwise the config file's `folders`.
fn resolve_folders(cli: &[PathBuf], config: &FileConfig) -> Vec<PathBuf> {
    if cli.is_empty() {
        config.folders()
    } else {
        cli.to_vec()
    }
}

impl ScanArgs {
    #[must_use]
    pub fn folders(&self, config: &FileConfig) -> Vec<PathBuf> {
        resolve_folders(&self.folders, config)
    }
}

impl CompareArgs {
    /// The `--pair` values grouped into directory pairs, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the values cannot be grouped in twos.
    pub fn directory_pairs(&self) -> Result<Vec<DirectoryPair>> {
        Ok(DirectoryPair::from_flat(&self.pairs)?)
    }

    /// Resolve thresholds and batch policy.
    ///
    /// Priority: CLI argument > config file > default (2000 bytes, 0 files).
    ///
    /// # Errors
    ///
    /// Returns an error if the size threshold is not a valid size string.
    pub fn compare_options(&self, config: &FileConfig) -> Result<CompareOptions> {
        let size_bytes = match self
            .size_threshold
            .as_deref()
            .or(config.compare.size_threshold.as_deref())
        {
            Some(raw) => parse_size(raw).context("Invalid size threshold")?,
            None => DEFAULT_SIZE_THRESHOLD,
        };

        let file_count = self
            .file_count_threshold
            .or(config.compare.file_count_threshold)
            .unwrap_or(DEFAULT_FILE_COUNT_THRESHOLD);

        Ok(CompareOptions {
            thresholds: Thresholds::new(size_bytes, file_count),
            keep_going: self.keep_going || config.compare.keep_going.unwrap_or(false),
        })
    }
}

impl FitArgs {
    #[must_use]
    pub fn folders(&self, config: &FileConfig) -> Vec<PathBuf> {
        resolve_folders(&self.folders, config)
    }

    /// Resolve capacity and margin.
    ///
    /// Priority: CLI argument > config file > default (1 TB, 10%).
    /// Range checks happen in the fitter itself.
    #[must_use]
    pub fn fit_options(&self, config: &FileConfig) -> FitOptions {
        FitOptions {
            capacity_tb: self
                .capacity
                .or(config.fit.capacity_tb)
                .unwrap_or(DEFAULT_CAPACITY_TB),
            safety_margin_percent: self
                .margin
                .or(config.fit.safety_margin_percent)
                .unwrap_or(DEFAULT_SAFETY_MARGIN_PERCENT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backup_planner::config::file::{FileCompareConfig, FileFitConfig};

    fn compare_args(cli: Cli) -> CompareArgs {
        match cli.command {
            Commands::Compare(args) => args,
            _ => panic!("expected compare subcommand"),
        }
    }

    fn fit_args(cli: Cli) -> FitArgs {
        match cli.command {
            Commands::Fit(args) => args,
            _ => panic!("expected fit subcommand"),
        }
    }

    #[test]
    fn test_global_flags_default() {
        let cli = Cli::parse_from(["backup-planner", "scan", "/a"]);

        assert!(!cli.json());
        assert_eq!(cli.verbose(), 0);
        assert!(!cli.quiet());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["backup-planner", "scan", "/a", "--json", "-vv"]);

        assert!(cli.json());
        assert_eq!(cli.verbose(), 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["backup-planner", "-q", "-v", "scan"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_folders_from_cli() {
        let cli = Cli::parse_from(["backup-planner", "scan", "/a", "/b"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };

        assert_eq!(
            args.folders(&FileConfig::default()),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_scan_folders_fall_back_to_config() {
        let cli = Cli::parse_from(["backup-planner", "scan"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };
        let config = FileConfig {
            folders: Some(vec![PathBuf::from("/from/config")]),
            ..FileConfig::default()
        };

        assert_eq!(args.folders(&config), vec![PathBuf::from("/from/config")]);
    }

    #[test]
    fn test_compare_multiple_pairs() {
        let cli = Cli::parse_from([
            "backup-planner",
            "compare",
            "--pair",
            "/src/a",
            "/hd/a",
            "--pair",
            "/src/b",
            "/hd/b",
        ]);
        let pairs = compare_args(cli).directory_pairs().unwrap();

        assert_eq!(
            pairs,
            vec![
                DirectoryPair::new("/src/a", "/hd/a"),
                DirectoryPair::new("/src/b", "/hd/b"),
            ]
        );
    }

    #[test]
    fn test_compare_requires_pair() {
        assert!(Cli::try_parse_from(["backup-planner", "compare"]).is_err());
    }

    #[test]
    fn test_compare_pair_needs_two_values() {
        assert!(Cli::try_parse_from(["backup-planner", "compare", "--pair", "/only"]).is_err());
    }

    #[test]
    fn test_compare_defaults() {
        let cli = Cli::parse_from(["backup-planner", "compare", "--pair", "/a", "/b"]);
        let opts = compare_args(cli)
            .compare_options(&FileConfig::default())
            .unwrap();

        assert_eq!(opts.thresholds, Thresholds::new(2000, 0));
        assert!(!opts.keep_going);
    }

    #[test]
    fn test_compare_cli_values() {
        let cli = Cli::parse_from([
            "backup-planner",
            "compare",
            "--pair",
            "/a",
            "/b",
            "-s",
            "1.5KiB",
            "-f",
            "3",
            "--keep-going",
        ]);
        let opts = compare_args(cli)
            .compare_options(&FileConfig::default())
            .unwrap();

        assert_eq!(opts.thresholds, Thresholds::new(1536, 3));
        assert!(opts.keep_going);
    }

    #[test]
    fn test_compare_config_values_used_when_cli_absent() {
        let cli = Cli::parse_from(["backup-planner", "compare", "--pair", "/a", "/b"]);
        let config = FileConfig {
            compare: FileCompareConfig {
                size_threshold: Some("10KB".to_string()),
                file_count_threshold: Some(5),
                keep_going: Some(true),
            },
            ..FileConfig::default()
        };

        let opts = compare_args(cli).compare_options(&config).unwrap();

        assert_eq!(opts.thresholds, Thresholds::new(10_000, 5));
        assert!(opts.keep_going);
    }

    #[test]
    fn test_compare_cli_overrides_config() {
        let cli = Cli::parse_from([
            "backup-planner",
            "compare",
            "--pair",
            "/a",
            "/b",
            "--size-threshold",
            "0",
            "--file-count-threshold",
            "1",
        ]);
        let config = FileConfig {
            compare: FileCompareConfig {
                size_threshold: Some("10KB".to_string()),
                file_count_threshold: Some(5),
                keep_going: None,
            },
            ..FileConfig::default()
        };

        let opts = compare_args(cli).compare_options(&config).unwrap();

        assert_eq!(opts.thresholds, Thresholds::new(0, 1));
    }

    #[test]
    fn test_compare_invalid_size_threshold() {
        let cli = Cli::parse_from(["backup-planner", "compare", "--pair", "/a", "/b", "-s", "big"]);

        let err = compare_args(cli)
            .compare_options(&FileConfig::default())
            .unwrap_err();

        assert!(err.to_string().contains("Invalid size threshold"));
    }

    #[test]
    fn test_compare_negative_file_count_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "backup-planner",
            "compare",
            "--pair",
            "/a",
            "/b",
            "-f",
            "-1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fit_defaults() {
        let cli = Cli::parse_from(["backup-planner", "fit", "/a"]);
        let opts = fit_args(cli).fit_options(&FileConfig::default());

        assert_eq!(opts, FitOptions::default());
    }

    #[test]
    fn test_fit_cli_values() {
        let cli = Cli::parse_from([
            "backup-planner",
            "fit",
            "/a",
            "/b",
            "--capacity",
            "4",
            "--margin",
            "5.5",
        ]);
        let args = fit_args(cli);
        let opts = args.fit_options(&FileConfig::default());

        assert!((opts.capacity_tb - 4.0).abs() < f64::EPSILON);
        assert!((opts.safety_margin_percent - 5.5).abs() < f64::EPSILON);
        assert_eq!(args.folders(&FileConfig::default()).len(), 2);
    }

    #[test]
    fn test_fit_config_values_used_when_cli_absent() {
        let cli = Cli::parse_from(["backup-planner", "fit", "-c", "2"]);
        let config = FileConfig {
            fit: FileFitConfig {
                capacity_tb: Some(8.0),
                safety_margin_percent: Some(20.0),
            },
            ..FileConfig::default()
        };

        let opts = fit_args(cli).fit_options(&config);

        assert!((opts.capacity_tb - 2.0).abs() < f64::EPSILON);
        assert!((opts.safety_margin_percent - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_subcommands() {
        for (arg, expected) in [("show", "show"), ("init", "init"), ("path", "path")] {
            let cli = Cli::parse_from(["backup-planner", "config", arg]);
            let Commands::Config { command } = cli.command else {
                panic!("expected config subcommand");
            };
            let name = match command {
                ConfigCommand::Show => "show",
                ConfigCommand::Init => "init",
                ConfigCommand::Path => "path",
            };
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
