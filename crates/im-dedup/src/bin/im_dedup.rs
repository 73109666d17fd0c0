//! im-dedup CLI
//!
//! Collapse near-duplicate labels (company names, city names, ...) read
//! from a file or stdin.
//!
//! # Commands
//!
//! - `dedup [FILE]`: print one surviving label per line (or JSON)
//! - `score A B`: print the similarity score of two labels

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use im_dedup::input::{read_labels, LabelSource};
use im_dedup::{
    token_sort_ratio_with, ClusterMode, DedupConfig, DedupError, DedupResult, Deduplicator,
    NormalizationMode,
};

/// Fuzzy deduplication of short text labels
#[derive(Parser)]
#[command(name = "im-dedup")]
#[command(version)]
#[command(about = "Collapse near-duplicate labels such as company names")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove near-duplicate labels
    Dedup(DedupArgs),
    /// Print the similarity score (0-100) of two labels
    Score(ScoreArgs),
}

#[derive(Args)]
struct DedupArgs {
    /// Input file, one label per line. Reads stdin when omitted.
    file: Option<PathBuf>,

    /// Take labels from this CSV column (by header) instead of lines
    #[arg(long, value_name = "NAME")]
    csv_column: Option<String>,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimum score (0-100) for two labels to be the same entity
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Sort labels by length first so the shortest variant survives
    #[arg(long)]
    shortest_first: bool,

    /// Merge matches transitively instead of pairwise
    #[arg(long)]
    transitive: bool,

    /// Ignore punctuation and diacritics when comparing
    #[arg(long)]
    alphanumeric: bool,

    /// Print survivors, dropped positions, and groups as JSON
    #[arg(long)]
    json: bool,
}

impl DedupArgs {
    /// Config file settings (or defaults) with command-line flags applied.
    fn to_config(&self) -> DedupResult<DedupConfig> {
        let mut config = match &self.config {
            Some(path) => DedupConfig::load(path)?,
            None => DedupConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if self.shortest_first {
            config.shortest_first = true;
        }
        if self.transitive {
            config.clustering = ClusterMode::Transitive;
        }
        if self.alphanumeric {
            config.normalization = NormalizationMode::Alphanumeric;
        }

        Ok(config)
    }

    fn label_source(&self) -> LabelSource {
        match &self.csv_column {
            Some(column) => LabelSource::CsvColumn(column.clone()),
            None => LabelSource::Lines,
        }
    }
}

#[derive(Args)]
struct ScoreArgs {
    a: String,
    b: String,

    /// Ignore punctuation and diacritics when comparing
    #[arg(long)]
    alphanumeric: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Dedup(args) => run_dedup(&args, &mut out),
        Commands::Score(args) => run_score(&args, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn run_dedup<W: Write>(args: &DedupArgs, out: &mut W) -> DedupResult<()> {
    let config = args.to_config()?;
    let deduplicator = Deduplicator::new(config)?;

    let labels = read_labels(args.file.as_deref(), &args.label_source())?;
    info!(
        labels = labels.len(),
        source = ?args.file,
        "read labels"
    );

    let outcome = deduplicator.run(&labels)?;
    info!(
        survivors = outcome.survivors.len(),
        removed = outcome.removed(),
        "deduplicated"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &outcome)
            .map_err(|e| DedupError::Io(e.to_string()))?;
        writeln!(out)?;
    } else {
        for label in &outcome.survivors {
            writeln!(out, "{}", label)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_score<W: Write>(args: &ScoreArgs, out: &mut W) -> DedupResult<()> {
    let mode = if args.alphanumeric {
        NormalizationMode::Alphanumeric
    } else {
        NormalizationMode::Whitespace
    };
    writeln!(out, "{}", token_sort_ratio_with(&args.a, &args.b, mode))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dedup_args(argv: &[&str]) -> DedupArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Dedup(args) => args,
            Commands::Score(_) => panic!("expected dedup command"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = dedup_args(&[
            "im-dedup",
            "dedup",
            "names.txt",
            "--threshold",
            "70",
            "--shortest-first",
            "--transitive",
            "--alphanumeric",
        ]);
        let config = args.to_config().unwrap();
        assert_eq!(config.threshold, 70);
        assert!(config.shortest_first);
        assert_eq!(config.clustering, ClusterMode::Transitive);
        assert_eq!(config.normalization, NormalizationMode::Alphanumeric);
        assert_eq!(args.file, Some(PathBuf::from("names.txt")));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dedup.toml");
        std::fs::write(&path, "threshold = 80\nshortest_first = true\n").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = dedup_args(&["im-dedup", "dedup", "--config", &path_arg, "-t", "60"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.threshold, 60);
        assert!(config.shortest_first);
    }

    #[test]
    fn test_csv_column_source() {
        let args = dedup_args(&["im-dedup", "dedup", "--csv-column", "company"]);
        assert_eq!(
            args.label_source(),
            LabelSource::CsvColumn("company".to_string())
        );
        assert!(args.file.is_none());
    }

    #[test]
    fn test_score_command_parses() {
        let cli = Cli::try_parse_from(["im-dedup", "-v", "score", "Saama", "Saama Tech"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Score(ref args) if args.b == "Saama Tech"));
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_dedup_csv_column_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "companies.csv",
            "id,company\n\
             1,\"AstraZeneca, gmbh Munich\"\n\
             2,Ship to AstraZeneca\n\
             3,AstraZeneca\n\
             4,Apple Inc\n",
        );
        let args = dedup_args(&[
            "im-dedup",
            "dedup",
            &path,
            "--csv-column",
            "company",
            "--shortest-first",
        ]);

        let mut out = Vec::new();
        run_dedup(&args, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Apple Inc\nAstraZeneca\n");
    }

    #[test]
    fn test_dedup_json_reports_input_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "labels.txt",
            "Saama Technologies\nSaamaTech, Inc\n\nSaama\n",
        );
        let args = dedup_args(&[
            "im-dedup",
            "dedup",
            &path,
            "--shortest-first",
            "--transitive",
            "--json",
        ]);

        let mut out = Vec::new();
        run_dedup(&args, &mut out).unwrap();
        let outcome: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(outcome["survivors"], serde_json::json!(["Saama"]));
        assert_eq!(outcome["duplicates"], serde_json::json!([0, 1]));
        assert_eq!(outcome["groups"][0]["survivor"], 2);
    }

    #[test]
    fn test_dedup_missing_csv_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "companies.csv", "id,name\n1,Saama\n");
        let args = dedup_args(&["im-dedup", "dedup", &path, "--csv-column", "company"]);

        let mut out = Vec::new();
        let err = run_dedup(&args, &mut out).unwrap_err();
        assert!(matches!(err, DedupError::InvalidInput(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_score_writes_score() {
        let cli = Cli::try_parse_from([
            "im-dedup",
            "score",
            "Café Nero",
            "cafe nero",
            "--alphanumeric",
        ])
        .unwrap();
        let Commands::Score(args) = cli.command else {
            panic!("expected score command");
        };

        let mut out = Vec::new();
        run_score(&args, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "100\n");
    }

    #[test]
    fn test_invalid_threshold_surfaces_from_config() {
        let args = dedup_args(&["im-dedup", "dedup", "--threshold", "101"]);
        let config = args.to_config().unwrap();
        assert!(matches!(
            Deduplicator::new(config),
            Err(DedupError::InvalidThreshold(101))
        ));
    }
}
