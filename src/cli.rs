use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tabloid::analyser::{self, ColumnDescriptor};
use tabloid::batch::{BatchAggregator, Report, writer};
use tabloid::config::{FailurePolicy, PlatformConfig};
use tabloid::error::PlatformError;
use tabloid::storage::{FsStore, ObjectStore as _};

#[derive(Parser)]
#[command(name = "tabloid", about = "Batch analytics over object-stored tabular files")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true, env = "TABLOID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory of the object store
    #[arg(long, global = true)]
    pub storage_root: Option<PathBuf>,

    /// Default log filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate every input object and publish the analytics report
    Run {
        /// What to do when one input object cannot be loaded
        #[arg(long, value_enum)]
        on_file_error: Option<FailurePolicy>,

        /// Print the report instead of publishing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print column descriptors for one local file
    Profile {
        /// CSV, TSV, JSON or JSON-lines file
        file: PathBuf,
    },
    /// Print the currently published report
    Report,
    /// Create the input and output namespaces if missing
    Init,
}

impl Cli {
    /// Resolves configuration from file and environment, then applies flags.
    pub fn resolve_config(&self) -> Result<PlatformConfig> {
        let mut config = PlatformConfig::resolve(self.config.as_deref())?;
        if let Some(root) = &self.storage_root {
            config.storage_root.clone_from(root);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }
        if let Commands::Run {
            on_file_error: Some(policy),
            ..
        } = &self.command
        {
            config.on_file_error = *policy;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run_command(command: Commands, config: &PlatformConfig) -> Result<()> {
    let store = FsStore::new(&config.storage_root);
    match command {
        Commands::Run { dry_run, .. } => handle_run(&store, config, dry_run),
        Commands::Profile { file } => handle_profile(&file),
        Commands::Report => handle_report(&store, config),
        Commands::Init => handle_init(&store, config),
    }
}

fn handle_run(store: &FsStore, config: &PlatformConfig, dry_run: bool) -> Result<()> {
    let aggregator = BatchAggregator::new(store, config);
    if dry_run {
        let report = aggregator.build_report()?;
        print!("{}", String::from_utf8(writer::render(&report)?)?);
        return Ok(());
    }

    let report = aggregator.run_batch()?;
    println!("{}", summary_line(&report, config));
    Ok(())
}

fn summary_line(report: &Report, config: &PlatformConfig) -> String {
    let duplicates = report
        .duplicate_rows
        .map_or_else(|| "n/a".to_owned(), |d| d.to_string());
    let mut line = format!(
        "Published {}/{}: {} rows, {} columns ({} numeric, {} categorical), {} duplicate rows",
        config.output_namespace,
        config.report_object,
        report.total_rows,
        report.total_columns,
        report.columns.numeric.len(),
        report.columns.categorical.len(),
        duplicates,
    );
    if !report.skipped_files.is_empty() {
        line.push_str(&format!(", {} skipped", report.skipped_files.len()));
    }
    line
}

fn handle_profile(file: &std::path::Path) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let dataset = tabloid::loader::load(name, &raw)?;

    println!(
        "{}: {} rows, {} columns",
        file.display(),
        dataset.row_count(),
        dataset.column_count()
    );
    print!("{}", descriptor_table(&analyser::analyze(&dataset)));

    let duplicates = analyser::count_duplicate_rows(&dataset);
    println!("duplicate rows: {duplicates}");
    Ok(())
}

fn descriptor_table(descriptors: &[ColumnDescriptor]) -> String {
    let width = descriptors
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("column".len());

    let mut out = format!(
        "{:<width$}  {:<9}  {:<11}  {:>8}  {:>8}  {:>8}\n",
        "column", "type", "kind", "unique", "missing", "missing%"
    );
    for d in descriptors {
        out.push_str(&format!(
            "{:<width$}  {:<9}  {:<11}  {:>8}  {:>8}  {:>8.1}\n",
            d.name,
            d.value_type.as_str(),
            d.kind.as_str(),
            d.unique.to_string(),
            d.missing,
            d.missing_pct,
        ));
    }
    out
}

fn handle_report(store: &FsStore, config: &PlatformConfig) -> Result<()> {
    let bytes = store
        .get_object(&config.output_namespace, &config.report_object)
        .context("No published report")?;
    print!("{}", String::from_utf8(bytes)?);
    Ok(())
}

fn handle_init(store: &FsStore, config: &PlatformConfig) -> Result<()> {
    for namespace in [&config.input_namespace, &config.output_namespace] {
        store.ensure_bucket(namespace)?;
    }
    println!(
        "Namespaces ready under {}: {}, {}",
        store.root().display(),
        config.input_namespace,
        config.output_namespace
    );
    Ok(())
}

/// Exit status for a failed command: 2 for an empty input namespace, 3 for
/// an unloadable input object, 1 otherwise.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PlatformError>() {
        Some(PlatformError::NoInputData { .. }) => 2,
        Some(e) if e.is_per_file() => 3,
        _ => 1,
    }
}

pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}
