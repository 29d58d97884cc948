//! histstack CLI

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hs_core::{ClassificationPolicy, FileRecord, HiststackConfig, Mode};
use hs_render::{OutputFormat, StackMode};

#[derive(Parser)]
#[command(name = "histstack")]
#[command(about = "histstack - signal vs background plots from ROOT histograms")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify, aggregate and plot every matching ROOT file
    Run {
        /// Run config (YAML, or JSON by extension). Flags below override it.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Glob selecting input files
        #[arg(short, long)]
        input_glob: Option<String>,

        /// Directory receiving the figures
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// aggregated, single or both
        #[arg(long)]
        mode: Option<Mode>,

        /// legacy or strict
        #[arg(long)]
        policy: Option<ClassificationPolicy>,

        /// overlay or cumulative
        #[arg(long)]
        stack_mode: Option<StackMode>,

        /// pdf, svg or png
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Write the run summary (pretty JSON) here. Defaults to stdout.
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// List the keys of a ROOT file, subdirectories included
    List {
        /// Input ROOT file
        file: PathBuf,
    },

    /// Print the classification and variation derived from file names
    Classify {
        /// File names or paths
        #[arg(required = true)]
        names: Vec<String>,

        /// legacy or strict
        #[arg(long, default_value = "legacy")]
        policy: ClassificationPolicy,
    },
}

/// Flag overrides for `histstack run`.
struct RunOverrides {
    input_glob: Option<String>,
    output_dir: Option<PathBuf>,
    mode: Option<Mode>,
    policy: Option<ClassificationPolicy>,
    stack_mode: Option<StackMode>,
    format: Option<OutputFormat>,
}

impl RunOverrides {
    fn apply(self, config: &mut HiststackConfig) {
        if let Some(v) = self.input_glob {
            config.input_glob = v;
        }
        if let Some(v) = self.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = self.mode {
            config.mode = v;
        }
        if let Some(v) = self.policy {
            config.classification_policy = v;
        }
        if let Some(v) = self.stack_mode {
            config.stack_mode = v;
        }
        if let Some(v) = self.format {
            config.format = v;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { config, input_glob, output_dir, mode, policy, stack_mode, format, summary } => {
            let overrides = RunOverrides { input_glob, output_dir, mode, policy, stack_mode, format };
            cmd_run(config.as_ref(), overrides, summary.as_ref())
        }
        Commands::List { file } => cmd_list(&file),
        Commands::Classify { names, policy } => cmd_classify(&names, policy),
    }
}

fn cmd_run(config: Option<&PathBuf>, overrides: RunOverrides, summary: Option<&PathBuf>) -> Result<()> {
    let mut cfg = match config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading run config");
            HiststackConfig::load(path)
                .with_context(|| format!("failed to load run config {}", path.display()))?
        }
        None => HiststackConfig::default(),
    };
    overrides.apply(&mut cfg);
    tracing::info!(
        input_glob = %cfg.input_glob,
        output_dir = %cfg.output_dir.display(),
        mode = %cfg.mode,
        policy = %cfg.classification_policy,
        stack_mode = %cfg.stack_mode,
        format = %cfg.format,
        "starting run"
    );

    let report = hs_core::pipeline::run(&cfg).context("histstack run failed")?;

    let skipped: Vec<serde_json::Value> = report
        .skipped
        .iter()
        .map(|(variation, name)| serde_json::json!({ "variation": variation, "name": name }))
        .collect();
    let output_json = serde_json::json!({
        "files_processed": report.files_processed,
        "files_unclassified": report.files_unclassified,
        "plots_written": report.plots_written,
        "skipped": skipped,
    });
    write_json(summary, output_json)
}

fn cmd_list(file: &PathBuf) -> Result<()> {
    let f = hs_root::RootFile::open(file).with_context(|| format!("failed to open {}", file.display()))?;
    let keys = f.walk_keys().with_context(|| format!("failed to read keys of {}", file.display()))?;
    tracing::info!(path = %file.display(), keys = keys.len(), "listed keys");

    let entries: Vec<serde_json::Value> = keys
        .iter()
        .map(|k| {
            serde_json::json!({
                "name": k.name,
                "class": k.class_name,
                "cycle": k.cycle,
                "histogram": hs_root::is_supported_histogram(&k.class_name),
            })
        })
        .collect();
    write_json(None, serde_json::Value::Array(entries))
}

fn cmd_classify(names: &[String], policy: ClassificationPolicy) -> Result<()> {
    let entries: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            let record = FileRecord::new(name, policy);
            serde_json::json!({
                "file": name,
                "classification": record.classification,
                "variation": record.variation,
            })
        })
        .collect();
    write_json(None, serde_json::Value::Array(entries))
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
