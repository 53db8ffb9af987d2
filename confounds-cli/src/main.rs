//! Confounds CLI: select nuisance regressors from fMRIPrep outputs.
//!
//! Commands:
//! - `load`: resolve confound files, apply a strategy, write the selected matrix
//! - `presets`: list the named configurations
//!
//! Logs go to stderr; `RUST_LOG` overrides the default `info` level.

mod export;
mod source;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use confounds_core::{ConfoundConfig, ConfoundSource, Preset, ScanConfounds, StrategyEngine};

use crate::export::{save_outputs, Provenance, OUTPUT_SUFFIX};
use crate::source::{output_stem, FileSource};

#[derive(Parser)]
#[command(
    name = "confounds",
    about = "Select fMRIPrep confound regressors with a denoising strategy"
)]
struct Cli {
    /// Debug-level logging.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load confounds for one or more scans and write the selected regressors.
    Load {
        /// Confounds TSVs or preprocessed BOLD images (.nii / .nii.gz).
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: minimal, scrubbing, compcor, ica_aroma.
        #[arg(long)]
        preset: Option<String>,

        /// Comma-separated noise categories, replacing the config's strategy.
        #[arg(long, value_delimiter = ',')]
        strategy: Vec<String>,

        /// Output directory for the selected confounds.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// List the named presets and their strategies.
    Presets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Load {
            inputs,
            config,
            preset,
            strategy,
            output_dir,
        } => {
            let config = build_config(config.as_deref(), preset.as_deref(), &strategy)?;
            run_load(&inputs, config, &output_dir)
        }
        Commands::Presets => {
            run_presets();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file or preset (mutually exclusive, default config otherwise),
/// then the `--strategy` override.
fn build_config(
    config_path: Option<&Path>,
    preset_name: Option<&str>,
    strategy: &[String],
) -> Result<ConfoundConfig> {
    let config = match (config_path, preset_name) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (Some(path), None) => ConfoundConfig::from_file(path)?,
        (None, Some(name)) => name.parse::<Preset>()?.config(),
        (None, None) => ConfoundConfig::default(),
    };
    if strategy.is_empty() {
        Ok(config)
    } else {
        Ok(config.with_strategy(strategy.iter().map(|s| s.trim())))
    }
}

fn run_load(inputs: &[PathBuf], config: ConfoundConfig, output_dir: &Path) -> Result<()> {
    let engine = StrategyEngine::new(config)?;
    info!(
        strategy = ?engine.strategy().names(),
        config_hash = %engine.config().config_hash(),
        scans = inputs.len(),
        "loading confounds"
    );

    let source = FileSource;
    let tsv_paths = inputs
        .iter()
        .map(|input| source.locate(input))
        .collect::<Result<Vec<_>, _>>()?;
    let stems = unique_stems(&tsv_paths)?;

    let mut scans: Vec<ScanConfounds> = Vec::with_capacity(inputs.len());
    for input in inputs {
        scans.push(source.resolve(input)?);
    }

    let matrices = engine.load_many(&scans).context("confound selection failed")?;

    for ((tsv, stem), matrix) in tsv_paths.iter().zip(&stems).zip(&matrices) {
        let provenance = Provenance::new(tsv, engine.config(), matrix);
        let written = save_outputs(matrix, &provenance, output_dir, stem)?;
        println!(
            "{} -> {} ({} rows, {} regressors)",
            tsv.display(),
            written.display(),
            matrix.n_rows(),
            matrix.n_cols()
        );
    }

    Ok(())
}

/// Output stems for every confounds file. Two inputs that would write the
/// same output file are rejected.
fn unique_stems(tsv_paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut stems = Vec::with_capacity(tsv_paths.len());
    for tsv in tsv_paths {
        let stem = output_stem(tsv);
        if let Some(first) = seen.insert(stem.clone(), tsv.as_path()) {
            bail!(
                "{} and {} would both write {stem}{OUTPUT_SUFFIX}.tsv; run them with separate --output-dir",
                first.display(),
                tsv.display()
            );
        }
        stems.push(stem);
    }
    Ok(stems)
}

fn run_presets() {
    println!("{:<12} {:<44}", "Preset", "Strategy");
    println!("{}", "-".repeat(56));
    for preset in Preset::ALL {
        println!("{:<12} {:<44}", preset.name(), preset.config().strategy.join(", "));
    }
}
