//! Trainer CLI
//!
//! Builds the base corpus, runs the feedback retraining job and inspects
//! published artifacts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hc_core::{
    Config, DumpExtractor, FeedbackStore, ModelStore, RetrainOptions, Retrainer, ServingModel,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hc_trainer")]
#[command(about = "Build corpora and retrain the gesture classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the base corpus from a per-label landmark dump dataset
    Corpus {
        /// Dataset root: one subdirectory per digit label
        #[arg(long)]
        dataset: PathBuf,

        /// Output corpus file path
        #[arg(long)]
        out: PathBuf,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Merge pending feedback, refit and publish a new model
    Retrain {
        /// Config file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fit and report without publishing or consuming feedback
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Show the serving pointer and all stored artifacts
    Inspect {
        /// Model artifact directory
        #[arg(long)]
        model_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Corpus { dataset, out, metadata } => {
            println!("Building base corpus...");
            println!("   Dataset: {}", dataset.display());
            println!("   Output:  {}", out.display());

            let meta = hc_trainer::build_corpus(&dataset, &out)?;

            println!("\nCorpus built:");
            println!("   Samples:  {}", meta.samples);
            println!("   Labels:   {}", meta.labels);
            println!("   Skipped:  {}", meta.skipped);
            println!("   Size:     {} bytes", meta.file_size);
            println!("   Checksum: {}", meta.checksum);
            println!("   Created:  {}", meta.created_at);

            if meta.labels < 2 {
                println!("\nWarning: fewer than two labels; retraining will refuse this corpus");
            }

            if let Some(path) = metadata {
                std::fs::write(&path, serde_json::to_string_pretty(&meta)?)?;
                println!("\nMetadata saved to {}", path.display());
            }
        }

        Commands::Retrain { config, dry_run } => {
            let config = Config::load_or_default(config.as_deref())
                .context("failed to load config")?;
            println!("Retraining...");
            println!("   Corpus:   {}", config.base_corpus.display());
            println!("   Models:   {}", config.model_dir.display());
            println!("   Feedback: {}", config.feedback_dir.display());

            let job = Retrainer::new(
                &config.base_corpus,
                FeedbackStore::open(&config.feedback_dir),
                ModelStore::new(&config.model_dir),
                Box::new(DumpExtractor),
                Arc::new(ServingModel::empty()),
            );
            let report = job.run_with(RetrainOptions { dry_run })?;

            match report.version {
                Some(version) => println!("\nPublished model v{version}"),
                None => println!("\nDry run, nothing published"),
            }
            println!("   Corpus size:      {}", report.corpus_size);
            println!("   Feedback used:    {}", report.feedback_used);
            println!("   Feedback skipped: {}", report.feedback_skipped);
        }

        Commands::Inspect { model_dir } => {
            let store = ModelStore::new(&model_dir);
            match store.serving_pointer()? {
                Some(pointer) => {
                    println!("Serving: v{} ({})", pointer.version, pointer.file);
                    println!("   Samples: {}", pointer.sample_count);
                    println!("   Created: {} (unix ms)", pointer.created_at);
                }
                None => println!("No serving model published under {}", model_dir.display()),
            }
            let headers = store.artifact_headers()?;
            println!("\n{} artifact(s):", headers.len());
            for header in headers {
                println!(
                    "   v{:<4} {} samples, created {} (unix ms)",
                    header.model_version, header.sample_count, header.created_at
                );
            }
        }
    }

    Ok(())
}
