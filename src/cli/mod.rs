// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to the
// application layer. Printing happens here and nowhere below.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;

use crate::application::predict_use_case::PredictUseCase;
use crate::application::selection_store::SelectionStore;
use crate::application::train_use_case::{PipelineConfig, TrainUseCase};
use crate::domain::traits::{SentimentPredictor, TrackingSink};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::tracking::{FsTrackingSink, NullSink};
use crate::ml::inferencer::FeatureReconstruction;
use commands::{Commands, PredictArgs, ServeArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "review-sentiment",
    version,
    about = "Train and serve a three-class product review sentiment classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Serve(args)   => run_serve(args),
        }
    }
}

fn tracking_sink(config: &PipelineConfig) -> Result<Arc<dyn TrackingSink>> {
    if config.no_tracking {
        tracing::info!("Experiment tracking disabled");
        return Ok(Arc::new(NullSink));
    }
    Ok(Arc::new(FsTrackingSink::new(&config.tracking_dir, &config.experiment)?))
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config: PipelineConfig = args.pipeline.into();
    tracing::info!("Training on '{}'", config.data_path);

    let use_case = TrainUseCase::new(config.clone(), tracking_sink(&config)?);
    let outcome  = use_case.execute()?;
    use_case.persist(&outcome)?;

    println!("{:<20} {:<14} {:>9}", "vectorizer", "model", "macro_f1");
    for row in &outcome.leaderboard {
        println!("{:<20} {:<14} {:>9.4}", row.vectorizer.name(), row.model.name(), row.macro_f1);
    }
    for failure in &outcome.failures {
        println!("{:<35} failed: {}", failure.label(), failure.reason);
    }
    println!(
        "\nBest: {} (macro_f1={:.4}). Checkpoint saved to '{}'.",
        outcome.selection.label(),
        outcome.selection.macro_f1,
        config.checkpoint_dir
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let ckpt = CheckpointManager::new(&args.checkpoint_dir)?;
    let selection = ckpt.load_selection_if_exists()?.ok_or_else(|| {
        anyhow!(
            "No saved model in '{}'. Make sure you have run 'train' first.",
            args.checkpoint_dir
        )
    })?;

    let mode      = args.reconstruction.unwrap_or_else(|| saved_reconstruction(&ckpt));
    let store     = Arc::new(SelectionStore::new(Some(selection)));
    let predictor = PredictUseCase::new(store, mode);
    let label     = predictor.predict(&args.text)?;

    println!("{label}");
    Ok(())
}

/// Reconstruction mode of the run that saved the checkpoint.
fn saved_reconstruction(ckpt: &CheckpointManager) -> FeatureReconstruction {
    match ckpt.load_config() {
        Ok(config) => config.reconstruction,
        Err(e) => {
            tracing::debug!("No saved pipeline config, using the default reconstruction: {e:#}");
            FeatureReconstruction::default()
        }
    }
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let config: PipelineConfig = args.pipeline.into();

    // A missing or unreadable checkpoint just means "not trained yet"
    let initial = CheckpointManager::new(&config.checkpoint_dir)
        .and_then(|ckpt| ckpt.load_selection_if_exists())
        .unwrap_or_else(|e| {
            tracing::warn!("Starting without a model: {e:#}");
            None
        });
    let store = Arc::new(SelectionStore::new(initial));
    if !store.is_ready() {
        tracing::info!("No model loaded; POST /retrain to train one");
    }

    let state = crate::web::AppState::new(config.clone(), tracking_sink(&config)?, store);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(crate::web::serve(&args.bind, state))
}
