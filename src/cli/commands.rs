// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands:
//
//   train    run the pipeline once and checkpoint the winner
//   predict  label one review with the checkpointed Selection
//   serve    start the web shell
//
// `train` and `serve` share PipelineArgs, which convert into the
// application-layer PipelineConfig. The application layer never
// sees clap types.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::PipelineConfig;
use crate::features::VectorizerConfig;
use crate::ml::classifier::ClassifierConfig;
use crate::ml::inferencer::FeatureReconstruction;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and save the best model
    Train(TrainArgs),

    /// Predict the sentiment of one review with the saved model
    Predict(PredictArgs),

    /// Serve the prediction form and the retrain trigger over HTTP
    Serve(ServeArgs),
}

/// Settings of one pipeline run.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// CSV file with a header row
    #[arg(long = "data", env = "REVIEW_SENTIMENT_DATA", default_value = "Dataset/Product_Reviews.csv")]
    pub data_path: String,

    /// Column holding the review text
    #[arg(long, default_value = "Product Review")]
    pub review_column: String,

    /// Column holding the 0/1/2 sentiment label
    #[arg(long, default_value = "Sentiment")]
    pub label_column: String,

    /// Where the selection, config and leaderboard are written
    #[arg(long, env = "REVIEW_SENTIMENT_CHECKPOINTS", default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Root of the experiment-tracking tree
    #[arg(long, env = "REVIEW_SENTIMENT_TRACKING_DIR", default_value = "mlruns")]
    pub tracking_dir: String,

    #[arg(long, default_value = "llm project")]
    pub experiment: String,

    /// Discard tracking calls instead of writing runs to disk
    #[arg(long)]
    pub no_tracking: bool,

    /// Share of rows held out for scoring
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Seed of the train/test shuffle
    #[arg(long, default_value_t = 42)]
    pub split_seed: u64,

    /// Seed shared by the classifiers
    #[arg(long, default_value_t = 42)]
    pub model_seed: u64,

    /// Vocabulary cap of the bag-of-words strategy
    #[arg(long, default_value_t = 1000)]
    pub max_features: usize,

    /// Embedding dimension of both word2vec strategies
    #[arg(long, default_value_t = 100)]
    pub vector_size: usize,

    #[arg(long, default_value_t = 3)]
    pub window: usize,

    /// Tokens seen fewer times are left out of the embedding vocabulary
    #[arg(long, default_value_t = 2)]
    pub min_count: usize,

    #[arg(long, default_value_t = 5)]
    pub embedding_epochs: usize,

    /// Fix the embedding initialisation; unset draws from OS entropy
    #[arg(long)]
    pub embedding_seed: Option<u64>,

    #[arg(long, default_value_t = 100)]
    pub forest_trees: usize,

    #[arg(long, default_value_t = 100)]
    pub boost_stages: usize,

    #[arg(long, default_value_t = 50)]
    pub ada_estimators: usize,

    /// How single-text features are rebuilt at prediction time
    #[arg(long, value_enum, default_value_t = FeatureReconstruction::ReuseFitted)]
    pub reconstruction: FeatureReconstruction,
}

impl From<PipelineArgs> for PipelineConfig {
    fn from(a: PipelineArgs) -> Self {
        PipelineConfig {
            data_path:      a.data_path,
            review_column:  a.review_column,
            label_column:   a.label_column,
            tracking_dir:   a.tracking_dir,
            experiment:     a.experiment,
            checkpoint_dir: a.checkpoint_dir,
            test_fraction:  a.test_fraction,
            split_seed:     a.split_seed,
            vectorizer:     VectorizerConfig {
                max_features: a.max_features,
                vector_size:  a.vector_size,
                window:       a.window,
                min_count:    a.min_count,
                epochs:       a.embedding_epochs,
                seed:         a.embedding_seed,
                ..VectorizerConfig::default()
            },
            classifiers:    ClassifierConfig {
                seed:           a.model_seed,
                forest_trees:   a.forest_trees,
                boost_stages:   a.boost_stages,
                ada_estimators: a.ada_estimators,
                ..ClassifierConfig::default()
            },
            reconstruction: a.reconstruction,
            no_tracking:    a.no_tracking,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Review text to classify
    #[arg(long)]
    pub text: String,

    /// Directory the `train` command saved into
    #[arg(long, env = "REVIEW_SENTIMENT_CHECKPOINTS", default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Feature rebuild mode; defaults to the mode saved with the model
    #[arg(long, value_enum)]
    pub reconstruction: Option<FeatureReconstruction>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to (host:port)
    #[arg(long, env = "REVIEW_SENTIMENT_BIND", default_value = "127.0.0.1:9070")]
    pub bind: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}
