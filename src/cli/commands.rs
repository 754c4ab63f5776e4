// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   run   — train, then classify one image (the default)
//   train — train only
//   infer — classify one image from an existing checkpoint
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::data::dataset::DatasetSource;

/// Image classified after training when none is given
pub const DEFAULT_IMAGE: &str = "assets/images/infer_3.png";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train, save the checkpoint, then classify one image
    Run(RunArgs),

    /// Train the model and save the checkpoint
    Train(TrainArgs),

    /// Classify an image using a saved checkpoint
    Infer(InferArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of full passes through the training set
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Examples per batch; a short trailing batch is dropped
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Seed for weight init and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print training loss every N batches
    #[arg(long, default_value_t = 100)]
    pub log_interval: usize,

    /// Checkpoint path (the recorder appends .mpk.gz)
    #[arg(long, default_value = "save_temp")]
    pub checkpoint: PathBuf,

    /// Directory for the exported inference model
    #[arg(long, default_value = "model/simple_mnist")]
    pub export_dir: PathBuf,

    /// Train on generated digits instead of downloading MNIST
    #[arg(long)]
    pub synthetic: bool,

    /// Training items generated with --synthetic
    #[arg(long, default_value_t = 2000, requires = "synthetic")]
    pub synthetic_train: usize,

    /// Test items generated with --synthetic
    #[arg(long, default_value_t = 500, requires = "synthetic")]
    pub synthetic_test: usize,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        let dataset = if a.synthetic {
            DatasetSource::Synthetic {
                train: a.synthetic_train,
                test:  a.synthetic_test,
                seed:  a.seed,
            }
        } else {
            DatasetSource::Mnist
        };

        TrainConfig {
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            learning_rate:   a.learning_rate,
            seed:            a.seed,
            log_interval:    a.log_interval,
            checkpoint_path: a.checkpoint,
            export_dir:      a.export_dir,
            dataset,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Image to classify once training finishes
    #[arg(long, default_value = DEFAULT_IMAGE)]
    pub image: PathBuf,
}

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Checkpoint path written by `train`
    #[arg(long, default_value = "save_temp")]
    pub checkpoint: PathBuf,

    /// Image file to classify (any common raster format)
    #[arg(long, default_value = DEFAULT_IMAGE)]
    pub image: PathBuf,
}
