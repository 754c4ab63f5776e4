// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to Layer 2. Without a
// subcommand the full pipeline runs with default settings:
// train for 5 epochs, save the checkpoint, classify the
// default image.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use commands::{Commands, InferArgs, RunArgs, DEFAULT_IMAGE};
use crate::application::train_use_case::TrainConfig;
use crate::domain::traits::DigitRecognizer;

#[derive(Parser, Debug)]
#[command(
    name = "simple-mnist",
    version,
    about = "Train a small CNN on MNIST, save a checkpoint, then classify an image."
)]
pub struct Cli {
    /// The subcommand to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Run(args))   => run_pipeline(args),
            Some(Commands::Train(args)) => run_train(args.into()).map(|_| ()),
            Some(Commands::Infer(args)) => run_infer(args),
            None => {
                let cfg = TrainConfig::default();
                let checkpoint = run_train(cfg)?;
                print_prediction(&checkpoint, Path::new(DEFAULT_IMAGE))
            }
        }
    }
}

fn run_pipeline(args: RunArgs) -> Result<()> {
    let RunArgs { train, image } = args;
    let checkpoint = run_train(train.into())?;
    print_prediction(&checkpoint, &image)
}

/// Train and return the checkpoint path.
fn run_train(cfg: TrainConfig) -> Result<PathBuf> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training for {} epoch(s)", cfg.epochs);
    let checkpoint = cfg.checkpoint_path.clone();
    let use_case   = TrainUseCase::new(cfg);
    use_case.execute()?;

    Ok(checkpoint)
}

fn run_infer(args: InferArgs) -> Result<()> {
    print_prediction(&args.checkpoint, &args.image)
}

fn print_prediction(checkpoint: &Path, image: &Path) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    let use_case   = InferUseCase::new(checkpoint)?;
    let prediction = use_case.recognize(image)?;
    println!("Inference result of {} is: {}", image.display(), prediction.digit);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::DatasetSource;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["simple-mnist"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["simple-mnist", "run"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else { panic!("expected run") };
        assert_eq!(args.image, PathBuf::from(DEFAULT_IMAGE));

        let cfg: TrainConfig = args.train.into();
        assert_eq!(cfg.epochs, 5);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.dataset, DatasetSource::Mnist);
        assert_eq!(cfg.checkpoint_path, PathBuf::from("save_temp"));
    }

    #[test]
    fn test_train_synthetic_flags() {
        let cli = Cli::try_parse_from([
            "simple-mnist", "train", "--epochs", "2", "--synthetic", "--synthetic-train", "100",
        ])
        .unwrap();
        let Some(Commands::Train(args)) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.epochs, 2);
        assert_eq!(
            cfg.dataset,
            DatasetSource::Synthetic { train: 100, test: 500, seed: 42 }
        );
    }

    #[test]
    fn test_infer_args() {
        let cli = Cli::try_parse_from([
            "simple-mnist", "infer", "--checkpoint", "ckpt/run1", "--image", "x.png",
        ])
        .unwrap();
        let Some(Commands::Infer(args)) = cli.command else { panic!("expected infer") };
        assert_eq!(args.checkpoint, PathBuf::from("ckpt/run1"));
        assert_eq!(args.image, PathBuf::from("x.png"));
    }
}
