// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Per epoch:
//   - shuffled training stream, fixed batch size, short trailing
//     batch dropped
//   - forward → mean cross-entropy → backward → one Adam step
//   - progress line every `log_interval` batches
//   - evaluation over the test stream on the inner backend
// After the last epoch the parameters are written to the
// checkpoint.
//
// Gradients are not accumulated between batches: `backward()`
// produces a fresh gradient set that the optimizer step consumes.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::{
        dataloader::DataLoaderBuilder,
        dataset::{vision::MnistItem, Dataset},
    },
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::MnistBatcher;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{evaluator::evaluate, model::MnistModel};

/// What a finished training run leaves behind.
pub struct TrainingReport<B: AutodiffBackend> {
    pub epochs: Vec<EpochMetrics>,
    pub model:  MnistModel<B>,
}

pub fn run_training<B, D>(
    cfg:           &TrainConfig,
    train_dataset: D,
    test_dataset:  D,
    ckpt_manager:  &CheckpointManager,
    device:        B::Device,
) -> Result<TrainingReport<B>>
where
    B: AutodiffBackend,
    D: Dataset<MnistItem> + 'static,
{
    ensure!(cfg.epochs > 0, "epochs must be positive");
    ensure!(cfg.batch_size > 0, "batch_size must be positive");
    ensure!(cfg.log_interval > 0, "log_interval must be positive");

    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: MnistModel<B> = cfg.model.init(&device);
    tracing::info!(
        "Model ready: conv {}→{} {}×{}, dense {}→{}",
        cfg.model.in_channels,
        cfg.model.conv_channels,
        cfg.model.kernel_size,
        cfg.model.kernel_size,
        cfg.model.dense_inputs(),
        cfg.model.num_classes,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // β1 = 0.9, β2 = 0.999, ε = 1e-8
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    let test_loader = DataLoaderBuilder::new(MnistBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(test_dataset);

    let metrics_log    = MetricsLogger::new(ckpt_manager.metrics_file())?;
    let mut history    = Vec::with_capacity(cfg.epochs);
    let mut best_loss  = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        let full_batches = train_loader
            .iter()
            .filter(|batch| batch.len() == cfg.batch_size);

        for (batch_id, batch) in full_batches.enumerate() {
            let output = model.forward_with_labels(batch.images, batch.targets.clone());
            let loss   = output.loss(batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                tracing::warn!("Non-finite loss at epoch {} step {}: {}", epoch, batch_id, loss_val);
            }
            loss_sum += loss_val;
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);

            if batch_id % cfg.log_interval == 0 {
                println!("Loss at epoch {} step {}: {:.6}", epoch, batch_id, loss_val);
            }
        }

        let train_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };

        // ── Evaluation ───────────────────────────────────────────────────────
        // model.valid() → MnistModel<B::InnerBackend>, no autodiff graph
        let model_valid = model.valid();
        let test        = evaluate(&model_valid, test_loader.as_ref(), cfg.batch_size);

        println!(
            "Loss at epoch {} , Test avg_loss is: {:.6}, acc is: {:.4}",
            epoch, test.loss, test.accuracy,
        );

        let row = EpochMetrics::new(epoch, batches, train_loss, test.loss, test.accuracy);
        if row.is_improvement(best_loss) {
            best_loss = row.test_loss;
            tracing::info!("Epoch {}: best test loss so far ({:.6})", epoch, best_loss);
        }
        metrics_log.log(&row)?;
        history.push(row);
    }

    let checkpoint_file = ckpt_manager.save_model(&model)?;
    println!("checkpoint saved to {}", checkpoint_file.display());

    Ok(TrainingReport { epochs: history, model })
}
