// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs a frozen model over a batch stream and reduces the
// per-batch loss / accuracy to their means.
//
// "Evaluation mode" is expressed through the type system: the
// model passed in lives on a non-autodiff backend (obtained via
// `model.valid()`), so no gradient graph is recorded and the
// model cannot be mutated. Short trailing batches are skipped,
// matching the training stream.

use burn::{
    data::dataloader::DataLoader,
    prelude::*,
    tensor::ElementConversion,
};

use crate::data::batcher::MnistBatch;
use crate::domain::evaluation::{EvalAccumulator, EvalSummary};
use crate::ml::model::MnistModel;

pub fn evaluate<B: Backend>(
    model:      &MnistModel<B>,
    loader:     &dyn DataLoader<MnistBatch<B>>,
    batch_size: usize,
) -> EvalSummary {
    let mut acc = EvalAccumulator::new();

    for batch in loader.iter() {
        if batch.len() != batch_size {
            continue;
        }

        let output = model.forward_with_labels(batch.images, batch.targets.clone());
        let loss   = output.loss(batch.targets).into_scalar().elem::<f64>();

        acc.push(loss, output.accuracy);
    }

    acc.finish()
}
