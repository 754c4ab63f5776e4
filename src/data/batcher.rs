// ============================================================
// Layer 4 — MNIST Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<MnistItem>
// into model-ready tensors.
//
//   Input:  N items, each a 28×28 array of raw [0,255] pixels
//   Output: images  [N, 1, 28, 28]  normalised to [-1, 1]
//           targets [N]             class index per item
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    prelude::*,
    tensor::{ElementConversion, TensorData},
};

use crate::data::preprocessor::{normalize_pixel, IMAGE_SIZE};

// ─── MnistBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct MnistBatch<B: Backend> {
    /// Shape: [batch_size, 1, 28, 28]
    pub images: Tensor<B, 4>,

    /// Shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatch<B> {
    /// Number of examples in this batch
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }
}

// ─── MnistBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<MnistItem, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistItem>) -> MnistBatch<B> {
        let batch_size = items.len();

        // Row-major, item after item: [N, 1, H, W]
        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.image.iter().flatten().map(|&v| normalize_pixel(v)))
            .collect();

        let labels: Vec<B::IntElem> = items
            .iter()
            .map(|item| (item.label as i64).elem::<B::IntElem>())
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, 1, IMAGE_SIZE, IMAGE_SIZE])
                .convert::<B::FloatElem>(),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        MnistBatch { images, targets }
    }
}
