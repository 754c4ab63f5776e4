use anyhow::{ensure, Result};
use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    prelude::*,
    tensor::{activation::softmax, ElementConversion},
};

use crate::data::preprocessor::IMAGE_SIZE;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct MnistConfig {
    #[config(default = 1)]
    pub in_channels: usize,
    #[config(default = 32)]
    pub conv_channels: usize,
    #[config(default = 3)]
    pub kernel_size: usize,
    #[config(default = 2)]
    pub pool_size: usize,
    #[config(default = 28)]
    pub image_size: usize,
    #[config(default = 10)]
    pub num_classes: usize,
}

impl MnistConfig {
    /// Side length after the valid 3×3 convolution and the pooling:
    /// 28 → 26 → 13 for the defaults.
    /// Zero when the geometry is invalid.
    pub fn pooled_size(&self) -> usize {
        match (self.image_size.checked_sub(self.kernel_size), self.pool_size) {
            (Some(span), pool) if pool > 0 => (span + 1) / pool,
            _ => 0,
        }
    }

    /// Rejects any architecture that cannot be built or cannot take the
    /// 28×28 input the preprocessor produces.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.in_channels > 0, "in_channels must be positive");
        ensure!(self.conv_channels > 0, "conv_channels must be positive");
        ensure!(self.num_classes > 0, "num_classes must be positive");
        ensure!(self.kernel_size > 0, "kernel_size must be positive");
        ensure!(self.pool_size > 0, "pool_size must be positive");
        ensure!(
            self.image_size == IMAGE_SIZE,
            "image_size is {}, inputs are {IMAGE_SIZE}×{IMAGE_SIZE}",
            self.image_size
        );
        ensure!(
            self.kernel_size <= self.image_size,
            "kernel_size {} exceeds image_size {}",
            self.kernel_size,
            self.image_size
        );
        ensure!(
            self.pooled_size() > 0,
            "pool_size {} leaves no features after the convolution",
            self.pool_size
        );
        Ok(())
    }

    /// Width of the flattened feature vector fed to the dense layer
    /// (32 × 13 × 13 = 5408 for the defaults).
    pub fn dense_inputs(&self) -> usize {
        self.conv_channels * self.pooled_size() * self.pooled_size()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> MnistModel<B> {
        let conv1 = Conv2dConfig::new(
            [self.in_channels, self.conv_channels],
            [self.kernel_size, self.kernel_size],
        )
        .init(device);
        let pool = MaxPool2dConfig::new([self.pool_size, self.pool_size])
            .with_strides([self.pool_size, self.pool_size])
            .init();
        let fc1 = LinearConfig::new(self.dense_inputs(), self.num_classes).init(device);

        MnistModel { conv1, pool, activation: Relu::new(), fc1 }
    }
}

#[derive(Module, Debug)]
pub struct MnistModel<B: Backend> {
    pub conv1:      Conv2d<B>,
    pub pool:       MaxPool2d,
    pub activation: Relu,
    pub fc1:        Linear<B>,
}

/// Everything one labelled forward pass produces.
pub struct ModelOutput<B: Backend> {
    /// Pre-softmax class scores — shape [N, num_classes]
    pub logits: Tensor<B, 2>,
    /// Fraction of rows whose arg-max logit equals the label
    pub accuracy: f64,
}

impl<B: Backend> ModelOutput<B> {
    /// Softmax of the logits; every row sums to 1.
    pub fn probabilities(&self) -> Tensor<B, 2> {
        softmax(self.logits.clone(), 1)
    }

    /// Mean cross-entropy of the predictions against `labels`.
    ///
    /// Computed from the logits with a fused log-softmax, which is
    /// mean(-ln(probabilities[label])) without the overflow.
    pub fn loss(&self, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        CrossEntropyLossConfig::new()
            .init(&self.logits.device())
            .forward(self.logits.clone(), labels)
    }
}

impl<B: Backend> MnistModel<B> {
    /// images: [N, 1, 28, 28] → logits: [N, 10]
    pub fn logits(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(images);   // [N, 32, 26, 26]
        let x = self.activation.forward(x);
        let x = self.pool.forward(x);         // [N, 32, 13, 13]
        let x = x.flatten::<2>(1, 3);         // [N, 5408]
        self.fc1.forward(x)                   // [N, 10]
    }

    /// images: [N, 1, 28, 28] → class probabilities: [N, 10]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.logits(images), 1)
    }

    /// Forward pass that also scores the batch against `labels`.
    pub fn forward_with_labels(
        &self,
        images: Tensor<B, 4>,
        labels: Tensor<B, 1, Int>,
    ) -> ModelOutput<B> {
        let logits   = self.logits(images);
        let accuracy = accuracy(logits.clone(), labels);
        ModelOutput { logits, accuracy }
    }

    /// Name and dims of every learnable tensor.
    pub fn param_shapes(&self) -> Vec<(&'static str, Vec<usize>)> {
        shapes_of(
            &self.conv1.weight,
            self.conv1.bias.as_ref(),
            &self.fc1.weight,
            self.fc1.bias.as_ref(),
        )
    }
}

/// Name and dims of every tensor stored in a model record.
pub fn record_shapes<B: Backend>(record: &MnistModelRecord<B>) -> Vec<(&'static str, Vec<usize>)> {
    shapes_of(
        &record.conv1.weight,
        record.conv1.bias.as_ref(),
        &record.fc1.weight,
        record.fc1.bias.as_ref(),
    )
}

fn shapes_of<B: Backend>(
    conv_weight: &Param<Tensor<B, 4>>,
    conv_bias:   Option<&Param<Tensor<B, 1>>>,
    fc_weight:   &Param<Tensor<B, 2>>,
    fc_bias:     Option<&Param<Tensor<B, 1>>>,
) -> Vec<(&'static str, Vec<usize>)> {
    let mut shapes = vec![("conv1.weight", conv_weight.val().dims().to_vec())];
    if let Some(bias) = conv_bias {
        shapes.push(("conv1.bias", bias.val().dims().to_vec()));
    }
    shapes.push(("fc1.weight", fc_weight.val().dims().to_vec()));
    if let Some(bias) = fc_bias {
        shapes.push(("fc1.bias", bias.val().dims().to_vec()));
    }
    shapes
}

/// Fraction in [0, 1] of rows where arg-max(scores) == label.
pub fn accuracy<B: Backend>(scores: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> f64 {
    let total = labels.dims()[0];
    if total == 0 {
        return 0.0;
    }
    // argmax(1) returns [N, 1] — squeeze to [N] before comparing
    let predictions = scores.argmax(1).squeeze::<1>(1);
    let correct = predictions
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<f64>();
    correct / total as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::NdArray,
        tensor::{Distribution, TensorData},
    };

    type TestBackend = NdArray;

    fn random_images(n: usize) -> Tensor<TestBackend, 4> {
        Tensor::random([n, 1, 28, 28], Distribution::Uniform(-1.0, 1.0), &Default::default())
    }

    #[test]
    fn test_default_dense_inputs() {
        assert_eq!(MnistConfig::new().dense_inputs(), 5408);
    }

    #[test]
    fn test_param_shapes() {
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&Default::default());
        assert_eq!(
            model.param_shapes(),
            vec![
                ("conv1.weight", vec![32, 1, 3, 3]),
                ("conv1.bias", vec![32]),
                ("fc1.weight", vec![5408, 10]),
                ("fc1.bias", vec![10]),
            ]
        );
    }

    #[test]
    fn test_record_shapes_match_module() {
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&Default::default());
        let shapes = model.param_shapes();
        assert_eq!(record_shapes(&model.into_record()), shapes);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(MnistConfig::new().validate().is_ok());
        assert!(MnistConfig::new().with_conv_channels(16).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unbuildable_geometry() {
        let bad = [
            MnistConfig::new().with_pool_size(0),
            MnistConfig::new().with_kernel_size(0),
            MnistConfig::new().with_kernel_size(40),
            MnistConfig::new().with_pool_size(40),
            MnistConfig::new().with_image_size(32),
            MnistConfig::new().with_conv_channels(0),
            MnistConfig::new().with_num_classes(0),
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
        assert_eq!(MnistConfig::new().with_pool_size(0).pooled_size(), 0);
        assert_eq!(MnistConfig::new().with_kernel_size(40).pooled_size(), 0);
    }

    #[test]
    fn test_output_shape_and_rows_sum_to_one() {
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&Default::default());
        for n in [1, 5] {
            let out = model.forward(random_images(n));
            assert_eq!(out.dims(), [n, 10]);

            let sums = out.sum_dim(1).into_data().to_vec::<f32>().unwrap();
            assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-5), "{sums:?}");
        }
    }

    #[test]
    fn test_accuracy_matches_manual_argmax() {
        let device = Default::default();
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&device);
        let n      = 8;
        let images = random_images(n);

        let logits = model.logits(images.clone()).into_data().to_vec::<f32>().unwrap();
        let argmax: Vec<i64> = logits
            .chunks(10)
            .map(|row| crate::domain::prediction::argmax(row).unwrap() as i64)
            .collect();

        // half the labels agree with the model, half are shifted off by one
        let labels: Vec<i64> = argmax
            .iter()
            .enumerate()
            .map(|(i, &a)| if i % 2 == 0 { a } else { (a + 1) % 10 })
            .collect();
        let labels_t = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(labels, [n]),
            &device,
        );

        let out = model.forward_with_labels(images, labels_t);
        assert!((out.accuracy - 0.5).abs() < 1e-12);
        assert_eq!(out.probabilities().dims(), [n, 10]);
    }

    #[test]
    fn test_accuracy_all_correct_and_all_wrong() {
        let device = Default::default();
        let scores = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![0.1f32, 0.9, 0.8, 0.2], [2, 2]),
            &device,
        );
        let right = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![1i64, 0], [2]), &device);
        let wrong = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![0i64, 1], [2]), &device);

        assert_eq!(accuracy(scores.clone(), right), 1.0);
        assert_eq!(accuracy(scores, wrong), 0.0);
    }

    #[test]
    fn test_loss_is_finite_and_positive() {
        let device = Default::default();
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&device);
        let labels = Tensor::<TestBackend, 1, Int>::from_data(TensorData::new(vec![0i64, 3, 9], [3]), &device);

        let out  = model.forward_with_labels(random_images(3), labels.clone());
        let loss = out.loss(labels).into_scalar().elem::<f64>();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_custom_config_changes_dense_width() {
        let cfg = MnistConfig::new().with_conv_channels(16);
        assert_eq!(cfg.dense_inputs(), 16 * 13 * 13);

        let model: MnistModel<TestBackend> = cfg.init(&Default::default());
        assert_eq!(model.forward(random_images(2)).dims(), [2, 10]);
    }
}
