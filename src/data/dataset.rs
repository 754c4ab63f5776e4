use burn::data::dataset::{
    vision::{MnistDataset, MnistItem},
    Dataset, InMemDataset,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::preprocessor::IMAGE_SIZE;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// Where the training and test items come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    /// The real MNIST splits, downloaded and cached by Burn
    Mnist,

    /// Seeded, generated digits for offline runs and tests
    Synthetic { train: usize, test: usize, seed: u64 },
}

impl DatasetSource {
    /// Build the (train, test) datasets.
    pub fn load(&self) -> (DigitDataset, DigitDataset) {
        match self {
            DatasetSource::Mnist => (
                DigitDataset::Mnist(MnistDataset::train()),
                DigitDataset::Mnist(MnistDataset::test()),
            ),
            DatasetSource::Synthetic { train, test, seed } => (
                DigitDataset::synthetic(*train, *seed),
                // distinct stream so test noise never repeats train noise
                DigitDataset::synthetic(*test, seed.wrapping_add(1)),
            ),
        }
    }
}

/// Either split of MNIST, or an in-memory synthetic set.
pub enum DigitDataset {
    Mnist(MnistDataset),
    Synthetic(InMemDataset<MnistItem>),
}

impl DigitDataset {
    pub fn synthetic(count: usize, seed: u64) -> Self {
        DigitDataset::Synthetic(InMemDataset::new(synthetic_items(count, seed)))
    }
}

impl Dataset<MnistItem> for DigitDataset {
    fn get(&self, index: usize) -> Option<MnistItem> {
        match self {
            DigitDataset::Mnist(d)     => d.get(index),
            DigitDataset::Synthetic(d) => d.get(index),
        }
    }

    fn len(&self) -> usize {
        match self {
            DigitDataset::Mnist(d)     => d.len(),
            DigitDataset::Synthetic(d) => d.len(),
        }
    }
}

/// Generate `count` MNIST-shaped items with balanced labels.
///
/// Each class `c` draws a bright two-row horizontal stroke at rows
/// `4 + 2c` and `5 + 2c`, over low-intensity background noise. Pixel
/// values are raw intensities in [0, 255] like the real dataset.
pub fn synthetic_items(count: usize, seed: u64) -> Vec<MnistItem> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let label = (i % NUM_CLASSES) as u8;
            let mut image = [[0f32; IMAGE_SIZE]; IMAGE_SIZE];

            for row in image.iter_mut() {
                for px in row.iter_mut() {
                    *px = rng.gen_range(0.0..30.0);
                }
            }

            let top = 4 + 2 * label as usize;
            for row in &mut image[top..top + 2] {
                for px in &mut row[4..IMAGE_SIZE - 4] {
                    *px = 255.0 - rng.gen_range(0.0..30.0);
                }
            }

            MnistItem { image, label }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_is_seeded() {
        let a = synthetic_items(20, 7);
        let b = synthetic_items(20, 7);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.label, y.label);
            assert_eq!(x.image, y.image);
        }
    }

    #[test]
    fn test_synthetic_labels_balanced() {
        let items = synthetic_items(30, 0);
        for class in 0..NUM_CLASSES as u8 {
            assert_eq!(items.iter().filter(|i| i.label == class).count(), 3);
        }
    }

    #[test]
    fn test_synthetic_pixels_in_range() {
        let items = synthetic_items(10, 3);
        assert!(items
            .iter()
            .flat_map(|i| i.image.iter().flatten())
            .all(|&v| (0.0..=255.0).contains(&v)));
    }

    #[test]
    fn test_source_lengths() {
        let src = DatasetSource::Synthetic { train: 12, test: 5, seed: 1 };
        let (train, test) = src.load();
        assert_eq!(train.len(), 12);
        assert_eq!(test.len(), 5);
        assert!(train.get(12).is_none());
    }
}
