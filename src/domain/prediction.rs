// ============================================================
// Layer 3 — Prediction Domain Type
// ============================================================
// The result of classifying a single image: one score per
// class (softmax probabilities, length 10 for digits) and the
// arg-max of those scores.
//
// Reference: Rust Book §5 (Structs and Methods)
//            Rust Book §13 (Iterators)

use serde::{Deserialize, Serialize};

/// Class scores for one image plus the winning class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Score per class, in class-index order
    pub scores: Vec<f32>,

    /// Index of the highest score
    pub digit: usize,
}

impl Prediction {
    /// Build a prediction from raw scores, selecting the arg-max.
    /// Returns None when there are no scores to choose from.
    pub fn from_scores(scores: Vec<f32>) -> Option<Self> {
        let digit = argmax(&scores)?;
        Some(Self { scores, digit })
    }

    /// Score assigned to the predicted class
    pub fn confidence(&self) -> f32 {
        self.scores[self.digit]
    }
}

/// Index of the largest value.
///
/// Among equal maxima the LAST index wins, which is what taking the
/// tail of an ascending stable sort gives. `total_cmp` orders NaN
/// above every number, so a NaN score is never silently skipped.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}
