use crate::preprocess::{MODEL_SIDE, PreprocessedImage};
use ndarray::Array1;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Number of digit classes the network distinguishes.
pub const NUM_CLASSES: usize = 10;

/// Errors that can occur while loading the model artifact.
///
/// These are fatal to the session: no predictions can be made until the
/// process is restarted with a valid artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// No file exists at the artifact path.
    Missing(PathBuf),
    /// The artifact exists but could not be parsed, optimized, or is not
    /// a network this adapter can drive.
    Invalid(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Missing(path) => {
                write!(f, "model artifact not found at '{}'", path.display())
            }
            LoadError::Invalid(reason) => write!(f, "could not load model artifact: {reason}"),
        }
    }
}

impl Error for LoadError {}

/// Errors that can occur for a single prediction request.
///
/// Unlike [`LoadError`] these are not fatal; the next request starts fresh.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The backend failed while executing the network.
    Execution(String),
    /// The network returned no output tensors.
    NoOutput,
    /// The output tensor did not hold one score per digit class.
    BadOutput(usize),
}

impl Display for InferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::Execution(reason) => write!(f, "inference failed: {reason}"),
            InferenceError::NoOutput => write!(f, "model produced no output tensors"),
            InferenceError::BadOutput(len) => {
                write!(f, "model produced {len} scores, expected {NUM_CLASSES}")
            }
        }
    }
}

impl Error for InferenceError {}

/// The outcome of classifying one drawing: a categorical distribution over
/// the ten digits and the class it selects.
///
/// Invariants, enforced by [`Prediction::from_scores`]: the vector has
/// exactly [`NUM_CLASSES`] non-negative entries summing to 1 (within float
/// tolerance), ordered by class index, and `label` is its argmax with ties
/// broken toward the lowest class index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize)
)]
#[cfg_attr(feature = "serde", serde(crate = "serde_crate"))]
pub struct Prediction {
    /// The predicted digit, 0 through 9.
    pub label: u8,
    /// Probability per digit class, indexed by digit.
    pub probabilities: Array1<f32>,
}

impl Prediction {
    /// Turns raw per-class scores into a prediction.
    ///
    /// Scores are passed through a numerically stable softmax; softmax is
    /// monotone, so this is safe whether the network emits logits or
    /// already-normalized probabilities.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::BadOutput` if `scores` does not hold one
    /// value per digit class.
    pub fn from_scores(scores: &[f32]) -> Result<Self, InferenceError> {
        if scores.len() != NUM_CLASSES {
            return Err(InferenceError::BadOutput(scores.len()));
        }
        let probabilities = softmax(scores);
        let label = argmax(&probabilities) as u8;
        Ok(Self {
            label,
            probabilities: Array1::from_vec(probabilities),
        })
    }
}

/// The seam between the pipeline and whatever runs the network.
///
/// The shipped implementation is [`OnnxDigitClassifier`]; tests substitute
/// stubs. Implementations must be safe to share read-only across threads.
pub trait DigitModel: Send + Sync {
    /// Classifies one preprocessed drawing.
    fn predict(&self, image: &PreprocessedImage) -> Result<Prediction, InferenceError>;

    /// Human-readable model name for status displays.
    fn name(&self) -> String;
}

type RunnablePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A pretrained digit network loaded from an ONNX artifact.
///
/// The artifact is parsed and optimized once at load; the resulting plan is
/// immutable and safe for concurrent read-only inference, so a single
/// instance (behind an `Arc`) serves the whole process.
pub struct OnnxDigitClassifier {
    plan: RunnablePlan,
    name: String,
}

impl OnnxDigitClassifier {
    /// Loads the network from a serialized ONNX file.
    ///
    /// The plan is specialized to the `1x1x28x28` float input the
    /// preprocessor produces; artifacts with a different input signature
    /// fail here rather than at prediction time.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Missing` if `path` is not a file, or
    /// `LoadError::Invalid` if the artifact cannot be parsed or optimized.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }

        let side = MODEL_SIDE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 1, side, side)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| LoadError::Invalid(e.to_string()))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { plan, name })
    }
}

impl DigitModel for OnnxDigitClassifier {
    fn predict(&self, image: &PreprocessedImage) -> Result<Prediction, InferenceError> {
        let normalized = image.to_normalized();
        let side = MODEL_SIDE as usize;
        let input: Tensor =
            tract_ndarray::Array4::from_shape_fn((1, 1, side, side), |(_, _, y, x)| {
                normalized[(y, x)]
            })
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Execution(e.to_string()))?;
        let output = outputs.first().ok_or(InferenceError::NoOutput)?;
        let scores: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Execution(e.to_string()))?
            .iter()
            .copied()
            .collect();

        Prediction::from_scores(&scores)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Numerically stable softmax: shift by the max before exponentiating so
/// large scores cannot overflow.
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; strict comparison keeps the lowest index on
/// ties.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn softmax_is_a_distribution() {
        let probs = softmax(&[2.0, -1.0, 0.5, 3.25, -7.0, 0.0, 1.0, 1.0, -2.5, 4.0]);
        assert_eq!(probs.len(), 10);
        assert!(probs.iter().all(|&p| p >= 0.0));
        assert_abs_diff_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn softmax_survives_large_scores() {
        let probs = softmax(&[1000.0, 999.0, 998.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-4);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn argmax_breaks_ties_toward_lowest_index() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 1.0]), 2);
    }

    #[test]
    fn prediction_label_is_argmax_of_probabilities() {
        let scores = [0.3, 2.0, -1.0, 0.0, 5.5, 0.2, 0.2, 1.9, -0.4, 0.0];
        let prediction = Prediction::from_scores(&scores).unwrap();
        assert_eq!(prediction.label, 4);
        assert_eq!(prediction.probabilities.len(), NUM_CLASSES);

        let max = prediction
            .probabilities
            .iter()
            .cloned()
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(prediction.probabilities[prediction.label as usize], max);
    }

    #[test]
    fn prediction_preserves_score_order() {
        let scores = [9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        let prediction = Prediction::from_scores(&scores).unwrap();
        for window in prediction.probabilities.as_slice().unwrap().windows(2) {
            assert!(window[0] > window[1]);
        }
        assert_eq!(prediction.label, 0);
    }

    #[test]
    fn wrong_score_count_is_rejected() {
        let result = Prediction::from_scores(&[0.5, 0.5]);
        assert_eq!(result, Err(InferenceError::BadOutput(2)));
    }

    #[test]
    fn missing_artifact_is_a_load_error() {
        let result = OnnxDigitClassifier::load("no/such/model.onnx");
        assert!(matches!(result, Err(LoadError::Missing(_))));
    }
}
