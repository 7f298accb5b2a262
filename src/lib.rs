//! Core pipeline for the digit sketchpad demo.
//!
//! A drawing captured from a 300x300 canvas flows one way through three
//! stages: preprocessing into the 28x28 inverted grayscale image the
//! pretrained network expects, inference through the ONNX classifier
//! adapter, and shaping of the resulting probability distribution into rows
//! a chart or table can render directly.

/// Canvas capture buffer and input validation.
pub mod canvas;
/// Classifier adapter: model loading and inference.
pub mod classifier;
/// The end-to-end capture-to-result flow.
pub mod pipeline;
/// Drawing-to-classifier-input preprocessing.
pub mod preprocess;
/// Result shaping for chart and table rendering.
pub mod report;

pub use canvas::{CANVAS_SIZE, InputError, RawCanvasImage};
pub use classifier::{
    DigitModel, InferenceError, LoadError, NUM_CLASSES, OnnxDigitClassifier, Prediction,
};
pub use pipeline::{PredictError, classify_drawing};
pub use preprocess::{MODEL_SIDE, PreprocessedImage, preprocess};
pub use report::{DigitScore, shape_prediction};
