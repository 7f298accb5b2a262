use crate::canvas::{InputError, RawCanvasImage};
use crate::classifier::{DigitModel, InferenceError};
use crate::preprocess::preprocess;
use crate::report::{DigitScore, shape_prediction};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Everything that can go wrong between "Predict" and a rendered result.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    /// The drawing itself was unusable; the user redraws and retries.
    Input(InputError),
    /// The classifier backend failed on this request.
    Inference(InferenceError),
}

impl Display for PredictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::Input(e) => write!(f, "{e}"),
            PredictError::Inference(e) => write!(f, "{e}"),
        }
    }
}

impl Error for PredictError {}

impl From<InputError> for PredictError {
    fn from(e: InputError) -> Self {
        PredictError::Input(e)
    }
}

impl From<InferenceError> for PredictError {
    fn from(e: InferenceError) -> Self {
        PredictError::Inference(e)
    }
}

/// Runs one drawing through the whole flow:
/// capture -> preprocess -> classify -> shape for rendering.
///
/// A blank canvas is rejected up front with `InputError::EmptyCanvas`; the
/// classifier is never consulted for it. There is no retry and no caching;
/// each call is one synchronous, self-contained request.
///
/// # Errors
///
/// Returns `PredictError::Input` for an empty canvas and
/// `PredictError::Inference` if the backend fails on this request.
pub fn classify_drawing<M: DigitModel + ?Sized>(
    model: &M,
    canvas: &RawCanvasImage,
) -> Result<Vec<DigitScore>, PredictError> {
    if canvas.is_blank() {
        return Err(InputError::EmptyCanvas.into());
    }
    let image = preprocess(canvas);
    let prediction = model.predict(&image)?;
    Ok(shape_prediction(&prediction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CANVAS_SIZE;
    use crate::classifier::Prediction;
    use crate::preprocess::PreprocessedImage;
    use image::{Rgba, RgbaImage};

    /// Stub that proves the pipeline never reached the classifier.
    struct UnreachableModel;

    impl DigitModel for UnreachableModel {
        fn predict(&self, _image: &PreprocessedImage) -> Result<Prediction, InferenceError> {
            panic!("classifier must not run for a blank canvas");
        }

        fn name(&self) -> String {
            "unreachable".to_string()
        }
    }

    /// Stub that always scores one digit highest.
    struct FixedModel {
        favorite: usize,
    }

    impl DigitModel for FixedModel {
        fn predict(&self, _image: &PreprocessedImage) -> Result<Prediction, InferenceError> {
            let mut scores = [0.0f32; 10];
            scores[self.favorite] = 4.0;
            Prediction::from_scores(&scores)
        }

        fn name(&self) -> String {
            "fixed".to_string()
        }
    }

    fn scribbled_canvas() -> RawCanvasImage {
        let mut pixels =
            RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255]));
        for y in 120..180 {
            for x in 120..180 {
                pixels.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        RawCanvasImage::new(pixels).unwrap()
    }

    #[test]
    fn blank_canvas_short_circuits_before_the_classifier() {
        let result = classify_drawing(&UnreachableModel, &RawCanvasImage::blank());
        assert_eq!(result, Err(PredictError::Input(InputError::EmptyCanvas)));
    }

    #[test]
    fn drawn_canvas_flows_through_to_a_shaped_result() {
        let model = FixedModel { favorite: 3 };
        let rows = classify_drawing(&model, &scribbled_canvas()).unwrap();
        assert_eq!(rows.len(), 10);
        assert!(rows[3].predicted);
        assert_eq!(rows.iter().filter(|r| r.predicted).count(), 1);
    }

    #[test]
    fn trait_objects_work_through_the_pipeline() {
        let model: Box<dyn DigitModel> = Box::new(FixedModel { favorite: 8 });
        let rows = classify_drawing(&*model, &scribbled_canvas()).unwrap();
        assert!(rows[8].predicted);
    }
}
