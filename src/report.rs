use crate::classifier::{NUM_CLASSES, Prediction};

/// One row of the rendered result: a digit, its probability, and whether it
/// is the predicted class (for highlighting in the chart and table).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize)
)]
#[cfg_attr(feature = "serde", serde(crate = "serde_crate"))]
pub struct DigitScore {
    pub digit: u8,
    pub probability: f32,
    pub predicted: bool,
}

/// Lays a prediction out for rendering: ten rows, digits 0 through 9 in
/// ascending order, with `predicted` set on exactly the selected class.
///
/// Pure data transformation; the chart and table views consume this as-is.
pub fn shape_prediction(prediction: &Prediction) -> Vec<DigitScore> {
    (0..NUM_CLASSES)
        .map(|digit| DigitScore {
            digit: digit as u8,
            probability: prediction.probabilities[digit],
            predicted: digit as u8 == prediction.label,
        })
        .collect()
}
