use crate::sketch::Sketch;
use crate::ui;

use digitpad::{
    DigitModel, DigitScore, LoadError, OnnxDigitClassifier, PredictError, classify_drawing,
};
use eframe::egui;
use eframe::{App, Frame};
use std::sync::Arc;

/// Where the pretrained network is expected on disk. Any 1x1x28x28 -> 10
/// ONNX digit network works, e.g. `mnist-8.onnx` from the ONNX model zoo.
pub const MODEL_PATH: &str = "mnist-8.onnx";

/// Explicit canvas lifecycle: blank, or carrying at least one stroke.
///
/// Draw (the first stroke) moves Idle -> Drawn; Clear moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Idle,
    Drawn,
}

/// The main application struct.
/// It holds the high-level state and delegates drawing to the `ui` module.
pub struct MyApp {
    // --- Core state ---
    /// The classifier, loaded once at startup and shared read-only for the
    /// process lifetime; `Err` keeps the load failure to display.
    pub model: Result<Arc<dyn DigitModel>, LoadError>,
    /// The strokes currently on the drawing surface.
    pub sketch: Sketch,
    /// Shaped rows from the latest prediction, ready for chart and table.
    pub last_result: Option<Vec<DigitScore>>,

    // --- UI state ---
    pub canvas_state: CanvasState,
    /// Non-fatal message from the last action (empty canvas, backend error).
    pub warning: Option<String>,
}

impl Default for MyApp {
    fn default() -> Self {
        let model = OnnxDigitClassifier::load(MODEL_PATH)
            .map(|classifier| Arc::new(classifier) as Arc<dyn DigitModel>);
        if let Err(e) = &model {
            eprintln!("Error loading model: {e}");
        }

        Self {
            model,
            sketch: Sketch::new(),
            last_result: None,
            canvas_state: CanvasState::Idle,
            warning: None,
        }
    }
}

impl App for MyApp {
    /// The main update loop, called by eframe on every frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ui::draw_side_panel(self, ctx);
        ui::draw_central_panel(self, ctx);
    }
}

impl MyApp {
    /// Draw transition: called whenever a stroke touches the canvas.
    pub fn mark_drawn(&mut self) {
        self.canvas_state = CanvasState::Drawn;
        self.warning = None;
    }

    /// Clear transition: back to a blank canvas, dropping any result.
    pub fn clear_canvas(&mut self) {
        self.sketch.clear();
        self.canvas_state = CanvasState::Idle;
        self.last_result = None;
        self.warning = None;
    }

    /// Runs one synchronous prediction for the current drawing.
    pub fn predict(&mut self) {
        let model = match &self.model {
            Ok(model) => Arc::clone(model),
            // The button is disabled without a model; nothing to do here.
            Err(_) => return,
        };

        if self.canvas_state == CanvasState::Idle {
            self.warning = Some("Please draw a digit first!".to_string());
            self.last_result = None;
            return;
        }

        let canvas = self.sketch.rasterize();
        match classify_drawing(model.as_ref(), &canvas) {
            Ok(rows) => {
                self.last_result = Some(rows);
                self.warning = None;
            }
            Err(PredictError::Input(e)) => {
                self.warning = Some(e.to_string());
                self.last_result = None;
            }
            Err(PredictError::Inference(e)) => {
                self.warning = Some(format!("Prediction failed: {e}"));
                self.last_result = None;
            }
        }
    }

    /// The digit picked by the latest prediction, if there is one.
    pub fn predicted_digit(&self) -> Option<u8> {
        self.last_result
            .as_ref()?
            .iter()
            .find(|row| row.predicted)
            .map(|row| row.digit)
    }
}
