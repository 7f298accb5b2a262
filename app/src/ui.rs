use crate::app::MyApp;
use crate::sketch::BRUSH_SIZE;

use digitpad::{CANVAS_SIZE, DigitScore};
use eframe::egui::{
    self, Color32, CornerRadius, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2,
};

const PAPER: Color32 = Color32::WHITE;
const INK: Color32 = Color32::BLACK;
// Crimson for the predicted digit, steel blue for the rest.
const HIGHLIGHT: Color32 = Color32::from_rgb(220, 20, 60);
const BAR: Color32 = Color32::from_rgb(70, 130, 180);

const CHART_SIZE: Vec2 = Vec2::new(320.0, 170.0);
const CHART_LABEL_BAND: f32 = 16.0;

/// Draws the left-side panel with the actions and status messages.
pub fn draw_side_panel(app: &mut MyApp, ctx: &egui::Context) {
    egui::SidePanel::left("controls_panel").show(ctx, |ui| {
        ui.heading("Digit Sketchpad");
        ui.separator();

        match &app.model {
            Ok(model) => {
                ui.label(format!("Model: {}", model.name()));
            }
            Err(e) => {
                ui.colored_label(Color32::RED, format!("Error loading model: {e}"));
                ui.label("Place a valid artifact next to the app and restart.");
            }
        }
        ui.separator();

        ui.heading("Actions");
        if ui
            .add_enabled(app.model.is_ok(), egui::Button::new("Predict Digit"))
            .clicked()
        {
            app.predict();
        }
        if ui.button("Clear Canvas").clicked() {
            app.clear_canvas();
        }

        if let Some(warning) = &app.warning {
            ui.separator();
            ui.colored_label(Color32::YELLOW, warning);
        }

        ui.separator();
        ui.label("Draw a digit (0-9) in the white canvas using the mouse.");
    });
}

/// Draws the central panel: the canvas on the left, results on the right.
pub fn draw_central_panel(app: &mut MyApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.horizontal_top(|ui| {
            draw_canvas(app, ui);
            ui.separator();
            draw_results(app, ui);
        });
    });
}

/// The drawing surface: captures drags as strokes and paints them back.
fn draw_canvas(app: &mut MyApp, ui: &mut Ui) {
    let (response, painter) =
        ui.allocate_painter(Vec2::splat(CANVAS_SIZE as f32), Sense::drag());
    let rect = response.rect;
    painter.rect_filled(rect, CornerRadius::ZERO, PAPER);

    // Pointer positions arrive in screen space; strokes live in
    // canvas-local coordinates so rasterization is a straight copy.
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            app.sketch.push_point((pos - rect.min).to_pos2());
            app.mark_drawn();
        }
    }
    if response.drag_stopped() {
        app.sketch.end_stroke();
    }

    let stroke = Stroke::new(BRUSH_SIZE, INK);
    for points in app.sketch.strokes() {
        match points {
            [] => {}
            [point] => {
                painter.circle_filled(rect.min + point.to_vec2(), BRUSH_SIZE / 2.0, INK);
            }
            _ => {
                let screen: Vec<Pos2> = points.iter().map(|p| rect.min + p.to_vec2()).collect();
                painter.add(Shape::line(screen, stroke));
            }
        }
    }
}

/// Headline, bar chart, and probability table for the latest prediction.
fn draw_results(app: &MyApp, ui: &mut Ui) {
    ui.vertical(|ui| {
        let Some(rows) = &app.last_result else {
            ui.label("Predictions will appear here.");
            return;
        };

        if let Some(digit) = app.predicted_digit() {
            ui.heading(format!("Predicted Digit: {digit}"));
        }
        ui.separator();

        ui.label("Confidence Probabilities:");
        draw_chart(rows, ui);
        ui.separator();

        ui.label("Detailed Probabilities:");
        draw_table(rows, ui);
    });
}

/// One bar per digit; the probability axis is fixed to [0, 1] so repeated
/// predictions stay visually comparable.
fn draw_chart(rows: &[DigitScore], ui: &mut Ui) {
    let (response, painter) = ui.allocate_painter(CHART_SIZE, Sense::hover());
    let rect = response.rect;

    let n = rows.len() as f32;
    let gap = 4.0;
    let bar_width = (rect.width() - gap * (n + 1.0)) / n;
    let baseline = rect.bottom() - CHART_LABEL_BAND;
    let full_height = rect.height() - CHART_LABEL_BAND;

    for (i, row) in rows.iter().enumerate() {
        let x0 = rect.left() + gap + i as f32 * (bar_width + gap);
        let height = row.probability.clamp(0.0, 1.0) * full_height;
        let bar = Rect::from_min_max(
            Pos2::new(x0, baseline - height),
            Pos2::new(x0 + bar_width, baseline),
        );
        let color = if row.predicted { HIGHLIGHT } else { BAR };
        painter.rect_filled(bar, CornerRadius::ZERO, color);

        painter.text(
            Pos2::new(x0 + bar_width / 2.0, baseline + 2.0),
            egui::Align2::CENTER_TOP,
            row.digit.to_string(),
            egui::FontId::default(),
            ui.visuals().text_color(),
        );
    }

    painter.line_segment(
        [
            Pos2::new(rect.left(), baseline),
            Pos2::new(rect.right(), baseline),
        ],
        Stroke::new(1.0, Color32::GRAY),
    );
}

/// Digit/probability table with the predicted row highlighted.
fn draw_table(rows: &[DigitScore], ui: &mut Ui) {
    egui::Grid::new("probability_table").striped(true).show(ui, |ui| {
        ui.label("Digit");
        ui.label("Probability");
        ui.end_row();

        for row in rows {
            let text = format!("{:.4}%", row.probability * 100.0);
            if row.predicted {
                ui.colored_label(HIGHLIGHT, row.digit.to_string());
                ui.colored_label(HIGHLIGHT, text);
            } else {
                ui.label(row.digit.to_string());
                ui.label(text);
            }
            ui.end_row();
        }
    });
}
