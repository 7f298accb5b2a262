use digitpad::{CANVAS_SIZE, RawCanvasImage};
use eframe::egui::Pos2;
use image::{Rgba, RgbaImage};

/// Brush diameter in canvas pixels.
pub const BRUSH_SIZE: f32 = 20.0;

/// The freehand drawing surface: strokes as point sequences in canvas-local
/// coordinates (origin at the canvas top-left, one unit per pixel).
#[derive(Debug, Default, Clone)]
pub struct Sketch {
    strokes: Vec<Vec<Pos2>>,
    /// The stroke currently under the pointer, if a drag is in progress.
    active: Vec<Pos2>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active.clear();
    }

    /// Extends the stroke under the pointer. Points outside the canvas are
    /// clamped to its edge so a drag leaving the widget stays connected.
    pub fn push_point(&mut self, pos: Pos2) {
        let side = CANVAS_SIZE as f32;
        self.active
            .push(Pos2::new(pos.x.clamp(0.0, side), pos.y.clamp(0.0, side)));
    }

    /// Finishes the stroke when the pointer lifts.
    pub fn end_stroke(&mut self) {
        if !self.active.is_empty() {
            self.strokes.push(std::mem::take(&mut self.active));
        }
    }

    /// All strokes, finished ones first and then the one in progress.
    pub fn strokes(&self) -> impl Iterator<Item = &[Pos2]> {
        self.strokes
            .iter()
            .map(Vec::as_slice)
            .chain((!self.active.is_empty()).then_some(self.active.as_slice()))
    }

    /// Renders the strokes into the 300x300 RGBA buffer the predictor
    /// consumes: black ink on a white background, round brush.
    pub fn rasterize(&self) -> RawCanvasImage {
        let mut pixels =
            RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255]));
        for stroke in self.strokes() {
            match stroke {
                [] => {}
                [point] => stamp(&mut pixels, *point),
                _ => {
                    for pair in stroke.windows(2) {
                        stamp_segment(&mut pixels, pair[0], pair[1]);
                    }
                }
            }
        }
        RawCanvasImage::new(pixels).expect("raster buffer has canvas dimensions")
    }
}

/// Stamps the brush at roughly one-pixel steps along a segment.
fn stamp_segment(pixels: &mut RgbaImage, from: Pos2, to: Pos2) {
    let steps = from.distance(to).ceil().max(1.0) as u32;
    for i in 0..=steps {
        stamp(pixels, from.lerp(to, i as f32 / steps as f32));
    }
}

/// Fills one round brush footprint.
fn stamp(pixels: &mut RgbaImage, center: Pos2) {
    let radius = BRUSH_SIZE / 2.0;
    let limit = (CANVAS_SIZE - 1) as f32;
    let min_x = (center.x - radius).floor().clamp(0.0, limit) as u32;
    let max_x = (center.x + radius).ceil().clamp(0.0, limit) as u32;
    let min_y = (center.y - radius).floor().clamp(0.0, limit) as u32;
    let max_y = (center.y + radius).ceil().clamp(0.0, limit) as u32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - center.x;
            let dy = y as f32 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                pixels.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
    }
}
