use image::{Rgba, RgbaImage};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Side length, in pixels, of the square drawing canvas.
pub const CANVAS_SIZE: u32 = 300;

/// Luminance at or above which a pixel counts as background.
///
/// The drawing surface paints pure black strokes on a pure white canvas, so
/// anything this close to white cannot be ink.
const BACKGROUND_LUMA: u8 = 250;

/// Errors that can occur when capturing or submitting a drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// The buffer does not describe a 300x300 canvas.
    BadDimensions { width: u32, height: u32 },
    /// The raw byte buffer is not `width * height * 4` bytes long.
    BadBufferLength { expected: usize, actual: usize },
    /// The canvas contains no strokes, so there is nothing to classify.
    EmptyCanvas,
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::BadDimensions { width, height } => write!(
                f,
                "expected a {CANVAS_SIZE}x{CANVAS_SIZE} canvas, got {width}x{height}"
            ),
            InputError::BadBufferLength { expected, actual } => write!(
                f,
                "canvas buffer is {actual} bytes, expected {expected} (RGBA)"
            ),
            InputError::EmptyCanvas => write!(f, "the canvas is empty, draw a digit first"),
        }
    }
}

impl Error for InputError {}

/// A captured drawing: a 300x300 RGBA buffer with dark strokes on a white
/// background, as emitted by the drawing surface.
///
/// Immutable once constructed; one prediction request consumes one capture.
#[derive(Debug, Clone)]
pub struct RawCanvasImage {
    pixels: RgbaImage,
}

impl RawCanvasImage {
    /// Wraps an RGBA buffer, validating that it has the canvas dimensions.
    ///
    /// # Errors
    ///
    /// Returns `InputError::BadDimensions` if the buffer is not 300x300.
    pub fn new(pixels: RgbaImage) -> Result<Self, InputError> {
        let (width, height) = pixels.dimensions();
        if width != CANVAS_SIZE || height != CANVAS_SIZE {
            return Err(InputError::BadDimensions { width, height });
        }
        Ok(Self { pixels })
    }

    /// Builds a capture from raw interleaved RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns `InputError::BadBufferLength` if `bytes` is not exactly
    /// `width * height * 4` long, or `InputError::BadDimensions` if the
    /// stated dimensions are not the canvas dimensions.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, InputError> {
        let expected = (width as usize) * (height as usize) * 4;
        let actual = bytes.len();
        let pixels = RgbaImage::from_raw(width, height, bytes)
            .ok_or(InputError::BadBufferLength { expected, actual })?;
        Self::new(pixels)
    }

    /// An untouched canvas: every pixel opaque white.
    pub fn blank() -> Self {
        Self {
            pixels: RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255])),
        }
    }

    /// True if no pixel is dark enough to be ink.
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| luma(p) >= BACKGROUND_LUMA)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The underlying RGBA buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Integer luminance approximation for one RGBA pixel, ignoring alpha.
fn luma(p: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = p.0;
    // BT.601 weights scaled to integer arithmetic
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}
