use crate::canvas::RawCanvasImage;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use ndarray::Array2;

/// Side length, in pixels, of the image the classifier consumes.
pub const MODEL_SIDE: u32 = 28;

/// The 28x28 single-channel image fed to the classifier.
///
/// Intensities are inverted relative to the canvas: strokes are bright on a
/// dark background, matching the convention of the digit dataset the
/// pretrained network was trained on. Always exactly 28x28 by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedImage {
    pixels: GrayImage,
}

impl PreprocessedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Intensity of one pixel, 0 (background) to 255 (stroke core).
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y).0[0]
    }

    /// Row-major view of the raw 8-bit pixels.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// The image as floats in `[0, 1]`, one row per pixel row.
    ///
    /// This is the final normalization step of the preprocessing contract;
    /// it lives here because the classifier adapter decides when it wants
    /// float input rather than 8-bit.
    pub fn to_normalized(&self) -> Array2<f32> {
        Array2::from_shape_fn(
            (MODEL_SIDE as usize, MODEL_SIDE as usize),
            |(y, x)| self.intensity(x as u32, y as u32) as f32 / 255.0,
        )
    }
}

/// Converts a captured drawing into classifier input.
///
/// Three pure steps, in order: luminance conversion (alpha discarded),
/// downscale to 28x28, intensity inversion. Deterministic; a blank canvas
/// yields a uniformly dark image rather than an error.
pub fn preprocess(canvas: &RawCanvasImage) -> PreprocessedImage {
    let gray = to_luminance(canvas);
    let mut small = downscale(&gray);
    invert_in_place(&mut small);
    PreprocessedImage { pixels: small }
}

/// Collapses the RGBA capture to a single luminance channel.
fn to_luminance(canvas: &RawCanvasImage) -> GrayImage {
    DynamicImage::ImageRgba8(canvas.pixels().clone()).to_luma8()
}

/// Resizes to the classifier's 28x28 input with a bilinear filter.
fn downscale(gray: &GrayImage) -> GrayImage {
    imageops::resize(gray, MODEL_SIDE, MODEL_SIDE, FilterType::Triangle)
}

/// Flips dark-on-light to light-on-dark: `v -> 255 - v` for every pixel.
fn invert_in_place(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        pixel.0[0] = 255 - pixel.0[0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CANVAS_SIZE;
    use image::{Luma, Rgba, RgbaImage};

    /// A white canvas with an axis-aligned black square drawn on it.
    fn canvas_with_square(x0: u32, y0: u32, side: u32) -> RawCanvasImage {
        let mut pixels =
            RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255]));
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                pixels.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        RawCanvasImage::new(pixels).unwrap()
    }

    #[test]
    fn output_is_always_28_by_28() {
        let blank = preprocess(&RawCanvasImage::blank());
        assert_eq!((blank.width(), blank.height()), (MODEL_SIDE, MODEL_SIDE));

        let drawn = preprocess(&canvas_with_square(40, 80, 120));
        assert_eq!((drawn.width(), drawn.height()), (MODEL_SIDE, MODEL_SIDE));
    }

    #[test]
    fn blank_canvas_becomes_uniformly_dark() {
        let image = preprocess(&RawCanvasImage::blank());
        assert!(image.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn centered_square_is_bright_inside_dark_outside() {
        // 100x100 black square centered on the canvas lands on the middle
        // third of the 28x28 grid after downscaling.
        let image = preprocess(&canvas_with_square(100, 100, 100));
        assert!(image.intensity(14, 14) > 200);
        assert!(image.intensity(1, 1) < 20);
        assert!(image.intensity(26, 26) < 20);
    }

    #[test]
    fn invert_is_its_own_inverse() {
        let mut image = GrayImage::from_fn(MODEL_SIDE, MODEL_SIDE, |x, y| {
            Luma([((x * 9 + y * 37) % 256) as u8])
        });
        let original = image.clone();
        invert_in_place(&mut image);
        assert_ne!(image, original);
        invert_in_place(&mut image);
        assert_eq!(image, original);
    }

    #[test]
    fn normalization_round_trips_every_intensity() {
        // 784 pixels cycling through every 8-bit value at least once.
        let image = PreprocessedImage {
            pixels: GrayImage::from_fn(MODEL_SIDE, MODEL_SIDE, |x, y| {
                Luma([((y * MODEL_SIDE + x) % 256) as u8])
            }),
        };
        let normalized = image.to_normalized();
        for y in 0..MODEL_SIDE {
            for x in 0..MODEL_SIDE {
                let v = normalized[(y as usize, x as usize)];
                assert!((0.0..=1.0).contains(&v));
                assert_eq!((v * 255.0).round() as u8, image.intensity(x, y));
            }
        }
    }

    #[test]
    fn normalized_view_matches_pixels() {
        let image = preprocess(&canvas_with_square(100, 100, 100));
        let normalized = image.to_normalized();
        assert_eq!(normalized.shape(), [28, 28]);
        for y in 0..MODEL_SIDE {
            for x in 0..MODEL_SIDE {
                let expected = image.intensity(x, y) as f32 / 255.0;
                assert_eq!(normalized[(y as usize, x as usize)], expected);
            }
        }
    }
}
