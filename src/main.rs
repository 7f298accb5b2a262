// This is a simple example showing how to use the digitpad library
use digitpad::{CANVAS_SIZE, RawCanvasImage, preprocess};
use image::{Rgba, RgbaImage};

fn main() {
    println!("digitpad preprocessing example");

    // Fake a capture: a thick vertical bar roughly where a "1" would sit.
    let mut pixels = RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba([255, 255, 255, 255]));
    for y in 60..240 {
        for x in 140..165 {
            pixels.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
    let canvas = RawCanvasImage::new(pixels).expect("canvas has the expected dimensions");
    println!("canvas blank: {}", canvas.is_blank());

    let image = preprocess(&canvas);
    let mean = image.as_raw().iter().map(|&v| v as f32).sum::<f32>()
        / image.as_raw().len() as f32;
    println!(
        "preprocessed to {}x{}, mean intensity {:.1}",
        image.width(),
        image.height(),
        mean
    );

    // Crude intensity map of what the classifier would see.
    for row in image.as_raw().chunks(image.width() as usize) {
        let line: String = row
            .iter()
            .map(|&v| match v {
                0..=63 => ' ',
                64..=127 => '.',
                128..=191 => '+',
                _ => '#',
            })
            .collect();
        println!("{line}");
    }
}
