mod app;
mod sketch;
mod ui;

use app::MyApp;

fn main() -> eframe::Result<()> {
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Digit Sketchpad",
        native_options,
        Box::new(|_cc| Ok(Box::new(MyApp::default()))),
    )
}
