//! Perspective Overlay - place flat images onto photos in perspective
//!
//! Main entry point for the application.

use perspective_overlay::PerspectiveOverlayApp;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Starting Perspective Overlay v{}", env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Perspective Overlay"),
        vsync: true,
        ..Default::default()
    };

    eframe::run_native(
        "Perspective Overlay",
        native_options,
        Box::new(|cc| Box::new(PerspectiveOverlayApp::new(cc))),
    )
}
