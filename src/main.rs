mod app;

use eframe::egui;
use log::{info, warn};
use time::UtcOffset;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Must run before any other thread exists, or the offset is indeterminate on unix.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|e| {
        warn!("cannot determine local offset, using UTC: {e}");
        UtcOffset::UTC
    });

    let cfg = app::Config::from_env();
    info!("starting with {} input, tick every {:?}", cfg.input_style, cfg.tick);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([340.0, 260.0]),
        ..Default::default()
    };
    let title = cfg.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Box::new(app::App::new(cfg, offset))),
    )
}
