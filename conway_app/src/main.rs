// main.rs - Conway's Game of Life with an asynchronous generation worker
//
// Composition root: parses the command line, sets up logging, and hands a
// validated configuration to the eframe app.

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

mod config;
mod scene;
mod ui;
mod view;

use config::Args;
use ui::ConwayApp;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = args.into_config()?;
    log::debug!(
        "grid {}x{}, {} initial cells",
        config.simulation.width,
        config.simulation.height,
        config.initial.len()
    );

    #[cfg(target_os = "windows")]
    enable_dpi_awareness();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |_cc| Box::new(ConwayApp::new(config))),
    )
    .map_err(|err| anyhow!("window error: {err}"))
}

#[cfg(target_os = "windows")]
fn enable_dpi_awareness() {
    // SAFETY: plain Win32 call without arguments, made before any window exists.
    let ok = unsafe { winapi::um::winuser::SetProcessDPIAware() };
    if ok == 0 {
        log::warn!("could not mark the process DPI aware");
    }
}
