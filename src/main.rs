//! BlogForge - Local LLM Blog Generator
//!
//! A desktop application that generates blog posts with a locally loaded
//! LLaMA model. Everything runs on-device.

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blogforge::app::App;

fn main() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("blogforge=info".parse().unwrap()))
        .init();

    info!("Starting BlogForge v{}", env!("CARGO_PKG_VERSION"));

    // Launch Dioxus desktop application
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::default().with_window(
                WindowBuilder::new()
                    .with_title("BlogForge")
                    .with_inner_size(LogicalSize::new(1000.0, 760.0)),
            ),
        )
        .launch(App);
}
