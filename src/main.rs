//! Professeur - LLM-driven language tutor
//!
//! A desktop tutor that generates lessons, corrects answers, and tracks
//! progress through a CEFR curriculum using a local Ollama server.

mod app;
mod core;
mod llm;
mod tasks;
mod ui;

use app::ProfesseurApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Professeur...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Professeur"),
        ..Default::default()
    };

    eframe::run_native(
        "Professeur",
        native_options,
        Box::new(|cc| Ok(Box::new(ProfesseurApp::new(cc)))),
    )
}
