//! Read-only markdown view of the displayed lesson or overview

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::ProfesseurApp;

/// Lesson display panel
pub struct LessonViewPanel;

impl LessonViewPanel {
    /// Show the lesson display panel
    pub fn show(ui: &mut egui::Ui, app: &mut ProfesseurApp) {
        // Get content first to avoid borrow conflicts
        let content = app.viewed_content.clone();

        egui::ScrollArea::vertical()
            .id_salt("lesson_scroll")
            .show(ui, |ui| {
                if let Some(content) = content {
                    CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, &content);
                } else {
                    Self::show_empty(ui);
                }
            });
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("Lesson file not found. Generate a new lesson.");
            ui.label("Answers go straight into the markdown file in your editor.");
        });
    }
}
