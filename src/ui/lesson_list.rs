//! Sidebar listing every document in the lesson folder

use eframe::egui;

use crate::app::ProfesseurApp;

/// Lesson list panel
pub struct LessonListPanel;

impl LessonListPanel {
    /// Show the lesson list panel
    pub fn show(ui: &mut egui::Ui, app: &mut ProfesseurApp) {
        ui.vertical(|ui| {
            // Header
            ui.horizontal(|ui| {
                ui.heading("Lessons");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                        app.refresh_entries();
                    }
                });
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("lesson_list_scroll")
                .show(ui, |ui| {
                    if app.entries.is_empty() {
                        ui.label("No lessons yet");
                        ui.add_space(10.0);
                        ui.label("Click 'Generate New Lesson' to create the first one.");
                        return;
                    }

                    let entries = app.entries.clone();
                    for entry in entries {
                        let is_active = app.viewed_path.as_deref() == Some(entry.path.as_path());
                        let label = format!("\u{1F4DD} {}", entry.title);
                        if ui.selectable_label(is_active, label).clicked() {
                            app.view_file(entry.path.clone());
                        }
                    }
                });
        });
    }
}
