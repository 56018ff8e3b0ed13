//! Settings dialog for server and course options

use eframe::egui;

use crate::core::config::AppConfig;

/// Dialog for editing the configuration
pub struct SettingsDialog {
    pub visible: bool,
    draft: AppConfig,
}

impl Default for SettingsDialog {
    fn default() -> Self {
        Self {
            visible: false,
            draft: AppConfig::default(),
        }
    }
}

impl SettingsDialog {
    /// Open the dialog over a copy of the live configuration
    pub fn open(&mut self, config: &AppConfig) {
        self.draft = config.clone();
        self.visible = true;
    }

    /// Show the dialog; returns the new configuration when saved
    pub fn show(&mut self, ctx: &egui::Context) -> Option<AppConfig> {
        if !self.visible {
            return None;
        }

        let mut result = None;
        let modal = egui::Modal::new(egui::Id::new("settings_modal")).show(ctx, |ui| {
            ui.set_max_width(440.0);
            ui.heading("Settings");
            ui.separator();

            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Server URL:");
                    ui.text_edit_singleline(&mut self.draft.server.url);
                    ui.end_row();

                    ui.label("Model:");
                    ui.text_edit_singleline(&mut self.draft.server.model);
                    ui.end_row();

                    ui.label("Language:");
                    ui.text_edit_singleline(&mut self.draft.course.language);
                    ui.end_row();

                    ui.label("Lessons per module:");
                    ui.add(
                        egui::DragValue::new(&mut self.draft.course.lessons_per_module)
                            .range(1..=20),
                    );
                    ui.end_row();

                    ui.label("Generation timeout (s):");
                    ui.add(
                        egui::DragValue::new(&mut self.draft.server.generate_timeout_secs)
                            .range(10..=600),
                    );
                    ui.end_row();

                    ui.label("Correction timeout (s):");
                    ui.add(
                        egui::DragValue::new(&mut self.draft.server.correction_timeout_secs)
                            .range(10..=600),
                    );
                    ui.end_row();

                    ui.label("Lessons folder:");
                    let shown = self
                        .draft
                        .course
                        .lessons_root
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "Documents/Professeur (default)".to_string());
                    ui.label(shown);
                    ui.end_row();
                });

            ui.horizontal(|ui| {
                if ui.button("Browse...").clicked() {
                    if let Some(path) = rfd::FileDialog::new().pick_folder() {
                        self.draft.course.lessons_root = Some(path);
                    }
                }
                if ui.button("Use Default").clicked() {
                    self.draft.course.lessons_root = None;
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    self.visible = false;
                }
                if ui.button("Save").clicked() {
                    result = Some(self.draft.clone());
                    self.visible = false;
                }
            });
        });

        // Clicking the backdrop or pressing Escape cancels
        if modal.should_close() {
            self.visible = false;
        }
        result
    }
}
