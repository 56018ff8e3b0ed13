//! Main application state and UI coordination

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::curriculum::{Advance, Module, Progress};
use crate::core::lesson::Lesson;
use crate::core::watcher::LessonWatcher;
use crate::core::workbook::{LessonEntry, Workbook};
use crate::llm::OllamaClient;
use crate::tasks::{self, PendingTask, TaskOutcome};
use crate::ui::{
    lesson_list::LessonListPanel, lesson_view::LessonViewPanel, settings::SettingsDialog,
};

/// A blocking notification; the rest of the UI is locked until dismissed
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Main application state
pub struct ProfesseurApp {
    /// Application configuration
    pub config: AppConfig,
    /// Lesson folder for the configured language
    pub workbook: Workbook,
    /// Client for the configured Ollama server
    pub client: OllamaClient,
    /// Curriculum pointer
    pub progress: Progress,
    /// Record backing the answer-check flow; None until a lesson exists
    pub current_lesson: Option<Lesson>,
    /// Path of the document on display
    pub viewed_path: Option<PathBuf>,
    /// Contents of the document on display; None shows the empty state
    pub viewed_content: Option<String>,
    /// Documents in the lesson folder
    pub entries: Vec<LessonEntry>,
    /// The single in-flight background task
    pub task: Option<PendingTask>,
    /// Status bar text while idle
    pub status: String,
    /// Pending blocking notification
    pub notice: Option<Notice>,
    /// Whether the current lesson already carries a correction
    pub correction_done: bool,
    /// Latched once the student advances past the last module
    pub completed_all: bool,
    /// Whether the lesson list is visible
    pub sidebar_visible: bool,
    /// Settings dialog state
    pub settings: SettingsDialog,
    /// Watches the lesson folder for external edits
    pub watcher: Option<LessonWatcher>,
    /// Commonmark cache for the lesson view
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl ProfesseurApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        // Load config or use defaults
        let config = AppConfig::load().unwrap_or_default();
        let workbook = Workbook::new(config.lessons_dir(), config.course.language.clone());
        let client = OllamaClient::new(&config.server);

        let mut app = Self {
            config,
            workbook,
            client,
            progress: Progress::default(),
            current_lesson: None,
            viewed_path: None,
            viewed_content: None,
            entries: Vec::new(),
            task: None,
            status: "Ready.".to_string(),
            notice: None,
            correction_done: false,
            completed_all: false,
            sidebar_visible: true,
            settings: SettingsDialog::default(),
            watcher: None,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
        };
        app.load_workspace();
        app
    }

    /// Open the lesson folder: progress record, current lesson, watcher, file list
    fn load_workspace(&mut self) {
        if let Err(e) = std::fs::create_dir_all(self.workbook.dir()) {
            tracing::error!("Failed to create lesson folder: {}", e);
        }

        self.progress = match Progress::load_or_create(&self.workbook.progress_path()) {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!("Failed to load progress: {:#}", e);
                self.show_notice(
                    "Progress Error",
                    format!(
                        "Could not read the progress file:\n{:#}\n\n\
                         Starting from the first lesson; the file on disk is left untouched.",
                        e
                    ),
                );
                Progress::default()
            }
        };

        // The lesson record survives restarts so answers can still be checked
        self.current_lesson = self.workbook.load_lesson_json(&self.progress).ok();

        self.watcher = match LessonWatcher::new(self.workbook.dir()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!("Running without file watcher: {:#}", e);
                None
            }
        };

        self.completed_all = false;
        self.refresh_entries();
        self.view_file(self.workbook.lesson_markdown_path(&self.progress));
        self.correction_done = self.workbook.has_correction(&self.progress);
    }

    /// Show a document in the lesson view
    pub fn view_file(&mut self, path: PathBuf) {
        match std::fs::read_to_string(&path) {
            Ok(content) => self.viewed_content = Some(content),
            Err(e) => {
                tracing::debug!("Nothing to display at {}: {}", path.display(), e);
                self.viewed_content = None;
            }
        }
        self.viewed_path = Some(path);
    }

    /// Re-read the document on display from disk
    fn reload_view(&mut self) {
        if let Some(path) = self.viewed_path.clone() {
            self.view_file(path);
        }
    }

    /// Re-scan the lesson folder
    pub fn refresh_entries(&mut self) {
        self.entries = self.workbook.list_entries();
    }

    fn busy(&self) -> bool {
        self.task.is_some()
    }

    fn progress_text(&self) -> String {
        format!(
            "Current Progress: Module {}, Lesson {}",
            self.progress.module, self.progress.lesson
        )
    }

    fn show_notice(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.notice = Some(Notice {
            title: title.into(),
            body: body.into(),
        });
    }

    /// Kick off lesson generation for the current curriculum position
    fn start_generate(&mut self) {
        self.task = Some(tasks::spawn_generate_lesson(
            self.client.clone(),
            self.workbook.clone(),
            self.config.course.language.clone(),
            self.progress,
        ));
    }

    /// Scrape the student's answers and request a correction
    fn start_check(&mut self) {
        let Some(lesson) = self.current_lesson.clone() else {
            self.show_notice("Warning", "Please generate a lesson first!");
            return;
        };
        if self.workbook.has_correction(&self.progress) {
            self.correction_done = true;
            self.show_notice(
                "Already Corrected",
                "This lesson has already been corrected. Please generate a new lesson \
                 or advance to the next one.",
            );
            return;
        }

        self.task = Some(tasks::spawn_check_answers(
            self.client.clone(),
            self.workbook.clone(),
            self.config.course.language.clone(),
            self.progress,
            lesson,
        ));
    }

    /// Advance the curriculum pointer.
    ///
    /// The pointer is saved before anything else happens; on module rollover
    /// the overview generation then runs as a background task, and an
    /// overview failure leaves the already-committed pointer in place.
    fn advance(&mut self) {
        let mut next = self.progress;
        match next.advance(self.config.course.lessons_per_module) {
            Advance::NextLesson => {
                if let Err(e) = next.save(&self.workbook.progress_path()) {
                    tracing::error!("Failed to save progress: {:#}", e);
                    self.show_notice("Progress Error", format!("{:#}", e));
                    return;
                }
                self.progress = next;
                self.reset_lesson_state();
                self.status = "Ready for the next lesson. Generate it now!".to_string();
                self.show_notice(
                    "Progress",
                    format!(
                        "Moved to Module {}, Lesson {}. Click 'Generate New Lesson' to start!",
                        next.module, next.lesson
                    ),
                );
            }
            Advance::NextModule(module) => {
                if let Err(e) = next.save(&self.workbook.progress_path()) {
                    tracing::error!("Failed to save progress: {:#}", e);
                    self.show_notice("Progress Error", format!("{:#}", e));
                    return;
                }
                self.progress = next;
                self.reset_lesson_state();
                self.task = Some(tasks::spawn_module_overview(
                    self.client.clone(),
                    self.workbook.clone(),
                    self.config.course.language.clone(),
                    module,
                ));
            }
            Advance::Completed => {
                self.completed_all = true;
                self.status = "All modules completed!".to_string();
                self.show_notice(
                    "Congratulations",
                    "You have completed all available modules!",
                );
            }
        }
    }

    /// Clear per-lesson state after the pointer moved
    fn reset_lesson_state(&mut self) {
        self.current_lesson = None;
        self.correction_done = false;
        self.viewed_path = Some(self.workbook.lesson_markdown_path(&self.progress));
        self.viewed_content = None;
    }

    /// Apply and persist new settings, then reopen the lesson folder
    fn apply_config(&mut self, config: AppConfig) {
        if let Err(e) = config.save() {
            tracing::error!("Failed to save config: {:#}", e);
        }
        self.config = config;
        self.workbook = Workbook::new(
            self.config.lessons_dir(),
            self.config.course.language.clone(),
        );
        self.client = OllamaClient::new(&self.config.server);
        self.load_workspace();
        self.status = "Settings applied.".to_string();
    }

    /// Open the lesson folder in the system file explorer
    fn open_lesson_folder(&mut self) {
        let dir = self.workbook.dir().to_path_buf();
        if !dir.exists() {
            self.show_notice("Error", format!("Path not found: {}", dir.display()));
            return;
        }
        if let Err(e) = open::that(&dir) {
            tracing::error!("Failed to open folder: {}", e);
            self.show_notice("Error", format!("Could not open the lesson folder: {}", e));
        }
    }

    /// Handle the outcome of a finished background task
    fn on_task_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::LessonReady {
                lesson,
                markdown_path,
            } => {
                self.current_lesson = Some(lesson);
                self.correction_done = false;
                self.refresh_entries();
                self.view_file(markdown_path.clone());
                self.status =
                    "Lesson generated. Please fill in answers in the MD file.".to_string();
                self.show_notice(
                    "Success",
                    format!(
                        "Lesson {} for module {} generated and saved to:\n{}\n\n\
                         Please open this file in Obsidian to write your answers.",
                        self.progress.lesson,
                        self.progress.module,
                        markdown_path.display()
                    ),
                );
            }
            TaskOutcome::CorrectionReady { markdown_path } => {
                self.correction_done = true;
                self.view_file(markdown_path);
                self.status = "Correction received and appended to MD file.".to_string();
                self.show_notice(
                    "Success",
                    "Answers submitted and correction received! Check the lesson display below.",
                );
            }
            TaskOutcome::OverviewReady {
                module,
                markdown_path,
            } => {
                self.refresh_entries();
                self.view_file(markdown_path);
                self.status = format!("Welcome to {} module! Generate your first lesson.", module);
                let completed = Module::ALL
                    .iter()
                    .find(|m| m.next() == Some(module))
                    .map(|m| m.to_string())
                    .unwrap_or_default();
                self.show_notice(
                    "Module Advanced",
                    format!(
                        "Congratulations! You've completed {} and moved to {}!\n\n\
                         Check the display for an overview of what you'll learn.",
                        completed, module
                    ),
                );
            }
            TaskOutcome::Failed { title, error } => {
                self.status = format!("{}.", title);
                self.show_notice(title, format!("{:#}", error));
            }
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let busy = self.busy();
                    if ui
                        .add_enabled(!busy, egui::Button::new("Open Lesson Folder"))
                        .clicked()
                    {
                        self.open_lesson_folder();
                        ui.close();
                    }
                    if ui
                        .add_enabled(!busy, egui::Button::new("Settings..."))
                        .clicked()
                    {
                        self.settings.open(&self.config);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Toggle Lesson List").clicked() {
                        self.sidebar_visible = !self.sidebar_visible;
                        ui.close();
                    }
                    if ui.button("Refresh Lesson List").clicked() {
                        self.refresh_entries();
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render the row of course actions under the menu
    fn render_action_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("action_bar").show(ctx, |ui| {
            ui.add_space(2.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(self.progress_text()).strong());
                ui.separator();

                let busy = self.busy();
                ui.add_enabled_ui(!busy && !self.completed_all, |ui| {
                    if ui.button("Generate New Lesson").clicked() {
                        self.start_generate();
                    }
                });
                ui.add_enabled_ui(!busy, |ui| {
                    if ui.button("Check My Answers & Get Correction").clicked() {
                        self.start_check();
                    }
                });
                ui.add_enabled_ui(!busy && self.correction_done && !self.completed_all, |ui| {
                    if ui.button("Next Lesson/Module").clicked() {
                        self.advance();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(!busy, |ui| {
                        if ui.button("\u{2699}").on_hover_text("Settings").clicked() {
                            self.settings.open(&self.config);
                        }
                        if ui.button("Open Lesson Folder").clicked() {
                            self.open_lesson_folder();
                        }
                    });
                });
            });
            ui.label(
                egui::RichText::new(
                    "To answer, open the .md file in your editor (e.g., Obsidian), fill in \
                     your answers after '**Your Answer:**', save, then click 'Check My Answers'.",
                )
                .italics()
                .weak(),
            );
            ui.add_space(2.0);
        });
    }

    /// Render the status bar
    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.busy() {
                    ui.spinner();
                }
                let status = self
                    .task
                    .as_ref()
                    .map(|t| t.label().to_string())
                    .unwrap_or_else(|| self.status.clone());
                ui.label(status);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(path) = &self.viewed_path {
                        ui.label(egui::RichText::new(path.display().to_string()).weak());
                    }
                });
            });
        });
    }

    /// Render the blocking notification, if any
    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };

        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("notice_modal")).show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.heading(&notice.title);
            ui.separator();
            ui.label(&notice.body);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });

        if dismissed || modal.should_close() {
            self.notice = None;
        }
    }
}

impl eframe::App for ProfesseurApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll the in-flight task; repaint while the worker runs so the
        // outcome is picked up without user input
        if let Some(task) = &self.task {
            if let Some(outcome) = task.poll() {
                self.task = None;
                self.on_task_outcome(outcome);
            } else {
                ctx.request_repaint_after(Duration::from_millis(200));
            }
        }

        // Pick up external edits (the student answers in another editor)
        let changed = self
            .watcher
            .as_ref()
            .map(|w| w.changed_paths())
            .unwrap_or_default();
        if !changed.is_empty() {
            self.refresh_entries();
            if changed
                .iter()
                .any(|p| Some(p.as_path()) == self.viewed_path.as_deref())
            {
                self.reload_view();
            }
            let current = self.workbook.lesson_markdown_path(&self.progress);
            if changed.iter().any(|p| *p == current) {
                self.correction_done = self.workbook.has_correction(&self.progress);
            }
        }

        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(egui::Key::B) {
                self.sidebar_visible = !self.sidebar_visible;
            }
        });

        self.render_menu_bar(ctx);
        self.render_action_bar(ctx);
        self.render_status_bar(ctx);

        if self.sidebar_visible {
            egui::SidePanel::left("lesson_list")
                .resizable(true)
                .default_width(230.0)
                .min_width(150.0)
                .show(ctx, |ui| {
                    LessonListPanel::show(ui, self);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            LessonViewPanel::show(ui, self);
        });

        if let Some(new_config) = self.settings.show(ctx) {
            self.apply_config(new_config);
        }

        self.render_notice(ctx);
    }
}
