//! Background tasks for model calls
//!
//! Every operation that talks to the model runs on its own thread so the
//! UI stays responsive; there is at most one in flight. The UI polls the
//! task's channel each frame and keeps its controls disabled until the
//! outcome arrives. Tasks cannot be cancelled.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};

use crate::core::curriculum::{Module, Progress};
use crate::core::lesson::Lesson;
use crate::core::workbook::Workbook;
use crate::llm::OllamaClient;

/// What a finished background task produced
#[derive(Debug)]
pub enum TaskOutcome {
    /// New lesson generated and written to disk
    LessonReady {
        lesson: Lesson,
        markdown_path: PathBuf,
    },
    /// Correction received and appended to the lesson document
    CorrectionReady { markdown_path: PathBuf },
    /// Module overview generated and written to disk
    OverviewReady {
        module: Module,
        markdown_path: PathBuf,
    },
    /// The task failed; nothing was committed beyond what `error` says
    Failed { title: String, error: anyhow::Error },
}

/// Handle to the single in-flight background task
pub struct PendingTask {
    label: &'static str,
    rx: Receiver<TaskOutcome>,
}

impl PendingTask {
    /// Status line shown while the task runs
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Non-blocking poll for the outcome.
    ///
    /// A disconnected channel means the worker died without reporting
    /// (a panic); that is surfaced as a failure so the UI unlocks.
    pub fn poll(&self) -> Option<TaskOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(TaskOutcome::Failed {
                title: "Task Error".to_string(),
                error: anyhow::anyhow!("background task ended without reporting an outcome"),
            }),
        }
    }
}

/// Generate the lesson at the current curriculum position and persist it
pub fn spawn_generate_lesson(
    client: OllamaClient,
    workbook: Workbook,
    language: String,
    progress: Progress,
) -> PendingTask {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome = match generate_lesson(&client, &workbook, &language, &progress) {
            Ok((lesson, markdown_path)) => TaskOutcome::LessonReady {
                lesson,
                markdown_path,
            },
            Err(error) => {
                tracing::error!("Lesson generation failed: {:#}", error);
                TaskOutcome::Failed {
                    title: "Generation Error".to_string(),
                    error,
                }
            }
        };
        let _ = tx.send(outcome);
    });

    PendingTask {
        label: "Generating lesson...",
        rx,
    }
}

/// Scrape the student's answers, request a correction, and append it to
/// the lesson document
pub fn spawn_check_answers(
    client: OllamaClient,
    workbook: Workbook,
    language: String,
    progress: Progress,
    lesson: Lesson,
) -> PendingTask {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome = match check_answers(&client, &workbook, &language, &progress, &lesson) {
            Ok(markdown_path) => TaskOutcome::CorrectionReady { markdown_path },
            Err(error) => {
                tracing::error!("Answer check failed: {:#}", error);
                TaskOutcome::Failed {
                    title: "Submission Error".to_string(),
                    error,
                }
            }
        };
        let _ = tx.send(outcome);
    });

    PendingTask {
        label: "Submitting answers and getting correction...",
        rx,
    }
}

/// Generate the overview document for a freshly entered module
pub fn spawn_module_overview(
    client: OllamaClient,
    workbook: Workbook,
    language: String,
    module: Module,
) -> PendingTask {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome = match module_overview(&client, &workbook, &language, module) {
            Ok(markdown_path) => TaskOutcome::OverviewReady {
                module,
                markdown_path,
            },
            Err(error) => {
                tracing::error!("Module overview failed: {:#}", error);
                TaskOutcome::Failed {
                    title: "Module Overview Error".to_string(),
                    error,
                }
            }
        };
        let _ = tx.send(outcome);
    });

    PendingTask {
        label: "Generating module overview...",
        rx,
    }
}

fn generate_lesson(
    client: &OllamaClient,
    workbook: &Workbook,
    language: &str,
    progress: &Progress,
) -> Result<(Lesson, PathBuf)> {
    let lesson = client
        .generate_lesson(language, progress.module, progress.lesson)
        .context("Failed to generate lesson")?;
    let markdown_path = workbook.write_lesson_markdown(progress, &lesson)?;
    workbook.write_lesson_json(progress, &lesson)?;
    Ok((lesson, markdown_path))
}

fn check_answers(
    client: &OllamaClient,
    workbook: &Workbook,
    language: &str,
    progress: &Progress,
    lesson: &Lesson,
) -> Result<PathBuf> {
    let answers = workbook.read_lesson_answers(progress, lesson.exercises.len())?;
    let correction = client
        .correct_answers(language, lesson, &answers)
        .context("Failed to get correction")?;
    workbook.append_correction(progress, &correction)
}

fn module_overview(
    client: &OllamaClient,
    workbook: &Workbook,
    language: &str,
    module: Module,
) -> Result<PathBuf> {
    let overview = client
        .module_overview(language, module)
        .context("Failed to generate module overview")?;
    workbook.write_overview(module, &overview)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_is_empty_while_running() {
        let (_tx, rx) = mpsc::channel();
        let task = PendingTask {
            label: "Generating lesson...",
            rx,
        };
        assert!(task.poll().is_none());
        assert_eq!(task.label(), "Generating lesson...");
    }

    #[test]
    fn test_poll_returns_outcome_once_sent() {
        let (tx, rx) = mpsc::channel();
        let task = PendingTask {
            label: "Generating lesson...",
            rx,
        };
        tx.send(TaskOutcome::CorrectionReady {
            markdown_path: PathBuf::from("A1_lesson_1.md"),
        })
        .unwrap();

        match task.poll() {
            Some(TaskOutcome::CorrectionReady { markdown_path }) => {
                assert_eq!(markdown_path, PathBuf::from("A1_lesson_1.md"));
            }
            other => panic!("unexpected poll result: {:?}", other),
        }
    }

    #[test]
    fn test_dead_worker_surfaces_as_failure() {
        let (tx, rx) = mpsc::channel::<TaskOutcome>();
        let task = PendingTask {
            label: "Generating lesson...",
            rx,
        };
        drop(tx);

        match task.poll() {
            Some(TaskOutcome::Failed { title, .. }) => assert_eq!(title, "Task Error"),
            other => panic!("unexpected poll result: {:?}", other),
        }
    }
}
