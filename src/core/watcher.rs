//! Lesson folder watcher
//!
//! The student edits lesson files in an external editor (typically
//! Obsidian), so the display refreshes whenever a watched file changes
//! on disk. Events arrive on a channel and are drained non-blocking
//! from the UI thread.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches a lesson folder for external edits
pub struct LessonWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl LessonWatcher {
    /// Start watching the given folder (non-recursive)
    pub fn new(dir: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)
            .context("Failed to create file watcher")?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch folder: {}", dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events (non-blocking), returning paths whose contents
    /// were created or modified since the last call
    pub fn changed_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        paths.extend(event.paths);
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("File watcher error: {}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        paths.sort();
        paths.dedup();
        paths
    }
}
