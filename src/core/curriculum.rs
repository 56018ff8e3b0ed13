//! Curriculum progression through the fixed module sequence

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One proficiency tier of the fixed curriculum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Module {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Module {
    /// All modules in teaching order
    pub const ALL: [Module; 6] = [
        Module::A1,
        Module::A2,
        Module::B1,
        Module::B2,
        Module::C1,
        Module::C2,
    ];

    /// The module a brand-new student starts in
    pub fn first() -> Self {
        Module::A1
    }

    /// The module following this one, if any
    pub fn next(self) -> Option<Self> {
        let idx = Module::ALL.iter().position(|m| *m == self)?;
        Module::ALL.get(idx + 1).copied()
    }

    /// Short name as used in file names and prompts
    pub fn as_str(self) -> &'static str {
        match self {
            Module::A1 => "A1",
            Module::A2 => "A2",
            Module::B1 => "B1",
            Module::B2 => "B2",
            Module::C1 => "C1",
            Module::C2 => "C2",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the student currently is in the curriculum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current module
    pub module: Module,
    /// Current lesson number within the module, starting at 1
    pub lesson: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            module: Module::first(),
            lesson: 1,
        }
    }
}

/// Outcome of moving past a finished lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Advanced to the next lesson within the same module
    NextLesson,
    /// Rolled over into a new module, lesson counter reset to 1
    NextModule(Module),
    /// The last lesson of the last module is already done; nothing moved
    Completed,
}

impl Progress {
    /// Advance by exactly one lesson, rolling over into the next module after
    /// `lessons_per_module` lessons. Past the last module the pointer stays put.
    pub fn advance(&mut self, lessons_per_module: u32) -> Advance {
        if self.lesson < lessons_per_module {
            self.lesson += 1;
            Advance::NextLesson
        } else if let Some(next) = self.module.next() {
            self.module = next;
            self.lesson = 1;
            Advance::NextModule(next)
        } else {
            Advance::Completed
        }
    }

    /// Load progress from disk, creating the file at the initial position if missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let progress = Self::default();
            progress.save(path)?;
            return Ok(progress);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read progress file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse progress file: {}", path.display()))
    }

    /// Save progress to disk, overwriting the whole file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write progress file: {}", path.display()))?;

        tracing::info!("Saved progress: {} lesson {}", self.module, self.lesson);
        Ok(())
    }
}
