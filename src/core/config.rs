//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inference server settings
    pub server: ServerConfig,
    /// Course and storage settings
    pub course: CourseConfig,
}

/// Inference server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the local Ollama server
    pub url: String,
    /// Model name passed with every request
    pub model: String,
    /// Request deadline for lesson and overview generation, in seconds
    pub generate_timeout_secs: u64,
    /// Request deadline for corrections, in seconds
    pub correction_timeout_secs: u64,
}

/// Course and storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Language being studied; also names the per-language lessons folder
    pub language: String,
    /// Root folder for all lessons (None = Documents/Professeur)
    pub lessons_root: Option<PathBuf>,
    /// Lessons completed in a module before moving to the next one
    pub lessons_per_module: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2:latest".to_string(),
            generate_timeout_secs: 90,
            correction_timeout_secs: 120,
        }
    }
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            language: "French".to_string(),
            lessons_root: None,
            lessons_per_module: 5,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "professeur", "Professeur")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Get the folder holding this language's lessons and progress record
    pub fn lessons_dir(&self) -> PathBuf {
        self.course
            .lessons_root
            .clone()
            .unwrap_or_else(default_lessons_root)
            .join(&self.course.language)
    }
}

/// Default lessons root: the user's Documents folder, or the current
/// directory when the platform reports none
fn default_lessons_root() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Professeur")
}
