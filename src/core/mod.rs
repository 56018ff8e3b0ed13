//! Core functionality for curriculum tracking, lesson storage, and configuration

pub mod config;
pub mod curriculum;
pub mod lesson;
pub mod watcher;
pub mod workbook;
