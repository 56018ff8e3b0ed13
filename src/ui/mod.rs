//! UI components for Professeur

pub mod lesson_list;
pub mod lesson_view;
pub mod settings;
