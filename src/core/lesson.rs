//! Lesson content as produced by the inference server
//!
//! The model is asked for strict JSON but regularly bends the contract: exercise
//! entries arrive as bare strings or as objects keyed `text` or `question`, with
//! or without multiple-choice options. The types here absorb those shapes instead
//! of failing the whole lesson.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::curriculum::Module;

/// One generated lesson for a (module, lesson) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Short summary of what the student will learn
    #[serde(default)]
    pub explanation_summary: String,
    /// Long-form explanation of the grammar concept or communication principle
    #[serde(default)]
    pub lesson_content: String,
    /// Ordered exercises, each requiring a written answer
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Lesson {
    /// Summary text with the placeholder the workbook shows when the model omitted it
    pub fn summary_text(&self) -> &str {
        if self.explanation_summary.trim().is_empty() {
            "No summary provided."
        } else {
            &self.explanation_summary
        }
    }

    /// Lesson body with the placeholder the workbook shows when the model omitted it
    pub fn content_text(&self) -> &str {
        if self.lesson_content.trim().is_empty() {
            "No lesson content provided."
        } else {
            &self.lesson_content
        }
    }
}

/// One exercise within a lesson
#[derive(Debug, Clone, PartialEq)]
pub enum Exercise {
    /// A bare question string
    Plain(String),
    /// A question object, possibly with multiple-choice options
    Structured {
        question: Option<String>,
        options: Vec<String>,
    },
}

impl Exercise {
    /// Coerce whatever JSON shape the model produced into an exercise
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Exercise::Plain(text),
            Value::Object(map) => {
                let question = [map.get("text"), map.get("question")]
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_str)
                    .find(|s| !s.trim().is_empty())
                    .map(str::to_owned);
                let options = map
                    .get("options")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default();
                Exercise::Structured { question, options }
            }
            _ => Exercise::Structured {
                question: None,
                options: Vec::new(),
            },
        }
    }

    /// The text shown for this exercise, both in the workbook and in the
    /// correction prompt: the question followed by its options, if any
    pub fn prompt_text(&self) -> String {
        match self {
            Exercise::Plain(text) => text.trim().to_string(),
            Exercise::Structured { question, options } => {
                let mut text = question
                    .as_deref()
                    .unwrap_or("*No question text*")
                    .trim()
                    .to_string();
                if !options.is_empty() {
                    text.push_str("\nOptions: ");
                    text.push_str(&options.join(", "));
                }
                text
            }
        }
    }
}

impl<'de> Deserialize<'de> for Exercise {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Exercise::from_value(value))
    }
}

impl Serialize for Exercise {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Exercise::Plain(text) => serializer.serialize_str(text),
            Exercise::Structured { question, options } => {
                let len = usize::from(question.is_some()) + usize::from(!options.is_empty());
                let mut map = serializer.serialize_map(Some(len))?;
                if let Some(question) = question {
                    map.serialize_entry("question", question)?;
                }
                if !options.is_empty() {
                    map.serialize_entry("options", options)?;
                }
                map.end()
            }
        }
    }
}

/// Overview text generated when the student enters a new module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleOverview {
    #[serde(default)]
    pub module_title: String,
    #[serde(default)]
    pub overview_text: String,
    #[serde(default)]
    pub topics_covered: Vec<String>,
}

impl ModuleOverview {
    /// Overview title, falling back to a generic one when the model omitted it
    pub fn title(&self, language: &str, module: Module) -> String {
        if self.module_title.trim().is_empty() {
            format!("{} {} Module Overview", language, module)
        } else {
            self.module_title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exercise_from_plain_string() {
        let exercise: Exercise =
            serde_json::from_value(json!("Fill in the blank: I ___ to school.")).unwrap();
        assert_eq!(
            exercise,
            Exercise::Plain("Fill in the blank: I ___ to school.".to_string())
        );
    }

    #[test]
    fn test_exercise_from_question_object() {
        let exercise: Exercise = serde_json::from_value(json!({
            "question": "Choose the correct article.",
            "options": ["le", "la", "les"]
        }))
        .unwrap();
        assert_eq!(
            exercise,
            Exercise::Structured {
                question: Some("Choose the correct article.".to_string()),
                options: vec!["le".to_string(), "la".to_string(), "les".to_string()],
            }
        );
    }

    #[test]
    fn test_exercise_accepts_text_key() {
        let exercise: Exercise =
            serde_json::from_value(json!({"text": "Conjugate 'aller'."})).unwrap();
        assert_eq!(
            exercise,
            Exercise::Structured {
                question: Some("Conjugate 'aller'.".to_string()),
                options: Vec::new(),
            }
        );
    }

    #[test]
    fn test_exercise_skips_empty_text_key() {
        let exercise: Exercise =
            serde_json::from_value(json!({"text": "", "question": "Translate: bonjour"})).unwrap();
        assert_eq!(
            exercise,
            Exercise::Structured {
                question: Some("Translate: bonjour".to_string()),
                options: Vec::new(),
            }
        );
    }

    #[test]
    fn test_exercise_tolerates_unexpected_shapes() {
        let exercise: Exercise = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(exercise.prompt_text(), "*No question text*");

        let exercise: Exercise =
            serde_json::from_value(json!({"options": ["a", 1, "b"]})).unwrap();
        // Non-string options are skipped rather than crashing the join
        assert_eq!(
            exercise,
            Exercise::Structured {
                question: None,
                options: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_prompt_text_appends_options() {
        let exercise = Exercise::Structured {
            question: Some("She (like/likes) pizza.".to_string()),
            options: vec!["like".to_string(), "likes".to_string()],
        };
        assert_eq!(
            exercise.prompt_text(),
            "She (like/likes) pizza.\nOptions: like, likes"
        );
    }

    #[test]
    fn test_lesson_tolerates_missing_fields() {
        let lesson: Lesson = serde_json::from_value(json!({
            "exercises": ["One question"]
        }))
        .unwrap();
        assert_eq!(lesson.summary_text(), "No summary provided.");
        assert_eq!(lesson.content_text(), "No lesson content provided.");
        assert_eq!(lesson.exercises.len(), 1);
    }

    #[test]
    fn test_lesson_round_trips_byte_for_byte() {
        let lesson = Lesson {
            explanation_summary: "Today: the present simple tense.".to_string(),
            lesson_content: "The present simple describes habits.\nFor example…".to_string(),
            exercises: vec![
                Exercise::Plain("Fill in the blank: I ___ (to go) to school.".to_string()),
                Exercise::Structured {
                    question: Some("Choose the correct option.".to_string()),
                    options: vec!["goes".to_string(), "go".to_string()],
                },
            ],
        };

        let serialized = serde_json::to_string_pretty(&lesson).unwrap();
        let reloaded: Lesson = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reloaded, lesson);
    }

    #[test]
    fn test_overview_title_fallback() {
        let overview = ModuleOverview::default();
        assert_eq!(overview.title("French", Module::A2), "French A2 Module Overview");

        let overview = ModuleOverview {
            module_title: "Welcome to A2!".to_string(),
            ..Default::default()
        };
        assert_eq!(overview.title("French", Module::A2), "Welcome to A2!");
    }
}
