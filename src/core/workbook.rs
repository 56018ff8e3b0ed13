//! Lesson files on disk: Markdown documents, JSON records, answer scraping

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex_lite::Regex;
use walkdir::WalkDir;

use crate::core::curriculum::{Module, Progress};
use crate::core::lesson::{Lesson, ModuleOverview};

/// Heading appended to a lesson once its answers have been corrected
pub const CORRECTION_HEADING: &str = "## Correction and Explanation";

/// Marker written after each exercise; the student types below it
pub const ANSWER_MARKER: &str = "**Your Answer:**";

/// A language's lesson folder and the documents inside it
#[derive(Debug, Clone)]
pub struct Workbook {
    dir: PathBuf,
    language: String,
}

/// One markdown document found in the lesson folder
#[derive(Debug, Clone, PartialEq)]
pub struct LessonEntry {
    pub title: String,
    pub path: PathBuf,
}

impl Workbook {
    pub fn new(dir: PathBuf, language: impl Into<String>) -> Self {
        Self {
            dir,
            language: language.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the progress record
    pub fn progress_path(&self) -> PathBuf {
        self.dir.join("lesson_progress.json")
    }

    /// Path of a lesson's markdown document
    pub fn lesson_markdown_path(&self, progress: &Progress) -> PathBuf {
        self.dir
            .join(format!("{}_lesson_{}.md", progress.module, progress.lesson))
    }

    /// Path of a lesson's raw JSON record
    pub fn lesson_json_path(&self, progress: &Progress) -> PathBuf {
        self.dir
            .join(format!("{}_lesson_{}.json", progress.module, progress.lesson))
    }

    /// Path of a module's overview document
    pub fn overview_path(&self, module: Module) -> PathBuf {
        self.dir.join(format!("{}_Module_Overview.md", module))
    }

    /// Write the lesson as a markdown document with numbered exercises and
    /// blank answer slots
    pub fn write_lesson_markdown(&self, progress: &Progress, lesson: &Lesson) -> Result<PathBuf> {
        let path = self.lesson_markdown_path(progress);
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create lesson folder: {}", self.dir.display()))?;

        let content = render_lesson_markdown(&self.language, progress, lesson);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write lesson file: {}", path.display()))?;

        tracing::info!("Saved lesson markdown: {}", path.display());
        Ok(path)
    }

    /// Write the raw lesson record next to the markdown document
    pub fn write_lesson_json(&self, progress: &Progress, lesson: &Lesson) -> Result<PathBuf> {
        let path = self.lesson_json_path(progress);
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create lesson folder: {}", self.dir.display()))?;

        let content = serde_json::to_string_pretty(lesson)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write lesson record: {}", path.display()))?;
        Ok(path)
    }

    /// Load the raw lesson record for the given lesson, if one was saved
    pub fn load_lesson_json(&self, progress: &Progress) -> Result<Lesson> {
        let path = self.lesson_json_path(progress);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read lesson record: {}", path.display()))?;
        let lesson: Lesson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse lesson record: {}", path.display()))?;
        Ok(lesson)
    }

    /// Append the correction below a horizontal rule at the end of the
    /// lesson document
    pub fn append_correction(&self, progress: &Progress, correction: &str) -> Result<PathBuf> {
        let path = self.lesson_markdown_path(progress);
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open lesson file: {}", path.display()))?;

        write!(file, "\n---\n{}\n\n{}\n", CORRECTION_HEADING, correction)
            .with_context(|| format!("Failed to append correction: {}", path.display()))?;

        tracing::info!("Appended correction: {}", path.display());
        Ok(path)
    }

    /// Whether this lesson's document already carries a correction
    pub fn has_correction(&self, progress: &Progress) -> bool {
        let path = self.lesson_markdown_path(progress);
        std::fs::read_to_string(&path)
            .map(|content| content.contains(CORRECTION_HEADING))
            .unwrap_or(false)
    }

    /// Scrape the student's answers out of the lesson document
    pub fn read_lesson_answers(
        &self,
        progress: &Progress,
        num_exercises: usize,
    ) -> Result<Vec<String>> {
        let path = self.lesson_markdown_path(progress);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read lesson file: {}", path.display()))?;
        Ok(read_answers(&content, num_exercises))
    }

    /// Write a module overview document
    pub fn write_overview(&self, module: Module, overview: &ModuleOverview) -> Result<PathBuf> {
        let path = self.overview_path(module);
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create lesson folder: {}", self.dir.display()))?;

        let content = render_overview_markdown(&self.language, module, overview);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write overview file: {}", path.display()))?;

        tracing::info!("Saved module overview: {}", path.display());
        Ok(path)
    }

    /// List all markdown documents in the lesson folder, sorted by file name
    pub fn list_entries(&self) -> Vec<LessonEntry> {
        let mut entries: Vec<LessonEntry> = WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "md").unwrap_or(false))
            .map(|e| {
                let path = e.path().to_path_buf();
                let title = entry_title(&path);
                LessonEntry { title, path }
            })
            .collect();

        entries.sort_by(|a, b| {
            let a_name = a.path.file_name().map(|s| s.to_string_lossy().to_lowercase());
            let b_name = b.path.file_name().map(|s| s.to_string_lossy().to_lowercase());
            a_name.cmp(&b_name)
        });
        entries
    }
}

/// Render the lesson markdown: title, summary, content, then the numbered
/// exercises each followed by an answer slot
fn render_lesson_markdown(language: &str, progress: &Progress, lesson: &Lesson) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# {} {} Lesson {}\n\n",
        language, progress.module, progress.lesson
    ));
    out.push_str(&format!(
        "## What you will learn today\n{}\n\n",
        lesson.summary_text()
    ));
    out.push_str(&format!("## Lesson Content\n{}\n\n", lesson.content_text()));
    out.push_str("## Exercises\n\n");

    for (i, exercise) in lesson.exercises.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, exercise.prompt_text().trim()));
        out.push_str(&format!("{} \n\n", ANSWER_MARKER));
    }
    out
}

/// Render the overview markdown: title, overview text, topic list
fn render_overview_markdown(language: &str, module: Module, overview: &ModuleOverview) -> String {
    let overview_text = if overview.overview_text.trim().is_empty() {
        "No overview text provided."
    } else {
        overview.overview_text.as_str()
    };

    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", overview.title(language, module)));
    out.push_str(&format!("{}\n\n", overview_text));
    out.push_str("## Topics to be Covered\n\n");
    for topic in &overview.topics_covered {
        out.push_str(&format!("- {}\n", topic));
    }
    out.push_str("\n---\n");
    out.push_str("Start your first lesson by clicking 'Generate New Lesson'!");
    out
}

/// Scrape one answer per exercise from the document text.
///
/// Each answer starts after its "**Your Answer:**" marker and is cut at the
/// next marker, the next numbered item, or the next heading, whichever comes
/// first. Always returns exactly `num_exercises` strings; exercises with no
/// marker in the document get an empty answer.
pub fn read_answers(content: &str, num_exercises: usize) -> Vec<String> {
    let marker = Regex::new(r"\*\*Your Answer:\*\*\s*").unwrap();
    let next_item = Regex::new(r"(?m)^\d+\.\s").unwrap();
    let next_heading = Regex::new(r"(?m)^#+\s").unwrap();

    let spans: Vec<(usize, usize)> = marker
        .find_iter(content)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut answers = vec![String::new(); num_exercises];
    for (i, answer) in answers.iter_mut().enumerate() {
        let Some(&(_, start)) = spans.get(i) else {
            break;
        };
        let end = spans.get(i + 1).map(|&(s, _)| s).unwrap_or(content.len());
        let block = content[start..end].trim();

        let mut cut = block.len();
        if let Some(m) = next_item.find(block) {
            cut = cut.min(m.start());
        }
        if let Some(m) = next_heading.find(block) {
            cut = cut.min(m.start());
        }
        *answer = block[..cut].trim().to_string();
    }
    answers
}

/// Title for the file list: the document's first heading, or the file stem
fn entry_title(path: &Path) -> String {
    use pulldown_cmark::{Event, Parser, Tag, TagEnd};

    let fallback = || {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    };

    let Ok(content) = std::fs::read_to_string(path) else {
        return fallback();
    };

    let mut in_heading = false;
    let mut text = String::new();
    for event in Parser::new(&content) {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::Text(t) if in_heading => text.push_str(&t),
            Event::End(TagEnd::Heading(_)) => {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
                in_heading = false;
                text.clear();
            }
            _ => {}
        }
    }
    fallback()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lesson::Exercise;

    fn sample_lesson() -> Lesson {
        Lesson {
            explanation_summary: "Greetings and introductions.".to_string(),
            lesson_content: "Bonjour means hello.".to_string(),
            exercises: vec![
                Exercise::Plain("Translate: Hello, my name is Anna.".to_string()),
                Exercise::Structured {
                    question: Some("Choose the correct greeting for the evening.".to_string()),
                    options: vec!["Bonjour".to_string(), "Bonsoir".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_lesson_markdown_format() {
        let progress = Progress {
            module: Module::A1,
            lesson: 1,
        };
        let rendered = render_lesson_markdown("French", &progress, &sample_lesson());
        let expected = "# French A1 Lesson 1\n\n\
            ## What you will learn today\nGreetings and introductions.\n\n\
            ## Lesson Content\nBonjour means hello.\n\n\
            ## Exercises\n\n\
            1. Translate: Hello, my name is Anna.\n\
            **Your Answer:** \n\n\
            2. Choose the correct greeting for the evening.\nOptions: Bonjour, Bonsoir\n\
            **Your Answer:** \n\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_empty_lesson_gets_placeholders() {
        let progress = Progress {
            module: Module::B2,
            lesson: 3,
        };
        let rendered = render_lesson_markdown("French", &progress, &Lesson::default());
        assert!(rendered.starts_with("# French B2 Lesson 3\n\n"));
        assert!(rendered.contains("No summary provided."));
        assert!(rendered.contains("No lesson content provided."));
        assert!(rendered.ends_with("## Exercises\n\n"));
    }

    #[test]
    fn test_overview_markdown_format() {
        let overview = ModuleOverview {
            module_title: "French A2 Module Overview".to_string(),
            overview_text: "This module builds everyday conversation skills.".to_string(),
            topics_covered: vec!["Past tense".to_string(), "Directions".to_string()],
        };
        let rendered = render_overview_markdown("French", Module::A2, &overview);
        let expected = "# French A2 Module Overview\n\n\
            This module builds everyday conversation skills.\n\n\
            ## Topics to be Covered\n\n\
            - Past tense\n\
            - Directions\n\
            \n---\n\
            Start your first lesson by clicking 'Generate New Lesson'!";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_read_answers_between_markers() {
        let content = "## Exercises\n\n\
            1. Translate: good morning.\n\
            **Your Answer:** bonjour\n\n\
            2. Translate: good evening.\n\
            **Your Answer:** bonsoir\n";
        let answers = read_answers(content, 2);
        assert_eq!(answers, vec!["bonjour".to_string(), "bonsoir".to_string()]);
    }

    #[test]
    fn test_read_answers_keeps_multiline_text() {
        let content = "1. Describe your weekend.\n\
            **Your Answer:** Samedi, j'ai visite le marche.\nDimanche, j'ai dormi.\n\n\
            2. Translate: thank you.\n\
            **Your Answer:** merci\n";
        let answers = read_answers(content, 2);
        assert_eq!(
            answers[0],
            "Samedi, j'ai visite le marche.\nDimanche, j'ai dormi."
        );
        assert_eq!(answers[1], "merci");
    }

    #[test]
    fn test_read_answers_truncates_at_heading() {
        let content = "1. Translate: hello.\n\
            **Your Answer:** salut\n\n\
            ## Correction and Explanation\n\nWell done.\n";
        let answers = read_answers(content, 1);
        assert_eq!(answers, vec!["salut".to_string()]);
    }

    #[test]
    fn test_read_answers_pads_missing_markers() {
        let content = "1. Translate: hello.\n**Your Answer:** salut\n";
        let answers = read_answers(content, 3);
        assert_eq!(
            answers,
            vec!["salut".to_string(), String::new(), String::new()]
        );
    }

    #[test]
    fn test_read_answers_blank_slots() {
        let progress = Progress {
            module: Module::A1,
            lesson: 1,
        };
        let rendered = render_lesson_markdown("French", &progress, &sample_lesson());
        // A freshly generated document has only empty answers
        assert_eq!(
            read_answers(&rendered, 2),
            vec![String::new(), String::new()]
        );
    }

    #[test]
    fn test_append_correction_and_detect() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(dir.path().to_path_buf(), "French");
        let progress = Progress {
            module: Module::A1,
            lesson: 2,
        };

        workbook
            .write_lesson_markdown(&progress, &sample_lesson())
            .unwrap();
        assert!(!workbook.has_correction(&progress));

        workbook
            .append_correction(&progress, "1. Correct.\n2. Use 'Bonsoir'.")
            .unwrap();
        assert!(workbook.has_correction(&progress));

        let content = std::fs::read_to_string(workbook.lesson_markdown_path(&progress)).unwrap();
        assert!(content.ends_with(
            "\n---\n## Correction and Explanation\n\n1. Correct.\n2. Use 'Bonsoir'.\n"
        ));
    }

    #[test]
    fn test_answers_survive_correction_append() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(dir.path().to_path_buf(), "French");
        let progress = Progress {
            module: Module::A1,
            lesson: 1,
        };

        let path = workbook
            .write_lesson_markdown(&progress, &sample_lesson())
            .unwrap();

        // Simulate the student filling in the first slot in an editor
        let content = std::fs::read_to_string(&path).unwrap();
        let filled = content.replacen(
            "**Your Answer:** \n",
            "**Your Answer:** Bonjour, je m'appelle Anna.\n",
            1,
        );
        std::fs::write(&path, filled).unwrap();

        let answers = workbook.read_lesson_answers(&progress, 2).unwrap();
        assert_eq!(answers[0], "Bonjour, je m'appelle Anna.");
        assert_eq!(answers[1], "");

        // The filled-in answer is still recoverable after the correction lands
        workbook.append_correction(&progress, "Looks good.").unwrap();
        let answers = workbook.read_lesson_answers(&progress, 2).unwrap();
        assert_eq!(answers[0], "Bonjour, je m'appelle Anna.");
    }

    #[test]
    fn test_lesson_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(dir.path().to_path_buf(), "French");
        let progress = Progress {
            module: Module::C1,
            lesson: 4,
        };

        let lesson = sample_lesson();
        workbook.write_lesson_json(&progress, &lesson).unwrap();
        let reloaded = workbook.load_lesson_json(&progress).unwrap();
        assert_eq!(reloaded, lesson);
    }

    #[test]
    fn test_load_missing_lesson_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(dir.path().to_path_buf(), "French");
        let progress = Progress::default();
        assert!(workbook.load_lesson_json(&progress).is_err());
    }

    #[test]
    fn test_list_entries_sorted_with_titles() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = Workbook::new(dir.path().to_path_buf(), "French");

        std::fs::write(
            dir.path().join("A1_lesson_2.md"),
            "# French A1 Lesson 2\n\nContent.\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("A1_lesson_1.md"),
            "# French A1 Lesson 1\n\nContent.\n",
        )
        .unwrap();
        // No heading: title falls back to the file stem
        std::fs::write(dir.path().join("notes.md"), "just text\n").unwrap();
        // Non-markdown files are skipped
        std::fs::write(dir.path().join("lesson_progress.json"), "{}").unwrap();

        let entries = workbook.list_entries();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["French A1 Lesson 1", "French A1 Lesson 2", "notes"]
        );
    }
}
