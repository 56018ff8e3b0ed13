//! Prompt templates for lesson generation, module overviews, and corrections

use crate::core::curriculum::Module;
use crate::core::lesson::Lesson;

/// Prompt for generating one lesson with exercises
pub fn lesson_prompt(language: &str, module: Module, lesson_number: u32) -> String {
    format!(
        r#"You are an expert {language} teacher. Create lesson number {lesson_number} for module {module} (A1, A2, B1, B2, C1, or C2).
Write a concise explanation of what the student will learn today regarding {language} grammar or communication skills.
Then provide a detailed text explaining the grammar concept or communication principle.
After the explanation, provide 5-7 varied exercises (fill-in-the-blanks, multiple choice, sentence correction, short answer, matching, etc.)
to practice the grammar topic.
To teach effective communication and writing, include at least one prompt for a "short reflection" or a "tiny essay" (around 50-100 words) at the end of the exercises, related to the lesson topic or a general communication skill. This will be part of the exercises.

YOUR ENTIRE RESPONSE MUST BE A SINGLE JSON OBJECT. DO NOT INCLUDE ANY OTHER TEXT, CONVERSATIONAL GREETINGS, OR EXPLANATIONS OUTSIDE THE JSON.

The 'exercises' array MUST contain 5-7 elements. EACH element in the 'exercises' array MUST be a string containing the full exercise question. Do NOT use placeholder text like 'No question text' or empty strings.

Example JSON structure:
{{
  "explanation_summary": "Today you will learn about the present simple tense for routines and habits.",
  "lesson_content": "The present simple tense is used to describe habits, routines, general truths, and scheduled events. For example, 'I eat breakfast every morning.' or 'The sun rises in the east.'",
  "exercises": [
    "Fill in the blank: I ___ (to go) to school every day.",
    "Choose the correct option: She (like/likes) pizza.",
    "Write a short reflection (50 words): Describe your daily routine using the present simple tense."
  ]
}}

Make sure the exercises match the {module} grammar level and the overall tone is professional and encouraging.
"#
    )
}

/// Prompt for generating an overview when the student enters a new module
pub fn overview_prompt(language: &str, module: Module) -> String {
    format!(
        r#"You are an expert {language} teacher. Create a professional and encouraging overview for the {module} module.
Explain what the student will explore in this module, including key grammar points, vocabulary themes, and communication skills they will develop.
Provide a list of 5-7 main topics that will be covered.

YOUR ENTIRE RESPONSE MUST BE A SINGLE JSON OBJECT. DO NOT INCLUDE ANY OTHER TEXT, CONVERSATIONAL GREETINGS, OR EXPLANATIONS OUTSIDE THE JSON.

Example JSON structure:
{{
  "module_title": "Welcome to A2: Building on Your Basics!",
  "overview_text": "In this module, you will expand your foundational {language} skills...",
  "topics_covered": [
    "Past simple tense: regular & irregular verbs",
    "Present continuous: actions happening now",
    "Countable and uncountable nouns: some, any, much, many",
    "Modal verbs for ability and permission: can, can't, must, mustn't",
    "Comparatives and superlatives: bigger, the biggest",
    "More prepositions: under, between, next to",
    "Simple conjunctions: and, but, because",
    "Possessive 's and pronouns"
  ]
}}
"#
    )
}

/// Prompt asking for detailed feedback on a completed lesson
pub fn correction_prompt(language: &str, lesson: &Lesson, answers: &[String]) -> String {
    let mut exercises_text = String::new();
    for (i, exercise) in lesson.exercises.iter().enumerate() {
        let answer = answers
            .get(i)
            .map(|a| a.as_str())
            .unwrap_or("No answer provided.");
        exercises_text.push_str(&format!(
            "Exercise {}: {}\nStudent's Answer: {}\n\n",
            i + 1,
            exercise.prompt_text().trim(),
            answer
        ));
    }

    format!(
        r#"You are a highly professional and experienced {language} teacher. Your task is to provide detailed, constructive, and encouraging feedback on a student's language exercises and writing.

Here is the lesson content, the original exercises, and the student's answers for each exercise:

---
Lesson Summary:
{summary}

Lesson Content:
{content}

---
Exercises and Student Answers:
{exercises_text}

---
Please provide the following:
1.  **Detailed Correction for Each Exercise:** For each exercise, clearly state if the answer is correct or incorrect. If incorrect, provide the correct answer and a clear, concise explanation of *why* it's incorrect and the grammatical rule or concept that applies.
2.  **Feedback on Writing/Essays:** For any essay or reflection prompts, provide specific feedback on grammar, vocabulary, sentence structure, clarity, coherence, and overall effectiveness of communication. Suggest areas for improvement.
3.  **Overall Improvement Areas:** Summarize the student's strengths and weaknesses across all exercises. Suggest specific areas for them to focus on for future improvement (e.g., "review verb tenses," "practice sentence connectors," "expand vocabulary related to X").
4.  **Professional and Encouraging Tone:** Maintain a supportive and professional tone throughout the correction.

Respond clearly and professionally in {language}.
"#,
        summary = lesson.explanation_summary,
        content = lesson.lesson_content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lesson::Exercise;

    #[test]
    fn test_lesson_prompt_mentions_position() {
        let prompt = lesson_prompt("French", Module::B1, 3);
        assert!(prompt.contains("Create lesson number 3 for module B1"));
        assert!(prompt.contains("expert French teacher"));
        assert!(prompt.contains("MUST BE A SINGLE JSON OBJECT"));
    }

    #[test]
    fn test_overview_prompt_mentions_module() {
        let prompt = overview_prompt("Spanish", Module::C2);
        assert!(prompt.contains("overview for the C2 module"));
        assert!(prompt.contains("expert Spanish teacher"));
    }

    #[test]
    fn test_correction_prompt_pairs_exercises_with_answers() {
        let lesson = Lesson {
            explanation_summary: "Articles.".to_string(),
            lesson_content: "Le, la, les.".to_string(),
            exercises: vec![
                Exercise::Plain("Translate: the cat.".to_string()),
                Exercise::Plain("Translate: the dogs.".to_string()),
            ],
        };
        let answers = vec!["le chat".to_string()];
        let prompt = correction_prompt("French", &lesson, &answers);

        assert!(prompt.contains("Exercise 1: Translate: the cat.\nStudent's Answer: le chat\n"));
        // Missing answers fall back to an explicit note for the model
        assert!(prompt
            .contains("Exercise 2: Translate: the dogs.\nStudent's Answer: No answer provided.\n"));
        assert!(prompt.contains("Lesson Summary:\nArticles."));
        assert!(prompt.contains("Respond clearly and professionally in French."));
    }

    #[test]
    fn test_correction_prompt_keeps_blank_answers_blank() {
        let lesson = Lesson {
            exercises: vec![Exercise::Plain("Conjugate: aller.".to_string())],
            ..Default::default()
        };
        let answers = vec![String::new()];
        let prompt = correction_prompt("French", &lesson, &answers);
        assert!(prompt.contains("Student's Answer: \n"));
        assert!(!prompt.contains("No answer provided."));
    }
}
