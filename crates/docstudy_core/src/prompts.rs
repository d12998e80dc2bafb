//! crates/docstudy_core/src/prompts.rs
//!
//! Pure, deterministic prompt construction for summary and quiz generation.
//! No I/O happens here; both provider adapters share these builders so the
//! instructions sent to the model do not depend on which provider is active.

use crate::domain::{Difficulty, QuestionType, SummaryType};

/// System instruction fixing the assistant's role for summary generation.
pub const SUMMARY_SYSTEM_INSTRUCTION: &str = "You are a professional document summarizer. \
Provide accurate, well-structured summaries based on the document content.";

/// System instruction fixing the assistant's role for quiz generation.
pub const QUIZ_SYSTEM_INSTRUCTION: &str = "You are an expert educational content creator. \
Generate high-quality quiz questions based on document content.";

/// Appended to the quiz system instruction by providers that enforce the
/// output structure through the prompt instead of a response schema.
pub const JSON_ONLY_DIRECTIVE: &str =
    "Always respond with valid JSON only, no additional text.";

/// Resolves a language code to the name used in prompt directives.
/// Unknown codes fall back to English.
pub fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "id" => "Indonesian (Bahasa Indonesia)",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "zh" => "Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ar" => "Arabic",
        "pt" => "Portuguese",
        _ => "English",
    }
}

/// The fixed option pair for true/false questions in the given language.
pub fn true_false_options(language: &str) -> [&'static str; 2] {
    if language == "id" {
        ["Benar", "Salah"]
    } else {
        ["True", "False"]
    }
}

/// Builds the task prompt for summary generation, selected by summary type.
pub fn summary_prompt(summary_type: SummaryType, file_name: &str, language: &str) -> String {
    let name = language_name(language);
    let language_instruction = format!(
        "IMPORTANT: Write the entire summary in {name}. All text must be in {name}."
    );

    match summary_type {
        SummaryType::Concise => format!(
            "Analyze the document '{file_name}' and provide a concise summary (2-3 paragraphs) \
             that captures the main points, key concepts, and essential information. Focus on \
             the most important ideas presented in the document.\n\n{language_instruction}"
        ),
        SummaryType::Detailed => format!(
            "Analyze the document '{file_name}' and create a comprehensive, detailed summary \
             that covers all major sections, key arguments, supporting evidence, and important \
             details. Organize the summary logically with clear sections. The summary should be \
             thorough enough that someone could understand the document's full scope without \
             reading it.\n\n{language_instruction}"
        ),
        SummaryType::BulletPoints => format!(
            "Analyze the document '{file_name}' and create a structured bullet-point summary. \
             Use clear bullet points (\u{2022}) to list:\n\
             \u{2022} Main topics and themes\n\
             \u{2022} Key concepts and definitions\n\
             \u{2022} Important findings and conclusions\n\
             \u{2022} Practical applications\n\
             \u{2022} Critical insights and takeaways\n\
             Keep each bullet point concise but informative.\n\n{language_instruction}"
        ),
        SummaryType::Abstract => format!(
            "Analyze the document '{file_name}' and write a formal academic-style abstract \
             (150-250 words) that includes: the document's purpose, methodology or approach, \
             key findings, and conclusions. Use formal academic language appropriate for a \
             research paper abstract.\n\n{language_instruction}"
        ),
    }
}

fn difficulty_description(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "basic concepts and fundamental understanding",
        Difficulty::Medium => "application of concepts and analytical thinking",
        Difficulty::Hard => "complex analysis, synthesis, and critical evaluation",
    }
}

fn type_description(question_type: QuestionType, language: &str) -> String {
    let [t, f] = true_false_options(language);
    match question_type {
        QuestionType::MultipleChoice => {
            "multiple-choice questions. Each question must have EXACTLY 4 answer options."
                .to_string()
        }
        QuestionType::TrueFalse => format!(
            "true/false questions. Each question must have EXACTLY 2 answer options: \
             [\"{t}\", \"{f}\"]."
        ),
        QuestionType::Mixed => format!(
            "a mix of multiple-choice and true/false questions. Multiple-choice questions must \
             have EXACTLY 4 options. True/false questions must have EXACTLY 2 options: \
             [\"{t}\", \"{f}\"]. Mix them roughly equally."
        ),
    }
}

fn format_instructions(question_type: QuestionType, language: &str) -> String {
    let [t, f] = true_false_options(language);
    match question_type {
        QuestionType::MultipleChoice => "- Each question must have exactly 4 options\n\
             - correct_answer index must be 0-3\n\
             - Mix the position of correct answers (don't always make it option A/0)"
            .to_string(),
        QuestionType::TrueFalse => format!(
            "- Each question MUST have exactly 2 options\n\
             - Options must be exactly [\"{t}\", \"{f}\"]\n\
             - correct_answer must be 0 (for {t}) or 1 (for {f})"
        ),
        QuestionType::Mixed => format!(
            "- For multiple-choice questions: provide exactly 4 options, correct_answer index 0-3\n\
             - For true/false questions: provide exactly 2 options [\"{t}\", \"{f}\"], \
             correct_answer 0 or 1\n\
             - Mix roughly equal numbers of both types\n\
             - Add a 'type' field to each question: 'multiple_choice' or 'true_false'"
        ),
    }
}

/// Builds the task prompt for quiz generation.
pub fn quiz_prompt(
    question_count: u32,
    difficulty: Difficulty,
    question_type: QuestionType,
    file_name: &str,
    language: &str,
) -> String {
    let name = language_name(language);
    let language_instruction = format!(
        "IMPORTANT: Write ALL questions, options, and explanations in {name}. \
         Every piece of text must be in {name}."
    );

    format!(
        "Analyze the document '{file_name}' and generate exactly {question_count} {type_desc}\n\
         \n\
         Difficulty Level: {difficulty}\n\
         Questions should test {difficulty_desc}\n\
         \n\
         Requirements:\n\
         - All questions must be based on the actual content of the document\n\
         - Each question should have a clear, unambiguous answer\n\
         {format_instructions}\n\
         - Provide a brief explanation for each correct answer\n\
         - Ensure questions cover different parts/topics of the document\n\
         - Use clear, professional language\n\
         - Number questions starting from 1\n\
         \n\
         {language_instruction}\n\
         \n\
         Generate questions that would genuinely test someone's understanding of the document \
         content.",
        type_desc = type_description(question_type, language),
        difficulty = difficulty.as_str(),
        difficulty_desc = difficulty_description(difficulty),
        format_instructions = format_instructions(question_type, language),
    )
}

/// The JSON example appended to quiz prompts by providers that request
/// JSON-only output instead of declaring a response schema.
pub fn quiz_json_example(question_type: QuestionType, language: &str) -> String {
    let [t, f] = true_false_options(language);
    match question_type {
        QuestionType::TrueFalse => format!(
            r#"{{
    "questions": [
        {{
            "id": 1,
            "question": "Question text here",
            "options": ["{t}", "{f}"],
            "correct_answer": 0,
            "explanation": "Brief explanation of the correct answer"
        }}
    ]
}}"#
        ),
        QuestionType::Mixed => format!(
            r#"{{
    "questions": [
        {{
            "id": 1,
            "question": "Multiple choice question text",
            "type": "multiple_choice",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "correct_answer": 0,
            "explanation": "Explanation for multiple choice"
        }},
        {{
            "id": 2,
            "question": "True/false question text",
            "type": "true_false",
            "options": ["{t}", "{f}"],
            "correct_answer": 1,
            "explanation": "Explanation for true/false"
        }}
    ]
}}"#
        ),
        QuestionType::MultipleChoice => r#"{
    "questions": [
        {
            "id": 1,
            "question": "Question text here",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "correct_answer": 0,
            "explanation": "Brief explanation of the correct answer"
        }
    ]
}"#
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_selects_template_by_type() {
        let concise = summary_prompt(SummaryType::Concise, "notes.pdf", "en");
        assert!(concise.contains("concise summary (2-3 paragraphs)"));
        assert!(concise.contains("'notes.pdf'"));

        let detailed = summary_prompt(SummaryType::Detailed, "notes.pdf", "en");
        assert!(detailed.contains("comprehensive, detailed summary"));

        let bullets = summary_prompt(SummaryType::BulletPoints, "notes.pdf", "en");
        assert!(bullets.contains("bullet-point summary"));
        assert!(bullets.contains("\u{2022} Main topics and themes"));

        let abstract_ = summary_prompt(SummaryType::Abstract, "notes.pdf", "en");
        assert!(abstract_.contains("academic-style abstract"));
    }

    #[test]
    fn summary_prompt_embeds_language_directive() {
        let prompt = summary_prompt(SummaryType::Concise, "doc.pdf", "fr");
        assert!(prompt.contains("Write the entire summary in French"));
    }

    #[test]
    fn unknown_language_defaults_to_english() {
        assert_eq!(language_name("xx"), "English");
        let prompt = summary_prompt(SummaryType::Concise, "doc.pdf", "xx");
        assert!(prompt.contains("Write the entire summary in English"));
    }

    #[test]
    fn indonesian_keeps_native_name() {
        assert_eq!(language_name("id"), "Indonesian (Bahasa Indonesia)");
    }

    #[test]
    fn true_false_pair_is_deterministic_per_language() {
        assert_eq!(true_false_options("id"), ["Benar", "Salah"]);
        assert_eq!(true_false_options("en"), ["True", "False"]);
        assert_eq!(true_false_options("xx"), ["True", "False"]);

        let id_prompt = quiz_prompt(10, Difficulty::Easy, QuestionType::TrueFalse, "a.pdf", "id");
        assert!(id_prompt.contains(r#"["Benar", "Salah"]"#));
        assert!(!id_prompt.contains(r#"["True", "False"]"#));

        let en_prompt = quiz_prompt(10, Difficulty::Easy, QuestionType::TrueFalse, "a.pdf", "en");
        assert!(en_prompt.contains(r#"["True", "False"]"#));
        assert!(!en_prompt.contains(r#"["Benar", "Salah"]"#));
    }

    #[test]
    fn quiz_prompt_interpolates_count_and_difficulty() {
        let prompt = quiz_prompt(
            25,
            Difficulty::Hard,
            QuestionType::MultipleChoice,
            "thesis.pdf",
            "en",
        );
        assert!(prompt.contains("exactly 25"));
        assert!(prompt.contains("Difficulty Level: hard"));
        assert!(prompt.contains("complex analysis, synthesis, and critical evaluation"));
        assert!(prompt.contains("EXACTLY 4 answer options"));
        assert!(prompt.contains("Mix the position of correct answers"));
        assert!(prompt.contains("Number questions starting from 1"));
    }

    #[test]
    fn mixed_prompt_requires_type_tag_and_balance() {
        let prompt = quiz_prompt(10, Difficulty::Medium, QuestionType::Mixed, "doc.pdf", "en");
        assert!(prompt.contains("Add a 'type' field to each question"));
        assert!(prompt.contains("Mix roughly equal numbers of both types"));
    }

    #[test]
    fn quiz_language_directive_covers_all_text() {
        let prompt = quiz_prompt(5, Difficulty::Easy, QuestionType::MultipleChoice, "d.pdf", "ja");
        assert!(prompt.contains("Write ALL questions, options, and explanations in Japanese"));
    }

    #[test]
    fn json_example_matches_question_type() {
        let mc = quiz_json_example(QuestionType::MultipleChoice, "en");
        assert!(mc.contains("\"questions\""));
        assert!(mc.contains("Option D"));
        assert!(!mc.contains("\"type\""));

        let tf = quiz_json_example(QuestionType::TrueFalse, "id");
        assert!(tf.contains("\"Benar\""));

        let mixed = quiz_json_example(QuestionType::Mixed, "en");
        assert!(mixed.contains("\"type\": \"multiple_choice\""));
        assert!(mixed.contains("\"type\": \"true_false\""));
    }
}
