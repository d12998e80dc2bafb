//! services/api/src/adapters/openai.rs
//!
//! Text-extraction content generation adapter backed by OpenAI chat
//! completions. The chat API has no file upload, so the PDF text is extracted
//! locally during `upload_file` and carried inside the returned handle. That
//! keeps the adapter stateless: upload and generate may run on different
//! instances of a scaled deployment.

use std::path::PathBuf;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use docstudy_core::domain::{Difficulty, Question, QuestionType, SummaryType};
use docstudy_core::ports::{ContentGenerationService, PortError, PortResult, SourceHandle};
use docstudy_core::prompts;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerationService` using an
/// OpenAI-compatible LLM over a text-only path.
#[derive(Clone)]
pub struct OpenAiAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    storage_root: PathBuf,
}

impl OpenAiAdapter {
    /// Creates a new `OpenAiAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, storage_root: PathBuf) -> Self {
        Self {
            client,
            model,
            storage_root,
        }
    }

    async fn try_extract(&self, storage_path: &str) -> PortResult<String> {
        let absolute_path = self.storage_root.join(storage_path);
        if !absolute_path.exists() {
            return Err(PortError::NotFound(format!(
                "File not found: {}",
                storage_path
            )));
        }

        let bytes = tokio::fs::read(&absolute_path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The pdf_extract crate (and its cff-parser dependency) can panic on
        // certain fonts/glyphs, so extraction runs guarded on a blocking task.
        let extracted = tokio::task::spawn_blocking(move || {
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        })
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let text = match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(PortError::Unexpected(format!(
                    "PDF extraction failed: {}",
                    e
                )))
            }
            Err(_panic) => {
                return Err(PortError::Unexpected(
                    "PDF extraction panicked, likely a malformed font".to_string(),
                ))
            }
        };

        if text.trim().is_empty() {
            return Err(PortError::Unexpected(
                "Failed to extract text from PDF".to_string(),
            ));
        }
        Ok(text)
    }

    fn inline_text<'a>(&self, handle: &'a SourceHandle) -> PortResult<&'a str> {
        match handle {
            SourceHandle::Inline { text, .. } => Ok(text),
            SourceHandle::Remote(name) => Err(PortError::Unexpected(format!(
                "Handle {} was not produced by the OpenAI provider",
                name
            ))),
        }
    }
}

/// Pulls the question array out of a JSON-mode completion. A response that is
/// not valid JSON or has no `questions` key yields an empty set rather than a
/// fault; the orchestrator decides how to surface that.
fn parse_questions(content: &str) -> Vec<Question> {
    let Ok(body) = serde_json::from_str::<Value>(content) else {
        return Vec::new();
    };
    body.get("questions")
        .and_then(|questions| serde_json::from_value(questions.clone()).ok())
        .unwrap_or_default()
}

//=========================================================================================
// `ContentGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerationService for OpenAiAdapter {
    /// "Uploads" a file by extracting its text locally. The extracted text is
    /// embedded in the returned handle instead of provider state.
    async fn upload_file(&self, storage_path: &str) -> Option<SourceHandle> {
        match self.try_extract(storage_path).await {
            Ok(text) => {
                let id = format!("openai_{}", Uuid::new_v4().simple());
                info!(
                    storage_path,
                    file_id = id.as_str(),
                    text_length = text.len(),
                    "File processed for OpenAI"
                );
                Some(SourceHandle::Inline { id, text })
            }
            Err(e) => {
                error!(error = %e, storage_path, "OpenAI file processing failed");
                None
            }
        }
    }

    async fn generate_summary(
        &self,
        handle: &SourceHandle,
        file_name: &str,
        summary_type: SummaryType,
        language: &str,
    ) -> PortResult<String> {
        let content = self.inline_text(handle)?;
        let prompt = prompts::summary_prompt(summary_type, file_name, language);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompts::SUMMARY_SYSTEM_INSTRUCTION)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("{}\n\nDocument Content:\n{}", prompt, content))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Summary LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Summary LLM returned no choices in its response.".to_string(),
            ))
        }
    }

    async fn generate_quiz(
        &self,
        handle: &SourceHandle,
        file_name: &str,
        question_count: u32,
        difficulty: Difficulty,
        question_type: QuestionType,
        language: &str,
    ) -> PortResult<Vec<Question>> {
        let content = self.inline_text(handle)?;
        let prompt =
            prompts::quiz_prompt(question_count, difficulty, question_type, file_name, language);
        let example = prompts::quiz_json_example(question_type, language);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(format!(
                    "{} {}",
                    prompts::QUIZ_SYSTEM_INSTRUCTION,
                    prompts::JSON_ONLY_DIRECTIVE
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "{}\n\nReturn the response as JSON with this exact structure:\n{}\n\n\
                     Document Content:\n{}",
                    prompt, example, content
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(parse_questions(&content))
    }

    /// Nothing is held remotely, so there is nothing to clean up; the
    /// extracted text lives in the handle and goes away with it.
    async fn delete_file(&self, handle: &SourceHandle) -> bool {
        match handle {
            SourceHandle::Inline { id, .. } => {
                debug!(file_id = id.as_str(), "Released extracted file content");
                true
            }
            SourceHandle::Remote(name) => {
                warn!(
                    file_uri = name.as_str(),
                    "OpenAI adapter asked to delete a non-OpenAI handle"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstudy_core::domain::QuestionKind;

    #[test]
    fn parses_a_well_formed_question_set() {
        let content = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "What is the main topic?",
                    "options": ["A", "B", "C", "D"],
                    "correct_answer": 2,
                    "explanation": "Stated in the introduction."
                }
            ]
        }"#;

        let questions = parse_questions(content);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[0].correct_answer, 2);
        assert_eq!(questions[0].kind, None);
    }

    #[test]
    fn parses_mixed_question_type_tags() {
        let content = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "Multiple choice",
                    "type": "multiple_choice",
                    "options": ["A", "B", "C", "D"],
                    "correct_answer": 0,
                    "explanation": ""
                },
                {
                    "id": 2,
                    "question": "True or false",
                    "type": "true_false",
                    "options": ["True", "False"],
                    "correct_answer": 1,
                    "explanation": ""
                }
            ]
        }"#;

        let questions = parse_questions(content);
        assert_eq!(questions[0].kind, Some(QuestionKind::MultipleChoice));
        assert_eq!(questions[1].kind, Some(QuestionKind::TrueFalse));
    }

    #[test]
    fn invalid_json_yields_an_empty_set() {
        assert!(parse_questions("not json at all").is_empty());
    }

    #[test]
    fn missing_questions_key_yields_an_empty_set() {
        assert!(parse_questions(r#"{"items": []}"#).is_empty());
    }

    #[test]
    fn malformed_questions_array_yields_an_empty_set() {
        assert!(parse_questions(r#"{"questions": [{"id": "not a number"}]}"#).is_empty());
    }
}
