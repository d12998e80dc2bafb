//! services/api/src/adapters/gemini.rs
//!
//! File-native content generation adapter backed by the Gemini REST API.
//! The raw document is uploaded to the Gemini File API and referenced from
//! the generation request, so no text extraction happens on our side. Quiz
//! output structure is enforced through a declared response schema.

use std::path::PathBuf;

use async_trait::async_trait;
use docstudy_core::domain::{Difficulty, Question, QuestionType, SummaryType};
use docstudy_core::ports::{ContentGenerationService, PortError, PortResult, SourceHandle};
use docstudy_core::prompts;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PDF_MIME_TYPE: &str = "application/pdf";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerationService` against the Gemini API.
#[derive(Clone)]
pub struct GeminiAdapter {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    storage_root: PathBuf,
    base_url: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`.
    pub fn new(api_key: String, model: String, storage_root: PathBuf) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            model,
            storage_root,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (for proxies or test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn file_uri(&self, resource_name: &str) -> String {
        format!("{}/v1beta/{}", self.base_url, resource_name)
    }

    async fn try_upload(&self, storage_path: &str) -> PortResult<SourceHandle> {
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

        let response = self
            .http_client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", PDF_MIME_TYPE)
            .body(bytes)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Gemini upload returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadFileResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(
            storage_path,
            file_uri = uploaded.file.name.as_str(),
            "File uploaded to Gemini"
        );
        Ok(SourceHandle::Remote(uploaded.file.name))
    }

    async fn generate_content(&self, request: &GenerateContentRequest) -> PortResult<String> {
        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Gemini generation returned {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let text: String = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PortError::Unexpected(
                "Gemini response contained no text content".to_string(),
            ));
        }
        Ok(text)
    }

    fn remote_name<'a>(&self, handle: &'a SourceHandle) -> PortResult<&'a str> {
        match handle {
            SourceHandle::Remote(name) => Ok(name),
            SourceHandle::Inline { id, .. } => Err(PortError::Unexpected(format!(
                "Handle {} was not produced by the Gemini provider",
                id
            ))),
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    fn file(file_uri: String) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: PDF_MIME_TYPE.to_string(),
                file_uri,
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: UploadedFile,
}

#[derive(Deserialize)]
struct UploadedFile {
    /// Resource name of the form `files/<id>`.
    name: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

/// The structural schema declared to Gemini for quiz generation.
fn quiz_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {
                            "type": "INTEGER",
                            "description": "Question number starting from 1"
                        },
                        "question": {
                            "type": "STRING",
                            "description": "The question text"
                        },
                        "type": {
                            "type": "STRING",
                            "description": "Question type: multiple_choice or true_false (for mixed type only)"
                        },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Array of answer options (4 for multiple_choice, 2 for true_false)"
                        },
                        "correct_answer": {
                            "type": "INTEGER",
                            "description": "Index of correct answer (0-3 for multiple_choice, 0-1 for true_false)"
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "Brief explanation of the correct answer"
                        }
                    },
                    "required": ["id", "question", "options", "correct_answer", "explanation"]
                }
            }
        },
        "required": ["questions"]
    })
}

//=========================================================================================
// `ContentGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerationService for GeminiAdapter {
    async fn upload_file(&self, storage_path: &str) -> Option<SourceHandle> {
        match self.try_upload(storage_path).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(error = %e, storage_path, "Gemini file upload failed");
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
        let name = self.remote_name(handle)?;
        let prompt = prompts::summary_prompt(summary_type, file_name, language);

        let request = GenerateContentRequest {
            system_instruction: Content::text(prompts::SUMMARY_SYSTEM_INSTRUCTION),
            contents: vec![Content {
                parts: vec![Part::text(prompt), Part::file(self.file_uri(name))],
            }],
            generation_config: None,
        };

        self.generate_content(&request).await
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
        let name = self.remote_name(handle)?;
        let prompt =
            prompts::quiz_prompt(question_count, difficulty, question_type, file_name, language);

        let request = GenerateContentRequest {
            system_instruction: Content::text(prompts::QUIZ_SYSTEM_INSTRUCTION),
            contents: vec![Content {
                parts: vec![Part::text(prompt), Part::file(self.file_uri(name))],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: quiz_response_schema(),
            }),
        };

        let text = self.generate_content(&request).await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| PortError::Unexpected(format!("Gemini returned invalid JSON: {}", e)))?;

        // The schema requires `questions`, but a missing key is still an
        // empty result rather than a fault.
        match body.get("questions") {
            Some(questions) => serde_json::from_value(questions.clone())
                .map_err(|e| PortError::Unexpected(format!("Malformed question set: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    async fn delete_file(&self, handle: &SourceHandle) -> bool {
        let name = match handle {
            SourceHandle::Remote(name) => name,
            SourceHandle::Inline { id, .. } => {
                warn!(
                    id = id.as_str(),
                    "Gemini adapter asked to delete a non-Gemini handle"
                );
                return false;
            }
        };

        let result = self
            .http_client
            .delete(format!("{}/v1beta/{}", self.base_url, name))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(file_uri = name.as_str(), "File deleted from Gemini");
                true
            }
            Ok(response) => {
                warn!(
                    file_uri = name.as_str(),
                    status = %response.status(),
                    "Gemini file deletion failed"
                );
                false
            }
            Err(e) => {
                warn!(file_uri = name.as_str(), error = %e, "Gemini file deletion failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_schema_requires_core_question_fields() {
        let schema = quiz_response_schema();
        assert_eq!(schema["required"][0], "questions");

        let required = schema["properties"]["questions"]["items"]["required"]
            .as_array()
            .unwrap();
        for field in ["id", "question", "options", "correct_answer", "explanation"] {
            assert!(required.iter().any(|v| v == field), "missing {}", field);
        }
    }

    #[test]
    fn generation_response_parses_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"questions\": []}"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.candidates[0].content.parts[0].text,
            "{\"questions\": []}"
        );
    }

    #[test]
    fn upload_response_parses_resource_name() {
        let body = r#"{"file": {"name": "files/abc-123", "uri": "https://example/v1beta/files/abc-123"}}"#;
        let parsed: UploadFileResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.file.name, "files/abc-123");
    }
}
