//! crates/docstudy_core/src/generation.rs
//!
//! Coordinates the upload -> generate -> cleanup pipeline against a
//! [`ContentGenerationService`], translating provider failures into the
//! domain error taxonomy. The orchestrator never persists anything; callers
//! store the returned content.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, warn};

use crate::domain::{Difficulty, Document, Question, QuestionType, SummaryType};
use crate::ports::{ContentGenerationService, SourceHandle};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Generation was requested for a document that has not finished
    /// processing. The provider is never contacted in this case.
    #[error("The document must be fully processed before generating content")]
    DocumentNotReady,

    /// The provider could not accept the source file.
    #[error("Failed to upload document for processing")]
    UploadFailed,

    /// The provider failed while generating. The underlying message is kept
    /// for diagnostics; callers surface a generic message to end users.
    #[error("Content generation failed: {0}")]
    GenerationFailed(String),

    /// The provider returned a structurally valid but empty question set.
    /// Distinct from `GenerationFailed` for observability; same external
    /// effect.
    #[error("The provider returned no quiz questions")]
    EmptyGenerationResult,
}

/// A generated summary along with its derived metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSummary {
    pub content: String,
    pub word_count: u32,
    pub processing_time_seconds: u32,
}

/// Drives one generation request through the active provider.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    provider: Arc<dyn ContentGenerationService>,
}

impl GenerationOrchestrator {
    pub fn new(provider: Arc<dyn ContentGenerationService>) -> Self {
        Self { provider }
    }

    /// Generates a summary for `document`.
    ///
    /// The document must be completed. Within one request the provider calls
    /// are strictly sequential: upload, generate, then best-effort delete.
    pub async fn generate_summary(
        &self,
        document: &Document,
        summary_type: SummaryType,
        language: &str,
    ) -> Result<GeneratedSummary, GenerationError> {
        if !document.is_completed() {
            return Err(GenerationError::DocumentNotReady);
        }

        let started = Instant::now();
        let handle = self
            .provider
            .upload_file(&document.file_path)
            .await
            .ok_or(GenerationError::UploadFailed)?;

        let content = match self
            .provider
            .generate_summary(&handle, &document.original_filename, summary_type, language)
            .await
        {
            Ok(content) => {
                self.cleanup(&handle).await;
                content
            }
            Err(e) => {
                error!(document_id = %document.id, error = %e, "summary generation failed");
                return Err(GenerationError::GenerationFailed(e.to_string()));
            }
        };

        Ok(GeneratedSummary {
            word_count: content.split_whitespace().count() as u32,
            processing_time_seconds: started.elapsed().as_secs() as u32,
            content,
        })
    }

    /// Generates quiz questions for `document`. An empty question set is a
    /// failure of its own kind so no quiz entity gets created from it.
    pub async fn generate_quiz(
        &self,
        document: &Document,
        question_count: u32,
        difficulty: Difficulty,
        question_type: QuestionType,
        language: &str,
    ) -> Result<Vec<Question>, GenerationError> {
        if !document.is_completed() {
            return Err(GenerationError::DocumentNotReady);
        }

        let handle = self
            .provider
            .upload_file(&document.file_path)
            .await
            .ok_or(GenerationError::UploadFailed)?;

        let questions = match self
            .provider
            .generate_quiz(
                &handle,
                &document.original_filename,
                question_count,
                difficulty,
                question_type,
                language,
            )
            .await
        {
            Ok(questions) => {
                self.cleanup(&handle).await;
                questions
            }
            Err(e) => {
                error!(document_id = %document.id, error = %e, "quiz generation failed");
                return Err(GenerationError::GenerationFailed(e.to_string()));
            }
        };

        if questions.is_empty() {
            warn!(document_id = %document.id, "provider produced an empty question set");
            return Err(GenerationError::EmptyGenerationResult);
        }

        Ok(questions)
    }

    /// Deletes the uploaded file. Failures are logged and swallowed; a leaked
    /// remote file must never block the primary response.
    async fn cleanup(&self, handle: &SourceHandle) {
        if !self.provider.delete_file(handle).await {
            warn!(
                reference = handle.reference(),
                "provider file cleanup failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessingStatus;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use uuid::Uuid;

    /// Scriptable provider double that records which calls were made.
    #[derive(Default)]
    struct FakeProvider {
        fail_upload: bool,
        fail_generation: bool,
        fail_delete: bool,
        questions: Vec<Question>,
        summary: String,
        upload_calls: AtomicU32,
        delete_called: AtomicBool,
    }

    #[async_trait]
    impl ContentGenerationService for FakeProvider {
        async fn upload_file(&self, _storage_path: &str) -> Option<SourceHandle> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload {
                None
            } else {
                Some(SourceHandle::Remote("files/test".to_string()))
            }
        }

        async fn generate_summary(
            &self,
            _handle: &SourceHandle,
            _file_name: &str,
            _summary_type: SummaryType,
            _language: &str,
        ) -> PortResult<String> {
            if self.fail_generation {
                Err(PortError::Unexpected("model unavailable".to_string()))
            } else {
                Ok(self.summary.clone())
            }
        }

        async fn generate_quiz(
            &self,
            _handle: &SourceHandle,
            _file_name: &str,
            _question_count: u32,
            _difficulty: Difficulty,
            _question_type: QuestionType,
            _language: &str,
        ) -> PortResult<Vec<Question>> {
            if self.fail_generation {
                Err(PortError::Unexpected("model unavailable".to_string()))
            } else {
                Ok(self.questions.clone())
            }
        }

        async fn delete_file(&self, _handle: &SourceHandle) -> bool {
            self.delete_called.store(true, Ordering::SeqCst);
            !self.fail_delete
        }
    }

    fn document(status: ProcessingStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            original_filename: "report.pdf".to_string(),
            file_path: "documents/report.pdf".to_string(),
            status,
        }
    }

    fn question(id: u32) -> Question {
        Question {
            id,
            question: format!("Question {}", id),
            kind: None,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: 0,
            explanation: Some("Because.".to_string()),
        }
    }

    #[tokio::test]
    async fn pending_document_is_rejected_before_any_provider_call() {
        let provider = Arc::new(FakeProvider::default());
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Pending);

        let err = orchestrator
            .generate_summary(&doc, SummaryType::Concise, "en")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::DocumentNotReady));
        assert_eq!(provider.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_upload_short_circuits_generation() {
        let provider = Arc::new(FakeProvider {
            fail_upload: true,
            ..FakeProvider::default()
        });
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Completed);

        let err = orchestrator
            .generate_quiz(&doc, 10, Difficulty::Easy, QuestionType::MultipleChoice, "en")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::UploadFailed));
        assert!(!provider.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn empty_question_set_is_its_own_failure_after_cleanup() {
        let provider = Arc::new(FakeProvider::default());
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Completed);

        let err = orchestrator
            .generate_quiz(&doc, 10, Difficulty::Easy, QuestionType::MultipleChoice, "en")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::EmptyGenerationResult));
        // Cleanup still ran even though the result was discarded.
        assert!(provider.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn provider_failure_wraps_message_and_skips_cleanup() {
        let provider = Arc::new(FakeProvider {
            fail_generation: true,
            ..FakeProvider::default()
        });
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Completed);

        let err = orchestrator
            .generate_summary(&doc, SummaryType::Detailed, "en")
            .await
            .unwrap_err();

        match err {
            GenerationError::GenerationFailed(msg) => assert!(msg.contains("model unavailable")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!provider.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cleanup_failure_does_not_fail_the_request() {
        let provider = Arc::new(FakeProvider {
            fail_delete: true,
            summary: "A short summary of the document.".to_string(),
            ..FakeProvider::default()
        });
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Completed);

        let summary = orchestrator
            .generate_summary(&doc, SummaryType::Concise, "en")
            .await
            .unwrap();

        assert_eq!(summary.word_count, 6);
        assert!(provider.delete_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn successful_quiz_generation_returns_questions_in_order() {
        let provider = Arc::new(FakeProvider {
            questions: vec![question(1), question(2), question(3), question(4), question(5)],
            ..FakeProvider::default()
        });
        let orchestrator = GenerationOrchestrator::new(provider.clone());
        let doc = document(ProcessingStatus::Completed);

        let questions = orchestrator
            .generate_quiz(&doc, 5, Difficulty::Medium, QuestionType::MultipleChoice, "id")
            .await
            .unwrap();

        let ids: Vec<u32> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(provider.delete_called.load(Ordering::SeqCst));
    }
}
