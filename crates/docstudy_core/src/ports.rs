//! crates/docstudy_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or AI provider APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AttemptOutcome, Difficulty, Document, Question, QuestionType, Quiz, QuizAttempt, Summary,
    SummaryType,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
///
/// Owner-scoped lookups report a missing row and a row owned by someone else
/// identically as `NotFound`, so an error can never leak whether a resource
/// exists.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Source Handles
//=========================================================================================

/// An opaque token referencing an uploaded document within a provider's
/// namespace, used for generation and later cleanup.
///
/// The text-extraction variant carries the extracted text inside the handle
/// itself rather than in provider-instance state, so upload and generate may
/// land on different instances of a horizontally scaled deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHandle {
    /// A file held remotely by the provider, referenced by resource name.
    Remote(String),
    /// Locally extracted text travelling with its generated id.
    Inline { id: String, text: String },
}

impl SourceHandle {
    /// The provider-facing reference string, suitable for logging.
    pub fn reference(&self) -> &str {
        match self {
            SourceHandle::Remote(name) => name,
            SourceHandle::Inline { id, .. } => id,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The provider-agnostic content generation contract. Two interchangeable
/// implementations exist: a file-native provider that submits the raw file to
/// a remote multimodal model, and a text-extraction provider that extracts
/// text locally and sends it through a text-only prompt. The orchestrator is
/// fully agnostic to which one is active.
#[async_trait]
pub trait ContentGenerationService: Send + Sync {
    /// Uploads the file at `storage_path` for processing.
    ///
    /// Returns `None` on any failure (missing file, empty extraction,
    /// transient provider error) instead of raising, so the caller can
    /// distinguish "not available" from a hard generation fault.
    async fn upload_file(&self, storage_path: &str) -> Option<SourceHandle>;

    /// Generates a summary of the uploaded document.
    async fn generate_summary(
        &self,
        handle: &SourceHandle,
        file_name: &str,
        summary_type: SummaryType,
        language: &str,
    ) -> PortResult<String>;

    /// Generates quiz questions from the uploaded document. A structurally
    /// valid but empty response yields an empty vec, not an error.
    async fn generate_quiz(
        &self,
        handle: &SourceHandle,
        file_name: &str,
        question_count: u32,
        difficulty: Difficulty,
        question_type: QuestionType,
        language: &str,
    ) -> PortResult<Vec<Question>>;

    /// Best-effort cleanup of an uploaded file. Returns false on failure; a
    /// leaked remote file must never block the primary response.
    async fn delete_file(&self, handle: &SourceHandle) -> bool;
}

/// Owner-scoped document lookup. The core never queries documents outside
/// this shape.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document>;
}

/// Persistence for generated summaries.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn create_summary(&self, summary: &Summary) -> PortResult<()>;

    /// Fetches a summary scoped to its owner, incrementing its view counter
    /// and stamping `last_viewed_at` in the same operation.
    async fn record_view(&self, summary_id: Uuid, user_id: Uuid) -> PortResult<Summary>;
}

/// Persistence for generated quizzes.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn create_quiz(&self, quiz: &Quiz) -> PortResult<()>;

    async fn find_quiz(&self, quiz_id: Uuid, user_id: Uuid) -> PortResult<Quiz>;

    /// Deletes a quiz; attempts cascade with it.
    async fn delete_quiz(&self, quiz_id: Uuid, user_id: Uuid) -> PortResult<()>;
}

/// Persistence for quiz attempts.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn create_attempt(&self, attempt: &QuizAttempt) -> PortResult<()>;

    async fn find_attempt(
        &self,
        attempt_id: Uuid,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<QuizAttempt>;

    /// Applies the in_progress -> completed transition together with all
    /// graded fields as one conditional update. Returns `false` when the
    /// attempt was no longer in progress (a concurrent submit won the race),
    /// in which case nothing was written.
    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        outcome: &AttemptOutcome,
    ) -> PortResult<bool>;

    /// All attempts for a quiz, newest first.
    async fn attempts_for_quiz(&self, quiz_id: Uuid, user_id: Uuid)
        -> PortResult<Vec<QuizAttempt>>;
}
