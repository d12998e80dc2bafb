//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST surface: the master OpenAPI definition, caller
//! identification, and the mapping from core errors onto HTTP responses.
//!
//! Owner-scoped lookups that miss always map to the same 404 body, whether
//! the resource is absent or belongs to someone else.

use axum::http::{HeaderMap, StatusCode};
use docstudy_core::attempts::AttemptError;
use docstudy_core::generation::GenerationError;
use docstudy_core::ports::PortError;
use tracing::{debug, error};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::web::quizzes;
use crate::web::summaries;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        summaries::generate_summary_handler,
        summaries::get_summary_handler,
        quizzes::generate_quiz_handler,
        quizzes::get_quiz_handler,
        quizzes::delete_quiz_handler,
        quizzes::start_attempt_handler,
        quizzes::submit_quiz_handler,
        quizzes::list_attempts_handler,
        quizzes::get_attempt_handler,
    ),
    components(
        schemas(
            summaries::GenerateSummaryRequest,
            summaries::SummaryResponse,
            quizzes::GenerateQuizRequest,
            quizzes::QuizResponse,
            quizzes::QuestionView,
            quizzes::StartAttemptResponse,
            quizzes::SubmitQuizRequest,
            quizzes::SubmittedAnswerPayload,
            quizzes::AttemptResponse,
            quizzes::GradedAnswerView,
            quizzes::SubmitQuizResponse,
        )
    ),
    tags(
        (name = "Document Study API", description = "API endpoints for document summaries, quizzes, and quiz attempts.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Caller Identification
//=========================================================================================

/// Pulls the calling user's id from the `x-user-id` header.
///
/// Authentication itself happens upstream; by the time a request reaches this
/// service the header carries a verified user id.
pub fn extract_user_id(headers: &HeaderMap) -> Result<Uuid, (StatusCode, String)> {
    let user_id_str = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "x-user-id header is required".to_string(),
            )
        })?;

    Uuid::parse_str(user_id_str).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid x-user-id format".to_string(),
        )
    })
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub(crate) fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(detail) => {
            debug!(detail = detail.as_str(), "lookup missed");
            (StatusCode::NOT_FOUND, "Resource not found".to_string())
        }
        PortError::Unexpected(detail) => {
            error!(detail = detail.as_str(), "unexpected port error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}

pub(crate) fn generation_error_response(err: GenerationError) -> (StatusCode, String) {
    match err {
        GenerationError::DocumentNotReady => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "The document must be fully processed before generating content".to_string(),
        ),
        GenerationError::UploadFailed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to upload document for processing".to_string(),
        ),
        // The underlying provider message stays in the logs; clients get a
        // generic body.
        GenerationError::GenerationFailed(detail) => {
            error!(detail = detail.as_str(), "content generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate content".to_string(),
            )
        }
        GenerationError::EmptyGenerationResult => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate quiz questions".to_string(),
        ),
    }
}

pub(crate) fn attempt_error_response(err: AttemptError) -> (StatusCode, String) {
    match err {
        AttemptError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        AttemptError::InvalidStateTransition => (
            StatusCode::BAD_REQUEST,
            "This attempt has already been completed".to_string(),
        ),
        AttemptError::Grading(e) => {
            error!(error = %e, "grading failed on a stored quiz");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
        AttemptError::Store(e) => port_error_response(e),
    }
}
