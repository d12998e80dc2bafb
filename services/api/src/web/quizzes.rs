//! services/api/src/web/quizzes.rs
//!
//! Axum handlers for quiz generation, the attempt lifecycle, and attempt
//! history. Quiz reads never include the answer key; graded answers only
//! appear on submitted attempts.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use docstudy_core::domain::{
    AttemptStatus, Difficulty, GradedAnswer, Question, QuestionKind, QuestionType, Quiz,
    QuizAttempt, SubmittedAnswer,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{
    attempt_error_response, extract_user_id, generation_error_response, port_error_response,
};
use crate::web::state::AppState;

const MIN_QUESTION_COUNT: u32 = 5;
const MAX_QUESTION_COUNT: u32 = 50;

fn default_language() -> String {
    "id".to_string()
}

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// The request payload for generating a quiz from a processed document.
#[derive(Deserialize, ToSchema)]
pub struct GenerateQuizRequest {
    pub document_id: Uuid,
    #[schema(minimum = 5, maximum = 50, example = 10)]
    pub question_count: u32,
    #[schema(value_type = String, example = "medium")]
    pub difficulty: Difficulty,
    #[schema(value_type = String, example = "multiple_choice")]
    pub question_type: QuestionType,
    #[serde(default = "default_language")]
    #[schema(example = "id")]
    pub language: String,
}

/// A question as shown to a quiz taker: no correct answer, no explanation.
#[derive(Serialize, ToSchema)]
pub struct QuestionView {
    pub id: u32,
    pub question: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub kind: Option<QuestionKind>,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            question: question.question.clone(),
            kind: question.kind,
            options: question.options.clone(),
        }
    }
}

/// A quiz as returned to clients.
#[derive(Serialize, ToSchema)]
pub struct QuizResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub difficulty: Difficulty,
    pub question_count: u32,
    #[schema(value_type = String)]
    pub question_type: QuestionType,
    pub questions: Vec<QuestionView>,
    pub created_at: DateTime<Utc>,
}

impl From<&Quiz> for QuizResponse {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            document_id: quiz.document_id,
            user_id: quiz.user_id,
            difficulty: quiz.difficulty,
            question_count: quiz.question_count,
            question_type: quiz.question_type,
            questions: quiz.questions.iter().map(QuestionView::from).collect(),
            created_at: quiz.created_at,
        }
    }
}

/// The response payload sent after starting an attempt.
#[derive(Serialize, ToSchema)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One submitted answer.
#[derive(Deserialize, ToSchema)]
pub struct SubmittedAnswerPayload {
    pub question_id: u32,
    pub answer_index: u32,
}

/// The request payload for submitting an attempt's answers.
#[derive(Deserialize, ToSchema)]
pub struct SubmitQuizRequest {
    pub attempt_id: Uuid,
    pub answers: Vec<SubmittedAnswerPayload>,
    pub time_spent_seconds: u32,
}

/// An attempt with its scoring fields; all of them are null while the
/// attempt is still in progress.
#[derive(Serialize, ToSchema)]
pub struct AttemptResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub status: AttemptStatus,
    pub score: Option<f64>,
    pub total_questions: Option<u32>,
    pub correct_answers: Option<u32>,
    pub incorrect_answers: Option<u32>,
    pub unanswered: Option<u32>,
    pub time_spent_seconds: Option<u32>,
    pub percentage: Option<f64>,
    pub passed: Option<bool>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl From<&QuizAttempt> for AttemptResponse {
    fn from(attempt: &QuizAttempt) -> Self {
        let outcome = attempt.outcome.as_ref();
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            user_id: attempt.user_id,
            status: attempt.status,
            score: outcome.map(|o| o.score),
            total_questions: outcome.map(|o| o.total_questions),
            correct_answers: outcome.map(|o| o.correct_answers),
            incorrect_answers: outcome.map(|o| o.incorrect_answers),
            unanswered: outcome.map(|o| o.unanswered),
            time_spent_seconds: outcome.map(|o| o.time_spent_seconds),
            percentage: outcome.map(|o| o.percentage),
            passed: outcome.map(|o| o.passed),
            started_at: attempt.started_at,
            submitted_at: outcome.map(|o| o.submitted_at),
            expires_at: attempt.expires_at,
        }
    }
}

/// One graded answer, including the snapshotted question and answer key.
#[derive(Serialize, ToSchema)]
pub struct GradedAnswerView {
    pub question_id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: Option<u32>,
    pub correct_answer: u32,
    pub is_correct: bool,
    pub explanation: String,
}

impl From<&GradedAnswer> for GradedAnswerView {
    fn from(answer: &GradedAnswer) -> Self {
        Self {
            question_id: answer.question_id,
            question: answer.question.clone(),
            options: answer.options.clone(),
            user_answer: answer.user_answer,
            correct_answer: answer.correct_answer,
            is_correct: answer.is_correct,
            explanation: answer.explanation.clone(),
        }
    }
}

/// A graded attempt together with its per-question results.
#[derive(Serialize, ToSchema)]
pub struct SubmitQuizResponse {
    pub quiz_attempt: AttemptResponse,
    pub answers: Vec<GradedAnswerView>,
}

impl From<&QuizAttempt> for SubmitQuizResponse {
    fn from(attempt: &QuizAttempt) -> Self {
        let answers = attempt
            .outcome
            .as_ref()
            .map(|o| o.answers.iter().map(GradedAnswerView::from).collect())
            .unwrap_or_default();
        Self {
            quiz_attempt: AttemptResponse::from(attempt),
            answers,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a new quiz from a document.
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body = GenerateQuizRequest,
    responses(
        (status = 201, description = "Quiz generated successfully", body = QuizResponse),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Invalid question count or document not ready"),
        (status = 500, description = "Generation failed")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn generate_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&payload.question_count) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "Question count must be between {} and {}",
                MIN_QUESTION_COUNT, MAX_QUESTION_COUNT
            ),
        ));
    }

    let document = app_state
        .documents
        .find_document(payload.document_id, user_id)
        .await
        .map_err(port_error_response)?;

    let questions = app_state
        .generator
        .generate_quiz(
            &document,
            payload.question_count,
            payload.difficulty,
            payload.question_type,
            &payload.language,
        )
        .await
        .map_err(generation_error_response)?;

    let quiz = Quiz {
        id: Uuid::new_v4(),
        document_id: document.id,
        user_id,
        difficulty: payload.difficulty,
        question_count: payload.question_count,
        question_type: payload.question_type,
        questions,
        created_at: Utc::now(),
    };

    app_state
        .quizzes
        .create_quiz(&quiz)
        .await
        .map_err(port_error_response)?;

    info!(
        user_id = %user_id,
        document_id = %document.id,
        quiz_id = %quiz.id,
        difficulty = quiz.difficulty.as_str(),
        question_count = quiz.question_count,
        "Generated {} quiz for '{}'", quiz.difficulty.as_str(), document.original_filename
    );

    Ok((StatusCode::CREATED, Json(QuizResponse::from(&quiz))))
}

/// Get a specific quiz, without its answer key.
#[utoipa::path(
    get,
    path = "/quizzes/{id}",
    responses(
        (status = 200, description = "The quiz", body = QuizResponse),
        (status = 404, description = "Quiz not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let quiz = app_state
        .quizzes
        .find_quiz(id, user_id)
        .await
        .map_err(port_error_response)?;

    Ok(Json(QuizResponse::from(&quiz)))
}

/// Delete a quiz; its attempts cascade with it.
#[utoipa::path(
    delete,
    path = "/quizzes/{id}",
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Quiz not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn delete_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    app_state
        .quizzes
        .delete_quiz(id, user_id)
        .await
        .map_err(port_error_response)?;

    info!(user_id = %user_id, quiz_id = %id, "Deleted quiz");

    Ok(StatusCode::NO_CONTENT)
}

/// Start a new attempt at a quiz.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/attempts",
    responses(
        (status = 201, description = "Attempt started", body = StartAttemptResponse),
        (status = 404, description = "Quiz not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn start_attempt_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let quiz = app_state
        .quizzes
        .find_quiz(id, user_id)
        .await
        .map_err(port_error_response)?;

    let attempt = app_state
        .attempts
        .start(&quiz, user_id)
        .await
        .map_err(attempt_error_response)?;

    info!(
        user_id = %user_id,
        quiz_id = %quiz.id,
        attempt_id = %attempt.id,
        difficulty = quiz.difficulty.as_str(),
        "Started quiz attempt"
    );

    Ok((
        StatusCode::CREATED,
        Json(StartAttemptResponse {
            attempt_id: attempt.id,
            quiz_id: quiz.id,
            started_at: attempt.started_at,
            expires_at: attempt.expires_at,
        }),
    ))
}

/// Submit answers for an attempt and get the graded result.
#[utoipa::path(
    post,
    path = "/quizzes/{id}/submit",
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, description = "Graded attempt", body = SubmitQuizResponse),
        (status = 400, description = "Attempt already completed"),
        (status = 404, description = "Quiz or attempt not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn submit_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let quiz = app_state
        .quizzes
        .find_quiz(id, user_id)
        .await
        .map_err(port_error_response)?;

    let answers: Vec<SubmittedAnswer> = payload
        .answers
        .iter()
        .map(|a| SubmittedAnswer {
            question_id: a.question_id,
            answer_index: a.answer_index,
        })
        .collect();

    let attempt = app_state
        .attempts
        .submit(
            &quiz,
            payload.attempt_id,
            user_id,
            &answers,
            payload.time_spent_seconds,
        )
        .await
        .map_err(attempt_error_response)?;

    if let Some(outcome) = &attempt.outcome {
        info!(
            user_id = %user_id,
            quiz_id = %quiz.id,
            attempt_id = %attempt.id,
            score = outcome.score,
            percentage = outcome.percentage,
            "Completed quiz attempt"
        );
    }

    Ok(Json(SubmitQuizResponse::from(&attempt)))
}

/// Get all attempts for a quiz, newest first.
#[utoipa::path(
    get,
    path = "/quizzes/{id}/attempts",
    responses(
        (status = 200, description = "Attempt history", body = [AttemptResponse]),
        (status = 404, description = "Quiz not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn list_attempts_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    // Scope through the quiz first so a foreign quiz id reads as missing.
    let quiz = app_state
        .quizzes
        .find_quiz(id, user_id)
        .await
        .map_err(port_error_response)?;

    let attempts = app_state
        .attempt_store
        .attempts_for_quiz(quiz.id, user_id)
        .await
        .map_err(port_error_response)?;

    let responses: Vec<AttemptResponse> = attempts.iter().map(AttemptResponse::from).collect();
    Ok(Json(responses))
}

/// Get a single attempt with its graded answers.
#[utoipa::path(
    get,
    path = "/quizzes/{id}/attempts/{attempt_id}",
    responses(
        (status = 200, description = "The attempt", body = SubmitQuizResponse),
        (status = 404, description = "Quiz or attempt not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Quiz id"),
        ("attempt_id" = Uuid, Path, description = "Attempt id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_attempt_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, attempt_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let attempt = app_state
        .attempt_store
        .find_attempt(attempt_id, id, user_id)
        .await
        .map_err(port_error_response)?;

    Ok(Json(SubmitQuizResponse::from(&attempt)))
}
