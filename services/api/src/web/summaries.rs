//! services/api/src/web/summaries.rs
//!
//! Axum handlers for summary generation and retrieval.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use docstudy_core::domain::{ProcessingStatus, Summary, SummaryType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{extract_user_id, generation_error_response, port_error_response};
use crate::web::state::AppState;

fn default_language() -> String {
    "id".to_string()
}

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// The request payload for generating a summary from a processed document.
#[derive(Deserialize, ToSchema)]
pub struct GenerateSummaryRequest {
    pub document_id: Uuid,
    #[schema(value_type = String, example = "concise")]
    pub summary_type: SummaryType,
    #[serde(default = "default_language")]
    #[schema(example = "id")]
    pub language: String,
}

/// A generated summary as returned to clients.
#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[schema(value_type = String)]
    pub summary_type: SummaryType,
    pub word_count: u32,
    pub language: String,
    #[schema(value_type = String)]
    pub status: ProcessingStatus,
    pub processing_time_seconds: Option<u32>,
    pub views_count: u32,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            id: summary.id,
            document_id: summary.document_id,
            user_id: summary.user_id,
            content: summary.content,
            summary_type: summary.summary_type,
            word_count: summary.word_count,
            language: summary.language,
            status: summary.status,
            processing_time_seconds: summary.processing_time_seconds,
            views_count: summary.views_count,
            last_viewed_at: summary.last_viewed_at,
            created_at: summary.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a new summary from a document.
#[utoipa::path(
    post,
    path = "/summaries",
    request_body = GenerateSummaryRequest,
    responses(
        (status = 201, description = "Summary generated successfully", body = SummaryResponse),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Document is not ready for generation"),
        (status = 500, description = "Generation failed")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn generate_summary_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateSummaryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let document = app_state
        .documents
        .find_document(payload.document_id, user_id)
        .await
        .map_err(port_error_response)?;

    let generated = app_state
        .generator
        .generate_summary(&document, payload.summary_type, &payload.language)
        .await
        .map_err(generation_error_response)?;

    let summary = Summary {
        id: Uuid::new_v4(),
        document_id: document.id,
        user_id,
        content: generated.content,
        summary_type: payload.summary_type,
        language: payload.language,
        word_count: generated.word_count,
        status: ProcessingStatus::Completed,
        processing_time_seconds: Some(generated.processing_time_seconds),
        views_count: 0,
        last_viewed_at: None,
        created_at: Utc::now(),
    };

    app_state
        .summaries
        .create_summary(&summary)
        .await
        .map_err(port_error_response)?;

    info!(
        user_id = %user_id,
        document_id = %document.id,
        summary_id = %summary.id,
        summary_type = summary.summary_type.as_str(),
        word_count = summary.word_count,
        "Generated summary for '{}'", document.original_filename
    );

    Ok((StatusCode::CREATED, Json(SummaryResponse::from(summary))))
}

/// Get a specific summary, counting the view.
#[utoipa::path(
    get,
    path = "/summaries/{id}",
    responses(
        (status = 200, description = "The summary", body = SummaryResponse),
        (status = 404, description = "Summary not found")
    ),
    params(
        ("id" = Uuid, Path, description = "Summary id"),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn get_summary_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = extract_user_id(&headers)?;

    let summary = app_state
        .summaries
        .record_view(id, user_id)
        .await
        .map_err(port_error_response)?;

    Ok(Json(SummaryResponse::from(summary)))
}
