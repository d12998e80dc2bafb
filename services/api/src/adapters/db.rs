//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the persistence ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.
//!
//! Every lookup is scoped by the owning user id; a row owned by someone else
//! is reported as `NotFound`, identical to a missing row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docstudy_core::domain::{
    AttemptOutcome, Document, GradedAnswer, Question, Quiz, QuizAttempt, Summary,
};
use docstudy_core::ports::{
    AttemptStore, DocumentStore, PortError, PortResult, QuizStore, SummaryStore,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the persistence ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn map_not_found(e: sqlx::Error, entity: &str, id: Uuid) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} {} not found", entity, id)),
        other => PortError::Unexpected(other.to_string()),
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    original_filename: String,
    file_path: String,
    status: String,
}

impl DocumentRecord {
    fn to_domain(self) -> PortResult<Document> {
        Ok(Document {
            id: self.id,
            user_id: self.user_id,
            original_filename: self.original_filename,
            file_path: self.file_path,
            status: self.status.parse().map_err(PortError::Unexpected)?,
        })
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    document_id: Uuid,
    user_id: Uuid,
    content: String,
    summary_type: String,
    language: String,
    word_count: i32,
    status: String,
    processing_time_seconds: Option<i32>,
    views_count: i32,
    last_viewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl SummaryRecord {
    fn to_domain(self) -> PortResult<Summary> {
        Ok(Summary {
            id: self.id,
            document_id: self.document_id,
            user_id: self.user_id,
            content: self.content,
            summary_type: self.summary_type.parse().map_err(PortError::Unexpected)?,
            language: self.language,
            word_count: self.word_count as u32,
            status: self.status.parse().map_err(PortError::Unexpected)?,
            processing_time_seconds: self.processing_time_seconds.map(|s| s as u32),
            views_count: self.views_count as u32,
            last_viewed_at: self.last_viewed_at,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QuizRecord {
    id: Uuid,
    document_id: Uuid,
    user_id: Uuid,
    difficulty: String,
    question_count: i32,
    question_type: String,
    questions: Json<Vec<Question>>,
    created_at: DateTime<Utc>,
}

impl QuizRecord {
    fn to_domain(self) -> PortResult<Quiz> {
        Ok(Quiz {
            id: self.id,
            document_id: self.document_id,
            user_id: self.user_id,
            difficulty: self.difficulty.parse().map_err(PortError::Unexpected)?,
            question_count: self.question_count as u32,
            question_type: self.question_type.parse().map_err(PortError::Unexpected)?,
            questions: self.questions.0,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AttemptRecord {
    id: Uuid,
    quiz_id: Uuid,
    user_id: Uuid,
    status: String,
    score: Option<f64>,
    total_questions: Option<i32>,
    correct_answers: Option<i32>,
    incorrect_answers: Option<i32>,
    unanswered: Option<i32>,
    time_spent_seconds: Option<i32>,
    percentage: Option<f64>,
    passed: Option<bool>,
    answers: Option<Json<Vec<GradedAnswer>>>,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// The graded fields, present only when all of them were written (which
    /// the completion update guarantees happens in one statement).
    fn outcome(&self) -> Option<AttemptOutcome> {
        Some(AttemptOutcome {
            score: self.score?,
            total_questions: self.total_questions? as u32,
            correct_answers: self.correct_answers? as u32,
            incorrect_answers: self.incorrect_answers? as u32,
            unanswered: self.unanswered? as u32,
            time_spent_seconds: self.time_spent_seconds? as u32,
            percentage: self.percentage?,
            passed: self.passed?,
            answers: self.answers.as_ref()?.0.clone(),
            submitted_at: self.submitted_at?,
        })
    }

    fn to_domain(self) -> PortResult<QuizAttempt> {
        let outcome = self.outcome();
        Ok(QuizAttempt {
            id: self.id,
            quiz_id: self.quiz_id,
            user_id: self.user_id,
            status: self.status.parse().map_err(PortError::Unexpected)?,
            started_at: self.started_at,
            expires_at: self.expires_at,
            outcome,
        })
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for DbAdapter {
    async fn find_document(&self, document_id: Uuid, user_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, user_id, original_filename, file_path, status \
             FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(document_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_not_found(e, "Document", document_id))?;

        record.to_domain()
    }
}

//=========================================================================================
// `SummaryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummaryStore for DbAdapter {
    async fn create_summary(&self, summary: &Summary) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO summaries \
             (id, document_id, user_id, content, summary_type, language, word_count, status, \
              processing_time_seconds, views_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(summary.id)
        .bind(summary.document_id)
        .bind(summary.user_id)
        .bind(&summary.content)
        .bind(summary.summary_type.as_str())
        .bind(&summary.language)
        .bind(summary.word_count as i32)
        .bind(summary.status.as_str())
        .bind(summary.processing_time_seconds.map(|s| s as i32))
        .bind(summary.views_count as i32)
        .bind(summary.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    async fn record_view(&self, summary_id: Uuid, user_id: Uuid) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(
            "UPDATE summaries \
             SET views_count = views_count + 1, last_viewed_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id, document_id, user_id, content, summary_type, language, word_count, \
                       status, processing_time_seconds, views_count, last_viewed_at, created_at",
        )
        .bind(summary_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_not_found(e, "Summary", summary_id))?;

        record.to_domain()
    }
}

//=========================================================================================
// `QuizStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuizStore for DbAdapter {
    async fn create_quiz(&self, quiz: &Quiz) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO quizzes \
             (id, document_id, user_id, difficulty, question_count, question_type, questions, \
              created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(quiz.id)
        .bind(quiz.document_id)
        .bind(quiz.user_id)
        .bind(quiz.difficulty.as_str())
        .bind(quiz.question_count as i32)
        .bind(quiz.question_type.as_str())
        .bind(Json(&quiz.questions))
        .bind(quiz.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    async fn find_quiz(&self, quiz_id: Uuid, user_id: Uuid) -> PortResult<Quiz> {
        let record = sqlx::query_as::<_, QuizRecord>(
            "SELECT id, document_id, user_id, difficulty, question_count, question_type, \
                    questions, created_at \
             FROM quizzes WHERE id = $1 AND user_id = $2",
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_not_found(e, "Quiz", quiz_id))?;

        record.to_domain()
    }

    async fn delete_quiz(&self, quiz_id: Uuid, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1 AND user_id = $2")
            .bind(quiz_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Quiz {} not found", quiz_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `AttemptStore` Trait Implementation
//=========================================================================================

const ATTEMPT_COLUMNS: &str = "id, quiz_id, user_id, status, score, total_questions, \
     correct_answers, incorrect_answers, unanswered, time_spent_seconds, percentage, passed, \
     answers, started_at, submitted_at, expires_at";

#[async_trait]
impl AttemptStore for DbAdapter {
    async fn create_attempt(&self, attempt: &QuizAttempt) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO quiz_attempts (id, quiz_id, user_id, status, started_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(attempt.id)
        .bind(attempt.quiz_id)
        .bind(attempt.user_id)
        .bind(attempt.status.as_str())
        .bind(attempt.started_at)
        .bind(attempt.expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    async fn find_attempt(
        &self,
        attempt_id: Uuid,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<QuizAttempt> {
        let record = sqlx::query_as::<_, AttemptRecord>(&format!(
            "SELECT {} FROM quiz_attempts WHERE id = $1 AND quiz_id = $2 AND user_id = $3",
            ATTEMPT_COLUMNS
        ))
        .bind(attempt_id)
        .bind(quiz_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_not_found(e, "Attempt", attempt_id))?;

        record.to_domain()
    }

    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        outcome: &AttemptOutcome,
    ) -> PortResult<bool> {
        // Conditional update: only an in-progress attempt may complete, so of
        // two concurrent submits exactly one writes the graded fields.
        let result = sqlx::query(
            "UPDATE quiz_attempts \
             SET status = 'completed', score = $3, total_questions = $4, correct_answers = $5, \
                 incorrect_answers = $6, unanswered = $7, time_spent_seconds = $8, \
                 percentage = $9, passed = $10, answers = $11, submitted_at = $12 \
             WHERE id = $1 AND user_id = $2 AND status = 'in_progress'",
        )
        .bind(attempt_id)
        .bind(user_id)
        .bind(outcome.score)
        .bind(outcome.total_questions as i32)
        .bind(outcome.correct_answers as i32)
        .bind(outcome.incorrect_answers as i32)
        .bind(outcome.unanswered as i32)
        .bind(outcome.time_spent_seconds as i32)
        .bind(outcome.percentage)
        .bind(outcome.passed)
        .bind(Json(&outcome.answers))
        .bind(outcome.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(result.rows_affected() == 1)
    }

    async fn attempts_for_quiz(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> PortResult<Vec<QuizAttempt>> {
        let records = sqlx::query_as::<_, AttemptRecord>(&format!(
            "SELECT {} FROM quiz_attempts WHERE quiz_id = $1 AND user_id = $2 \
             ORDER BY started_at DESC",
            ATTEMPT_COLUMNS
        ))
        .bind(quiz_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
