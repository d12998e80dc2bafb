//! crates/docstudy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or web framework. The value
//! objects that cross the provider boundary (`Question`, `GradedAnswer`)
//! derive serde so the JSON contract with the AI providers and the JSONB
//! persistence columns stays in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Status and Type Enums
//=========================================================================================

/// Processing status shared by documents and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProcessingStatus::Pending),
            "processing" => Ok(ProcessingStatus::Processing),
            "completed" => Ok(ProcessingStatus::Completed),
            "failed" => Ok(ProcessingStatus::Failed),
            other => Err(format!("unknown processing status '{}'", other)),
        }
    }
}

/// The shape a generated summary takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Concise,
    Detailed,
    BulletPoints,
    Abstract,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Concise => "concise",
            SummaryType::Detailed => "detailed",
            SummaryType::BulletPoints => "bullet_points",
            SummaryType::Abstract => "abstract",
        }
    }
}

impl std::str::FromStr for SummaryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concise" => Ok(SummaryType::Concise),
            "detailed" => Ok(SummaryType::Detailed),
            "bullet_points" => Ok(SummaryType::BulletPoints),
            "abstract" => Ok(SummaryType::Abstract),
            other => Err(format!("unknown summary type '{}'", other)),
        }
    }
}

/// Cognitive difficulty of a generated quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// The question format requested for a quiz as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Mixed,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Mixed => "mixed",
        }
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "true_false" => Ok(QuestionType::TrueFalse),
            "mixed" => Ok(QuestionType::Mixed),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// Per-question format tag, present only on questions of a mixed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
}

/// Lifecycle status of a quiz attempt. `Expired` is reserved: nothing
/// transitions into it automatically, an overdue attempt stays submittable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
    Expired,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Completed => "completed",
            AttemptStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(AttemptStatus::InProgress),
            "completed" => Ok(AttemptStatus::Completed),
            "expired" => Ok(AttemptStatus::Expired),
            other => Err(format!("unknown attempt status '{}'", other)),
        }
    }
}

//=========================================================================================
// Entities
//=========================================================================================

/// A document uploaded and processed by the (external) document service.
/// Only `completed` documents may be used for generation.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: String,
    pub file_path: String,
    pub status: ProcessingStatus,
}

impl Document {
    pub fn is_completed(&self) -> bool {
        self.status == ProcessingStatus::Completed
    }
}

/// A generated summary. Content is immutable once created; only the view
/// counters mutate afterwards.
#[derive(Debug, Clone)]
pub struct Summary {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub summary_type: SummaryType,
    pub language: String,
    pub word_count: u32,
    pub status: ProcessingStatus,
    pub processing_time_seconds: Option<u32>,
    pub views_count: u32,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A single quiz question as produced by a provider. Questions keep their
/// 1-based sequence ids and are never reordered after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    /// Format tag disambiguating questions inside a mixed quiz.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<QuestionKind>,
    pub options: Vec<String>,
    pub correct_answer: u32,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A generated quiz. Immutable after creation; deletion cascades to attempts.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub difficulty: Difficulty,
    pub question_count: u32,
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

/// One answer as submitted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: u32,
    pub answer_index: u32,
}

/// The graded outcome of one question, snapshotting the question text and
/// answer key so later quiz changes can never rewrite historical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: Option<u32>,
    pub correct_answer: u32,
    pub is_correct: bool,
    pub explanation: String,
}

/// The result of grading one answer set against one quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingResult {
    pub score: f64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub unanswered: u32,
    pub percentage: f64,
    pub passed: bool,
    pub detailed_answers: Vec<GradedAnswer>,
}

/// The graded fields of a completed attempt. Held behind an `Option` on
/// `QuizAttempt` so they can only ever be set together, exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub score: f64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub unanswered: u32,
    pub time_spent_seconds: u32,
    pub percentage: f64,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
    pub submitted_at: DateTime<Utc>,
}

/// One user's timed effort to answer a quiz's questions.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub outcome: Option<AttemptOutcome>,
}

impl QuizAttempt {
    pub fn is_in_progress(&self) -> bool {
        self.status == AttemptStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }
}
