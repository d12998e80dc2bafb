//! crates/docstudy_core/src/attempts.rs
//!
//! The state machine governing a quiz attempt from creation through grading.
//! An attempt starts `in_progress`, and moves to `completed` at most once via
//! `submit`. Expiry timestamps are recorded but not enforced on submission:
//! an overdue attempt that is still in progress remains submittable.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{AttemptOutcome, AttemptStatus, Quiz, QuizAttempt, SubmittedAnswer};
use crate::grading::{grade, GradingError};
use crate::ports::{AttemptStore, PortError};

/// How long an attempt stays open after it is started.
pub const ATTEMPT_DURATION: Duration = Duration::hours(1);

#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The attempt does not exist or belongs to another user. The two cases
    /// are deliberately indistinguishable.
    #[error("Attempt not found")]
    NotFound,

    #[error("This attempt has already been completed")]
    InvalidStateTransition,

    #[error(transparent)]
    Grading(#[from] GradingError),

    #[error("Attempt store error: {0}")]
    Store(PortError),
}

impl From<PortError> for AttemptError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(_) => AttemptError::NotFound,
            other => AttemptError::Store(other),
        }
    }
}

/// Enforces the attempt state machine on top of an [`AttemptStore`].
#[derive(Clone)]
pub struct AttemptLifecycleManager {
    attempts: Arc<dyn AttemptStore>,
}

impl AttemptLifecycleManager {
    pub fn new(attempts: Arc<dyn AttemptStore>) -> Self {
        Self { attempts }
    }

    /// Starts a new attempt for `quiz`. There is no limit on concurrent or
    /// historical attempts per quiz and user.
    pub async fn start(&self, quiz: &Quiz, user_id: Uuid) -> Result<QuizAttempt, AttemptError> {
        let started_at = Utc::now();
        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            user_id,
            status: AttemptStatus::InProgress,
            started_at,
            expires_at: started_at + ATTEMPT_DURATION,
            outcome: None,
        };

        self.attempts.create_attempt(&attempt).await?;
        Ok(attempt)
    }

    /// Grades the submitted answers and completes the attempt.
    ///
    /// Valid only while the attempt is in progress. The transition is applied
    /// through the store's conditional update, so of two concurrent submits
    /// exactly one succeeds; the loser observes the completed state and gets
    /// `InvalidStateTransition`. `time_spent_seconds` is the client-reported
    /// value and is stored as-is.
    pub async fn submit(
        &self,
        quiz: &Quiz,
        attempt_id: Uuid,
        user_id: Uuid,
        answers: &[SubmittedAnswer],
        time_spent_seconds: u32,
    ) -> Result<QuizAttempt, AttemptError> {
        let attempt = self
            .attempts
            .find_attempt(attempt_id, quiz.id, user_id)
            .await?;

        if !attempt.is_in_progress() {
            return Err(AttemptError::InvalidStateTransition);
        }

        let result = grade(&quiz.questions, answers)?;

        let outcome = AttemptOutcome {
            score: result.score,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            incorrect_answers: result.incorrect_answers,
            unanswered: result.unanswered,
            time_spent_seconds,
            percentage: result.percentage,
            passed: result.passed,
            answers: result.detailed_answers,
            submitted_at: Utc::now(),
        };

        let applied = self
            .attempts
            .complete_attempt(attempt.id, user_id, &outcome)
            .await?;
        if !applied {
            // A concurrent submit got there first.
            return Err(AttemptError::InvalidStateTransition);
        }

        Ok(QuizAttempt {
            status: AttemptStatus::Completed,
            outcome: Some(outcome),
            ..attempt
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, Question, QuestionType};
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the persistence collaborator, mirroring the
    /// conditional-update semantics of the real adapter.
    #[derive(Default)]
    struct MemoryAttemptStore {
        attempts: Mutex<HashMap<Uuid, QuizAttempt>>,
    }

    impl MemoryAttemptStore {
        fn insert(&self, attempt: QuizAttempt) {
            self.attempts.lock().unwrap().insert(attempt.id, attempt);
        }

        fn get(&self, id: Uuid) -> Option<QuizAttempt> {
            self.attempts.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl AttemptStore for MemoryAttemptStore {
        async fn create_attempt(&self, attempt: &QuizAttempt) -> PortResult<()> {
            self.insert(attempt.clone());
            Ok(())
        }

        async fn find_attempt(
            &self,
            attempt_id: Uuid,
            quiz_id: Uuid,
            user_id: Uuid,
        ) -> PortResult<QuizAttempt> {
            self.attempts
                .lock()
                .unwrap()
                .get(&attempt_id)
                .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("attempt {}", attempt_id)))
        }

        async fn complete_attempt(
            &self,
            attempt_id: Uuid,
            user_id: Uuid,
            outcome: &AttemptOutcome,
        ) -> PortResult<bool> {
            let mut attempts = self.attempts.lock().unwrap();
            match attempts.get_mut(&attempt_id) {
                Some(a) if a.user_id == user_id && a.status == AttemptStatus::InProgress => {
                    a.status = AttemptStatus::Completed;
                    a.outcome = Some(outcome.clone());
                    Ok(true)
                }
                Some(_) => Ok(false),
                None => Err(PortError::NotFound(format!("attempt {}", attempt_id))),
            }
        }

        async fn attempts_for_quiz(
            &self,
            quiz_id: Uuid,
            user_id: Uuid,
        ) -> PortResult<Vec<QuizAttempt>> {
            let mut matching: Vec<QuizAttempt> = self
                .attempts
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.quiz_id == quiz_id && a.user_id == user_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            Ok(matching)
        }
    }

    fn quiz(question_count: usize) -> Quiz {
        let questions = (1..=question_count as u32)
            .map(|id| Question {
                id,
                question: format!("Question {}", id),
                kind: None,
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: 0,
                explanation: None,
            })
            .collect();
        Quiz {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            difficulty: Difficulty::Medium,
            question_count: question_count as u32,
            question_type: QuestionType::MultipleChoice,
            questions,
            created_at: Utc::now(),
        }
    }

    fn all_correct(question_count: u32) -> Vec<SubmittedAnswer> {
        (1..=question_count)
            .map(|question_id| SubmittedAnswer {
                question_id,
                answer_index: 0,
            })
            .collect()
    }

    fn manager() -> (AttemptLifecycleManager, Arc<MemoryAttemptStore>) {
        let store = Arc::new(MemoryAttemptStore::default());
        (AttemptLifecycleManager::new(store.clone()), store)
    }

    #[tokio::test]
    async fn start_creates_in_progress_attempt_with_one_hour_expiry() {
        let (manager, store) = manager();
        let quiz = quiz(5);
        let user_id = quiz.user_id;

        let attempt = manager.start(&quiz, user_id).await.unwrap();

        assert_eq!(attempt.status, AttemptStatus::InProgress);
        assert_eq!(attempt.expires_at - attempt.started_at, Duration::hours(1));
        assert!(attempt.outcome.is_none());
        assert!(store.get(attempt.id).is_some());
    }

    #[tokio::test]
    async fn multiple_attempts_per_quiz_are_allowed() {
        let (manager, _store) = manager();
        let quiz = quiz(5);
        let user_id = quiz.user_id;

        let first = manager.start(&quiz, user_id).await.unwrap();
        let second = manager.start(&quiz, user_id).await.unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn submit_grades_and_completes_atomically() {
        let (manager, store) = manager();
        let quiz = quiz(5);
        let user_id = quiz.user_id;
        let attempt = manager.start(&quiz, user_id).await.unwrap();

        let completed = manager
            .submit(&quiz, attempt.id, user_id, &all_correct(5), 240)
            .await
            .unwrap();

        assert_eq!(completed.status, AttemptStatus::Completed);
        let outcome = completed.outcome.unwrap();
        assert_eq!(outcome.correct_answers, 5);
        assert_eq!(outcome.percentage, 100.00);
        assert!(outcome.passed);
        assert_eq!(outcome.time_spent_seconds, 240);
        assert_eq!(outcome.answers.len(), 5);

        let stored = store.get(attempt.id).unwrap();
        assert_eq!(stored.status, AttemptStatus::Completed);
    }

    #[tokio::test]
    async fn second_submit_fails_and_preserves_first_result() {
        let (manager, store) = manager();
        let quiz = quiz(5);
        let user_id = quiz.user_id;
        let attempt = manager.start(&quiz, user_id).await.unwrap();

        manager
            .submit(&quiz, attempt.id, user_id, &all_correct(5), 60)
            .await
            .unwrap();

        let err = manager
            .submit(&quiz, attempt.id, user_id, &[], 90)
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::InvalidStateTransition));

        // The second call must not have touched the graded fields.
        let stored = store.get(attempt.id).unwrap();
        let outcome = stored.outcome.unwrap();
        assert_eq!(outcome.correct_answers, 5);
        assert_eq!(outcome.time_spent_seconds, 60);
    }

    #[tokio::test]
    async fn unknown_attempt_is_not_found() {
        let (manager, _store) = manager();
        let quiz = quiz(5);

        let err = manager
            .submit(&quiz, Uuid::new_v4(), quiz.user_id, &[], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::NotFound));
    }

    #[tokio::test]
    async fn foreign_attempt_is_indistinguishable_from_missing() {
        let (manager, _store) = manager();
        let quiz = quiz(5);
        let owner = quiz.user_id;
        let attempt = manager.start(&quiz, owner).await.unwrap();

        let err = manager
            .submit(&quiz, attempt.id, Uuid::new_v4(), &all_correct(5), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::NotFound));
    }

    #[tokio::test]
    async fn overdue_attempt_remains_submittable() {
        let (manager, store) = manager();
        let quiz = quiz(5);
        let user_id = quiz.user_id;

        let started_at = Utc::now() - Duration::hours(3);
        let overdue = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            user_id,
            status: AttemptStatus::InProgress,
            started_at,
            expires_at: started_at + ATTEMPT_DURATION,
            outcome: None,
        };
        store.insert(overdue.clone());

        let completed = manager
            .submit(&quiz, overdue.id, user_id, &all_correct(5), 3600)
            .await
            .unwrap();
        assert_eq!(completed.status, AttemptStatus::Completed);
    }
}
