//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use docstudy_core::attempts::AttemptLifecycleManager;
use docstudy_core::generation::GenerationOrchestrator;
use docstudy_core::ports::{AttemptStore, DocumentStore, QuizStore, SummaryStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. The active content generation provider is chosen at startup and
/// hidden behind the orchestrator; handlers never see which one is running.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub documents: Arc<dyn DocumentStore>,
    pub summaries: Arc<dyn SummaryStore>,
    pub quizzes: Arc<dyn QuizStore>,
    pub attempt_store: Arc<dyn AttemptStore>,
    pub generator: GenerationOrchestrator,
    pub attempts: AttemptLifecycleManager,
}
