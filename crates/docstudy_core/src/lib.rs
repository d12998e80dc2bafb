pub mod attempts;
pub mod domain;
pub mod generation;
pub mod grading;
pub mod ports;
pub mod prompts;

pub use attempts::{AttemptError, AttemptLifecycleManager, ATTEMPT_DURATION};
pub use domain::{
    AttemptOutcome, AttemptStatus, Difficulty, Document, GradedAnswer, GradingResult,
    ProcessingStatus, Question, QuestionKind, QuestionType, Quiz, QuizAttempt, SubmittedAnswer,
    Summary, SummaryType,
};
pub use generation::{GeneratedSummary, GenerationError, GenerationOrchestrator};
pub use grading::{grade, GradingError, PASS_THRESHOLD};
pub use ports::{
    AttemptStore, ContentGenerationService, DocumentStore, PortError, PortResult, QuizStore,
    SourceHandle, SummaryStore,
};
