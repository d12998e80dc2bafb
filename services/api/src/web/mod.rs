pub mod quizzes;
pub mod rest;
pub mod state;
pub mod summaries;

// Re-export the OpenAPI definition for the binaries that build the router
// and dump the spec.
pub use rest::ApiDoc;
