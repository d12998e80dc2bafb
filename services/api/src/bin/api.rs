//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GeminiAdapter, OpenAiAdapter},
    config::{AiProvider, Config},
    error::ApiError,
    web::{quizzes, rest::ApiDoc, state::AppState, summaries},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use docstudy_core::attempts::AttemptLifecycleManager;
use docstudy_core::generation::GenerationOrchestrator;
use docstudy_core::ports::ContentGenerationService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Select and Initialize the Content Generation Provider ---
    let provider: Arc<dyn ContentGenerationService> = match config.ai_provider {
        AiProvider::Gemini => {
            let api_key = config.gemini_api_key.clone().ok_or_else(|| {
                ApiError::Internal(
                    "GEMINI_API_KEY is required when AI_PROVIDER=gemini".to_string(),
                )
            })?;
            info!(model = config.gemini_model.as_str(), "Using the Gemini provider");
            Arc::new(GeminiAdapter::new(
                api_key,
                config.gemini_model.clone(),
                config.storage_root.clone(),
            ))
        }
        AiProvider::OpenAi => {
            let api_key = config.openai_api_key.as_ref().ok_or_else(|| {
                ApiError::Internal(
                    "OPENAI_API_KEY is required when AI_PROVIDER=openai".to_string(),
                )
            })?;
            let openai_config = OpenAIConfig::new().with_api_key(api_key);
            let openai_client = Client::with_config(openai_config);
            info!(model = config.openai_model.as_str(), "Using the OpenAI provider");
            Arc::new(OpenAiAdapter::new(
                openai_client,
                config.openai_model.clone(),
                config.storage_root.clone(),
            ))
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        documents: db_adapter.clone(),
        summaries: db_adapter.clone(),
        quizzes: db_adapter.clone(),
        attempt_store: db_adapter.clone(),
        generator: GenerationOrchestrator::new(provider),
        attempts: AttemptLifecycleManager::new(db_adapter.clone()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/summaries", post(summaries::generate_summary_handler))
        .route("/summaries/{id}", get(summaries::get_summary_handler))
        .route("/quizzes", post(quizzes::generate_quiz_handler))
        .route(
            "/quizzes/{id}",
            get(quizzes::get_quiz_handler).delete(quizzes::delete_quiz_handler),
        )
        .route(
            "/quizzes/{id}/attempts",
            post(quizzes::start_attempt_handler).get(quizzes::list_attempts_handler),
        )
        .route(
            "/quizzes/{id}/attempts/{attempt_id}",
            get(quizzes::get_attempt_handler),
        )
        .route("/quizzes/{id}/submit", post(quizzes::submit_quiz_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
