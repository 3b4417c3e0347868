//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads the configuration, builds the chat store and the AI
//! client, and serves the router from [`create_router`]. Tests build the same
//! router around their own [`AppState`].

// region: --- Imports
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::FromRef;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, Response};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use lib_ai::{AiClient, HuggingFaceClient};
use lib_core::{AppError, ChatStore, Config};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn, Span};

use crate::handlers::{self, ai};
use crate::middleware::{log_requests, stamp_req, RequestStamp, REQUEST_ID_HEADER};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub store: ChatStore,
    pub ai: Arc<dyn AiClient>,
    pub config: Config,
}

impl FromRef<AppState> for ChatStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AiClient> {
    fn from_ref(state: &AppState) -> Self {
        state.ai.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the state the server runs with: a (possibly seeded) store and the
/// Hugging Face client.
///
/// # Errors
///
/// Fails if the HTTP client for the inference service cannot be built.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store = if config.seed_sample_data {
        info!("[STORE] Seeding sample users, rooms and messages");
        ChatStore::with_sample_data(config.store_config())
    } else {
        ChatStore::new(config.store_config())
    };

    // Dropping a subscription leaves the listener registered.
    let _events = store.subscribe(|event| debug!("[STORE] {:?}", event));

    if config.huggingface_api_key.is_empty() {
        warn!("[HF] HUGGINGFACE_API_KEY is not set, AI endpoints will serve fallbacks");
    }
    let client = HuggingFaceClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build AI client: {}", e))?;

    Ok(AppState {
        store,
        ai: Arc::new(client),
        config,
    })
}
// endregion: --- AppState

// region: --- Server Setup
fn init_tracing() -> anyhow::Result<String> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(&log_level),
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    Ok(log_level)
}

/// Initialize and start the HTTP server
///
/// # Returns
///
/// Returns `Ok(())` when the server shuts down, or an error if initialization fails.
///
/// # Errors
///
/// This function will return an error if:
/// - The tracing subscriber cannot be installed
/// - Configuration loading or validation fails
/// - The AI client cannot be built
/// - Server binding fails
pub async fn start_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = init_tracing()?;
    info!(" AI CHAT BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    info!("Inference API: {}", config.huggingface_api_url);

    let bind_address = config.bind_address.clone();
    let state = build_state(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(" SERVER READY: http://{}", bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    error!("[PANIC] Handler panicked: {}", detail);
    AppError::Internal(detail).into_response()
}

/// Create the main application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route(
            "/api/messages",
            get(handlers::messages::list_messages)
                .post(handlers::messages::send_message)
                .put(handlers::messages::edit_message)
                .delete(handlers::messages::delete_message),
        )
        .route("/api/messages/search", get(handlers::messages::search_messages))
        .route(
            "/api/rooms",
            get(handlers::rooms::list_rooms)
                .post(handlers::rooms::create_room)
                .put(handlers::rooms::update_room)
                .patch(handlers::rooms::room_action),
        )
        .route("/api/rooms/{room_id}/stats", get(handlers::rooms::room_stats))
        .route(
            "/api/users",
            get(handlers::users::get_users)
                .post(handlers::users::register)
                .put(handlers::users::update_user)
                .patch(handlers::users::login)
                .delete(handlers::users::user_action),
        )
        .route("/api/typing", get(handlers::typing::get_typing).post(handlers::typing::set_typing))
        .route("/api/ai/chat", get(ai::chat::get_status).post(ai::chat::post_chat))
        .route("/api/ai/models", get(ai::models::list_models))
        .route("/api/ai/analyze", post(ai::analyze::analyze).put(ai::analyze::batch_analyze))
        .route("/api/ai/suggest", get(ai::suggest::get_smart_replies).post(ai::suggest::suggest))
        .route(
            "/api/ai/translate",
            get(ai::translate::languages)
                .post(ai::translate::translate)
                .put(ai::translate::batch_translate),
        )
        .route("/health", get(handlers::health))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            AppError::NotFound("Route not found".to_string())
        })
        .with_state(state)
        // Outermost first. The stamp has to be set before the trace span is made.
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum::middleware::from_fn(stamp_req))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .extensions()
                                .get::<RequestStamp>()
                                .map(|s| s.id.clone())
                                .unwrap_or_else(|| "unknown".to_string());
                            tracing::info_span!(
                                "http_request",
                                request_id = %request_id,
                                method = %request.method(),
                                uri = %request.uri(),
                            )
                        })
                        .on_request(|_request: &Request<Body>, _span: &Span| {})
                        .on_response(|_response: &Response<Body>, _latency: Duration, _span: &Span| {})
                        .on_failure(|failure: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                            error!(
                                latency_ms = latency.as_millis(),
                                "[HTTP FAILURE] Error: {}", failure
                            );
                        }),
                )
                .layer(axum::middleware::from_fn(log_requests))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

/// Log server information
fn log_server_info() {
    info!(" MESSAGES:");
    info!("   • GET|POST|PUT|DELETE /api/messages");
    info!("   • GET  /api/messages/search?q={{text}}&roomId={{room}}");
    info!(" ROOMS:");
    info!("   • GET|POST|PUT|PATCH /api/rooms");
    info!("   • GET  /api/rooms/{{roomId}}/stats");
    info!(" USERS:");
    info!("   • GET|POST|PUT|PATCH|DELETE /api/users");
    info!(" TYPING:");
    info!("   • GET|POST /api/typing");
    info!(" AI:");
    info!("   • GET|POST /api/ai/chat");
    info!("   • GET  /api/ai/models");
    info!("   • POST|PUT /api/ai/analyze");
    info!("   • GET|POST /api/ai/suggest");
    info!("   • GET|POST|PUT /api/ai/translate");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup

// region:    --- Tests
#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{call, test_app, ScriptedAi};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_and_fallback() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (health, body) = call(&app, "GET", "/health", None).await;
        let (missing, error) = call(&app, "GET", "/api/nothing-here", None).await;

        // Assert
        assert_eq!(health, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(missing, StatusCode::NOT_FOUND);
        assert_eq!(error["error"], "Route not found");
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "trace-me")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.headers()["x-request-id"], "trace-me");
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/messages")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "PATCH")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.headers()["access-control-allow-origin"], "http://localhost:3000");
    }
}
// endregion: --- Tests
