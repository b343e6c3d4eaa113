//! HTTP endpoints
//!
//! REST surface, the Telegram webhook, and static audio serving.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use niyati_agent::Outbound;
use niyati_core::UserProfile;

use crate::state::AppState;
use crate::telegram::{TelegramSink, TelegramUpdate};
use crate::websocket::ws_handler;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/user/create", post(create_user))
        .route("/api/user/:user_id/history", get(user_history))
        .route("/webhook", post(telegram_webhook))
        .route("/ws/:user_id", get(ws_handler))
        .route("/audio/:file", get(serve_audio))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn liveness() -> &'static str {
    "Niyati is online"
}

/// Create user request
#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    name: String,
}

/// Create user response
#[derive(Debug, Serialize)]
struct CreateUserResponse {
    user_id: String,
    username: String,
    name: String,
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, StatusCode> {
    if request.username.trim().is_empty() || request.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state
        .store
        .create_user(&request.username, &request.name)
        .await
    {
        Ok(profile) => Ok(Json(CreateUserResponse {
            user_id: profile.user_id,
            username: request.username,
            name: profile.display_name,
        })),
        Err(e) => {
            tracing::error!(error = %e, "user creation failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: usize,
}

fn default_history_limit() -> usize {
    50
}

async fn user_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.store.get_recent(&user_id, query.limit).await {
        Ok(mut turns) => {
            // The store returns newest first; callers read a transcript.
            turns.reverse();
            Ok(Json(serde_json::json!({ "history": turns })))
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "history fetch failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Telegram pushes every update here. Always answer 200: a non-success
/// status makes the Bot API redeliver the same update.
async fn telegram_webhook(
    State(state): State<AppState>,
    Json(update): Json<TelegramUpdate>,
) -> Json<serde_json::Value> {
    let Some(message) = update.message else {
        return Json(serde_json::json!({ "status": "ok, no text" }));
    };
    let (Some(from), Some(text)) = (message.from, message.text) else {
        return Json(serde_json::json!({ "status": "ok, no text" }));
    };
    if text.trim().is_empty() {
        return Json(serde_json::json!({ "status": "ok, no text" }));
    }

    let user_id = from.id.to_string();

    let (session, sink) = match state.sessions.get(&user_id) {
        Some(pair) => pair,
        None => {
            let profile = match state
                .store
                .load_profile(&user_id, Some(&from.first_name))
                .await
            {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %e,
                        "profile load failed, starting with a fresh one"
                    );
                    UserProfile::new(&user_id, &from.first_name)
                }
            };

            let sink: Arc<dyn Outbound> = Arc::new(TelegramSink::new(
                state.gateway.clone(),
                message.chat.id,
                state.settings.telegram.public_base_url(),
            ));
            match state.sessions.connect(profile, sink.clone()).await {
                Ok(session) => (session, sink),
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "session setup failed");
                    return Json(serde_json::json!({ "status": "error" }));
                }
            }
        }
    };

    if let Err(e) = state
        .orchestrator
        .handle_turn(&session, sink.as_ref(), &text)
        .await
    {
        tracing::error!(user_id = %user_id, error = %e, "webhook turn failed");
    }

    Json(serde_json::json!({ "status": "ok" }))
}

async fn serve_audio(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    // Cache files are flat hex digests; nothing nested is ours to serve.
    if file.contains(['/', '\\']) || file.contains("..") {
        return Err(StatusCode::BAD_REQUEST);
    }

    let path = std::path::Path::new(&state.settings.storage.audio_dir).join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes)),
        Err(_) => Err(StatusCode::NOT_FOUND),
    }
}
