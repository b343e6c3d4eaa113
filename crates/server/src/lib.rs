//! Niyati server
//!
//! HTTP, WebSocket and Telegram webhook endpoints for the chat agent.

pub mod http;
pub mod session;
pub mod state;
pub mod telegram;
pub mod websocket;

pub use http::create_router;
pub use session::SessionManager;
pub use state::AppState;
pub use telegram::{TelegramGateway, TelegramSink, TelegramUpdate};
pub use websocket::WsSink;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Gateway(_) => axum::http::StatusCode::BAD_GATEWAY,
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let status: axum::http::StatusCode =
            ServerError::NotFound("user".to_string()).into();
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);

        let status: axum::http::StatusCode =
            ServerError::Gateway("telegram 502".to_string()).into();
        assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    }
}
