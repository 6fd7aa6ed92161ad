//! The HTTP boundary: Telegram delivers updates here.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use teloxide::types::Update;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    bot::Bot,
    http_err::{ApiError, ApiResponse},
    server::AppState,
};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Serializes update handling. Only one update is processed at a time.
#[derive(Clone, Default)]
pub struct UpdateGate(Arc<Mutex<()>>);

/// The secret Telegram must echo back in [`SECRET_HEADER`], if any.
#[derive(Clone, Default)]
pub struct WebhookSecret(pub Option<Arc<str>>);

impl WebhookSecret {
    fn accepts(&self, headers: &HeaderMap) -> bool {
        match &self.0 {
            None => true,
            Some(expected) => headers
                .get(SECRET_HEADER)
                .and_then(|value| value.to_str().ok())
                .map_or(false, |given| given == &**expected),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_update))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn receive_update(
    State(bot): State<Arc<Bot>>,
    State(gate): State<UpdateGate>,
    State(secret): State<WebhookSecret>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> ApiResponse<StatusCode> {
    if !secret.accepts(&headers) {
        warn!(update_id = ?update.id, "Rejected update with a bad secret.");

        return Err(ApiError::Unauthorized);
    }

    let _guard = gate.0.lock().await;
    debug!(update_id = ?update.id, "Handling update.");
    bot.handle_update(update).await;

    Ok(StatusCode::OK)
}
