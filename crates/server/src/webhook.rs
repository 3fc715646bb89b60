use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use kotoba_core::{InboundEvent, TranslationEngine};

#[derive(Clone)]
pub struct WebhookState {
    engine: Arc<TranslationEngine>,
}

/// The Slack Events API request body: either a URL-verification handshake
/// carrying a `challenge`, or an event callback wrapping the event object.
#[derive(Debug, Deserialize)]
pub struct EventCallback {
    pub challenge: Option<String>,
    pub event: Option<Value>,
}

pub fn router(engine: Arc<TranslationEngine>) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .with_state(WebhookState { engine })
}

/// Entry point for every Slack delivery. The handshake is echoed back
/// without touching the engine. Everything else is dispatched, and the
/// response is a generic success no matter what happened: surfacing errors
/// here would only make Slack re-deliver the same event.
pub async fn slack_events(
    State(state): State<WebhookState>,
    Json(body): Json<EventCallback>,
) -> Json<Value> {
    if let Some(challenge) = body.challenge {
        info!(event_name = "ingress.slack.url_verification", "answering challenge handshake");
        return Json(json!({ "challenge": challenge }));
    }

    let event = match body.event {
        Some(value) => match InboundEvent::from_value(value) {
            Ok(event) => Some(event),
            Err(parse_error) => {
                warn!(
                    event_name = "ingress.slack.event_unparseable",
                    error = %parse_error,
                    "event payload did not match any known shape"
                );
                None
            }
        },
        None => None,
    };

    match state.engine.handle_event(event).await {
        Ok(()) => {}
        Err(engine_error) if engine_error.is_duplicate() => {
            info!(
                event_name = "ingress.slack.duplicate_dropped",
                error = %engine_error,
                "duplicate delivery dropped"
            );
        }
        Err(engine_error) => {
            error!(
                event_name = "ingress.slack.event_failed",
                error = %engine_error,
                "event processing failed"
            );
        }
    }

    Json(json!({ "message": "success" }))
}
