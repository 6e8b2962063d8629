//! Push endpoint for registration events.
//!
//! The push subscription redelivers anything that is not 2xx, so every
//! outcome that must not repeat is acknowledged: undecodable events, provider
//! rejections, and a failed write after the email already went out. Only a
//! transport failure before delivery is answered with an error.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use verimail_common::error::AppError;
use verimail_decoders::{PushRequest, decode_envelope};
use verimail_engine::{ProcessOutcome, process_registration};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(handle_push))
}

/// POST / — Send the verification email for one registration event.
async fn handle_push(
    State(state): State<AppState>,
    request: Result<Json<PushRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Discarding malformed push body");
            return Ok(StatusCode::NO_CONTENT);
        }
    };

    let event = match decode_envelope(&request.message) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                message_id = request.message.message_id.as_deref().unwrap_or("-"),
                error = %e,
                "Discarding undecodable event"
            );
            return Ok(StatusCode::NO_CONTENT);
        }
    };

    match process_registration(
        &state.config,
        state.sender.as_ref(),
        state.store.as_ref(),
        &event,
    )
    .await
    {
        Ok(ProcessOutcome::Recorded(_)) => {}
        Ok(ProcessOutcome::EmailRejected { status, .. }) => {
            tracing::debug!(uuid = %event.uuid, status, "Event handled without recording");
        }
        // Only the record step touches the database, so the email is out.
        Err(AppError::Database(_)) => {}
        Err(e) => return Err(e),
    }

    Ok(StatusCode::NO_CONTENT)
}
