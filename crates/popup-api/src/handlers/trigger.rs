//! Trigger ingress from the call-control dialplan.

use axum::extract::{Query, State};
use tracing::{info, warn};

use popup_core::error::AppError;
use popup_core::events::{CallIn, OutboundMessage};

use crate::dto::request::TriggerQuery;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/trigger?token=..&phone=..[&exten=..]
///
/// Forwards `{"type":"CALL_IN",...}` to every connected client.
pub async fn trigger(
    State(state): State<AppState>,
    Query(query): Query<TriggerQuery>,
) -> ApiResult<&'static str> {
    if query.token.as_deref() != Some(state.config.access.secret_token.as_str()) {
        warn!(token_present = query.token.is_some(), "Trigger rejected: invalid token");
        return Err(AppError::authentication("Unauthorized").into());
    }

    let phone = query.phone.unwrap_or_default();
    if phone.is_empty() {
        return Err(AppError::validation("Bad Request: 'phone' parameter is missing").into());
    }
    let exten = query.exten.unwrap_or_default();

    let message = OutboundMessage::from(CallIn::new(phone, exten));
    let delivered = state.hub.broadcast_message(&message).await?;

    if let OutboundMessage::CallIn(call) = &message {
        info!(phone = %call.phone(), delivered, "Trigger forwarded");
    }
    Ok("OK")
}
