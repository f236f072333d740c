use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    api::middleware::{ApiError, ApiResult},
    api::AppState,
};

/// Push channel: the gateway posts signed payment events here.
///
/// Signature verification gates everything in live mode. Past that gate,
/// internal processing errors are logged and swallowed and the handler
/// still acknowledges receipt to keep the gateway from retrying.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let signature = headers
        .get("x-razorpay-signature")
        .and_then(|v| v.to_str().ok());

    if state.gateway.is_live() {
        let signature =
            signature.ok_or_else(|| ApiError::BadRequest("Missing signature".to_string()))?;

        if !state.gateway.verify_signature(&body, signature) {
            return Err(ApiError::BadRequest("Invalid signature".to_string()));
        }
    }

    match process_payment_event(&state, &body).await {
        Ok(()) => Ok(Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Webhook processing error: {}", e);
            Ok(Json(json!({ "status": "error_but_received" })))
        }
    }
}

async fn process_payment_event(state: &AppState, body: &[u8]) -> ApiResult<()> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let event = payload["event"].as_str().unwrap_or_default();

    if event == "payment_link.paid" {
        let link_id = payload["payload"]["payment_link"]["entity"]["id"]
            .as_str()
            .ok_or_else(|| {
                ApiError::BadRequest("event is missing the payment link id".to_string())
            })?;

        state.reconciler.confirm_paid(link_id).await?;
    } else {
        tracing::debug!("Ignoring gateway event '{}'", event);
    }

    Ok(())
}

/// Pull channel: the kiosk's "check payment" poll. Queries the gateway and
/// applies the same paid transition the webhook would.
pub async fn payment_status(
    State(state): State<AppState>,
    Path(link_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let status = state.reconciler.check_payment(&link_id).await?;

    Ok(Json(json!({
        "gateway_link_id": link_id,
        "status": status,
    })))
}
