use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    api::middleware::ApiResult,
    api::AppState,
    models::{JobStatus, MachineState, MachineStatusResponse},
};

/// Coarse machine state for the kiosk display, derived from the most
/// recent job. Polled every few seconds, so it stays a single cheap read.
pub async fn machine_status(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let latest = state.db.latest_job().await?;

    let (text, machine_state) = match latest {
        Some(job) => match job.status {
            JobStatus::Printing => (format!("Printing job #{}", job.id), MachineState::Printing),
            JobStatus::Paid | JobStatus::Processing => {
                ("Processing job...".to_string(), MachineState::Printing)
            }
            JobStatus::PaymentPending => {
                ("Waiting for payment".to_string(), MachineState::Uploading)
            }
            JobStatus::Uploaded => ("File uploaded, configuring...".to_string(), MachineState::Uploading),
            _ => ("ready".to_string(), MachineState::Idle),
        },
        None => ("ready".to_string(), MachineState::Idle),
    };

    Ok(Json(MachineStatusResponse {
        status: text,
        state: machine_state,
        is_online: true,
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut status = "ok";
    let mut components = serde_json::Map::new();

    match state.db.ping().await {
        Ok(()) => {
            components.insert("database".to_string(), json!("up"));
        }
        Err(e) => {
            status = "degraded";
            components.insert("database".to_string(), json!(format!("down: {}", e)));
        }
    }

    match state.print_system.list_printers().await {
        Ok(printers) => {
            components.insert("print_subsystem".to_string(), json!("up"));
            components.insert("printers_found".to_string(), json!(printers.len()));
        }
        Err(e) => {
            status = "degraded";
            components.insert("print_subsystem".to_string(), json!(format!("down: {}", e)));
        }
    }

    Json(json!({ "status": status, "components": components }))
}
