// Plain-text endpoints polled by the signal devices

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    error_handling::{AppError, AppResult},
    validation::Validator,
    AppState,
};

const OPEN_NOTIFICATIONS_SUFFIX: &str = "-open-notifications";
const STATUS_SUFFIX: &str = "-status";

/// Routes `<department>-status` and `<department>-open-notifications`.
pub async fn device_endpoint(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> AppResult<Response> {
    if let Some(department) = target.strip_suffix(OPEN_NOTIFICATIONS_SUFFIX) {
        return open_notifications(&state, department).await;
    }
    if let Some(department) = target.strip_suffix(STATUS_SUFFIX) {
        return heartbeat(&state, department).await;
    }
    Err(AppError::not_found(format!("device endpoint {}", target)))
}

async fn heartbeat(state: &AppState, department: &str) -> AppResult<Response> {
    Validator::validate_department(department)?;

    let record = state.tracker.record_heartbeat(department, Utc::now()).await?;
    let body = format!(
        "department={} reported_at={}",
        record.department,
        record.reported_at.timestamp()
    );
    Ok(plain_text(body))
}

/// `;1;<CODE>;` for the most urgent open alert, `;0;` when all clear.
async fn open_notifications(state: &AppState, department: &str) -> AppResult<Response> {
    Validator::validate_department(department)?;

    let body = match state.ledger.current_alert(department).await? {
        Some(notification) => format!(";1;{};", notification.priority.device_code()),
        None => ";0;".to_string(),
    };
    Ok(plain_text(body))
}

fn plain_text(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
