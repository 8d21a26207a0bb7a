use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    error_handling::{AppError, AppResult},
    validation::Validator,
    views::{negotiate, CardFragment, CardView},
    AppState,
};

/// Tells the page script to drop the element that triggered the request.
pub const REMOVE_HEADER: HeaderName = HeaderName::from_static("x-ic-remove");

pub async fn raise_priority(
    State(state): State<AppState>,
    Path((modality, department, priority)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    Validator::validate_modality(&modality)?;
    Validator::validate_department(&department)?;
    let priority = Validator::parse_priority(&priority)?;

    let now = Utc::now();
    let notification = state
        .ledger
        .raise_priority(&department, &modality, priority, now)
        .await?;
    let device_alive = state.tracker.is_alive(&department, now).await?.is_some();

    let fragment = CardFragment {
        card: CardView::new(&department, &modality, Some(&notification), device_alive),
    };
    negotiate(&headers, fragment)
}

pub async fn cancel_notification(
    State(state): State<AppState>,
    Path((modality, department)): Path<(String, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    Validator::validate_modality(&modality)?;
    Validator::validate_department(&department)?;

    let now = Utc::now();
    state.ledger.cancel(&department, &modality, now).await?;
    let device_alive = state.tracker.is_alive(&department, now).await?.is_some();

    let fragment = CardFragment {
        card: CardView::new(&department, &modality, None, device_alive),
    };
    negotiate(&headers, fragment)
}

/// Confirm a notification from the department view.
///
/// The removal header is set whether or not anything was confirmed, so a
/// stale row disappears from the page either way.
pub async fn confirm_notification(
    State(state): State<AppState>,
    Path((department, id)): Path<(String, String)>,
) -> AppResult<Response> {
    Validator::validate_department(&department)?;
    Validator::validate_notification_id(&id)?;

    let rows = state.ledger.confirm(&id, Utc::now()).await?;

    let mut response = if rows == 0 {
        tracing::warn!(department = %department, id = %id, "Confirm matched no open notification");
        AppError::bad_request(format!("Notification {} is not open", id)).into_response()
    } else {
        StatusCode::OK.into_response()
    };
    response
        .headers_mut()
        .insert(REMOVE_HEADER, HeaderValue::from_static("true"));
    Ok(response)
}
