use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use chrono::Utc;

use crate::{
    error_handling::AppResult,
    validation::Validator,
    views::{negotiate, CardView, DepartmentPage, DeviceView, HistoryRow, IndexPage, ModalityPage, OpenRow},
    AppState, VERSION,
};

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let page = IndexPage {
        version: VERSION,
        departments: state.config.departments.clone(),
    };
    negotiate(&headers, page)
}

/// Modality view: a card per configured department plus the closed history.
pub async fn modality_view(
    State(state): State<AppState>,
    Path(modality): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    Validator::validate_modality(&modality)?;

    let now = Utc::now();
    let mut cards = Vec::with_capacity(state.config.departments.len());
    for department in &state.config.departments {
        let open = state.ledger.get_open(department, &modality).await?;
        let device_alive = state.tracker.is_alive(department, now).await?.is_some();
        cards.push(CardView::new(department, &modality, open.as_ref(), device_alive));
    }

    let history: Vec<HistoryRow> = state
        .ledger
        .get_history(&modality)
        .await?
        .iter()
        .map(HistoryRow::from)
        .collect();

    let page = ModalityPage {
        modality,
        version: VERSION,
        cards,
        history,
    };
    negotiate(&headers, page)
}

/// Department view: open alerts, most urgent first, and the device status.
pub async fn department_view(
    State(state): State<AppState>,
    Path(department): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    Validator::validate_department(&department)?;

    let notifications: Vec<OpenRow> = state
        .ledger
        .get_open_ordered_by_priority(&department)
        .await?
        .iter()
        .map(OpenRow::from)
        .collect();

    let device = state
        .tracker
        .is_alive(&department, Utc::now())
        .await?
        .as_ref()
        .map(DeviceView::from);

    let page = DepartmentPage {
        department,
        version: VERSION,
        notifications,
        device,
    };
    negotiate(&headers, page)
}
