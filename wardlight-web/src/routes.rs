use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Every route answers both GET and POST; the page script posts, devices and
/// browsers get.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index).post(handlers::index))
        .route("/health", get(handlers::health_check))
        // Views
        .route(
            "/mtra/:modality",
            get(handlers::modality_view).post(handlers::modality_view),
        )
        .route(
            "/radiologie/:department",
            get(handlers::department_view).post(handlers::department_view),
        )
        // Notification lifecycle
        .route(
            "/modality/:modality/department/:department/prio/:priority",
            get(handlers::raise_priority).post(handlers::raise_priority),
        )
        .route(
            "/modality/:modality/department/:department/cancel",
            get(handlers::cancel_notification).post(handlers::cancel_notification),
        )
        .route(
            "/notification/:department/:id",
            get(handlers::confirm_notification).post(handlers::confirm_notification),
        )
        // Signal devices
        .route(
            "/nce-rest/arduino-status/:target",
            get(handlers::device_endpoint).post(handlers::device_endpoint),
        )
}
