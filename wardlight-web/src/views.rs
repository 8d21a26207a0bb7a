// View models shared by the HTML templates and the JSON responses

use askama::Template;
use axum::{
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Json, Response},
};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use wardlight_core::{HeartbeatRecord, Notification, NotificationState, Priority};

use crate::error_handling::AppResult;

fn clock_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn full_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d.%m.%Y %H:%M:%S").to_string()
}

/// True when the client asked for the view data instead of markup.
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json") || mime.eq_ignore_ascii_case("text/json")
        })
        .unwrap_or(false)
}

/// Render `view` as JSON or HTML depending on the request's content type
pub fn negotiate<T>(headers: &HeaderMap, view: T) -> AppResult<Response>
where
    T: Template + Serialize,
{
    if wants_json(headers) {
        return Ok(Json(view).into_response());
    }
    Ok(Html(view.render()?).into_response())
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertView {
    pub id: String,
    pub priority: i64,
    pub priority_class: &'static str,
    pub priority_name: &'static str,
    pub created_at: String,
}

impl From<&Notification> for AlertView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            priority: notification.priority.as_i64(),
            priority_class: notification.priority.css_class(),
            priority_name: notification.priority.display_name(),
            created_at: clock_time(notification.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityButton {
    pub priority: i64,
    pub css_class: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// One department's slot on a modality view.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub department: String,
    pub modality: String,
    pub alert: Option<AlertView>,
    /// Whether the department's signal device has reported recently.
    pub device_alive: bool,
    pub buttons: Vec<PriorityButton>,
}

impl CardView {
    pub fn new(
        department: &str,
        modality: &str,
        open: Option<&Notification>,
        device_alive: bool,
    ) -> Self {
        let current = open.map(|n| n.priority);
        let buttons = Priority::ALL
            .iter()
            .map(|&priority| PriorityButton {
                priority: priority.as_i64(),
                css_class: priority.css_class(),
                label: priority.display_name(),
                active: current == Some(priority),
            })
            .collect();

        Self {
            department: department.to_string(),
            modality: modality.to_string(),
            alert: open.map(AlertView::from),
            device_alive,
            buttons,
        }
    }
}

#[derive(Template, Serialize)]
#[template(path = "card_view.html")]
pub struct CardFragment {
    #[serde(flatten)]
    pub card: CardView,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub department: String,
    pub priority: i64,
    pub priority_class: &'static str,
    pub priority_name: &'static str,
    pub state: NotificationState,
    pub created_at: String,
    pub closed_at: String,
}

impl From<&Notification> for HistoryRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            department: notification.department.clone(),
            priority: notification.priority.as_i64(),
            priority_class: notification.priority.css_class(),
            priority_name: notification.priority.display_name(),
            state: notification.state(),
            created_at: full_time(notification.created_at),
            closed_at: notification.closed_at().map(full_time).unwrap_or_default(),
        }
    }
}

#[derive(Template, Serialize)]
#[template(path = "mtra.html")]
pub struct ModalityPage {
    pub modality: String,
    pub version: &'static str,
    pub cards: Vec<CardView>,
    pub history: Vec<HistoryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenRow {
    pub id: String,
    pub modality: String,
    pub priority: i64,
    pub priority_class: &'static str,
    pub priority_name: &'static str,
    pub created_at: String,
}

impl From<&Notification> for OpenRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            modality: notification.modality.clone(),
            priority: notification.priority.as_i64(),
            priority_class: notification.priority.css_class(),
            priority_name: notification.priority.display_name(),
            created_at: clock_time(notification.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceView {
    pub reported_at: String,
}

impl From<&HeartbeatRecord> for DeviceView {
    fn from(record: &HeartbeatRecord) -> Self {
        Self {
            reported_at: clock_time(record.reported_at),
        }
    }
}

#[derive(Template, Serialize)]
#[template(path = "radiologie.html")]
pub struct DepartmentPage {
    pub department: String,
    pub version: &'static str,
    pub notifications: Vec<OpenRow>,
    /// Last fresh heartbeat; `None` when the device is silent.
    pub device: Option<DeviceView>,
}

#[derive(Template, Serialize)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub version: &'static str,
    pub departments: Vec<String>,
}
