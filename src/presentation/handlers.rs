// HTTP request handlers
use crate::application::export_service::{CSV_MIME, CsvDownload, ExportError};
use crate::application::translator::Language;
use crate::domain::history::TimeRange;
use crate::domain::reading::Parameter;
use crate::infrastructure::json_stream::chunked_json_stream;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub lang: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub parameter: Option<String>,
    pub range: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AutoRefreshBody {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct RangeBody {
    pub range: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboard snapshot. `?range=` overrides the sticky selection for this
/// response only; `PUT /dashboard/range` changes the selection itself.
pub async fn get_dashboard(
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = match parse_range(query.range.as_deref()) {
        Ok(range) => range,
        Err(response) => return response,
    };

    let view = state
        .dashboard
        .view(language(query.lang.as_deref()), bearer_token(&headers), range)
        .await;
    Json(view).into_response()
}

/// Stream dashboard views as the feed updates (progressive loading)
pub async fn stream_dashboard(
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = match parse_range(query.range.as_deref()) {
        Ok(range) => range,
        Err(response) => return response,
    };

    // Check if client accepts Brotli compression
    let compress = headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false);

    let user = match bearer_token(&headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };

    let stream = state
        .dashboard
        .clone()
        .view_stream(language(query.lang.as_deref()), user, range);

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Manual refresh, bypassing the subscription
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let refreshed = state.dashboard.refresh().await;
    Json(json!({ "refreshed": refreshed }))
}

pub async fn set_auto_refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AutoRefreshBody>,
) -> StatusCode {
    state.dashboard.set_auto_refresh(body.enabled);
    StatusCode::NO_CONTENT
}

pub async fn set_range(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RangeBody>,
) -> Response {
    match TimeRange::parse(&body.range) {
        Some(range) => {
            state.dashboard.set_range(range);
            StatusCode::NO_CONTENT.into_response()
        }
        None => {
            (StatusCode::BAD_REQUEST, format!("unknown time range: {}", body.range)).into_response()
        }
    }
}

/// CSV download for one parameter (`?parameter=pH`) or all parameters
pub async fn export_csv(
    Query(query): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = match parse_range(query.range.as_deref()) {
        Ok(range) => range,
        Err(response) => return response,
    };

    let result = match query.parameter.as_deref() {
        Some(name) => match Parameter::from_wire_name(name) {
            Some(parameter) => state.dashboard.export_parameter(parameter, range),
            None => {
                return (StatusCode::BAD_REQUEST, format!("unknown parameter: {name}"))
                    .into_response();
            }
        },
        None => state.dashboard.export_all(range),
    };

    match result {
        Ok(download) => csv_response(download),
        // An empty export is a skipped download, not a malformed file
        Err(ExportError::EmptySeries) => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    match state
        .sessions
        .login(&credentials.email, &credentials.password)
        .await
    {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
    }
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    match state
        .sessions
        .signup(&credentials.email, &credentials.password)
        .await
    {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
    }
}

pub async fn logout(headers: HeaderMap, State(state): State<Arc<AppState>>) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn current_user(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let user = match bearer_token(&headers) {
        Some(token) => state.sessions.current_user(token).await,
        None => None,
    };

    match user {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn language(lang: Option<&str>) -> Language {
    lang.map(Language::parse).unwrap_or_default()
}

fn parse_range(raw: Option<&str>) -> Result<Option<TimeRange>, Response> {
    match raw {
        None => Ok(None),
        Some(value) => match TimeRange::parse(value) {
            Some(range) => Ok(Some(range)),
            None => Err((StatusCode::BAD_REQUEST, format!("unknown time range: {value}"))
                .into_response()),
        },
    }
}

fn csv_response(download: CsvDownload) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CSV_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.content,
    )
        .into_response()
}
