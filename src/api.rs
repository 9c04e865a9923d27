use std::{collections::HashMap, sync::Arc};

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    clients::{
        core_api::CoreApiClient, health::HealthChecker, host::CollectingNotifier,
        webhook::WebhookClient,
    },
    config::Config,
    error::ValidationError,
    models::{
        alert::Alert,
        attendance::AttendanceForm,
        health::HealthStatus,
        recipient::{RecipientBatch, RecipientSource},
        response::ApiResponse,
        session::UserInfo,
        template::Template,
    },
    recipients,
    templating::{TemplatePreview, extract_variables},
    utils::{SubmissionOutcome, process_submission},
};

const SYSTEM_KEY_HEADER: &str = "x-system-key";
const USER_ID_HEADER: &str = "x-user-id";
const MEDIA_FIELD: &str = "data";
const DEFAULT_MEDIA_NAME: &str = "arquivo";

pub struct AppState {
    health_checker: HealthChecker,
    webhook: WebhookClient,
    core_api: CoreApiClient,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            health_checker: HealthChecker::new(config.clone()),
            webhook: WebhookClient::new(config)?,
            core_api: CoreApiClient::new(config)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub template: Template,

    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientsRequest {
    pub ddi: String,
    pub source: RecipientSource,

    #[serde(default)]
    pub template: Option<Template>,

    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct RecipientsView {
    pub phone: String,
    pub count: usize,
    pub batch: RecipientBatch,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmissionOutcome>,
    pub alerts: Vec<Alert>,
    pub close_modal: bool,
}

#[derive(Debug, Serialize)]
pub struct MediaView {
    pub url: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/preview", post(preview))
        .route("/api/v1/recipients", post(normalize_recipients))
        .route("/api/v1/attendances", post(start_attendance))
        .route("/api/v1/media", post(upload_media))
        .route("/api/v1/channels/{channel_id}/sectors", get(list_sectors))
        .route("/api/v1/channels/{channel_id}/templates", get(list_templates))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let state = Arc::new(AppState::new(&config)?);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Attendance panel server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn preview(Json(request): Json<PreviewRequest>) -> impl IntoResponse {
    let preview = TemplatePreview::new(&request.template, &request.variables);

    (
        StatusCode::OK,
        Json(ApiResponse::success(preview, "Preview rendered".to_string())),
    )
}

async fn normalize_recipients(Json(request): Json<RecipientsRequest>) -> impl IntoResponse {
    let ordered_variables = request
        .template
        .as_ref()
        .map(|template| extract_variables(template.body_text()))
        .unwrap_or_default();
    let variables = request.template.as_ref().map(|_| &request.variables);

    match recipients::normalize(&request.source, &request.ddi, variables, &ordered_variables) {
        Ok(normalized) => {
            let view = RecipientsView {
                phone: normalized.batch.wire_phone(),
                count: normalized.batch.len(),
                warnings: normalized.warnings.iter().map(ToString::to_string).collect(),
                batch: normalized.batch,
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(view, "Recipients normalized".to_string())),
            )
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                e.to_string(),
                "Invalid recipients".to_string(),
            )),
        ),
    }
}

async fn start_attendance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<AttendanceForm>,
) -> impl IntoResponse {
    let session = user_from_headers(&headers);
    let notifier = CollectingNotifier::new();

    let result = process_submission(
        &form,
        &session,
        &notifier,
        &state.webhook,
        state.core_api.origin(),
    )
    .await;

    match result {
        Ok(outcome) => {
            let message = outcome.message.clone();
            let view = SubmissionView {
                outcome: Some(outcome),
                alerts: notifier.alerts(),
                close_modal: notifier.modal_closed(),
            };
            (StatusCode::OK, Json(ApiResponse::success(view, message)))
        }
        Err(e) => {
            let status = if e.downcast_ref::<ValidationError>().is_some() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            let view = SubmissionView {
                outcome: None,
                alerts: notifier.alerts(),
                close_modal: notifier.modal_closed(),
            };
            (
                status,
                Json(ApiResponse::failure_with(
                    view,
                    e.to_string(),
                    "Attendance not started".to_string(),
                )),
            )
        }
    }
}

/// Relays a header media file to the upload webhook; the returned URL goes
/// into the form's `media` before submitting.
async fn upload_media(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let user = user_from_headers(&headers);
    let Some(system_key) = user.resolved_system_key() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<MediaView>::error(
                ValidationError::MissingSystemKey.to_string(),
                "Media not uploaded".to_string(),
            )),
        );
    };

    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(MEDIA_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_MEDIA_NAME)
            .to_string();
        match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => {
                upload = Some((file_name, bytes.to_vec()));
                break;
            }
            _ => continue,
        }
    }

    let Some((file_name, bytes)) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "No file provided".to_string(),
                "Media not uploaded".to_string(),
            )),
        );
    };

    match state.webhook.upload_media(&file_name, bytes, system_key).await {
        Ok(url) => (
            StatusCode::OK,
            Json(ApiResponse::success(MediaView { url }, "Media uploaded".to_string())),
        ),
        Err(e) => {
            warn!(file_name = %file_name, error = %e, "Media upload failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(e.to_string(), "Media not uploaded".to_string())),
            )
        }
    }
}

async fn list_sectors(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user = user_from_headers(&headers);
    let user_id = user.resolved_user_id();

    match state
        .core_api
        .fetch_sectors(&channel_id, Some(user_id.as_str()))
        .await
    {
        Ok(sectors) => (
            StatusCode::OK,
            Json(ApiResponse::success(sectors, "Sectors fetched".to_string())),
        ),
        Err(e) => {
            warn!(channel_id = %channel_id, error = %e, "Sector lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(
                    e.to_string(),
                    "Failed to fetch sectors".to_string(),
                )),
            )
        }
    }
}

async fn list_templates(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<String>,
) -> impl IntoResponse {
    match state.core_api.fetch_templates(&channel_id).await {
        Ok(templates) => (
            StatusCode::OK,
            Json(ApiResponse::success(templates, "Templates fetched".to_string())),
        ),
        Err(e) => {
            warn!(channel_id = %channel_id, error = %e, "Template lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(
                    e.to_string(),
                    "Failed to fetch templates".to_string(),
                )),
            )
        }
    }
}

/// The widget forwards the identity it got from the host shell as headers.
fn user_from_headers(headers: &HeaderMap) -> UserInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .filter(|value| !value.is_empty())
    };

    UserInfo {
        user_id: header(USER_ID_HEADER),
        system_key: header(SYSTEM_KEY_HEADER),
        ..UserInfo::default()
    }
}
