use anyhow::{Error, Result, anyhow};
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    models::{
        attendance::{AttendancePayload, AttendanceResponse},
        recipient::PhoneMode,
    },
};

const SINGLE_ATTENDANCE_PATH: &str = "/webhook/extensao/numero/inicia-atendimento";
const BULK_ATTENDANCE_PATH: &str = "/webhook/extensao/inicia-atendimento";
const UPLOAD_PATH: &str = "/webhook/upload-arquivo";

const DEFAULT_START_ERROR: &str = "Failed to start attendance";

/// Client for the external webhook that opens attendances and stores
/// uploaded template media. Requests are sent once; failures are surfaced
/// to the caller as they are.
#[derive(Clone)]
pub struct WebhookClient {
    http_client: Client,
    base_url: String,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.webhook_base_url, "Webhook client initialized");

        Ok(Self {
            http_client,
            base_url: config.webhook_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn start_attendance(
        &self,
        payload: &AttendancePayload,
    ) -> Result<AttendanceResponse, Error> {
        let path = match payload.type_select {
            PhoneMode::Single => SINGLE_ATTENDANCE_PATH,
            PhoneMode::List | PhoneMode::Csv => BULK_ATTENDANCE_PATH,
        };
        let url = format!("{}{}", self.base_url, path);

        debug!(
            channel_id = %payload.channel_id,
            sector_id = %payload.sector_id,
            mode = %payload.type_select,
            has_template = payload.template_id.is_some(),
            "Submitting attendance request"
        );

        let response = self.http_client.post(&url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if payload.type_select == PhoneMode::Single && status == StatusCode::BAD_REQUEST {
            let message = rejection_message(&body);
            warn!(status = %status, error = %message, "Attendance request rejected");
            return Err(anyhow!(message));
        }

        if !status.is_success() {
            warn!(status = %status, "Attendance webhook returned an error");
            return Err(anyhow!("{}: {} - {}", DEFAULT_START_ERROR, status, body));
        }

        if body.trim().is_empty() {
            return Ok(AttendanceResponse::default());
        }

        let parsed = serde_json::from_str::<AttendanceResponse>(&body)
            .map_err(|e| anyhow!("Failed to parse attendance response: {}", e))?;

        info!(
            channel_id = %payload.channel_id,
            mode = %payload.type_select,
            "Attendance request accepted"
        );

        Ok(parsed)
    }

    /// Uploads a header media file and returns the URL it is served from.
    pub async fn upload_media(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        system_key: &str,
    ) -> Result<String, Error> {
        if system_key.is_empty() {
            return Err(anyhow!("systemKey not found"));
        }

        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        let form = Form::new()
            .part("data", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("systemKey", system_key.to_string());

        debug!(file_name, "Uploading template media");

        let response = self.http_client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(anyhow!("Upload failed: {}", status));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse upload response: {}", e))?;

        ["url", "link", "fileUrl"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Upload response did not contain a file URL"))
    }
}

/// Message of a 400 reply: JSON `message` or `error`, else the raw body.
fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => ["message", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_START_ERROR)
            .to_string(),
        Err(_) if body.trim().is_empty() => DEFAULT_START_ERROR.to_string(),
        Err(_) => body.to_string(),
    }
}
