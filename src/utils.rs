use std::sync::LazyLock;

use anyhow::{Error, Result, anyhow};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::{
        host::{NotificationPort, SessionPort},
        webhook::WebhookClient,
    },
    error::{RecipientWarning, ValidationError},
    models::{
        alert::{Alert, AlertVariant},
        attendance::{AttendanceForm, AttendancePayload, AttendanceResponse},
        recipient::{PhoneMode, RecipientSource},
        session::UserInfo,
        validation::validate_form,
    },
    recipients,
    templating::{ComponentInputs, build_components, extract_variables, render_message},
};

const STARTED_MESSAGE: &str = "Attendance started successfully";

static SUCCESS_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+execuç(?:ões|ão)\s+com\s+sucesso").expect("success count pattern is valid")
});
static SINGULAR_SUCCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+execução\s+com\s+sucesso").expect("singular pattern is valid")
});
static PLURAL_SUCCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+execuções\s+com\s+sucesso").expect("plural pattern is valid")
});
static ANY_FAILURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s+com\s+falhas?").expect("failure pattern is valid"));
static OPENED_CHATS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+chats?\s+abertos?\s+com\s+sucesso").expect("opened pattern is valid")
});
static ZERO_OPENED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b0\s+chats?\s+abertos?\s+com\s+sucesso\s+e\s+").expect("zero pattern is valid")
});
static ZERO_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+e\s+0\s+com\s+falhas?\s*").expect("zero failure pattern is valid")
});
static ONE_FAILED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b1\s+com\s+falhas\b").expect("one failure pattern is valid"));

/// Webhook payload plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct PreparedSubmission {
    pub payload: AttendancePayload,
    pub recipients: usize,
    pub warnings: Vec<RecipientWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub trace_id: Uuid,
    pub mode: PhoneMode,
    pub recipients: usize,
    pub message: String,
}

/// Validates the form, normalizes recipients and assembles the webhook
/// payload. Nothing is sent.
pub fn prepare_submission(
    form: &AttendanceForm,
    user: &UserInfo,
    core_api_origin: &str,
) -> Result<PreparedSubmission, ValidationError> {
    validate_form(form)?;

    let ordered_variables = form
        .template
        .as_ref()
        .map(|template| extract_variables(template.body_text()))
        .unwrap_or_default();
    let variables = form.template.as_ref().map(|_| &form.variables);

    let normalized = recipients::normalize(&form.recipients, &form.ddi, variables, &ordered_variables)?;

    let system_key = user
        .resolved_system_key()
        .ok_or(ValidationError::MissingSystemKey)?;

    let message = match &form.template {
        Some(template) => Some(render_message(template.body_text(), &form.variables)),
        None => form.message.clone().filter(|m| !m.is_empty()),
    };

    let quick_template = form.quick_message_template();
    let template_components = quick_template
        .map(|template| {
            build_components(
                template,
                ComponentInputs {
                    variables: &form.variables,
                    button_values: &form.button_values,
                    media: &form.media,
                },
            )
        })
        .unwrap_or_default();

    let phone_list = match &form.recipients {
        RecipientSource::List { text } => Some(text.clone()),
        _ => None,
    };

    let payload = AttendancePayload {
        channel_id: form.channel_id.clone(),
        sector_id: form.sector_id.clone(),
        phone: normalized.batch.wire_phone(),
        system_key: system_key.to_string(),
        user_id: user.resolved_user_id(),
        type_select: form.recipients.mode(),
        type_channel: form.channel_kind(),
        endereco_api: core_api_origin.to_string(),
        phone_list,
        template_id: quick_template.map(|template| template.id.clone()),
        template_components,
        message,
    };

    Ok(PreparedSubmission {
        payload,
        recipients: normalized.batch.len(),
        warnings: normalized.warnings,
    })
}

/// Runs a panel submission end to end, reporting every step to the
/// operator through `notifier`. The modal is closed only after the webhook
/// confirms at least one attendance.
pub async fn process_submission<S, N>(
    form: &AttendanceForm,
    session: &S,
    notifier: &N,
    webhook: &WebhookClient,
    core_api_origin: &str,
) -> Result<SubmissionOutcome, Error>
where
    S: SessionPort,
    N: NotificationPort,
{
    let trace_id = Uuid::new_v4();
    let mode = form.recipients.mode();

    info!(
        trace_id = %trace_id,
        channel_id = %form.channel_id,
        sector_id = %form.sector_id,
        mode = %mode,
        "Processing attendance submission"
    );

    let user = session.user_info().unwrap_or_default();

    let prepared = match prepare_submission(form, &user, core_api_origin) {
        Ok(prepared) => prepared,
        Err(e) => {
            warn!(trace_id = %trace_id, error = %e, "Attendance submission rejected");
            notifier.alert(Alert::error(e.to_string()));
            return Err(e.into());
        }
    };

    for warning in &prepared.warnings {
        notifier.alert(Alert::warning(warning.to_string()));
    }

    let response = match webhook.start_attendance(&prepared.payload).await {
        Ok(response) => response,
        Err(e) => {
            warn!(trace_id = %trace_id, error = %e, "Attendance webhook call failed");
            notifier.alert(Alert::error(e.to_string()));
            return Err(e);
        }
    };

    let summary = summarize_outcome(mode, &response);
    notifier.alert(summary.clone());

    if summary.variant == AlertVariant::Error {
        warn!(trace_id = %trace_id, summary = %summary.message, "No attendance was started");
        return Err(anyhow!(summary.message));
    }

    notifier.close_modal();

    info!(
        trace_id = %trace_id,
        recipients = prepared.recipients,
        "Attendance submission completed"
    );

    Ok(SubmissionOutcome {
        trace_id,
        mode,
        recipients: prepared.recipients,
        message: summary.message,
    })
}

/// Turns the webhook reply into the alert shown to the operator.
///
/// Bulk replies carry a Portuguese tally such as
/// `3 execuções com sucesso e 0 com falhas`; it is rewritten in terms of
/// opened chats and treated as an error when nothing succeeded.
pub fn summarize_outcome(mode: PhoneMode, response: &AttendanceResponse) -> Alert {
    if mode == PhoneMode::Single {
        return Alert::success(STARTED_MESSAGE);
    }

    let Some(total) = response
        .total_atendimentos
        .as_deref()
        .filter(|t| !t.trim().is_empty())
    else {
        return Alert::success(STARTED_MESSAGE);
    };

    let success_count = SUCCESS_COUNT
        .captures(total)
        .and_then(|c| c[1].parse::<u64>().ok())
        .unwrap_or(0);

    let message = format_tally(total, success_count);

    if success_count >= 1 {
        Alert::success(message)
    } else {
        Alert::error(message)
    }
}

fn format_tally(total: &str, success_count: u64) -> String {
    let formatted = SINGULAR_SUCCESS.replace_all(total, "$1 chat aberto com sucesso");
    let formatted = PLURAL_SUCCESS
        .replace_all(&formatted, "$1 chats abertos com sucesso")
        .into_owned();

    if success_count >= 1 && !ANY_FAILURE.is_match(&formatted) {
        if let Some(captures) = OPENED_CHATS.captures(&formatted) {
            let count = &captures[1];
            let suffix = if count == "1" { "" } else { "s" };
            return format!("{} chat{} aberto{} com sucesso", count, suffix, suffix);
        }
    }

    let formatted = ZERO_OPENED.replace_all(&formatted, "");
    let formatted = ZERO_FAILED.replace_all(&formatted, "");
    let formatted = ONE_FAILED.replace_all(&formatted, "1 com falha");

    formatted.trim().to_string()
}
