use anyhow::Result;
use attendance_launcher::{
    clients::{
        host::{CollectingNotifier, NotificationPort, TracingNotifier},
        webhook::WebhookClient,
    },
    error::ValidationError,
    models::{
        alert::{Alert, AlertVariant},
        attendance::{AttendanceForm, AttendanceResponse, HeaderMedia},
        recipient::{PhoneMode, RecipientSource},
        session::UserInfo,
        template::{MediaKind, Template},
        validation::validate_form,
    },
    utils::{prepare_submission, process_submission, summarize_outcome},
};
use std::collections::HashMap;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

use crate::webhook_tests::test_config;

const CORE_API: &str = "https://api.example";

fn operator() -> UserInfo {
    UserInfo {
        user_id: Some("user-1".to_string()),
        system_key: Some("sys-key".to_string()),
        ..UserInfo::default()
    }
}

fn welcome_template() -> Result<Template> {
    Ok(serde_json::from_value(serde_json::json!({
        "id": "template-1",
        "description": "boas_vindas_",
        "dynamicComponents": [{
            "type": "BODY",
            "text": "Olá {{1}}, seu código é {{2}}"
        }]
    }))?)
}

fn form(recipients: RecipientSource) -> AttendanceForm {
    AttendanceForm {
        channel_id: "channel-1".to_string(),
        channel_type: 4,
        sector_id: "sector-1".to_string(),
        ddi: "55".to_string(),
        recipients,
        send_quick_message: false,
        template: None,
        variables: HashMap::new(),
        button_values: HashMap::new(),
        media: HeaderMedia::default(),
        message: None,
    }
}

fn response(total: Option<&str>) -> AttendanceResponse {
    AttendanceResponse {
        total_atendimentos: total.map(str::to_string),
        ..AttendanceResponse::default()
    }
}

/// Test: Missing channel or sector selection blocks the form
#[test]
fn test_validate_form_requires_selection() {
    let mut incomplete = form(RecipientSource::Single {
        number: "11999999999".to_string(),
    });
    incomplete.sector_id = String::new();

    assert_eq!(validate_form(&incomplete), Err(ValidationError::MissingSelection));
}

/// Test: CSV mode without file content is rejected
#[test]
fn test_validate_form_requires_csv_file() {
    let csv = form(RecipientSource::Csv {
        text: String::new(),
    });

    assert_eq!(validate_form(&csv), Err(ValidationError::MissingCsvFile));
}

/// Test: Cloud quick messages with a media header need the uploaded file
#[test]
fn test_validate_form_requires_header_media() -> Result<()> {
    let mut quick = form(RecipientSource::Single {
        number: "11999999999".to_string(),
    });
    quick.send_quick_message = true;
    quick.template = Some(serde_json::from_value(serde_json::json!({
        "id": "template-2",
        "description": "pesquisa",
        "dynamicComponents": [
            { "type": "HEADER", "format": "VIDEO" },
            { "type": "BODY", "text": "Oi {{1}}" }
        ]
    }))?);

    assert_eq!(
        validate_form(&quick),
        Err(ValidationError::MissingHeaderMedia(MediaKind::Video))
    );
    assert_eq!(
        ValidationError::MissingHeaderMedia(MediaKind::Video).to_string(),
        "Please upload the template video"
    );

    // Web channels never send quick messages, so no media is required.
    quick.channel_type = 1;
    assert_eq!(validate_form(&quick), Ok(()));

    quick.channel_type = 4;
    quick.media.video_url = Some("https://cdn.example/v.mp4".to_string());
    assert_eq!(validate_form(&quick), Ok(()));

    Ok(())
}

/// Test: Single submissions render the message and build body parameters
#[test]
fn test_prepare_single_submission_with_template() -> Result<()> {
    let mut single = form(RecipientSource::Single {
        number: "(11) 99999-9999".to_string(),
    });
    single.send_quick_message = true;
    single.template = Some(welcome_template()?);
    single
        .variables
        .insert("1".to_string(), "Maria".to_string());
    single
        .variables
        .insert("2".to_string(), "X9F2".to_string());

    let prepared = prepare_submission(&single, &operator(), CORE_API)?;
    let payload = &prepared.payload;

    assert_eq!(payload.phone, "5511999999999");
    assert_eq!(payload.type_select, PhoneMode::Single);
    assert_eq!(payload.message.as_deref(), Some("Olá Maria, seu código é X9F2"));
    assert_eq!(payload.template_id.as_deref(), Some("template-1"));
    assert_eq!(payload.template_components.len(), 1);
    assert_eq!(payload.user_id, "user-1");
    assert_eq!(payload.endereco_api, CORE_API);
    assert_eq!(prepared.recipients, 1);

    let wire = serde_json::to_value(payload)?;
    assert_eq!(wire["typeChannel"], "cloud");
    assert_eq!(wire["templateComponents"][0]["type"], "BODY");
    assert!(wire.get("phoneList").is_none());

    Ok(())
}

/// Test: List submissions align shared variables and keep the raw list
#[test]
fn test_prepare_list_submission() -> Result<()> {
    let raw = "11999999999\n11888888888,Ana,Z1";
    let mut bulk = form(RecipientSource::List {
        text: raw.to_string(),
    });
    bulk.template = Some(welcome_template()?);
    bulk.variables.insert("1".to_string(), "Maria".to_string());

    let prepared = prepare_submission(&bulk, &operator(), CORE_API)?;
    let payload = &prepared.payload;

    assert_eq!(payload.phone, "5511999999999,Maria,\n5511888888888,Ana,Z1");
    assert_eq!(payload.phone_list.as_deref(), Some(raw));
    assert_eq!(payload.type_select, PhoneMode::List);
    // Not sent as a quick message, so no template id or components.
    assert!(payload.template_id.is_none());
    assert!(payload.template_components.is_empty());
    assert_eq!(payload.message.as_deref(), Some("Olá Maria, seu código é {{2}}"));

    let wire = serde_json::to_value(payload)?;
    assert!(wire.get("templateComponents").is_none());

    Ok(())
}

/// Test: A session without a system key cannot submit
#[test]
fn test_prepare_requires_system_key() {
    let single = form(RecipientSource::Single {
        number: "11999999999".to_string(),
    });

    let result = prepare_submission(&single, &UserInfo::default(), CORE_API);

    assert!(matches!(result, Err(ValidationError::MissingSystemKey)));
}

/// Test: Single mode always reports a plain success
#[test]
fn test_summarize_single_mode() {
    let alert = summarize_outcome(PhoneMode::Single, &response(Some("0 execuções com sucesso")));

    assert_eq!(alert, Alert::success("Attendance started successfully"));
}

/// Test: Bulk tallies are rewritten in terms of opened chats
#[test]
fn test_summarize_bulk_tallies() {
    let cases = [
        (
            "3 execuções com sucesso e 0 com falhas",
            AlertVariant::Success,
            "3 chats abertos com sucesso",
        ),
        (
            "1 execução com sucesso",
            AlertVariant::Success,
            "1 chat aberto com sucesso",
        ),
        (
            "2 execuções com sucesso e 1 com falhas",
            AlertVariant::Success,
            "2 chats abertos com sucesso e 1 com falha",
        ),
        (
            "0 execuções com sucesso e 1 com falhas",
            AlertVariant::Error,
            "1 com falha",
        ),
        (
            "0 execuções com sucesso e 4 com falhas",
            AlertVariant::Error,
            "4 com falhas",
        ),
    ];

    for (total, variant, message) in cases {
        let alert = summarize_outcome(PhoneMode::Csv, &response(Some(total)));
        assert_eq!(alert.variant, variant, "{}", total);
        assert_eq!(alert.message, message, "{}", total);
    }

    let alert = summarize_outcome(PhoneMode::List, &response(None));
    assert_eq!(alert, Alert::success("Attendance started successfully"));
}

/// Test: A successful bulk submission alerts, closes the modal and reports the count
#[tokio::test]
async fn test_process_submission_success() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook/extensao/inicia-atendimento"))
        .and(body_partial_json(serde_json::json!({
            "phone": "5511999999999\n5511888888888",
            "typeSelect": "csv"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalAtendimentos": "2 execuções com sucesso e 0 com falhas"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookClient::new(&test_config(&server))?;
    let notifier = CollectingNotifier::new();
    let csv = form(RecipientSource::Csv {
        text: "telefone\n11999999999\n11888888888\n".to_string(),
    });

    let outcome = process_submission(&csv, &operator(), &notifier, &webhook, CORE_API).await?;

    assert_eq!(outcome.recipients, 2);
    assert_eq!(outcome.mode, PhoneMode::Csv);
    assert_eq!(outcome.message, "2 chats abertos com sucesso");
    assert_eq!(notifier.alerts(), vec![Alert::success("2 chats abertos com sucesso")]);
    assert!(notifier.modal_closed());

    Ok(())
}

/// Test: CSV truncation warns before the submission goes out
#[tokio::test]
async fn test_process_submission_truncation_warning() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook/extensao/inicia-atendimento"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookClient::new(&test_config(&server))?;
    let notifier = CollectingNotifier::new();
    let text = (0..12)
        .map(|i| format!("119999900{:02}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let csv = form(RecipientSource::Csv { text });

    let outcome = process_submission(&csv, &operator(), &notifier, &webhook, CORE_API).await?;

    assert_eq!(outcome.recipients, 10);
    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].variant, AlertVariant::Warning);
    assert_eq!(alerts[1], Alert::success("Attendance started successfully"));

    Ok(())
}

/// Test: Validation failures alert the operator and send nothing
#[tokio::test]
async fn test_process_submission_validation_failure() -> Result<()> {
    let server = MockServer::start().await;
    let webhook = WebhookClient::new(&test_config(&server))?;
    let notifier = CollectingNotifier::new();

    let text = (0..11)
        .map(|i| format!("119999900{:02}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let over_limit = form(RecipientSource::List { text });

    let error = process_submission(&over_limit, &operator(), &notifier, &webhook, CORE_API)
        .await
        .expect_err("list over the limit must fail");

    assert!(matches!(
        error.downcast_ref::<ValidationError>(),
        Some(ValidationError::ListOverLimit { found: 11, .. })
    ));
    assert_eq!(notifier.alerts().len(), 1);
    assert_eq!(notifier.alerts()[0].variant, AlertVariant::Error);
    assert!(!notifier.modal_closed());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    Ok(())
}

/// Test: A tally with no successes is an error and keeps the modal open
#[tokio::test]
async fn test_process_submission_all_failed() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook/extensao/inicia-atendimento"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalAtendimentos": "0 execuções com sucesso e 2 com falhas"
        })))
        .mount(&server)
        .await;

    let webhook = WebhookClient::new(&test_config(&server))?;
    let notifier = CollectingNotifier::new();
    let bulk = form(RecipientSource::List {
        text: "11999999999\n11888888888".to_string(),
    });

    let result = process_submission(&bulk, &operator(), &notifier, &webhook, CORE_API).await;

    assert!(result.is_err());
    assert_eq!(notifier.alerts(), vec![Alert::error("2 com falhas")]);
    assert!(!notifier.modal_closed());

    Ok(())
}

/// Test: Webhook errors are surfaced once as an error alert
#[tokio::test]
async fn test_process_submission_webhook_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/webhook/extensao/numero/inicia-atendimento"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "Setor inválido" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let webhook = WebhookClient::new(&test_config(&server))?;
    let notifier = CollectingNotifier::new();
    let single = form(RecipientSource::Single {
        number: "11999999999".to_string(),
    });

    let error = process_submission(&single, &operator(), &notifier, &webhook, CORE_API)
        .await
        .expect_err("rejected submission must fail");

    assert_eq!(error.to_string(), "Setor inválido");
    assert_eq!(notifier.alerts(), vec![Alert::error("Setor inválido")]);

    Ok(())
}

/// Test: The logging notifier accepts every alert variant
#[test]
fn test_tracing_notifier() {
    let notifier = TracingNotifier;

    notifier.alert(Alert::success("ok"));
    notifier.alert(Alert::warning("careful"));
    notifier.alert(Alert::error("broken"));
    notifier.close_modal();
}
