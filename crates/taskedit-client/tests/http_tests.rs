mod common;

use common::{client_for, setup_mock_server};
use serde_json::json;
use taskedit_client::{ClientError, RecordsClient};
use taskedit_core::config::ApiSettings;
use taskedit_core::notify::FAILURE_FALLBACK;
use taskedit_core::schema::FieldName;
use taskedit_core::{
    DialogPhase, DialogSettings, EditTaskDialog, InvalidationBus, SubmitOutcome, TaskUpdater,
    UpdateError,
};
use taskedit_shared::UpdatePayload;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn builds_record_urls() {
    let settings = ApiSettings {
        base_url: "http://localhost:1337/api/".to_string(),
        ..ApiSettings::default()
    };
    let client = RecordsClient::new(&settings).expect("client");
    assert_eq!(
        client.record_url(7).as_str(),
        "http://localhost:1337/api/tasks/7"
    );
}

#[test]
fn rejects_unusable_base_url() {
    let settings = ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    };
    assert!(matches!(
        RecordsClient::new(&settings),
        Err(ClientError::Url(_))
    ));
}

#[tokio::test]
async fn update_puts_payload_under_data() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/7"))
        .and(body_json(json!({ "data": { "file_no": 15 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": 7, "file_no": 15 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut payload = UpdatePayload::new();
    payload.insert("file_no", json!(15));

    client
        .update_record(7, &payload)
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn rejected_update_carries_nested_message() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "data": null,
            "error": {
                "status": 400,
                "name": "ValidationError",
                "message": "file_no must be unique",
                "details": {}
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .update_record(7, &UpdatePayload::new())
        .await
        .expect_err("update should fail");

    match &err {
        UpdateError::Rejected { status, .. } => assert_eq!(*status, 400),
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(err.detail_message(), Some("file_no must be unique"));
}

#[tokio::test]
async fn non_json_error_body_has_no_message() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .update_record(7, &UpdatePayload::new())
        .await
        .expect_err("update should fail");
    assert_eq!(err.detail_message(), None);
}

#[tokio::test]
async fn fetches_record_by_id() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 7,
                "file_no": 12,
                "reviewer": { "reviewer": "AB" },
                "status": { "status": "OPEN" },
                "remarks": ""
            }
        })))
        .mount(&server)
        .await;

    let record = client_for(&server).fetch_record(7).await.expect("fetch");
    assert_eq!(record.id, 7);
    assert_eq!(record.file_no, Some(12.into()));
    assert_eq!(record.status.map(|s| s.status), Some("OPEN".to_string()));
}

#[tokio::test]
async fn missing_record_reports_status() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "data": null,
            "error": { "status": 404, "name": "NotFoundError", "message": "Not Found" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_record(404)
        .await
        .expect_err("fetch should fail");
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("Not Found"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn dialog_submits_through_client() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 7,
                "file_no": 12,
                "reviewer": { "reviewer": "AB" },
                "status": { "status": "OPEN" },
                "remarks": ""
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/7"))
        .and(body_json(json!({ "data": { "file_no": 15 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bus = InvalidationBus::new();
    let mut dialog = EditTaskDialog::mount(bus.clone(), DialogSettings::default());

    dialog
        .open(client.fetch_record(7).await.expect("fetch"))
        .expect("open");
    dialog.set_input(FieldName::FileNo, "15").expect("edit");

    assert_eq!(dialog.submit(&client).await, SubmitOutcome::Saved);
    assert_eq!(dialog.phase(), DialogPhase::Closed);
    assert_eq!(bus.published(), 2);
}

#[tokio::test]
async fn dialog_stays_open_when_server_errors() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut dialog = EditTaskDialog::mount(InvalidationBus::new(), DialogSettings::default());
    dialog
        .open(taskedit_shared::TaskRecord::new(3))
        .expect("open");
    dialog.set_input(FieldName::Remarks, "blocked on vendor").expect("edit");

    assert_eq!(dialog.submit(&client).await, SubmitOutcome::Failed);
    assert_eq!(dialog.phase(), DialogPhase::Editing);
    let toasts = dialog.take_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].detail, FAILURE_FALLBACK);
}
