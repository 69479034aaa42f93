mod common;

use axum::http::StatusCode;
use common::{import_body, read_events, TestApp, TEST_TENANT_ID};
use serde_json::json;

async fn error_code(response: reqwest::Response) -> String {
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    body["code"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn an_empty_file_list_is_rejected_before_any_stream_starts() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();

    let body = json!({ "tenantId": TEST_TENANT_ID, "files": [] });
    let response = app.post_import(user_id, "standard", &body).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "EMPTY_FILE_LIST");
    assert_eq!(app.drive.downloads(), 0);
    assert_eq!(app.assets.count(), 0);
}

#[tokio::test]
async fn a_missing_or_non_positive_tenant_id_is_rejected() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    let files = json!([{ "id": "f1", "name": "logo.png", "mimeType": "image/png" }]);

    let response = app
        .post_import(user_id, "standard", &json!({ "files": files.clone() }))
        .await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "MISSING_TENANT_ID");

    let response = app
        .post_import(
            user_id,
            "standard",
            &json!({ "tenantId": 0, "files": files }),
        )
        .await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "MISSING_TENANT_ID");
}

#[tokio::test]
async fn malformed_bodies_come_back_as_invalid_request() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();

    // tenantId is typed, so a string here fails deserialization.
    let body = json!({
        "tenantId": "forty-two",
        "files": [{ "id": "f1", "name": "logo.png", "mimeType": "image/png" }]
    });
    let response = app.post_import(user_id, "standard", &body).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "INVALID_REQUEST");
}

#[tokio::test]
async fn files_without_an_id_are_rejected() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();

    let body = json!({
        "tenantId": TEST_TENANT_ID,
        "files": [{ "id": "", "name": "logo.png", "mimeType": "image/png" }]
    });
    let response = app.post_import(user_id, "standard", &body).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "MISSING_FILE_ID");
}

#[tokio::test]
async fn negative_declared_sizes_are_rejected() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();

    let body = json!({
        "tenantId": TEST_TENANT_ID,
        "files": [{ "id": "f1", "name": "logo.png", "mimeType": "image/png", "size": -5 }]
    });
    let response = app.post_import(user_id, "standard", &body).await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "INVALID_SIZE");
}

#[tokio::test]
async fn an_empty_file_list_outranks_a_missing_tenant() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();

    let response = app
        .post_import(user_id, "standard", &json!({ "files": [] }))
        .await;

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    assert_eq!(error_code(response).await, "EMPTY_FILE_LIST");
}

#[tokio::test]
async fn a_declared_oversize_file_fails_alone_without_touching_drive() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    // Limit in the test config is 1 MiB.
    let big = app
        .drive
        .seed_file("f1", "big.psd", "image/vnd.adobe.photoshop", 4 * 1024 * 1024);
    let small = app.drive.seed_file("f2", "logo.png", "image/png", 2048);

    let response = app
        .post_import(user_id, "standard", &import_body(&[&big, &small]))
        .await;
    assert_eq!(StatusCode::OK, response.status());

    let events = read_events(response).await;
    let error = events
        .iter()
        .find(|event| event["status"] == "error")
        .expect("no error event");
    assert!(error["error"]
        .as_str()
        .unwrap_or_default()
        .contains("maximum allowed size"));

    let finished = events.last().expect("no events");
    assert_eq!(finished["imported"], 1);
    assert_eq!(finished["failed"], 1);
    assert_eq!(finished["errors"].as_array().map(Vec::len), Some(1));

    // The rejected file never reached Drive; the good one did.
    assert_eq!(app.drive.downloads(), 1);
    assert_eq!(app.assets.count(), 1);
}

#[tokio::test]
async fn provider_metadata_size_overrules_a_lying_request() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    // Metadata says 4 MiB even though the request claims 100 bytes.
    app.drive
        .seed_file("f1", "sneaky.png", "image/png", 4 * 1024 * 1024);

    let body = json!({
        "tenantId": TEST_TENANT_ID,
        "files": [{ "id": "f1", "name": "sneaky.png", "mimeType": "image/png", "size": 100 }]
    });
    let response = app.post_import(user_id, "standard", &body).await;

    let events = read_events(response).await;
    let finished = events.last().expect("no finished event");
    assert_eq!(finished["failed"], 1);
    assert_eq!(app.drive.downloads(), 0);
    assert_eq!(app.assets.count(), 0);
}

#[tokio::test]
async fn provider_native_types_are_rejected_per_file() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    let doc = app.drive.seed_file(
        "f1",
        "notes",
        "application/vnd.google-apps.document",
        1000,
    );

    let response = app.post_import(user_id, "standard", &import_body(&[&doc])).await;

    let events = read_events(response).await;
    let error = events
        .iter()
        .find(|event| event["status"] == "error")
        .expect("no error event");
    assert_eq!(error["error"], "This file type cannot be imported");
    assert_eq!(app.drive.downloads(), 0);
}
