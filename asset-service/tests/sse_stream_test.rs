mod common;

use axum::http::StatusCode;
use common::{import_body, TestApp};

/// Accumulate raw SSE bytes until `needle` shows up in the stream.
async fn read_until(response: &mut reqwest::Response, needle: &str) -> String {
    let mut seen = String::new();
    while !seen.contains(needle) {
        match response.chunk().await.expect("Failed to read SSE chunk") {
            Some(bytes) => seen.push_str(&String::from_utf8_lossy(&bytes)),
            None => break,
        }
    }
    seen
}

#[tokio::test]
async fn client_disconnect_cancels_the_in_flight_download() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    let slow = app.drive.seed_file("slow", "slow.png", "image/png", 100);
    let quick = app.drive.seed_file("quick", "quick.png", "image/png", 100);
    let gate = app.drive.stall_download("slow");

    let mut response = app
        .post_import(user_id, "standard", &import_body(&[&slow, &quick]))
        .await;
    assert_eq!(StatusCode::OK, response.status());

    let seen = read_until(&mut response, r#""status":"downloading""#).await;
    assert!(seen.contains("slow.png"));

    // Dropping the response closes the connection; the server-side drop
    // guard cancels the run while the first download is still stalled.
    drop(response);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    // Release the stalled download. A cancelled run discards the result;
    // only a broken one would carry on to the second file.
    gate.notify_one();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    assert_eq!(app.drive.downloads(), 1);
    assert_eq!(app.assets.count(), 0);
    assert_eq!(app.storage.object_count(), 0);
    assert!(app.audit.entries().await.is_empty());
}

#[tokio::test]
async fn files_stored_before_a_disconnect_are_kept() {
    let app = TestApp::spawn().await;
    let user_id = app.seed_importer();
    let quick = app.drive.seed_file("quick", "quick.png", "image/png", 100);
    let slow = app.drive.seed_file("slow", "slow.png", "image/png", 100);
    let never = app.drive.seed_file("never", "never.png", "image/png", 100);
    let _gate = app.drive.stall_download("slow");

    let mut response = app
        .post_import(user_id, "standard", &import_body(&[&quick, &slow, &never]))
        .await;
    assert_eq!(StatusCode::OK, response.status());

    // First file settles, second is mid-download when we walk away.
    read_until(&mut response, r#""status":"downloading","file":"slow.png""#).await;
    drop(response);
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    assert_eq!(app.assets.count(), 1);
    assert_eq!(app.storage.object_count(), 1);
    assert_eq!(app.audit.entries().await.len(), 1);
    // quick and slow both started; never was abandoned before any call.
    assert_eq!(app.drive.downloads(), 2);
}
