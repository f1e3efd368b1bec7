mod support;

use std::sync::Arc;

use portfolio::pages::Page;
use portfolio::storage::{JsonFileStore, MemoryStore};
use reqwest::StatusCode;
use support::{client, spawn_app, state, FailingStore, RecordingMailer, OWNER, SENDER};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn contact_form() -> [(&'static str, &'static str); 3] {
    [("name", "Ana"), ("email", "ana@x.com"), ("message", "Hola")]
}

#[tokio::test]
async fn every_page_is_served() {
    let base = spawn_app(state(Arc::new(MemoryStore::new()), Arc::new(RecordingMailer::default()))).await;

    for page in Page::ALL {
        let response = client().get(format!("{base}{}", page.path())).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", page.path());

        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"), "{}", page.path());

        let body = response.text().await.unwrap();
        assert!(body.contains("<html"), "{}", page.path());
    }
}

#[tokio::test]
async fn unknown_paths_render_not_found_page() {
    let base = spawn_app(state(Arc::new(MemoryStore::new()), Arc::new(RecordingMailer::default()))).await;

    for path in ["/nada", "/contacto/extra", "/gracias.html"] {
        let response = client().get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let body = response.text().await.unwrap();
        assert!(body.contains("La página que buscas no existe"), "{path}");
    }
}

#[tokio::test]
async fn submission_is_stored_notified_and_redirected() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let base = spawn_app(state(Arc::new(store.clone()), Arc::new(mailer.clone()))).await;
    let started = OffsetDateTime::now_utc();

    let response = client()
        .post(format!("{base}/contacto"))
        .form(&contact_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/gracias");

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ana");
    assert_eq!(records[0].email, "ana@x.com");
    assert_eq!(records[0].message, "Hola");
    assert!(records[0].received_at >= started);

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, SENDER);
    assert_eq!(sent[0].to, vec![OWNER]);
    assert!(sent[0].body.html().unwrap().contains("Mensaje: Hola"));
}

#[tokio::test]
async fn storage_failure_is_a_generic_500_without_notification() {
    let mailer = RecordingMailer::default();
    let base = spawn_app(state(Arc::new(FailingStore), Arc::new(mailer.clone()))).await;

    let response = client()
        .post(format!("{base}/contacto"))
        .form(&contact_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("location").is_none());
    let body = response.text().await.unwrap();
    assert_eq!(body, "Error interno del servidor.");
    assert!(!body.contains("read-only"));
    assert!(mailer.sent().await.is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_change_the_outcome() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::failing();
    let base = spawn_app(state(Arc::new(store.clone()), Arc::new(mailer.clone()))).await;

    let response = client()
        .post(format!("{base}/contacto"))
        .form(&contact_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/gracias");
    assert_eq!(store.records().await.len(), 1);
    assert_eq!(mailer.sent().await.len(), 1);
}

#[tokio::test]
async fn missing_fields_are_accepted_as_empty() {
    let store = MemoryStore::new();
    let base = spawn_app(state(Arc::new(store.clone()), Arc::new(RecordingMailer::default()))).await;

    let response = client()
        .post(format!("{base}/contacto"))
        .form(&[("name", "Ana")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let records = store.records().await;
    assert_eq!(records[0].name, "Ana");
    assert_eq!(records[0].email, "");
    assert_eq!(records[0].message, "");
}

#[tokio::test]
async fn bodyless_post_is_stored_as_empty_submission() {
    let store = MemoryStore::new();
    let mailer = RecordingMailer::default();
    let base = spawn_app(state(Arc::new(store.clone()), Arc::new(mailer.clone()))).await;

    let response = client().post(format!("{base}/contacto")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/gracias");
    let records = store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "");
    assert_eq!(records[0].email, "");
    assert_eq!(records[0].message, "");
    assert_eq!(mailer.sent().await.len(), 1);
}

#[tokio::test]
async fn non_form_body_is_stored_as_empty_submission() {
    let store = MemoryStore::new();
    let base = spawn_app(state(Arc::new(store.clone()), Arc::new(RecordingMailer::default()))).await;

    let response = client()
        .post(format!("{base}/contacto"))
        .json(&serde_json::json!({ "name": "Ana" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(store.records().await[0].name, "");
}

#[tokio::test]
async fn file_store_record_is_stamped_after_request_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("contacts.json");
    let base = spawn_app(state(
        Arc::new(JsonFileStore::new(&path)),
        Arc::new(RecordingMailer::default()),
    ))
    .await;
    let started = OffsetDateTime::now_utc();

    let response = client()
        .post(format!("{base}/contacto"))
        .form(&contact_form())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);

    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["name"], "Ana");
    assert_eq!(record["email"], "ana@x.com");
    assert_eq!(record["message"], "Hola");

    let id = record["id"].as_i64().expect("integer id");
    let received_at =
        OffsetDateTime::parse(record["receivedAt"].as_str().unwrap(), &Rfc3339).unwrap();
    assert!(received_at >= started);
    assert!(received_at <= OffsetDateTime::now_utc());
    assert_eq!(id, (received_at.unix_timestamp_nanos() / 1_000_000) as i64);
}

#[tokio::test]
async fn concurrent_submissions_to_file_store_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.json");
    let mailer = RecordingMailer::default();
    let base = spawn_app(state(Arc::new(JsonFileStore::new(&path)), Arc::new(mailer.clone()))).await;
    let client = client();

    let requests = (0..10).map(|i| {
        let client = client.clone();
        let url = format!("{base}/contacto");
        async move {
            client
                .post(url)
                .form(&[("name", format!("User{i}")), ("email", format!("user{i}@x.com")), ("message", "Hola".to_string())])
                .send()
                .await
                .unwrap()
                .status()
        }
    });
    let handles: Vec<_> = requests.map(tokio::spawn).collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::FOUND);
    }

    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 10);
    for record in &records {
        for key in ["id", "name", "email", "message", "receivedAt"] {
            assert!(record.get(key).is_some(), "missing {key} in {record}");
        }
    }
    assert_eq!(mailer.sent().await.len(), 10);
}
