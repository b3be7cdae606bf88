//! PostgrestStore against a mock PostgREST server

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xss_core::NewRecord;
use xss_server::{PostgrestStore, RecordStore, StoreError};

const TABLE_PATH: &str = "/rest/v1/xss";

fn row(id: i64, url: &str, screenshot: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "url": url,
        "cookie": "sid=1",
        "screenshot": screenshot,
        "trigger_time": "2024-03-01 12:00:00"
    })
}

async fn store(server: &MockServer) -> PostgrestStore {
    PostgrestStore::new(&format!("{}/rest/v1", server.uri()), "anon-key", "xss").unwrap()
}

#[tokio::test]
async fn test_insert_returns_stored_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("prefer", "return=representation"))
        .and(query_param("select", "id,url,cookie,screenshot,trigger_time"))
        .and(body_json(json!([{
            "url": "https://victim.test/",
            "cookie": "sid=1",
            "screenshot": null,
            "trigger_time": "2024-03-01 12:00:00"
        }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(
            7,
            "https://victim.test/",
            None
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let inserted = store(&server)
        .await
        .insert(NewRecord {
            url: "https://victim.test/".to_string(),
            cookie: "sid=1".to_string(),
            screenshot: None,
            trigger_time: "2024-03-01 12:00:00".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(inserted.id, 7);
    assert_eq!(inserted.url, "https://victim.test/");
    assert_eq!(inserted.screenshot, None);
}

#[tokio::test]
async fn test_update_by_url_filters_on_url() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("url", "eq.https://victim.test/"))
        .and(body_json(json!({ "screenshot": "data:image/png;base64,QQ==" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row(1, "https://victim.test/", Some("data:image/png;base64,QQ==")),
            row(2, "https://victim.test/", Some("data:image/png;base64,QQ==")),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let updated = store(&server)
        .await
        .update_screenshot_by_url("https://victim.test/", Some("data:image/png;base64,QQ=="))
        .await
        .unwrap();

    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|r| r.has_screenshot()));
}

#[tokio::test]
async fn test_update_by_id_filters_on_id_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.5"))
        .and(query_param("url", "eq.https://victim.test/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let updated = store(&server)
        .await
        .update_screenshot_by_id(5, "https://victim.test/", None)
        .await
        .unwrap();
    assert!(updated.is_empty());
}

#[tokio::test]
async fn test_list_orders_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("order", "id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row(1, "https://a.test/", None),
            row(3, "https://b.test/", None),
        ])))
        .mount(&server)
        .await;

    let records = store(&server).await.list().await.unwrap();
    let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_delete_by_id_reports_whether_a_row_went() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.1"))
        .and(query_param("select", "id"))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "eq.2"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store(&server).await;
    assert!(store.delete_by_id(1).await.unwrap());
    assert!(!store.delete_by_id(2).await.unwrap());
}

#[tokio::test]
async fn test_delete_all_uses_never_matching_filter() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(TABLE_PATH))
        .and(query_param("id", "neq.-1"))
        .and(query_param("select", "id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(store(&server).await.delete_all().await.unwrap(), 2);
}

#[tokio::test]
async fn test_rejection_carries_postgrest_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "PGRST301",
            "message": "JWT expired"
        })))
        .mount(&server)
        .await;

    let store = store(&server).await;
    match store.list().await {
        Err(StoreError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "JWT expired");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(matches!(
        store.ping().await,
        Err(StoreError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store(&server).await;
    assert!(matches!(store.list().await, Err(StoreError::Malformed(_))));

    let inserted = store
        .insert(NewRecord {
            url: "https://a.test/".to_string(),
            cookie: "null".to_string(),
            screenshot: None,
            trigger_time: "2024-03-01 12:00:00".to_string(),
        })
        .await;
    assert!(matches!(inserted, Err(StoreError::Malformed(_))));
}

#[tokio::test]
async fn test_ping_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    store(&server).await.ping().await.unwrap();
}
