//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: cursor → HTTP data source → collection

use offset_infinity::{
    load_profile_from_str, Collection, CursorConfig, DataSourceError, Deferred, Error,
    HttpDataSource, LoadOutcome, NotAdvancing, PaginationCursor, PaginationEvent, StartOptions,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_body(ids: std::ops::Range<u64>, total: u64) -> serde_json::Value {
    json!({
        "items": ids.map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        "meta": { "totalCount": total }
    })
}

// ============================================================================
// Cursor over HTTP
// ============================================================================

#[tokio::test]
async fn test_http_pages_until_total_count() {
    let mock_server = MockServer::start().await;

    for (offset, ids) in [(0, 0..10), (10, 10..20), (20, 20..25), (30, 25..25)] {
        Mock::given(method("GET"))
            .and(path("/item"))
            .and(query_param("limit", "10"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(ids, 25)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let source = HttpDataSource::new(mock_server.uri()).unwrap();
    let items = Collection::new();
    let cursor = PaginationCursor::new(source, items.clone());

    let first = cursor
        .start("item", StartOptions::new().limit(10))
        .await
        .unwrap();
    assert_eq!(first.current_offset, 0);
    assert_eq!(first.total_count, Some(25));

    let mut offsets = Vec::new();
    while cursor.can_load_more() {
        if let LoadOutcome::Advanced(page) = cursor.load_next().await.unwrap() {
            offsets.push(page.current_offset);
        }
    }

    assert_eq!(offsets, vec![10, 20, 30]);
    assert_eq!(items.len(), 25);
    assert!(items.is_exhausted());
    assert_eq!(
        cursor.load_next().await.unwrap(),
        LoadOutcome::NotAdvancing(NotAdvancing::Exhausted)
    );
}

#[tokio::test]
async fn test_http_custom_params_and_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("per", "2"))
        .and(query_param("skip", "0"))
        .and(query_param("status", "published"))
        .and(query_param("tags", r#"["rust","async"]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1}, {"id": 2}],
            "pagination": {"total": "3"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("skip", "2"))
        .and(query_param("status", "published"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 3}],
            "pagination": {"total": "3"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("skip", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "pagination": {"total": "3"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = HttpDataSource::new(mock_server.uri())
        .unwrap()
        .with_records_field("data");
    let config = CursorConfig::new()
        .limit_param("per")
        .offset_param("skip")
        .total_count_param("pagination.total");
    let cursor = PaginationCursor::new(source, Collection::new()).with_config(config);

    let options = StartOptions::new()
        .limit(2)
        .param("status", "published")
        .param("tags", json!(["rust", "async"]));
    cursor.start("articles", options).await.unwrap();
    assert_eq!(cursor.total_count(), Some(3));

    assert!(cursor.load_next().await.unwrap().is_advanced());
    assert!(!cursor.is_exhausted());

    assert!(cursor.load_next().await.unwrap().is_advanced());
    assert!(cursor.is_exhausted());
    assert_eq!(
        cursor.sink().items(),
        vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]
    );
}

#[tokio::test]
async fn test_http_failure_then_retry_same_window() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..5, 10)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "5"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(5..10, 10)))
        .mount(&mock_server)
        .await;

    let source = HttpDataSource::new(mock_server.uri()).unwrap();
    let cursor = PaginationCursor::new(source, Collection::new());
    cursor
        .start("item", StartOptions::new().limit(5))
        .await
        .unwrap();

    let err = cursor.load_next().await.unwrap_err();
    assert!(matches!(
        err,
        Error::DataSource(DataSourceError::HttpStatus { status: 503, .. })
    ));
    assert_eq!(cursor.current_offset(), 0);
    assert_eq!(cursor.sink().len(), 5);
    assert!(!cursor.is_loading_more());

    let outcome = cursor.load_next().await.unwrap();
    assert_eq!(outcome.page().unwrap().current_offset, 5);
    assert_eq!(cursor.sink().len(), 10);
    assert!(cursor.can_load_more());
}

#[tokio::test]
async fn test_http_concurrent_load_next_fetches_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..10, 100)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(10..20, 100))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = HttpDataSource::new(mock_server.uri()).unwrap();
    let cursor = PaginationCursor::new(source, Collection::new());
    cursor
        .start("item", StartOptions::new().limit(10))
        .await
        .unwrap();

    let (first, second) = tokio::join!(cursor.load_next(), cursor.load_next());

    assert!(first.unwrap().is_advanced());
    assert_eq!(
        second.unwrap(),
        LoadOutcome::NotAdvancing(NotAdvancing::Busy)
    );
    assert_eq!(cursor.current_offset(), 10);
    assert_eq!(cursor.sink().len(), 20);
}

#[tokio::test]
async fn test_http_events_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, 3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/item"))
        .and(query_param("offset", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(3..3, 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let events = Arc::new(Deferred::new());
    let source = HttpDataSource::new(mock_server.uri()).unwrap();
    let cursor =
        PaginationCursor::new(source, Collection::new()).with_notifier(Arc::clone(&events));

    cursor
        .start("item", StartOptions::new().limit(3))
        .await
        .unwrap();
    assert!(cursor.load_next().await.unwrap().is_advanced());
    assert_eq!(
        cursor.load_next().await.unwrap(),
        LoadOutcome::NotAdvancing(NotAdvancing::Exhausted)
    );

    let taken = events.take();
    assert_eq!(taken.len(), 3);
    assert!(matches!(&taken[0], PaginationEvent::PageLoaded(p) if p.current_offset == 0));
    assert!(matches!(&taken[1], PaginationEvent::PageLoaded(p) if p.current_offset == 3));
    assert!(matches!(
        &taken[2],
        PaginationEvent::Complete(c) if c.total_count == Some(3)
    ));
}

// ============================================================================
// Profile → fetch
// ============================================================================

#[tokio::test]
async fn test_profile_driven_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .and(query_param("page_size", "2"))
        .and(query_param("start", "0"))
        .and(query_param("author", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "a"}, {"id": "b"}],
            "count": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "count": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let yaml = format!(
        r#"
base_url: {}/v1
model: posts
limit_param: page_size
offset_param: start
total_count_param: count
records_field: results
options:
  limit: 2
  author: 7
"#,
        mock_server.uri()
    );
    let profile = load_profile_from_str(&yaml).unwrap();

    let summary = offset_infinity::cli::fetch_all(&profile, None).await.unwrap();

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.total_count, Some(2));
    assert!(summary.exhausted);
    assert_eq!(summary.records, vec![json!({"id": "a"}), json!({"id": "b"})]);
}
