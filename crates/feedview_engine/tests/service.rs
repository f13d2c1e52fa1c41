use std::time::Duration;

use feedview_core::{FetchFailure, SummarySource};
use feedview_engine::{ContentService, HttpContentService, ServiceError, ServiceSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> HttpContentService {
    HttpContentService::new(ServiceSettings {
        api_base: format!("{}/api", server.uri()),
        ..ServiceSettings::default()
    })
    .expect("client builds")
}

#[tokio::test]
async fn alternate_extraction_is_requested_by_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/extract"))
        .and(query_param("url", "https://site.com/story?id=7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Harbour reopens",
            "content": "<p>Full text</p>",
            "byline": "J. Doe",
            "siteName": "Site",
            "url": "https://site.com/story?id=7",
            "wordCount": 812,
            "fallback": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let extraction = service_for(&server)
        .fetch_alternate("https://site.com/story?id=7")
        .await
        .expect("extraction ok");

    assert_eq!(extraction.title, "Harbour reopens");
    assert_eq!(extraction.site_name.as_deref(), Some("Site"));
    assert_eq!(extraction.word_count, 812);
    assert!(!extraction.fallback);
    assert_eq!(extraction.error, None);
}

#[tokio::test]
async fn summary_is_requested_by_article_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/a1/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": ["First", "Second"],
            "source": "fallback",
            "reason": "model offline"
        })))
        .mount(&server)
        .await;

    let summary = service_for(&server)
        .fetch_summary("a1")
        .await
        .expect("summary ok");

    assert_eq!(summary.points, vec!["First".to_string(), "Second".to_string()]);
    assert_eq!(summary.source, SummarySource::Fallback);
    assert_eq!(summary.reason.as_deref(), Some("model offline"));
}

#[tokio::test]
async fn error_status_carries_the_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "paywall detected",
            "message": "Unprocessable Entity"
        })))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .fetch_alternate("https://site.com/locked")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::HttpStatus {
            status: 422,
            body: FetchFailure {
                error: Some("paywall detected".to_string()),
                message: Some("Unprocessable Entity".to_string()),
            },
        }
    );
}

#[tokio::test]
async fn error_status_without_json_body_has_no_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/a2/summary"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let failure = service_for(&server)
        .fetch_summary("a2")
        .await
        .unwrap_err()
        .into_failure();

    assert_eq!(failure, FetchFailure::default());
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/big/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(256)))
        .mount(&server)
        .await;

    let service = HttpContentService::new(ServiceSettings {
        api_base: format!("{}/api", server.uri()),
        max_bytes: 64,
        ..ServiceSettings::default()
    })
    .expect("client builds");

    let err = service.fetch_summary("big").await.unwrap_err();
    assert_eq!(err, ServiceError::TooLarge { max_bytes: 64 });
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/slow/summary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "points": ["late"] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let service = HttpContentService::new(ServiceSettings {
        api_base: format!("{}/api", server.uri()),
        request_timeout: Duration::from_millis(200),
        ..ServiceSettings::default()
    })
    .expect("client builds");

    let err = service.fetch_summary("slow").await.unwrap_err();
    assert_eq!(err, ServiceError::Timeout);
    assert_eq!(
        err.into_failure().reason_or("unused"),
        "request timed out"
    );
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/odd/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = service_for(&server).fetch_summary("odd").await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
}

#[tokio::test]
async fn unparseable_link_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = service_for(&server)
        .fetch_alternate("not a url")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidUrl(_)));
}
