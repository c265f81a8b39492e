//! Tests for the HTTP module

use super::testing::{ok, too_many_requests, StubTransport};
use super::*;
use crate::auth::Credentials;
use crate::config::ClientOptions;
use crate::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_case::test_case;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher(stub: &Arc<StubTransport>, options: &ClientOptions) -> RequestDispatcher {
    RequestDispatcher::new(Arc::clone(stub) as Arc<dyn Transport>, options)
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(40));
    assert_eq!(config.base_url, "https://api.fivetran.com/v1/");
    assert!(config.credentials.is_none());
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .credentials(Credentials::new("key", "secret"))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.credentials.unwrap().api_key(), "key");
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_http_client_config_from_options() {
    let options = ClientOptions::builder()
        .timeout(Duration::from_secs(7))
        .user_agent("opts/1.0")
        .build();
    let config = HttpClientConfig::from_options("https://example.test/", &options);

    assert_eq!(config.base_url, "https://example.test/");
    assert_eq!(config.timeout, Duration::from_secs(7));
    assert_eq!(config.user_agent, "opts/1.0");
}

#[test]
fn test_transport_rejects_zero_timeout() {
    let config = HttpClientConfig::builder().timeout(Duration::ZERO).build();
    let err = ReqwestTransport::new(&config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_transport_build_url() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/v1")
        .build();
    let transport = ReqwestTransport::new(&config).unwrap();

    assert_eq!(transport.base_url().as_str(), "https://api.example.com/v1/");
    assert_eq!(
        transport.build_url("groups?limit=100").unwrap().as_str(),
        "https://api.example.com/v1/groups?limit=100"
    );
    assert_eq!(
        transport.build_url("/groups/g1/connectors").unwrap().as_str(),
        "https://api.example.com/v1/groups/g1/connectors"
    );
}

#[test]
fn test_retry_after_parsing() {
    assert_eq!(
        too_many_requests(Some("5")).retry_after(),
        Some(Duration::from_secs(5))
    );
    assert_eq!(
        too_many_requests(Some("0.01"))
            .retry_after()
            .map(|d| d.as_millis()),
        Some(10)
    );
    assert_eq!(too_many_requests(Some("-1")).retry_after(), None);
    assert_eq!(
        too_many_requests(Some("Wed, 21 Oct 2015 07:28:00 GMT")).retry_after(),
        None
    );
    assert_eq!(too_many_requests(None).retry_after(), None);
}

#[test_case("18446744073709551615", Some(MAX_RETRY_AFTER) ; "integer beyond ceiling is capped")]
#[test_case("1e30", Some(MAX_RETRY_AFTER) ; "huge float is capped")]
#[test_case("7200.5", Some(MAX_RETRY_AFTER) ; "fraction above ceiling is capped")]
#[test_case("3600", Some(MAX_RETRY_AFTER) ; "ceiling itself")]
#[test_case("inf", None ; "infinity")]
#[test_case("NaN", None ; "not a number")]
#[test_case("-0.5", None ; "negative fraction")]
#[test_case("", None ; "empty")]
fn test_retry_after_out_of_range(raw: &'static str, expected: Option<Duration>) {
    assert_eq!(too_many_requests(Some(raw)).retry_after(), expected);
}

// ============================================================================
// Reqwest Transport Tests
// ============================================================================

#[tokio::test]
async fn test_transport_sends_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .and(query_param("limit", "100"))
        .and(header("Authorization", "Basic a2V5OnNlY3JldA=="))
        .and(header("Accept", "application/json"))
        .and(header("User-Agent", "test-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\":null}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/v1/", mock_server.uri()))
        .credentials(Credentials::new("key", "secret"))
        .user_agent("test-agent/1.0")
        .build();
    let transport = ReqwestTransport::new(&config).unwrap();

    let response = transport.get("groups?limit=100").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"data\":null}");
}

#[tokio::test]
async fn test_transport_returns_error_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .build();
    let transport = ReqwestTransport::new(&config).unwrap();

    let response = transport.get("missing").await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.text(), "Not found");
}

#[tokio::test]
async fn test_transport_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .build();
    let transport = ReqwestTransport::new(&config).unwrap();

    let err = transport.get("slow").await.unwrap_err();
    assert!(matches!(err, Error::Http(ref e) if e.is_timeout()));
}

// ============================================================================
// Dispatcher: Retry Tests
// ============================================================================

#[tokio::test]
async fn test_dispatcher_retries_on_429_and_succeeds() {
    let stub = Arc::new(StubTransport::new(|_, call| {
        if call == 0 {
            too_many_requests(Some("0.01"))
        } else {
            ok(r#"{ "data": { "items": ["ok"], "next_cursor": null } }"#)
        }
    }));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());

    let response = dispatcher
        .get("testendpoint", &CancellationToken::new())
        .await
        .unwrap();

    assert!(response.text().contains("ok"));
    assert!(!response.from_cache);
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_dispatcher_gives_up_after_three_retries() {
    let stub = Arc::new(StubTransport::new(|_, _| too_many_requests(Some("0.01"))));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());

    let err = dispatcher
        .get("testendpoint", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::RateLimitExceeded { url, max_retries } => {
            assert_eq!(url, "testendpoint");
            assert_eq!(max_retries, 3);
        }
        other => panic!("Expected RateLimitExceeded, got {other:?}"),
    }
    assert_eq!(stub.calls(), 4);
}

#[tokio::test]
async fn test_dispatcher_default_backoff_without_retry_after() {
    let stub = Arc::new(StubTransport::new(|_, _| too_many_requests(None)));
    let dispatcher = Arc::new(dispatcher(&stub, &ClientOptions::default()));
    let cancel = CancellationToken::new();

    let task = {
        let dispatcher = Arc::clone(&dispatcher);
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.get("groups", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let remaining = dispatcher.retry_after_remaining().unwrap();
    assert!(remaining > Duration::from_secs(55));

    cancel.cancel();
    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_dispatcher_huge_retry_after_is_capped() {
    let stub = Arc::new(StubTransport::new(|_, _| {
        too_many_requests(Some("18446744073709551615"))
    }));
    let dispatcher = Arc::new(dispatcher(&stub, &ClientOptions::default()));
    let cancel = CancellationToken::new();

    let task = {
        let dispatcher = Arc::clone(&dispatcher);
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.get("groups", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let remaining = dispatcher.retry_after_remaining().unwrap();
    assert!(remaining <= MAX_RETRY_AFTER);
    assert!(remaining > MAX_RETRY_AFTER - Duration::from_secs(5));

    cancel.cancel();
    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_dispatcher_does_not_retry_other_failures() {
    let stub = Arc::new(StubTransport::new(|_, _| {
        HttpResponse::new(reqwest::StatusCode::NOT_FOUND, "Not found")
    }));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());
    let cancel = CancellationToken::new();

    let err = dispatcher.get("groups/missing", &cancel).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert_eq!(stub.calls(), 1);

    // Failures are never cached
    let _ = dispatcher.get("groups/missing", &cancel).await;
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_dispatcher_deadline_applies_to_other_urls() {
    let stub = Arc::new(StubTransport::new(|url, _| {
        if url == "throttled" {
            too_many_requests(Some("0.2"))
        } else {
            ok("{}")
        }
    }));
    let options = ClientOptions::builder().no_cache().build();
    let dispatcher = Arc::new(dispatcher(&stub, &options));
    let cancel = CancellationToken::new();

    let throttled = {
        let dispatcher = Arc::clone(&dispatcher);
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.get("throttled", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    let start = Instant::now();
    dispatcher.get("unrelated", &cancel).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(150));

    cancel.cancel();
    let _ = throttled.await.unwrap();
}

// ============================================================================
// Dispatcher: Cache Tests
// ============================================================================

#[tokio::test]
async fn test_dispatcher_caches_successful_responses() {
    let stub = Arc::new(StubTransport::new(|_, call| ok(&format!("{{\"call\":{call}}}"))));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());
    let cancel = CancellationToken::new();

    let first = dispatcher.get("groups?limit=100", &cancel).await.unwrap();
    let second = dispatcher.get("groups?limit=100", &cancel).await.unwrap();

    assert_eq!(stub.calls(), 1);
    assert_eq!(first.body, second.body);
    assert!(!first.from_cache);
    assert!(second.from_cache);
}

#[tokio::test]
async fn test_dispatcher_cache_is_keyed_by_full_url() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());
    let cancel = CancellationToken::new();

    dispatcher.get("groups?limit=100", &cancel).await.unwrap();
    dispatcher
        .get("groups?limit=100&cursor=abc", &cancel)
        .await
        .unwrap();

    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_dispatcher_refetches_after_ttl() {
    let stub = Arc::new(StubTransport::new(|_, call| ok(&format!("{{\"call\":{call}}}"))));
    let options = ClientOptions::builder()
        .cache_ttl(Duration::from_millis(30))
        .build();
    let dispatcher = dispatcher(&stub, &options);
    let cancel = CancellationToken::new();

    let first = dispatcher.get("groups", &cancel).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let second = dispatcher.get("groups", &cancel).await.unwrap();

    assert_eq!(stub.calls(), 2);
    assert_ne!(first.body, second.body);
    assert_eq!(dispatcher.purge_cache(), 0);
}

#[tokio::test]
async fn test_dispatcher_without_cache() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")));
    let options = ClientOptions::builder().no_cache().build();
    let dispatcher = dispatcher(&stub, &options);
    let cancel = CancellationToken::new();

    dispatcher.get("groups", &cancel).await.unwrap();
    dispatcher.get("groups", &cancel).await.unwrap();

    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_dispatcher_cache_hit_bypasses_gate() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")).with_delay(Duration::from_millis(50)));
    let options = ClientOptions::builder().max_concurrent_requests(1).build();
    let dispatcher = Arc::new(dispatcher(&stub, &options));
    let cancel = CancellationToken::new();

    dispatcher.get("groups", &cancel).await.unwrap();

    // Occupy the only permit with a slow uncached request
    let slow = {
        let dispatcher = Arc::clone(&dispatcher);
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.get("connectors", &cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(dispatcher.available_permits(), Some(0));

    let hit = tokio::time::timeout(
        Duration::from_millis(30),
        dispatcher.get("groups", &cancel),
    )
    .await
    .expect("cache hit waited for a permit")
    .unwrap();

    assert!(hit.from_cache);
    slow.await.unwrap().unwrap();
    assert_eq!(stub.calls(), 2);
}

// ============================================================================
// Dispatcher: Concurrency and Cancellation Tests
// ============================================================================

#[tokio::test]
async fn test_dispatcher_bounds_concurrent_calls() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")).with_delay(Duration::from_millis(30)));
    let options = ClientOptions::builder().max_concurrent_requests(2).build();
    let dispatcher = Arc::new(dispatcher(&stub, &options));
    let cancel = CancellationToken::new();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            let cancel = cancel.clone();
            tokio::spawn(async move { dispatcher.get(&format!("groups/{i}"), &cancel).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(stub.calls(), 8);
    assert!(stub.max_in_flight() <= 2);
    assert_eq!(dispatcher.available_permits(), Some(2));
}

#[tokio::test]
async fn test_dispatcher_unbounded_by_default() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")).with_delay(Duration::from_millis(30)));
    let dispatcher = Arc::new(dispatcher(&stub, &ClientOptions::default()));
    let cancel = CancellationToken::new();
    assert!(dispatcher.available_permits().is_none());

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            let cancel = cancel.clone();
            tokio::spawn(async move { dispatcher.get(&format!("groups/{i}"), &cancel).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(stub.max_in_flight(), 4);
}

#[tokio::test]
async fn test_dispatcher_cancelled_before_start() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = dispatcher.get("groups", &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_dispatcher_cancel_in_flight_releases_permit() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")).with_delay(Duration::from_secs(10)));
    let options = ClientOptions::builder().max_concurrent_requests(1).build();
    let dispatcher = Arc::new(dispatcher(&stub, &options));
    let cancel = CancellationToken::new();

    let task = {
        let dispatcher = Arc::clone(&dispatcher);
        let cancel = cancel.clone();
        tokio::spawn(async move { dispatcher.get("groups", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(dispatcher.available_permits(), Some(0));
    assert_eq!(stub.in_flight(), 1);

    cancel.cancel();
    let result = task.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(dispatcher.available_permits(), Some(1));
    assert_eq!(stub.in_flight(), 0);
    assert_eq!(stub.max_in_flight(), 1);
}

#[test]
fn test_dispatcher_debug() {
    let stub = Arc::new(StubTransport::new(|_, _| ok("{}")));
    let dispatcher = dispatcher(&stub, &ClientOptions::default());
    let debug_str = format!("{dispatcher:?}");
    assert!(debug_str.contains("RequestDispatcher"));
    assert!(debug_str.contains("cache_ttl"));
}
