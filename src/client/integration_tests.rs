//! NetworkClient behaviour against a local mock server

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use wiremock::{
    matchers::{body_string_contains, method, path, query_param},
    Mock, MockServer, Request, ResponseTemplate,
};

fn test_client() -> NetworkClient {
    NetworkClient::new(
        Duration::from_millis(500),
        Duration::from_millis(500),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_get_reads_full_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/speedtest/random750x750.jpg"))
        .and(query_param("y", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
        .mount(&server)
        .await;

    let request = HttpRequest::get(format!("{}/speedtest/random750x750.jpg", server.uri()))
        .with_query("x", 1)
        .with_query("y", 1);
    let response = test_client().execute(request).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.body_size(), 4096);
}

#[tokio::test]
async fn test_post_form_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/speedtest/upload.php"))
        .and(body_string_contains("content0=QWERTY"))
        .respond_with(ResponseTemplate::new(200).set_body_string("size=15"))
        .mount(&server)
        .await;

    let request = HttpRequest::post_form(
        format!("{}/speedtest/upload.php", server.uri()),
        [("content0", "QWERTY")],
    );
    let response = test_client().execute(request).await.unwrap();

    assert_eq!(response.text(), "size=15");
}

#[tokio::test]
async fn test_non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let response = test_client()
        .execute(HttpRequest::get(server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status_code, 503);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let started = Instant::now();
    let result = test_client()
        .execute(HttpRequest::get(server.uri()).with_timeout(Duration::from_millis(200)))
        .await;

    assert!(matches!(result, Err(AppError::Timeout(_))), "got {:?}", result);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = test_client()
        .execute(HttpRequest::get(format!("http://{}/", addr)))
        .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().is_recoverable());
}

#[tokio::test]
async fn test_retry_policy_retries_timeouts() {
    let server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    Mock::given(method("GET"))
        .respond_with(move |_: &Request| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5))
            } else {
                ResponseTemplate::new(200).set_body_string("ok")
            }
        })
        .mount(&server)
        .await;

    let client = test_client().with_retry_policy(RetryPolicy::transient(2));
    let response = client
        .execute(HttpRequest::get(server.uri()).with_timeout(Duration::from_millis(300)))
        .await
        .unwrap();

    assert_eq!(response.text(), "ok");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
