//! Integration tests for the request pipeline.
//!
//! These tests script the transport with [`FnTransport`] to observe how
//! interceptors, cancellation and configuration changes shape each request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use resource_client::{
    BaseUrl, ChainKind, Config, Fault, FnTransport, Method, Payload, Request, ResourceClient,
    ResourceError, ResourceNode, Response, Stage, TransportError,
};
use serde_json::json;
use tokio_test::{assert_pending, assert_ready, task};

/// Creates a client whose transport records every request and answers with
/// `reply`.
fn scripted(
    reply: impl Fn(&Request) -> Result<Response, TransportError> + Send + Sync + 'static,
) -> (ResourceClient, Arc<Mutex<Vec<Request>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let reply = Arc::new(reply);
    let config = Config::builder()
        .base_url_str("https://api.test")
        .build()
        .unwrap();
    config.set_transport(FnTransport::new(move |request: Request| {
        let outcome = reply(&request);
        log.lock().push(request);
        async move { outcome }
    }));
    (ResourceClient::new(config), seen)
}

fn ok(body: serde_json::Value) -> Result<Response, TransportError> {
    Ok(Response::json(200, &body))
}

// ============================================================================
// Laziness and late binding
// ============================================================================

#[tokio::test]
async fn test_nothing_is_sent_until_awaited() {
    let (client, seen) = scripted(|_| ok(json!({"id": 1})));
    let mut user = client.one("users", 1);

    let pending = user.get(None, None);
    tokio::task::yield_now().await;
    assert!(seen.lock().is_empty());

    pending.await.unwrap();
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn test_configuration_is_read_when_the_request_is_built() {
    let (client, seen) = scripted(|_| ok(json!({"id": 1})));
    let mut user = client.one("users", 1);

    let pending = user.get(None, None);
    client
        .config()
        .set_base_url(BaseUrl::new("https://other.test").unwrap());
    client.config().set_headers([("x-api-key", "late")]);
    pending.await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0].url, "https://other.test/users/1");
    assert_eq!(seen[0].headers.get("x-api-key"), Some("late"));
}

#[tokio::test]
async fn test_each_verb_call_sends_a_fresh_request() {
    let (client, seen) = scripted(|_| ok(json!({"id": 1})));
    let mut user = client.one("users", 1);

    user.get(None, None).await.unwrap();
    user.get(None, None).await.unwrap();

    assert_eq!(seen.lock().len(), 2);
}

// ============================================================================
// Interceptors
// ============================================================================

#[tokio::test]
async fn test_request_interceptors_fold_in_registration_order() {
    let (client, seen) = scripted(|_| ok(json!({})));
    client.config().add_request_interceptor(|request| {
        let mut request = request.clone();
        request.headers.set("h", "1");
        Ok(Stage::Replace(request))
    });
    client.config().add_request_interceptor(|request| {
        let mut request = request.clone();
        let first = request.headers.get("h").unwrap_or_default().to_string();
        request.headers.set("h2", format!("{first}+2"));
        Ok(Stage::Replace(request))
    });
    client.config().add_request_interceptor(|request| {
        let mut request = request.clone();
        Ok(Stage::pending(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            request.headers.set("h3", "async");
            Ok(Some(request))
        }))
    });
    let mut user = client.one("users", 1);

    user.get(None, None).await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0].headers.get("h"), Some("1"));
    assert_eq!(seen[0].headers.get("h2"), Some("1+2"));
    assert_eq!(seen[0].headers.get("h3"), Some("async"));
}

#[tokio::test]
async fn test_request_interceptor_edits_query_and_body_in_place() {
    let (client, seen) = scripted(|_| ok(json!({"id": 1})));
    client.config().add_request_interceptor(|request| {
        let mut request = request.clone();
        request.query.set("token", "abc");
        request.body = Payload::Text("signed".to_string());
        Ok(Stage::Replace(request))
    });
    let mut user = client.one("users", 1);

    user.put(Some(json!({"id": 1})), None, None).await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0].query.get("token"), Some("abc"));
    assert_eq!(seen[0].full_url(), "https://api.test/users/1?token=abc");
    assert_eq!(seen[0].content_type(), Some("text/plain;charset=UTF-8"));
}

#[tokio::test]
async fn test_response_interceptor_can_rewrite_the_response() {
    let (client, _seen) = scripted(|_| ok(json!({"data": {"id": 1, "name": "Ada"}})));
    client.config().add_response_interceptor(|response| {
        let body: serde_json::Value = serde_json::from_slice(&response.body)?;
        Ok(Stage::Replace(Response::json(response.status, &body["data"])))
    });
    let mut user = client.one("users", 1);

    user.get(None, None).await.unwrap();

    assert_eq!(user.plain(), json!({"id": 1, "name": "Ada"}));
}

#[tokio::test]
async fn test_error_interceptor_can_recover_a_failure() {
    let (client, _seen) = scripted(|_| Ok(Response::json(503, &json!({"error": "busy"}))));
    client.config().add_error_interceptor(|fault| {
        if fault.status() == Some(503) {
            let cached = Response::json(200, &json!({"id": 1, "cached": true}));
            return Ok(Stage::Replace(Fault::Resolved(cached)));
        }
        Ok(Stage::Pass)
    });
    let mut user = client.one("users", 1);

    user.get(None, None).await.unwrap();

    assert_eq!(user.field("cached"), Some(&json!(true)));
    assert!(user.from_server());
}

#[tokio::test]
async fn test_unrecovered_failures_are_not_swallowed() {
    let (client, _seen) = scripted(|_| Ok(Response::json(404, &json!({"message": "gone"}))));
    let observed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&observed);
    client.config().add_error_interceptor(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Stage::Pass)
    });
    let mut user = client.one("users", 1);

    let error = user.get(None, None).await.unwrap_err();

    assert_eq!(error.status(), Some(404));
    assert_eq!(error.to_string(), "Not Found: gone");
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_response_interceptor_failure_names_its_chain() {
    let (client, _seen) = scripted(|_| ok(json!({})));
    client
        .config()
        .add_response_interceptor(|_| Err("unexpected shape".into()));
    let mut user = client.one("users", 1);

    let error = user.get(None, None).await.unwrap_err();

    assert!(matches!(
        error,
        ResourceError::Interceptor {
            chain: ChainKind::Response,
            ..
        }
    ));
    assert_eq!(
        error.to_string(),
        "response interceptor failed: unexpected shape"
    );
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_abort_in_flight_invokes_the_callback_once() {
    let config = Config::builder()
        .base_url_str("https://api.test")
        .build()
        .unwrap();
    config.set_transport(FnTransport::new(|_: Request| {
        futures::future::pending::<Result<Response, TransportError>>()
    }));
    let aborted = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&aborted);
    config.set_abort_callback(move |request| log.lock().push(request.url.clone()));

    let client = ResourceClient::new(config);
    let mut user = client.one("users", 1);
    user.set_field("name", "Ada");

    let pending = user.get(None, None);
    let handle = pending.abort_handle();
    let mut task = task::spawn(pending);
    assert_pending!(task.poll());
    assert!(aborted.lock().is_empty());

    handle.abort();
    assert!(task.is_woken());
    let outcome = assert_ready!(task.poll());
    drop(task);

    assert!(matches!(outcome, Err(ResourceError::Cancelled)));
    assert_eq!(*aborted.lock(), vec!["https://api.test/users/1".to_string()]);
    assert_eq!(user.plain(), json!({"name": "Ada"}));
    assert!(!user.from_server());
}

#[tokio::test]
async fn test_dropping_an_in_flight_pipeline_invokes_the_callback() {
    let config = Config::default();
    config.set_transport(FnTransport::new(|_: Request| {
        futures::future::pending::<Result<Response, TransportError>>()
    }));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    config.set_abort_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut user = ResourceClient::new(config).one("users", 1);

    let result = tokio::time::timeout(Duration::from_millis(20), user.get(None, None)).await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_settled_pipeline_never_invokes_the_callback() {
    let (client, _seen) = scripted(|_| ok(json!({"id": 1})));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    client.config().set_abort_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut user = client.one("users", 1);

    let pending = user.get(None, None);
    let handle = pending.abort_handle();
    pending.await.unwrap();
    handle.abort();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Identity and cloning
// ============================================================================

#[tokio::test]
async fn test_clone_round_trip_keeps_the_original_intact() {
    let (client, seen) = scripted(|request| {
        let body: serde_json::Value = match &request.body {
            Payload::Json(s) => serde_json::from_str(s).unwrap(),
            _ => json!({}),
        };
        ok(body)
    });
    let mut original = client.one("users", 1);
    original.set_field("name", "Ada");

    let mut copy = original.clone_item();
    copy.set_field("name", "Grace");
    copy.put(None::<serde_json::Value>, None, None).await.unwrap();

    assert_eq!(original.field("name"), Some(&json!("Ada")));
    assert_eq!(copy.field("name"), Some(&json!("Grace")));
    assert_ne!(copy.uuid(), original.uuid());

    let seen = seen.lock();
    assert_eq!(seen[0].method, Method::Put);
    assert_eq!(seen[0].url, original.url());
}
