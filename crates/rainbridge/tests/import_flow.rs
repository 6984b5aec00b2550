//! End-to-end import runs over a scripted transport.
//!
//! Real `RaindropClient` and `KarakeepClient` instances talk to a router that
//! answers by method and path, so request construction, retry, pagination and
//! orchestration are exercised together.

use async_trait::async_trait;
use rainbridge::http::{ApiRequest, ApiResponse, Method, Sleeper, StatusCode, Transport};
use rainbridge::{
    FailurePhase, KarakeepClient, Orchestrator, Paginator, RaindropClient, RequestExecutor,
    Result,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const RAINDROP: &str = "http://raindrop.test/rest/v1";
const KARAKEEP: &str = "http://karakeep.test/api/v1";

/// Answers by `METHOD path[?page=N]`. Each route holds a queue; the last
/// response of a queue is repeated once the others are used up.
#[derive(Default)]
struct RouterTransport {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    log: Mutex<Vec<String>>,
}

impl RouterTransport {
    fn route(&self, key: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back((status, body.to_string()));
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn count(&self, key: &str) -> usize {
        self.log().iter().filter(|k| *k == key).count()
    }

    fn key(request: &ApiRequest) -> String {
        let mut key = format!("{} {}", request.method, request.path());
        if let Some(page) = request.query_param("page") {
            key.push_str(&format!("?page={}", page));
        }
        key
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let key = Self::key(request);
        self.log.lock().unwrap().push(key.clone());

        let mut routes = self.routes.lock().unwrap();
        let (status, body) = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => (404, "{}".to_string()),
        };
        Ok(ApiResponse::new(StatusCode::from_u16(status).unwrap(), body))
    }
}

#[derive(Default)]
struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

struct Harness {
    transport: Arc<RouterTransport>,
    sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    fn new() -> Self {
        Self {
            transport: Arc::new(RouterTransport::default()),
            sleeper: Arc::new(RecordingSleeper::default()),
        }
    }

    fn orchestrator(&self) -> Orchestrator {
        let executor = RequestExecutor::new(self.transport.clone(), self.sleeper.clone());
        let source = RaindropClient::new(RAINDROP, "rd", executor.clone())
            .with_paginator(Paginator::with_max_pages(Some(100)));
        let destination = KarakeepClient::new(KARAKEEP, "kk", executor);
        Orchestrator::new(Arc::new(source), Arc::new(destination))
    }
}

#[tokio::test]
async fn partial_failure_still_succeeds() {
    let h = Harness::new();
    let t = &h.transport;
    t.route(
        "GET /rest/v1/collections",
        200,
        r#"{"items": [{"_id": 7, "title": "Reading"}]}"#,
    );
    t.route(
        "GET /rest/v1/raindrops/7?page=0",
        200,
        r#"{"items": [
            {"_id": 1, "title": "first", "link": "https://one.example", "excerpt": null, "tags": []},
            {"_id": 2, "title": "second", "link": "https://two.example", "excerpt": "x", "tags": ["a"]}
        ]}"#,
    );
    t.route("GET /rest/v1/raindrops/7?page=1", 200, r#"{"items": []}"#);
    t.route("POST /api/v1/lists", 201, r#"{"id": "L1", "name": "Reading"}"#);
    t.route("POST /api/v1/bookmarks", 500, "{}");
    t.route("POST /api/v1/bookmarks", 201, r#"{"id": "B2", "url": "https://two.example"}"#);
    t.route("POST /api/v1/lists/L1/bookmarks/B2", 200, "{}");

    let report = h.orchestrator().run().await.unwrap();

    assert_eq!(report.items_total, 2);
    assert_eq!(report.items_created, 1);
    assert_eq!(report.items_failed, 1);
    assert_eq!(report.items_linked, 1);
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.failures[0].phase, FailurePhase::CreateItem);
    assert_eq!(
        report.failures[0].error,
        "failed to create bookmark: 500 Internal Server Error"
    );

    let link_calls: Vec<_> = t
        .log()
        .into_iter()
        .filter(|k| k.contains("/lists/") && k.contains("/bookmarks/"))
        .collect();
    assert_eq!(link_calls, vec!["POST /api/v1/lists/L1/bookmarks/B2"]);
    assert_eq!(t.count("GET /rest/v1/raindrops/7?page=0"), 1);
    assert_eq!(t.count("GET /rest/v1/raindrops/7?page=1"), 1);
}

#[tokio::test]
async fn no_folders_means_no_destination_calls() {
    let h = Harness::new();
    h.transport
        .route("GET /rest/v1/collections", 200, r#"{"items": []}"#);

    let report = h.orchestrator().run().await.unwrap();

    assert_eq!(h.transport.log(), vec!["GET /rest/v1/collections"]);
    assert_eq!(report.folders_total, 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn folder_listing_failure_is_fatal() {
    let h = Harness::new();
    h.transport
        .route("GET /rest/v1/collections", 503, "unavailable");

    let err = h.orchestrator().run().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to get collections: 503 Service Unavailable"
    );
    assert_eq!(h.transport.log().len(), 1);
}

#[tokio::test]
async fn rate_limited_requests_are_retried_transparently() {
    let h = Harness::new();
    let t = &h.transport;
    t.route("GET /rest/v1/collections", 429, "");
    t.route("GET /rest/v1/collections", 429, "");
    t.route(
        "GET /rest/v1/collections",
        200,
        r#"{"items": [{"_id": 0, "title": "Unsorted"}]}"#,
    );
    t.route("GET /rest/v1/raindrops/0?page=0", 200, r#"{"items": []}"#);
    t.route("POST /api/v1/lists", 201, r#"{"id": "L0", "name": "Unsorted"}"#);

    let report = h.orchestrator().run().await.unwrap();

    assert_eq!(t.count("GET /rest/v1/collections"), 3);
    let sleeps = h.sleeper.sleeps.lock().unwrap().clone();
    assert_eq!(sleeps.len(), 2);
    assert!(sleeps[0] >= Duration::from_secs(1) && sleeps[0] <= Duration::from_millis(1100));
    assert!(sleeps[1] >= Duration::from_secs(2) && sleeps[1] <= Duration::from_millis(2200));
    assert_eq!(report.folders_created, 1);
    assert_eq!(report.items_total, 0);
}

#[tokio::test]
async fn exhausted_rate_limit_on_item_is_recorded() {
    let h = Harness::new();
    let t = &h.transport;
    t.route(
        "GET /rest/v1/collections",
        200,
        r#"{"items": [{"_id": 3, "title": "Busy"}]}"#,
    );
    t.route(
        "GET /rest/v1/raindrops/3?page=0",
        200,
        r#"{"items": [{"_id": 9, "title": "throttled", "link": "https://t.example"}]}"#,
    );
    t.route("GET /rest/v1/raindrops/3?page=1", 200, r#"{"items": []}"#);
    t.route("POST /api/v1/lists", 201, r#"{"id": "L3", "name": "Busy"}"#);
    t.route("POST /api/v1/bookmarks", 429, "");

    let report = h.orchestrator().run().await.unwrap();

    assert_eq!(t.count("POST /api/v1/bookmarks"), 6);
    assert_eq!(report.items_failed, 1);
    assert_eq!(
        report.failures[0].error,
        "rate limited after 5 retries: 429 Too Many Requests"
    );
    assert_eq!(report.failures[0].url.as_deref(), Some("https://t.example"));
}

#[tokio::test]
async fn unmapped_folder_items_are_created_without_links() {
    let h = Harness::new();
    let t = &h.transport;
    t.route(
        "GET /rest/v1/collections",
        200,
        r#"{"items": [{"_id": 5, "title": "Dup"}]}"#,
    );
    t.route(
        "GET /rest/v1/raindrops/5?page=0",
        200,
        r#"{"items": [{"_id": 50, "title": "lonely", "link": "https://l.example"}]}"#,
    );
    t.route("GET /rest/v1/raindrops/5?page=1", 200, r#"{"items": []}"#);
    t.route("POST /api/v1/lists", 409, "{}");
    t.route("POST /api/v1/bookmarks", 201, r#"{"id": "B50"}"#);

    let report = h.orchestrator().run().await.unwrap();

    assert_eq!(report.folders_failed, 1);
    assert_eq!(report.items_created, 1);
    assert_eq!(report.items_linked, 0);
    assert!(!t.log().iter().any(|k| k.starts_with("POST /api/v1/lists/")));
}

#[tokio::test]
async fn dry_run_touches_only_the_source() {
    let h = Harness::new();
    let t = &h.transport;
    t.route(
        "GET /rest/v1/collections",
        200,
        r#"{"items": [{"_id": 1, "title": "A"}]}"#,
    );
    t.route(
        "GET /rest/v1/raindrops/1?page=0",
        200,
        r#"{"items": [{"_id": 10}, {"_id": 11}]}"#,
    );
    t.route("GET /rest/v1/raindrops/1?page=1", 200, r#"{"items": []}"#);

    let report = h.orchestrator().with_dry_run(true).run().await.unwrap();

    assert_eq!(report.items_total, 2);
    assert!(t.log().iter().all(|k| k.starts_with("GET /rest/v1/")));
    assert!(!t.log().iter().any(|k| k.starts_with(&Method::POST.to_string())));
}
