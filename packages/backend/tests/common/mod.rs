#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;

use vocab_backend::config::Config;
use vocab_backend::services::{Clock, MasteryService};
use vocab_backend::store::{MasteryStore, MemoryStore};

pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn advance(&self, by: Duration) {
        let mut guard = self.0.lock();
        *guard = *guard + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

pub fn start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-09-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn create_test_app() -> (Router, Arc<TestClock>) {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn create_test_app_with_store(store: Arc<dyn MasteryStore>) -> (Router, Arc<TestClock>) {
    let clock = Arc::new(TestClock(Mutex::new(start_time())));
    let service = MasteryService::new(store, clock.clone());
    (vocab_backend::build_app(service, &Config::default()), clock)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_attempt(user: &str, word_id: &str, is_correct: bool) -> Request<Body> {
    let body = serde_json::json!({ "wordId": word_id, "isCorrect": is_correct });
    Request::builder()
        .method("POST")
        .uri("/api/v1/mastery/attempts")
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
