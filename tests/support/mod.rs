#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
enum MockBody {
    Json(JsonValue),
    Html(String),
}

#[derive(Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: MockBody,
    delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body: MockBody::Json(body),
            delay: Duration::from_millis(0),
        }
    }

    /// Non-JSON body, like the pages a gateway serves in front of the model.
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: MockBody::Html(body.to_owned()),
            delay: Duration::from_millis(0),
        }
    }

    pub fn generated(text: &str) -> Self {
        Self::json(StatusCode::OK, json!([{ "generated_text": text }]))
    }

    pub fn loading(estimated_time: f64) -> Self {
        Self::json(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "error": "Model mistralai/Mistral-Nemo-Instruct-2407 is currently loading",
                "estimated_time": estimated_time
            }),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Headers, raw body and arrival time of one received request.
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
    pub received_at: Instant,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    hits: Arc<AtomicUsize>,
}

async fn model_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let received_at = Instant::now();
    state.hits.fetch_add(1, Ordering::SeqCst);

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    state
        .received
        .lock()
        .expect("received mutex must not be poisoned")
        .push(ReceivedRequest {
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
            body,
            received_at,
        });

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    match response.body {
        MockBody::Json(body) => (response.status, Json(body)).into_response(),
        MockBody::Html(body) => (
            response.status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
    }
}

pub struct MockModel {
    base_url: String,
    hits: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MockModel {
    pub fn model_url(&self) -> String {
        format!("{}/models/test-model", self.base_url)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received
            .lock()
            .expect("received mutex must not be poisoned")
            .clone()
    }
}

pub async fn spawn_model(responses: Vec<MockResponse>) -> MockModel {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        received: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/models/test-model", post(model_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    MockModel {
        base_url: format!("http://{address}"),
        hits: state.hits,
        received: state.received,
        task,
    }
}
