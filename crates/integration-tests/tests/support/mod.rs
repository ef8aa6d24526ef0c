use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chat_widget::{ChatController, HttpCompletionConfig, HttpCompletionGateway};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

/// One scripted endpoint reply, consumed in order.
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
}

/// Completion content returned as the successful first choice.
pub fn content_reply(content: &str) -> ScriptedReply {
    ScriptedReply {
        status: StatusCode::OK,
        body: json!({
            "choices": [{ "message": { "content": content } }]
        }),
        delay: Duration::ZERO,
    }
}

pub fn structured_reply(reply: &str, suggestions: &[&str], topic: &str) -> ScriptedReply {
    content_reply(
        &json!({
            "reply": reply,
            "suggestions": suggestions,
            "topic": topic
        })
        .to_string(),
    )
}

pub fn endpoint_error(status: StatusCode, code: &str) -> ScriptedReply {
    ScriptedReply {
        status,
        body: json!({ "error": { "code": code } }),
        delay: Duration::ZERO,
    }
}

#[derive(Debug, Clone)]
pub struct MockEndpointState {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    seen_bodies: Arc<Mutex<Vec<Value>>>,
}

impl MockEndpointState {
    /// Request bodies the endpoint received, in order.
    pub async fn seen_bodies(&self) -> Vec<Value> {
        self.seen_bodies.lock().await.clone()
    }
}

pub struct MockEndpoint {
    pub state: MockEndpointState,
    pub url: String,
    shutdown_tx: oneshot::Sender<()>,
    server_task: tokio::task::JoinHandle<()>,
}

impl MockEndpoint {
    pub async fn start(replies: Vec<ScriptedReply>) -> Self {
        let state = MockEndpointState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_bodies: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/chat", post(chat_handler))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            server.await.expect("mock endpoint should run");
        });

        Self {
            state,
            url: format!("http://{local_addr}/api/chat"),
            shutdown_tx,
            server_task,
        }
    }

    pub async fn shutdown(self) {
        self.shutdown_tx
            .send(())
            .expect("shutdown signal should send");
        self.server_task
            .await
            .expect("mock endpoint task should join");
    }
}

async fn chat_handler(
    State(state): State<MockEndpointState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen_bodies.lock().await.push(payload);

    let reply = state
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or(ScriptedReply {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": { "code": "exhausted_scripted_replies" } }),
            delay: Duration::ZERO,
        });

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (reply.status, Json(reply.body))
}

/// Controller wired to the mock endpoint over the real HTTP transport.
pub fn controller_for(
    endpoint: &MockEndpoint,
    timeout_ms: u64,
    max_retries: u32,
) -> ChatController {
    let gateway = HttpCompletionGateway::new(HttpCompletionConfig {
        chat_url: endpoint.url.clone(),
        api_key: None,
        timeout_ms,
        max_retries,
        retry_base_backoff_ms: 0,
    })
    .expect("gateway should build");

    ChatController::new(Arc::new(gateway))
}
