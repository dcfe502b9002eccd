//! Test helper utilities: scripted generation clients and waiting helpers
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::{mpsc, oneshot};
use tower::ServiceExt;

use bulk_imaginator::models::settings::GenerationSettings;
use bulk_imaginator::services::generation::{GenerationClient, GenerationError};
use bulk_imaginator::services::job_store::{JobStore, StoreSnapshot};

use crate::fixtures;

pub const WAIT: Duration = Duration::from_secs(5);

/// One generation call held open until the test settles it.
pub struct Dispatch {
    pub prompt: String,
    pub settings: GenerationSettings,
    reply: oneshot::Sender<Result<String, GenerationError>>,
}

impl Dispatch {
    pub fn succeed(self, image_url: impl Into<String>) {
        let _ = self.reply.send(Ok(image_url.into()));
    }

    pub fn fail(self, message: &str) {
        let _ = self.reply.send(Err(GenerationError::Rejected(message.to_string())));
    }
}

/// Generation client whose calls are settled by the test.
pub struct ScriptedClient {
    calls: mpsc::UnboundedSender<Dispatch>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<Dispatch>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            calls,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        (client, rx)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let (reply, rx) = oneshot::channel();
        let _ = self.calls.send(Dispatch {
            prompt: prompt.to_string(),
            settings: *settings,
            reply,
        });
        let outcome = rx
            .await
            .unwrap_or_else(|_| Err(GenerationError::Rejected("dispatch dropped".to_string())));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Generation client that answers immediately with a PNG, or fails for
/// prompts containing "fail".
pub struct InstantClient;

#[async_trait]
impl GenerationClient for InstantClient {
    async fn generate(
        &self,
        prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        if prompt.contains("fail") {
            Err(GenerationError::Rejected(format!("could not draw: {prompt}")))
        } else {
            Ok(fixtures::png_data_uri())
        }
    }
}

/// Receive the next generation call, failing the test after [`WAIT`].
pub async fn next_dispatch(rx: &mut mpsc::UnboundedReceiver<Dispatch>) -> Dispatch {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no generation call was dispatched")
        .expect("client dropped")
}

/// Wait until the store satisfies `predicate`, failing the test after [`WAIT`].
pub async fn wait_for_store<F>(store: &JobStore, mut predicate: F) -> StoreSnapshot
where
    F: FnMut(&StoreSnapshot) -> bool,
{
    let mut rx = store.subscribe();
    let snapshot = tokio::time::timeout(WAIT, rx.wait_for(|s| predicate(s)))
        .await
        .expect("store did not reach the expected state")
        .expect("store closed")
        .clone();
    snapshot
}

/// Send a request through the router.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
