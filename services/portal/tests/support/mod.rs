//! In-process mock of the school backend for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use common::MemoryStore;
use portal::navigation::{RecordingNavigator, RecordingNotifier};
use portal::{ApiClient, Dashboard, PortalConfig, SessionController, TokenStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// One request seen by the mock backend
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hits(Arc<Mutex<Vec<Hit>>>);

impl Hits {
    pub fn all(&self) -> Vec<Hit> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Hit {
        self.all().pop().expect("no request reached the backend")
    }
}

async fn record(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    hits.0.lock().unwrap().push(Hit {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        authorization: parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap().to_string()),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

pub struct MockBackend {
    pub api_url: String,
    pub hits: Hits,
}

impl MockBackend {
    /// Serve `router` (routes rooted at `/api`) on an ephemeral port
    pub async fn start(router: Router) -> Self {
        let hits = Hits::default();
        let app = router.layer(middleware::from_fn_with_state(hits.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            api_url: format!("http://{}/api", addr),
            hits,
        }
    }

    pub fn client(&self) -> (ApiClient, TokenStore, MemoryStore) {
        let memory = MemoryStore::new();
        let tokens = TokenStore::new(Arc::new(memory.clone()));
        let api = ApiClient::new(&PortalConfig::with_api_url(&self.api_url), tokens.clone()).unwrap();
        (api, tokens, memory)
    }
}

/// Controller wired to recording navigation and notifications
pub struct Harness<T> {
    pub subject: T,
    pub tokens: TokenStore,
    pub memory: MemoryStore,
    pub navigator: RecordingNavigator,
    pub notifier: RecordingNotifier,
}

pub fn session(backend: &MockBackend) -> Harness<SessionController> {
    let (api, tokens, memory) = backend.client();
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();
    let subject = SessionController::new(
        api,
        Arc::new(navigator.clone()),
        Arc::new(notifier.clone()),
        Duration::ZERO,
    );
    Harness {
        subject,
        tokens,
        memory,
        navigator,
        notifier,
    }
}

pub fn dashboard(backend: &MockBackend, download_dir: &std::path::Path) -> Harness<Dashboard> {
    let (api, tokens, memory) = backend.client();
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();
    let subject = Dashboard::new(
        api,
        Arc::new(navigator.clone()),
        Arc::new(notifier.clone()),
        download_dir,
    );
    Harness {
        subject,
        tokens,
        memory,
        navigator,
        notifier,
    }
}

pub fn document_json(id: i64, title: &str, document_type: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "document_type": document_type,
        "file_url": format!("/media/documents/{}.pdf", id),
        "uploaded_at": "2024-01-15T10:00:00Z",
        "is_verified": true,
        "file_size": 2048
    })
}
