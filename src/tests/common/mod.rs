// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json};
use serde_json::Value;

use crate::cache::cache_key::TokenKind;
use crate::config::credentials::Credentials;

pub const TOKEN_PATH: &str = "/oauth2/v2.0/token";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Token endpoint double: answers each step with a configurable response
/// and records every form body it receives.
#[derive(Default)]
pub struct FakeTokenEndpoint {
    responses: Mutex<HashMap<TokenKind, (StatusCode, Value)>>,
    requests: Mutex<Vec<(TokenKind, HashMap<String, String>)>>,
}

impl FakeTokenEndpoint {
    pub fn respond(&self, kind: TokenKind, status: StatusCode, body: Value) {
        self.responses.lock().unwrap().insert(kind, (status, body));
    }

    pub fn respond_token(&self, kind: TokenKind, token: &str, expires_in: Option<u64>) {
        let body = match expires_in {
            Some(expires_in) => json!({"access_token": token, "expires_in": expires_in, "token_type": "Bearer"}),
            None => json!({"access_token": token, "token_type": "Bearer"}),
        };
        self.respond(kind, StatusCode::OK, body);
    }

    pub fn calls(&self, kind: TokenKind) -> usize {
        self.requests.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Form body of the most recent request for `kind`.
    pub fn last_request(&self, kind: TokenKind) -> Option<HashMap<String, String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, form)| form.clone())
    }

    fn classify(form: &HashMap<String, String>) -> TokenKind {
        match (form.get("grant_type").map(String::as_str), form.contains_key("client_assertion")) {
            (Some("user_fic"), _) => TokenKind::UserToken,
            (_, true) => TokenKind::AgentFic,
            _ => TokenKind::Blueprint,
        }
    }
}

async fn token_handler(
    State(endpoint): State<Arc<FakeTokenEndpoint>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let kind = FakeTokenEndpoint::classify(&form);
    endpoint.requests.lock().unwrap().push((kind, form));
    let response = endpoint.responses.lock().unwrap().get(&kind).cloned();
    match response {
        Some((status, body)) => (status, Json(body)),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "no response configured"}))),
    }
}

/// Start a fake token endpoint; returns it with its full token URL.
pub async fn spawn_token_endpoint() -> (Arc<FakeTokenEndpoint>, String, JoinHandle<()>) {
    let endpoint = Arc::new(FakeTokenEndpoint::default());
    let router = Router::new()
        .route(TOKEN_PATH, post(token_handler))
        .with_state(endpoint.clone());
    let (handle, addr) = spawn_axum(router).await;
    (endpoint, format!("http://{}{}", addr, TOKEN_PATH), handle)
}

pub fn credentials(token_endpoint: &str) -> Credentials {
    Credentials::new(token_endpoint, "B1", "S1", "A1", "U1")
}
