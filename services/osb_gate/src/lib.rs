pub mod api;
pub mod log;
pub mod outcome;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
    Json, Router,
};
use osb_core::Broker;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::log::ErrorLog;
use crate::outcome::Outcome;

/// Shared by every request. Holds no mutable state of its own.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<dyn Broker>,
    pub log: Arc<dyn ErrorLog>,
}

impl AppState {
    pub fn new(broker: Arc<dyn Broker>, log: Arc<dyn ErrorLog>) -> Self {
        Self { broker, log }
    }

    /// Write the outcome's log line, if any, then hand it back for the response.
    pub fn emit(&self, outcome: Outcome) -> Outcome {
        if let Some(ref line) = outcome.log {
            self.log.log_error(line);
        }
        outcome
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v2/catalog", get(api::catalog))
        .route(
            "/v2/service_instances/:instance_id",
            put(api::provision).delete(api::deprovision),
        )
        .route(
            "/v2/service_instances/:instance_id/service_bindings/:binding_id",
            put(api::bind).delete(api::unbind),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let resp = next.run(req).await;
    info!(%method, %path, status = resp.status().as_u16(), "request");
    resp
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({"ok": true}))
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    use osb_core::{
        BindError, Broker, Catalog, Credentials, DeprovisionError, InMemoryBroker,
        ProvisionError, ProvisionedInstance, UnbindError,
    };
    use serde_json::json;

    use super::AppState;
    use crate::log::ErrorLog;

    /// Spawn the server on a random port. Returns the address and a
    /// JoinHandle that keeps the server alive until dropped.
    pub async fn spawn_with(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let app = super::app(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, handle)
    }

    /// Spawn with an in-memory broker (demo catalog, instance limit 3).
    pub async fn spawn() -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let broker = Arc::new(InMemoryBroker::new(Catalog::demo(), 3));
        spawn_with(AppState::new(broker, Arc::new(RecordingLog::default()))).await
    }

    /// Keeps every error line in memory.
    #[derive(Clone, Default)]
    pub struct RecordingLog {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingLog {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().map(|l| l.clone()).unwrap_or_default()
        }

        pub fn contains(&self, line: &str) -> bool {
            let lines = self.lines();
            let found = lines.iter().any(|l| l == line);
            if !found {
                eprintln!("didn't find [{line}] in {lines:?}");
            }
            found
        }
    }

    impl ErrorLog for RecordingLog {
        fn log_error(&self, message: &str) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(message.to_string());
            }
        }
    }

    /// Succeeds unless an error is configured for the operation.
    #[derive(Default)]
    pub struct ScriptedBroker {
        pub catalog: Option<Catalog>,
        pub provision_error: Option<ProvisionError>,
        pub deprovision_error: Option<DeprovisionError>,
        pub bind_error: Option<BindError>,
        pub unbind_error: Option<UnbindError>,
    }

    impl Broker for ScriptedBroker {
        fn catalog(&self) -> Catalog {
            self.catalog.clone().unwrap_or_else(Catalog::demo)
        }

        fn provision(&self, _instance_id: &str) -> Result<ProvisionedInstance, ProvisionError> {
            match &self.provision_error {
                Some(e) => Err(e.clone()),
                None => Ok(ProvisionedInstance::new("https://dashboard.example.com")),
            }
        }

        fn deprovision(&self, _instance_id: &str) -> Result<(), DeprovisionError> {
            self.deprovision_error.clone().map_or(Ok(()), Err)
        }

        fn bind(&self, _instance_id: &str, _binding_id: &str) -> Result<Credentials, BindError> {
            if let Some(e) = &self.bind_error {
                return Err(e.clone());
            }
            let mut creds = Credentials::new();
            creds.insert(
                "credentials".into(),
                json!({"host": "127.0.0.1", "port": 3000, "username": "batman", "password": "robin"}),
            );
            Ok(creds)
        }

        fn unbind(&self, _instance_id: &str, _binding_id: &str) -> Result<(), UnbindError> {
            self.unbind_error.clone().map_or(Ok(()), Err)
        }
    }
}
