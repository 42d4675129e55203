#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use hr_desk_api::auth::{generate_jwt, Claims};
use hr_desk_api::config::AppConfig;
use hr_desk_api::database::{DocumentStore, MemoryDocumentStore, Repository};
use hr_desk_api::models::{Address, Contact, Holiday, Others};
use hr_desk_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store, plus direct access to that store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_testing(SECRET))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let state = AppState::new(config, store.clone() as Arc<dyn DocumentStore>);
        Self {
            router: app(state.clone()),
            store,
            state,
        }
    }

    pub fn contacts(&self) -> Repository<Contact> {
        self.state.contacts()
    }

    pub fn holidays(&self) -> Repository<Holiday> {
        self.state.holidays()
    }

    /// Send a request and return `(status, json_body)`; empty bodies come back as `Null`
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        match body {
            Some(body) => {
                self.send_raw(method, uri, auth, Some("application/json"), body.to_string())
                    .await
            }
            None => self.send_raw(method, uri, auth, None, String::new()).await,
        }
    }

    /// Like `send`, but with an arbitrary body and optional content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, value))
    }

    pub async fn seed_contact(&self, contact: Contact) -> Result<Contact> {
        self.contacts().insert(&contact).await?;
        Ok(contact)
    }

    pub async fn seed_holiday(&self, holiday: Holiday) -> Result<Holiday> {
        self.holidays().insert(&holiday).await?;
        Ok(holiday)
    }
}

/// "Bearer <token>" signed with the test secret
pub fn bearer(role: Option<&str>) -> String {
    format!("Bearer {}", raw_token(role))
}

pub fn raw_token(role: Option<&str>) -> String {
    let claims = Claims::new("emp-1001", role.map(str::to_string), 1);
    generate_jwt(&claims, SECRET).expect("token should sign")
}

pub fn sample_address() -> Address {
    Address {
        address_line1: Some("12 MG Road".into()),
        address_line2: Some("Near Metro".into()),
        address_type: Some("home".into()),
        city: Some("Bengaluru".into()),
        state: Some("Karnataka".into()),
        postal_code: Some("560001".into()),
        country: Some("India".into()),
    }
}

pub fn sample_others() -> Others {
    Others {
        contact_type: Some("emergency".into()),
        channel_type: Some("phone".into()),
        value: Some("+91 98450 00000".into()),
    }
}

/// A server binary started on a free port with the in-memory backend
pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_hr-desk-api"))
            .env("APP_ENV", "development")
            .env("STORE_BACKEND", "memory")
            .env("SECRET_KEY", SECRET)
            .env("HR_API_HOST", "127.0.0.1")
            .env("HR_API_PORT", port.to_string())
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
