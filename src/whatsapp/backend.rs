//! Backend Client
//!
//! The three HTTP endpoints exposed by the WhatsApp connection backend and
//! the [`Backend`] seam the monitor and dispatcher are written against.

use super::error::{BackendError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const STATUS_PATH: &str = "/whatsapp/status";
pub const QR_PATH: &str = "/whatsapp/qr";
pub const SEND_PATH: &str = "/whatsapp/send-test";

/// How the backend describes its messaging-channel connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// `ready: true`
    Ready,
    /// `ready: false`, a QR code should be waiting
    NotReady,
    /// Field missing, null, or not a boolean
    Unknown,
}

/// Body of `GET /whatsapp/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub ready: Option<serde_json::Value>,
}

impl StatusReply {
    pub fn readiness(&self) -> Readiness {
        match self.ready {
            Some(serde_json::Value::Bool(true)) => Readiness::Ready,
            Some(serde_json::Value::Bool(false)) => Readiness::NotReady,
            _ => Readiness::Unknown,
        }
    }
}

/// Body of `GET /whatsapp/qr`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrReply {
    #[serde(default)]
    pub qr: Option<String>,
}

impl QrReply {
    /// The QR payload, if the backend actually sent one.
    pub fn into_payload(self) -> Option<String> {
        self.qr.filter(|qr| !qr.is_empty())
    }
}

/// Body of `POST /whatsapp/send-test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest {
    pub number: String,
    pub message: String,
}

/// Reply to a send. Both fields are optional on the wire; the dispatcher
/// decides what counts as a confirmation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReply {
    #[serde(default)]
    pub success: Option<bool>,
    /// Usually a string, but some backends hand out numeric ids.
    #[serde(default)]
    pub message_id: Option<serde_json::Value>,
}

impl SendReply {
    /// The message id, only when the backend explicitly confirmed the send.
    pub fn confirmed_id(self) -> Option<String> {
        if self.success != Some(true) {
            return None;
        }
        match self.message_id? {
            serde_json::Value::String(id) if !id.is_empty() => Some(id),
            serde_json::Value::Number(id) if id.as_f64() != Some(0.0) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Operations the connection backend offers.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn status(&self) -> Result<StatusReply>;

    async fn qr(&self) -> Result<QrReply>;

    async fn send(&self, request: &SendRequest) -> Result<SendReply>;
}

/// [`Backend`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for `base_url` (e.g. `http://localhost:10000`).
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx is treated like a failed request; the body is only decoded on success.
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn status(&self) -> Result<StatusReply> {
        let resp = self.client.get(self.endpoint(STATUS_PATH)).send().await?;
        Self::read_json(resp).await
    }

    async fn qr(&self) -> Result<QrReply> {
        let resp = self.client.get(self.endpoint(QR_PATH)).send().await?;
        Self::read_json(resp).await
    }

    async fn send(&self, request: &SendRequest) -> Result<SendReply> {
        tracing::debug!("POST {} to {}", SEND_PATH, request.number);
        let resp = self
            .client
            .post(self.endpoint(SEND_PATH))
            .json(request)
            .send()
            .await?;
        Self::read_json(resp).await
    }
}
