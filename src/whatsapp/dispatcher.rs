//! Message Dispatcher
//!
//! Validates a draft, normalizes its destination, submits it and classifies
//! what came back. The dispatcher owns no state: clearing the draft after a
//! successful send is up to the caller.

use super::backend::{Backend, SendRequest};
use super::error::BackendError;
use super::number::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// Raw numbers must be 10 to 15 ASCII digits before normalization.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,15}$").expect("phone pattern is a valid regex"));

/// What the operator typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftMessage {
    pub raw_number: String,
    pub body: String,
}

impl DraftMessage {
    pub fn new(raw_number: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            raw_number: raw_number.into(),
            body: body.into(),
        }
    }
}

/// Why a send did not go through even though nothing broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing fields")]
    MissingFields,
    #[error("invalid phone number format")]
    InvalidNumberFormat,
    #[error("server did not confirm")]
    ServerDidNotConfirm,
}

/// Outcome of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Success { message_id: String },
    Rejected { reason: RejectReason },
    TransportFailure,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Local checks, first violation wins. Never touches the network.
pub fn validate(draft: &DraftMessage) -> Result<(), RejectReason> {
    if draft.raw_number.is_empty() || draft.body.is_empty() {
        return Err(RejectReason::MissingFields);
    }
    if !PHONE_PATTERN.is_match(&draft.raw_number) {
        return Err(RejectReason::InvalidNumberFormat);
    }
    Ok(())
}

/// Sends one message per call. Overlapping calls are the caller's problem.
#[derive(Clone)]
pub struct MessageDispatcher {
    backend: Arc<dyn Backend>,
}

impl MessageDispatcher {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn send(&self, draft: &DraftMessage) -> SendResult {
        if let Err(reason) = validate(draft) {
            tracing::debug!("WhatsApp send rejected locally: {}", reason);
            return SendResult::Rejected { reason };
        }

        let number = normalize(&draft.raw_number);
        let request = SendRequest {
            number: number.into_inner(),
            message: draft.body.clone(),
        };

        match self.backend.send(&request).await {
            Ok(reply) => match reply.confirmed_id() {
                Some(message_id) => {
                    tracing::debug!(
                        "WhatsApp message sent to {} (id={})",
                        request.number,
                        message_id
                    );
                    SendResult::Success { message_id }
                }
                None => {
                    tracing::debug!("WhatsApp send to {} not confirmed", request.number);
                    SendResult::Rejected {
                        reason: RejectReason::ServerDidNotConfirm,
                    }
                }
            },
            Err(BackendError::Decode(e)) => {
                tracing::warn!("WhatsApp send returned an unreadable reply: {}", e);
                SendResult::Rejected {
                    reason: RejectReason::ServerDidNotConfirm,
                }
            }
            Err(e) => {
                tracing::warn!("WhatsApp send failed: {}", e);
                SendResult::TransportFailure
            }
        }
    }
}
