//! Operator Notifications
//!
//! Transient notices shown after a send attempt. The kind and payload are
//! the contract; how a [`Notifier`] renders them is up to it.

use crate::whatsapp::{RejectReason, SendResult};
use std::fmt;

/// How alarming a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingFields,
    InvalidFormat,
    Sent { message_id: String },
    /// The backend answered but did not confirm the send.
    Rejected { reason: RejectReason },
    TransportFailure,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Sent { .. } => Severity::Success,
            Self::Rejected { .. } => Severity::Warning,
            Self::MissingFields | Self::InvalidFormat | Self::TransportFailure => Severity::Error,
        }
    }
}

impl From<&SendResult> for Notice {
    fn from(result: &SendResult) -> Self {
        match result {
            SendResult::Success { message_id } => Self::Sent {
                message_id: message_id.clone(),
            },
            SendResult::Rejected {
                reason: RejectReason::MissingFields,
            } => Self::MissingFields,
            SendResult::Rejected {
                reason: RejectReason::InvalidNumberFormat,
            } => Self::InvalidFormat,
            SendResult::Rejected { reason } => Self::Rejected { reason: *reason },
            SendResult::TransportFailure => Self::TransportFailure,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => f.write_str("Please fill all fields"),
            Self::InvalidFormat => f.write_str("Invalid phone number format"),
            Self::Sent { message_id } => write!(f, "✅ Message sent! ID: {message_id}"),
            Self::Rejected { reason } => write!(f, "⚠️ Message send failed ({reason})"),
            Self::TransportFailure => f.write_str("❌ Failed to send message"),
        }
    }
}

/// Where notices go.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to the terminal: successes on stdout, the rest on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::debug!(severity = ?notice.severity(), "notify: {}", notice);
        match notice.severity() {
            Severity::Success => println!("{notice}"),
            Severity::Warning | Severity::Error => eprintln!("{notice}"),
        }
    }
}
