//! WhatsApp Backend Integration
//!
//! Talks to an external WhatsApp connection backend over HTTP: watches its
//! connection state and sends single outbound messages through it.

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod monitor;
pub mod number;
pub mod qr;

pub use backend::{Backend, HttpBackend, Readiness, SendRequest};
pub use dispatcher::{DraftMessage, MessageDispatcher, RejectReason, SendResult};
pub use error::BackendError;
pub use monitor::{ConnectionMonitor, ConnectionState, MonitorHandle};
pub use number::{NormalizedNumber, normalize};
pub use qr::QrPayload;
