//! wasend
//!
//! Operator client for a WhatsApp connection backend: watches the backend's
//! connection state (and pairing QR code) and sends single outbound
//! messages through it.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod notify;
pub mod whatsapp;

#[cfg(test)]
mod tests;
