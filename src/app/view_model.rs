//! Wires the connection monitor, the dispatcher and the notifier to the
//! operator-facing [`ViewState`].

use super::state::ViewState;
use crate::notify::{Notice, Notifier};
use crate::whatsapp::{
    Backend, ConnectionMonitor, ConnectionState, MessageDispatcher, MonitorHandle, SendResult,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

pub struct ViewModel {
    state: Arc<Mutex<ViewState>>,
    monitor: ConnectionMonitor,
    dispatcher: MessageDispatcher,
    notifier: Arc<dyn Notifier>,
    connection_tx: watch::Sender<ConnectionState>,
    /// Present while mounted. Dropping it stops the monitor.
    monitor_handle: Option<MonitorHandle>,
}

impl ViewModel {
    pub fn new(
        backend: Arc<dyn Backend>,
        poll_interval: Duration,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (connection_tx, _) = watch::channel(ConnectionState::default());
        Self {
            state: Arc::new(Mutex::new(ViewState::default())),
            monitor: ConnectionMonitor::with_interval(backend.clone(), poll_interval),
            dispatcher: MessageDispatcher::new(backend),
            notifier,
            connection_tx,
            monitor_handle: None,
        }
    }

    /// Start watching the backend. Calling it twice is a no-op.
    pub fn mount(&mut self) {
        if self.monitor_handle.is_some() {
            return;
        }

        let state = self.state.clone();
        let connection_tx = self.connection_tx.clone();
        let handle = self.monitor.start(move |connection| {
            lock(&state).connection = connection.clone();
            connection_tx.send_if_modified(|current| {
                if *current == connection {
                    false
                } else {
                    *current = connection;
                    true
                }
            });
        });
        self.monitor_handle = Some(handle);
    }

    /// Stop watching the backend. No connection update lands after this returns.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.monitor_handle.take() {
            handle.stop();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.monitor_handle.is_some()
    }

    /// Receives the connection state whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.connection_tx.subscribe()
    }

    pub fn set_number(&self, number: impl Into<String>) {
        lock(&self.state).draft.raw_number = number.into();
    }

    pub fn set_message(&self, message: impl Into<String>) {
        lock(&self.state).draft.body = message.into();
    }

    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    /// Send the current draft and notify the operator of the outcome.
    ///
    /// Returns `None` without touching the backend if a send is already in
    /// flight. The message body is cleared after a confirmed send.
    pub async fn submit(&self) -> Option<SendResult> {
        let draft = {
            let mut state = lock(&self.state);
            if state.sending {
                tracing::debug!("Submit ignored: a send is already in flight");
                return None;
            }
            state.sending = true;
            state.draft.clone()
        };
        let _sending = SendingGuard(&self.state);

        let result = self.dispatcher.send(&draft).await;
        if result.is_success() {
            lock(&self.state).draft.body.clear();
        }
        self.notifier.notify(&Notice::from(&result));

        Some(result)
    }
}

/// Clears the `sending` flag however the submit ends.
struct SendingGuard<'a>(&'a Mutex<ViewState>);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).sending = false;
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
