//! Connection Monitor
//!
//! Polls backend readiness on a fixed interval and reports the operator's
//! view of the connection (connected, or disconnected with an optional QR
//! code to scan). Transport errors are swallowed here: a degraded status is
//! the only signal the operator gets.

use super::backend::{Backend, Readiness};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default time between two poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Connected, or disconnected with the pairing QR code if one is available.
///
/// A QR code is never held while connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    connected: bool,
    qr: Option<String>,
}

impl ConnectionState {
    pub fn connected() -> Self {
        Self {
            connected: true,
            qr: None,
        }
    }

    pub fn disconnected(qr: Option<String>) -> Self {
        Self {
            connected: false,
            qr,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn qr(&self) -> Option<&str> {
        self.qr.as_deref()
    }
}

/// Callback receiving every poll result.
type UpdateCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;

/// Periodic readiness poller.
pub struct ConnectionMonitor {
    backend: Arc<dyn Backend>,
    interval: Duration,
}

impl ConnectionMonitor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_interval(backend, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(backend: Arc<dyn Backend>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Run a single poll cycle without scheduling anything.
    pub async fn poll_once(&self) -> ConnectionState {
        poll_cycle(self.backend.as_ref()).await
    }

    /// Poll now and then every interval, handing each result to `on_update`.
    ///
    /// Cycles run as their own tasks, so a slow backend can make them
    /// overlap; the latest result to land wins. `on_update` must not stop
    /// the monitor it was registered with.
    pub fn start<F>(&self, on_update: F) -> MonitorHandle
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        let live = Arc::new(Mutex::new(true));
        let token = CancellationToken::new();
        let on_update: UpdateCallback = Arc::new(on_update);
        let backend = self.backend.clone();
        let interval = self.interval;

        tracing::info!(
            "WhatsApp connection monitor started (interval={}ms)",
            interval.as_millis()
        );

        let task = tokio::spawn({
            let live = live.clone();
            let token = token.clone();
            async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut cycles = JoinSet::new();

                loop {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            let backend = backend.clone();
                            let live = live.clone();
                            let on_update = on_update.clone();
                            cycles.spawn(async move {
                                let state = poll_cycle(backend.as_ref()).await;
                                apply(&live, &on_update, state);
                            });
                        }
                        Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                            if let Err(e) = joined
                                && e.is_panic()
                            {
                                tracing::error!("WhatsApp poll cycle panicked: {}", e);
                            }
                        }
                    }
                }

                cycles.abort_all();
            }
        });

        MonitorHandle { live, token, task }
    }
}

/// Handle to a running monitor. Stopping (or dropping) it silences the
/// callback for good.
pub struct MonitorHandle {
    live: Arc<Mutex<bool>>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop polling. Once this returns `on_update` will not be called again,
    /// even for a cycle whose request is still in flight.
    pub fn stop(&self) {
        let was_live = std::mem::replace(&mut *lock(&self.live), false);
        self.token.cancel();
        self.task.abort();
        if was_live {
            tracing::info!("WhatsApp connection monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        *lock(&self.live)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(live: &Mutex<bool>) -> MutexGuard<'_, bool> {
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The liveness lock is held across the callback so `stop` cannot slip in
/// between the check and the update.
fn apply(live: &Mutex<bool>, on_update: &UpdateCallback, state: ConnectionState) {
    let live = lock(live);
    if *live {
        on_update(state);
    }
}

/// Status first; the QR code is only fetched when the backend says it is
/// explicitly not ready.
async fn poll_cycle(backend: &dyn Backend) -> ConnectionState {
    let status = match backend.status().await {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!("WhatsApp status poll failed: {}", e);
            return ConnectionState::disconnected(None);
        }
    };

    match status.readiness() {
        Readiness::Ready => {
            tracing::debug!("WhatsApp backend ready");
            ConnectionState::connected()
        }
        Readiness::Unknown => {
            tracing::debug!("WhatsApp backend readiness unknown, treating as disconnected");
            ConnectionState::disconnected(None)
        }
        Readiness::NotReady => match backend.qr().await {
            Ok(reply) => {
                let qr = reply.into_payload();
                tracing::debug!("WhatsApp backend not ready (qr={})", qr.is_some());
                ConnectionState::disconnected(qr)
            }
            Err(e) => {
                tracing::debug!("WhatsApp QR fetch failed: {}", e);
                ConnectionState::disconnected(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_state_has_no_qr() {
        let state = ConnectionState::connected();
        assert!(state.is_connected());
        assert_eq!(state.qr(), None);
    }

    #[test]
    fn test_default_state_is_disconnected() {
        let state = ConnectionState::default();
        assert!(!state.is_connected());
        assert_eq!(state.qr(), None);
    }
}
