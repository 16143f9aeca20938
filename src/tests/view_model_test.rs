//! ViewModel tests
//!
//! Submit guard, draft handling, notifications and monitor lifecycle.

use super::fake_backend::{Canned, FakeBackend};
use crate::app::ViewModel;
use crate::notify::{Notice, Notifier};
use crate::whatsapp::{ConnectionState, RejectReason, SendResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const INTERVAL: Duration = Duration::from_secs(10);
const CONFIRMED: &str = r#"{"success":true,"messageId":"abc"}"#;

/// Keeps every notice for inspection.
#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

fn view_model(fake: &Arc<FakeBackend>) -> (ViewModel, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let vm = ViewModel::new(fake.clone(), INTERVAL, notifier.clone());
    (vm, notifier)
}

#[tokio::test]
async fn test_success_clears_body_and_notifies() {
    let fake = Arc::new(FakeBackend::new().with_send(Canned::Json(CONFIRMED)));
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");
    vm.set_message("hello");

    let result = vm.submit().await;

    assert_eq!(
        result,
        Some(SendResult::Success {
            message_id: "abc".to_string()
        })
    );
    let state = vm.snapshot();
    assert_eq!(state.draft.body, "");
    assert_eq!(state.draft.raw_number, "9876543210");
    assert!(!state.sending);
    assert_eq!(
        notifier.notices(),
        vec![Notice::Sent {
            message_id: "abc".to_string()
        }]
    );
}

#[tokio::test]
async fn test_missing_fields_notice_without_network() {
    let fake = Arc::new(FakeBackend::new().with_send(Canned::Json(CONFIRMED)));
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");

    let result = vm.submit().await;

    assert_eq!(
        result,
        Some(SendResult::Rejected {
            reason: RejectReason::MissingFields
        })
    );
    assert_eq!(notifier.notices(), vec![Notice::MissingFields]);
    assert_eq!(fake.send_calls(), 0);
    assert!(!vm.snapshot().sending);
}

#[tokio::test]
async fn test_invalid_format_notice() {
    let fake = Arc::new(FakeBackend::new().with_send(Canned::Json(CONFIRMED)));
    let (vm, notifier) = view_model(&fake);
    vm.set_number("+91 98765 43210");
    vm.set_message("hello");

    vm.submit().await;

    assert_eq!(notifier.notices(), vec![Notice::InvalidFormat]);
    assert_eq!(fake.send_calls(), 0);
    // the draft is left for the operator to fix
    assert_eq!(vm.snapshot().draft.body, "hello");
}

#[tokio::test]
async fn test_unconfirmed_send_keeps_body() {
    let fake = Arc::new(FakeBackend::new().with_send(Canned::Json(r#"{"success":true}"#)));
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");
    vm.set_message("hello");

    vm.submit().await;

    assert_eq!(
        notifier.notices(),
        vec![Notice::Rejected {
            reason: RejectReason::ServerDidNotConfirm
        }]
    );
    assert_eq!(vm.snapshot().draft.body, "hello");
}

#[tokio::test]
async fn test_transport_failure_resets_sending() {
    let fake = Arc::new(FakeBackend::new().with_send(Canned::Fail));
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");
    vm.set_message("hello");

    let result = vm.submit().await;

    assert_eq!(result, Some(SendResult::TransportFailure));
    assert_eq!(notifier.notices(), vec![Notice::TransportFailure]);
    let state = vm.snapshot();
    assert!(!state.sending);
    assert_eq!(state.draft.body, "hello");
}

#[tokio::test]
async fn test_submit_while_sending_is_noop() {
    let gate = Arc::new(Notify::new());
    let fake = Arc::new(
        FakeBackend::new()
            .with_send(Canned::Json(CONFIRMED))
            .gate_send(gate.clone()),
    );
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");
    vm.set_message("hello");

    let (first, second) = tokio::join!(vm.submit(), async {
        while fake.send_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(vm.snapshot().sending);
        assert!(!vm.snapshot().can_submit());
        let second = vm.submit().await;
        gate.notify_one();
        second
    });

    assert!(first.is_some_and(|r| r.is_success()));
    assert_eq!(second, None);
    assert_eq!(fake.send_calls(), 1);
    assert_eq!(notifier.notices().len(), 1);
    assert!(!vm.snapshot().sending);
}

#[tokio::test]
async fn test_dropped_submit_resets_sending() {
    let gate = Arc::new(Notify::new());
    let fake = Arc::new(
        FakeBackend::new()
            .with_send(Canned::Json(CONFIRMED))
            .gate_send(gate),
    );
    let (vm, notifier) = view_model(&fake);
    vm.set_number("9876543210");
    vm.set_message("hello");

    let timed_out = tokio::time::timeout(Duration::from_millis(20), vm.submit()).await;

    assert!(timed_out.is_err());
    assert!(!vm.snapshot().sending);
    assert!(notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_mount_feeds_connection_state() {
    let fake = Arc::new(
        FakeBackend::new()
            .with_status(Canned::Json(r#"{"ready":false}"#))
            .with_qr(Canned::Json(r#"{"qr":"data:image/png;base64,aGVsbG8="}"#)),
    );
    let (mut vm, _) = view_model(&fake);
    let mut connection = vm.subscribe();

    assert!(!vm.snapshot().is_connected());
    vm.mount();
    assert!(vm.is_mounted());

    connection.changed().await.unwrap();
    assert!(!connection.borrow_and_update().is_connected());
    assert_eq!(vm.snapshot().qr(), Some("data:image/png;base64,aGVsbG8="));

    fake.set_status(Canned::Json(r#"{"ready":true}"#));
    connection.changed().await.unwrap();
    assert_eq!(*connection.borrow_and_update(), ConnectionState::connected());
    assert!(vm.snapshot().is_connected());
    assert_eq!(vm.snapshot().qr(), None);

    vm.unmount();
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_updates() {
    let fake = Arc::new(FakeBackend::new().with_status(Canned::Json(r#"{"ready":true}"#)));
    let (mut vm, _) = view_model(&fake);

    vm.mount();
    // mounting twice does not start a second monitor
    vm.mount();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(vm.snapshot().is_connected());
    assert_eq!(fake.status_calls(), 1);

    vm.unmount();
    assert!(!vm.is_mounted());
    fake.set_status(Canned::Fail);
    tokio::time::sleep(INTERVAL * 3).await;

    assert_eq!(fake.status_calls(), 1);
    assert!(vm.snapshot().is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_view_model_stops_monitor() {
    let fake = Arc::new(FakeBackend::new().with_status(Canned::Json(r#"{"ready":true}"#)));
    let (mut vm, _) = view_model(&fake);

    vm.mount();
    tokio::time::sleep(Duration::from_millis(1)).await;
    drop(vm);

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(fake.status_calls(), 1);
}
