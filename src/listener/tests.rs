use super::{
    ConnectionManager, ConnectionState, DEFAULT_MAX_ATTEMPTS, Dialer, Disposition, InboundMessage,
    LogForwarder, MessageHandler, RetryDecision, TopicBinding, after_failure, backoff_delay,
};
use crate::connector::{Connector, ConnectorOutcome, LogPayload, Request};
use crate::utils::error::ListenerError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// Fails the first `failures` dials, then hands out the attempt count as the
// handle. Every dial instant is recorded.
struct FakeDialer {
    failures: u32,
    dials: Arc<Mutex<Vec<Instant>>>,
}

impl FakeDialer {
    fn new(failures: u32) -> (Self, Arc<Mutex<Vec<Instant>>>) {
        let dials = Arc::new(Mutex::new(Vec::new()));
        let dialer = Self {
            failures,
            dials: dials.clone(),
        };
        (dialer, dials)
    }
}

#[async_trait]
impl Dialer for FakeDialer {
    type Handle = u32;
    type Error = String;

    async fn dial(&self) -> Result<u32, String> {
        let attempt = {
            let mut dials = self.dials.lock().unwrap();
            dials.push(Instant::now());
            dials.len() as u32
        };
        if attempt <= self.failures {
            Err(format!("connection refused ({attempt})"))
        } else {
            Ok(attempt)
        }
    }
}

fn gaps(dials: &[Instant]) -> Vec<u64> {
    dials
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).as_secs())
        .collect()
}

#[test]
fn backoff_is_attempt_squared() {
    for n in 0..6u32 {
        assert_eq!(backoff_delay(n), Duration::from_secs(u64::from(n * n)));
    }
}

#[test]
fn after_failure_retries_until_budget_spent() {
    assert_eq!(
        after_failure(0, DEFAULT_MAX_ATTEMPTS),
        RetryDecision::Retry {
            next_attempt: 1,
            delay: Duration::ZERO
        }
    );
    assert_eq!(
        after_failure(3, DEFAULT_MAX_ATTEMPTS),
        RetryDecision::Retry {
            next_attempt: 4,
            delay: Duration::from_secs(9)
        }
    );
    assert_eq!(after_failure(5, DEFAULT_MAX_ATTEMPTS), RetryDecision::Exhausted);
    assert_eq!(after_failure(0, 0), RetryDecision::Exhausted);
}

#[tokio::test(start_paused = true)]
async fn connect_gives_up_after_six_attempts() {
    let (dialer, dials) = FakeDialer::new(u32::MAX);
    let mut manager = ConnectionManager::new(dialer, DEFAULT_MAX_ATTEMPTS);
    let cancel = CancellationToken::new();

    let err = manager.connect(&cancel).await.unwrap_err();
    match err {
        ListenerError::ConnectExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 6);
            assert_eq!(last_error, "connection refused (6)");
        }
        other => panic!("Expected ConnectExhausted, got {other:?}"),
    }
    assert!(matches!(manager.state(), ConnectionState::Exhausted));

    let dials = dials.lock().unwrap();
    assert_eq!(dials.len(), 6);
    assert_eq!(gaps(&dials), vec![0, 1, 4, 9, 16]);
}

#[tokio::test(start_paused = true)]
async fn connect_succeeds_after_transient_failures() {
    let (dialer, dials) = FakeDialer::new(2);
    let mut manager = ConnectionManager::new(dialer, DEFAULT_MAX_ATTEMPTS);
    let cancel = CancellationToken::new();

    let handle = manager.connect(&cancel).await.unwrap();
    assert_eq!(*handle, 3);
    assert!(manager.state().is_connected());
    assert_eq!(gaps(&dials.lock().unwrap()), vec![0, 1]);

    assert_eq!(manager.disconnect(), Some(3));
    assert!(matches!(manager.state(), ConnectionState::Disconnected));
    assert!(manager.handle_mut().is_none());
}

#[tokio::test(start_paused = true)]
async fn first_dial_success_does_not_wait() {
    let (dialer, _dials) = FakeDialer::new(0);
    let mut manager = ConnectionManager::new(dialer, DEFAULT_MAX_ATTEMPTS);
    let started = Instant::now();

    manager.connect(&CancellationToken::new()).await.unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_connect_never_dials() {
    let (dialer, dials) = FakeDialer::new(0);
    let mut manager = ConnectionManager::new(dialer, DEFAULT_MAX_ATTEMPTS);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = manager.connect(&cancel).await.unwrap_err();
    assert_eq!(err, ListenerError::Cancelled);
    assert!(dials.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_backoff() {
    let (dialer, dials) = FakeDialer::new(u32::MAX);
    let mut manager = ConnectionManager::new(dialer, DEFAULT_MAX_ATTEMPTS);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        trigger.cancel();
    });

    let err = manager.connect(&cancel).await.unwrap_err();
    assert_eq!(err, ListenerError::Cancelled);
    // Dials at t=0, t=0 and t=1; the 4 second backoff is cut short.
    assert_eq!(dials.lock().unwrap().len(), 3);
    assert!(matches!(manager.state(), ConnectionState::Disconnected));
}

#[test]
fn topic_binding_drops_duplicates_in_order() {
    let binding = TopicBinding::new(["log.INFO", "log.ERROR", "log.INFO"]);
    assert_eq!(binding.topics(), ["log.INFO", "log.ERROR"]);
    assert!(!binding.is_empty());
    assert!(TopicBinding::new(Vec::<String>::new()).is_empty());
}

struct RecordingConnector {
    outcome: ConnectorOutcome,
    seen: Mutex<Vec<Request>>,
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn call(&self, request: &Request) -> ConnectorOutcome {
        self.seen.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

fn recording(outcome: ConnectorOutcome) -> Arc<RecordingConnector> {
    Arc::new(RecordingConnector {
        outcome,
        seen: Mutex::new(Vec::new()),
    })
}

fn inbound(body: &str) -> InboundMessage {
    InboundMessage {
        topic: "log.ERROR".to_string(),
        body: body.as_bytes().to_vec(),
        delivery_tag: 7,
        timestamp: 0,
    }
}

#[tokio::test]
async fn log_forwarder_acks_accepted_events() {
    let connector = recording(ConnectorOutcome::Accepted(None));
    let mut handler = LogForwarder::new(connector.clone());

    let disposition = handler
        .handle(&inbound(r#"{"name":"event","data":"disk full"}"#))
        .await;

    assert_eq!(disposition, Disposition::Ack);
    let seen = connector.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![Request::Log(LogPayload {
            name: "event".to_string(),
            data: "disk full".to_string(),
        })]
    );
}

#[tokio::test]
async fn log_forwarder_leaves_rejected_events() {
    let connector = recording(ConnectorOutcome::Rejected {
        status: 500,
        reason: "down".to_string(),
    });
    let mut handler = LogForwarder::new(connector.clone());

    let disposition = handler
        .handle(&inbound(r#"{"name":"event","data":"x"}"#))
        .await;
    assert_eq!(disposition, Disposition::Leave);
    assert_eq!(connector.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn log_forwarder_skips_undecodable_bodies() {
    let connector = recording(ConnectorOutcome::Accepted(None));
    let mut handler = LogForwarder::new(connector.clone());

    assert_eq!(handler.handle(&inbound("not json")).await, Disposition::Leave);
    assert!(connector.seen.lock().unwrap().is_empty());
}
