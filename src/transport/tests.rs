use super::message::{ClientMessage, ServerMessage};
use super::websocket::handle_frame;
use crate::broker::{Broker, Client};
use serde_json::json;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tungstenite::protocol::Message as WsMessage;

fn broker_with_client() -> (Mutex<Broker>, String, UnboundedReceiver<WsMessage>) {
    let mut broker = Broker::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let client = Client::new(tx);
    let id = client.id.clone();
    broker.register_client(client);
    (Mutex::new(broker), id, rx)
}

fn reply(rx: &mut UnboundedReceiver<WsMessage>) -> ServerMessage {
    match rx.try_recv().expect("expected a reply") {
        WsMessage::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected a text message, got {other:?}"),
    }
}

fn frame(value: serde_json::Value) -> ClientMessage {
    serde_json::from_value(value).expect("valid client frame")
}

#[test]
fn test_client_frames_parse() {
    assert_eq!(
        frame(json!({"type": "declare"})),
        ClientMessage::Declare { queue: None }
    );
    assert_eq!(
        frame(json!({"type": "ack", "delivery_tag": 3})),
        ClientMessage::Ack { delivery_tag: 3 }
    );
    assert!(serde_json::from_value::<ClientMessage>(json!({"type": "subscribe"})).is_err());
}

#[test]
fn test_deliver_frame_shape() {
    let text = serde_json::to_string(&ServerMessage::Deliver {
        topic: "log.INFO".to_string(),
        payload: "{}".to_string(),
        delivery_tag: 1,
        timestamp: 5,
    })
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["type"], "deliver");
    assert_eq!(value["delivery_tag"], 1);
}

#[test]
fn test_handle_declare_bind_consume() {
    let (broker, id, mut rx) = broker_with_client();

    handle_frame(&broker, &id, frame(json!({"type": "declare", "queue": "logs"})));
    assert_eq!(
        reply(&mut rx),
        ServerMessage::Declared {
            queue: "logs".to_string()
        }
    );

    handle_frame(
        &broker,
        &id,
        frame(json!({"type": "bind", "queue": "logs", "topic": "log.ERROR"})),
    );
    assert_eq!(
        reply(&mut rx),
        ServerMessage::Bound {
            queue: "logs".to_string(),
            topic: "log.ERROR".to_string()
        }
    );

    handle_frame(&broker, &id, frame(json!({"type": "consume", "queue": "logs"})));
    assert_eq!(
        reply(&mut rx),
        ServerMessage::Consuming {
            queue: "logs".to_string()
        }
    );
    assert!(broker.lock().unwrap().queue("logs").unwrap().consuming);
}

#[test]
fn test_handle_publish_and_ack() {
    let (broker, id, mut rx) = broker_with_client();
    handle_frame(&broker, &id, frame(json!({"type": "declare", "queue": "logs"})));
    handle_frame(
        &broker,
        &id,
        frame(json!({"type": "bind", "queue": "logs", "topic": "log.#"})),
    );
    handle_frame(&broker, &id, frame(json!({"type": "consume", "queue": "logs"})));
    for _ in 0..3 {
        reply(&mut rx);
    }

    handle_frame(
        &broker,
        &id,
        frame(json!({"type": "publish", "topic": "log.INFO", "payload": "hello"})),
    );
    let tag = match reply(&mut rx) {
        ServerMessage::Deliver {
            topic,
            payload,
            delivery_tag,
            ..
        } => {
            assert_eq!(topic, "log.INFO");
            assert_eq!(payload, "hello");
            delivery_tag
        }
        other => panic!("Expected a delivery, got {other:?}"),
    };

    handle_frame(&broker, &id, ClientMessage::Ack { delivery_tag: tag });
    assert!(rx.try_recv().is_err());
    assert_eq!(broker.lock().unwrap().unacked_count(), 0);
}

#[test]
fn test_handle_error_is_reported_to_client() {
    let (broker, id, mut rx) = broker_with_client();
    handle_frame(
        &broker,
        &id,
        frame(json!({"type": "bind", "queue": "missing", "topic": "log.INFO"})),
    );
    match reply(&mut rx) {
        ServerMessage::Error { message } => assert!(message.contains("missing")),
        other => panic!("Expected an error, got {other:?}"),
    }
}
