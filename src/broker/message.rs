use crate::transport::message::ServerMessage;

/// One message handed to one queue's consumer.
///
/// The `delivery_tag` is unique for the lifetime of the broker and is what
/// the consumer sends back to acknowledge the delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub queue: String,
    pub topic: String,
    pub payload: String,
    pub delivery_tag: u64,
    pub timestamp: i64,
}

impl From<&Delivery> for ServerMessage {
    fn from(delivery: &Delivery) -> Self {
        ServerMessage::Deliver {
            topic: delivery.topic.clone(),
            payload: delivery.payload.clone(),
            delivery_tag: delivery.delivery_tag,
            timestamp: delivery.timestamp,
        }
    }
}
