//! Topic consumer
//!
//! Declares one queue, binds it to every configured topic filter and hands
//! deliveries to a `MessageHandler` one at a time, in the order the broker
//! sent them. A lost connection ends consumption with an error; resuming is
//! up to the caller, who reconnects and listens again.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::session::BrokerSession;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::error::ListenerError;

/// Ordered, duplicate-free list of topic filters fixed for the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBinding {
    topics: Vec<String>,
}

impl TopicBinding {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for topic in topics {
            let topic = topic.into();
            if !unique.contains(&topic) {
                unique.push(topic);
            }
        }
        Self { topics: unique }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// One delivery from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub body: Vec<u8>,
    /// Token to acknowledge this delivery with.
    pub delivery_tag: u64,
    pub timestamp: i64,
}

/// What the consumer does with a delivery once the handler is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Leave the delivery unacknowledged.
    Leave,
}

#[async_trait]
pub trait MessageHandler: Send {
    async fn handle(&mut self, message: &InboundMessage) -> Disposition;
}

/// A bound, consuming queue on a borrowed session.
#[derive(Debug)]
pub struct Subscription<'a> {
    session: &'a mut BrokerSession,
    queue: String,
}

impl Subscription<'_> {
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Waits for the next delivery.
    pub async fn next(&mut self) -> Result<InboundMessage, ListenerError> {
        loop {
            match self.session.recv().await? {
                ServerMessage::Deliver {
                    topic,
                    payload,
                    delivery_tag,
                    timestamp,
                } => {
                    return Ok(InboundMessage {
                        topic,
                        body: payload.into_bytes(),
                        delivery_tag,
                        timestamp,
                    });
                }
                ServerMessage::Error { message } => return Err(ListenerError::Consume(message)),
                other => debug!(frame = ?other, "Ignoring broker frame while consuming"),
            }
        }
    }

    pub async fn ack(&mut self, delivery_tag: u64) -> Result<(), ListenerError> {
        self.session
            .send(&ClientMessage::Ack { delivery_tag })
            .await
    }
}

#[derive(Debug, Clone)]
pub struct TopicConsumer {
    binding: TopicBinding,
    queue: Option<String>,
}

impl TopicConsumer {
    /// `queue` fixes the queue name; `None` lets the broker pick one.
    pub fn new(binding: TopicBinding, queue: Option<String>) -> Self {
        Self { binding, queue }
    }

    pub fn binding(&self) -> &TopicBinding {
        &self.binding
    }

    /// Declares the queue, binds every topic and starts consuming.
    pub async fn subscribe<'a>(
        &self,
        session: &'a mut BrokerSession,
    ) -> Result<Subscription<'a>, ListenerError> {
        session
            .send(&ClientMessage::Declare {
                queue: self.queue.clone(),
            })
            .await?;
        let queue = match expect_reply(session).await? {
            ServerMessage::Declared { queue } => queue,
            other => return Err(unexpected("declared", &other)),
        };

        if self.binding.is_empty() {
            warn!(queue = %queue, "No topics configured; nothing will be delivered");
        }
        for topic in self.binding.topics() {
            session
                .send(&ClientMessage::Bind {
                    queue: queue.clone(),
                    topic: topic.clone(),
                })
                .await?;
            match expect_reply(session).await? {
                ServerMessage::Bound { .. } => debug!(queue = %queue, topic = %topic, "Bound topic"),
                other => return Err(unexpected("bound", &other)),
            }
        }

        session
            .send(&ClientMessage::Consume {
                queue: queue.clone(),
            })
            .await?;
        match expect_reply(session).await? {
            ServerMessage::Consuming { .. } => {}
            other => return Err(unexpected("consuming", &other)),
        }

        Ok(Subscription { session, queue })
    }

    /// Subscribes and feeds every delivery to `handler` until `cancel` fires
    /// or the connection fails.
    ///
    /// Cancellation is checked between messages, never while the handler is
    /// running. Returns `Ok(())` only when cancelled.
    pub async fn listen<H: MessageHandler>(
        &self,
        session: &mut BrokerSession,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> Result<(), ListenerError> {
        let mut subscription = self.subscribe(session).await?;
        info!(
            queue = subscription.queue(),
            topics = ?self.binding.topics(),
            "Listening for and consuming broker messages"
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stopping consumer");
                    return Ok(());
                }
                next = subscription.next() => next?,
            };

            debug!(topic = %message.topic, tag = message.delivery_tag, "Delivering message");
            if handler.handle(&message).await == Disposition::Ack {
                subscription.ack(message.delivery_tag).await?;
            }
        }
    }
}

async fn expect_reply(session: &mut BrokerSession) -> Result<ServerMessage, ListenerError> {
    match session.recv().await? {
        ServerMessage::Error { message } => Err(ListenerError::Protocol(message)),
        reply => Ok(reply),
    }
}

fn unexpected(wanted: &str, got: &ServerMessage) -> ListenerError {
    ListenerError::Protocol(format!("expected '{wanted}' reply, got {got:?}"))
}
