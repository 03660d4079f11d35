//! Relay broker engine
//!
//! In-memory topic routing:
//! - clients declare exclusive queues and bind them to topic filters
//! - a published message is delivered once to every consuming queue with a
//!   matching binding, and dropped when nothing matches
//! - deliveries stay unacknowledged until the consumer acks their tag; each
//!   queue keeps at most `unacked_limit` of them and forgets the oldest first
//!
//! The API is synchronous and meant to sit behind `Arc<Mutex<Broker>>`.
//! Frames go out through each client's unbounded channel, so the lock is
//! never held across network I/O.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::client::{Client, ClientId};
use crate::broker::message::Delivery;
use crate::broker::queue::Queue;
use crate::broker::topic::TopicFilter;
use crate::transport::message::ServerMessage;
use crate::utils::error::BrokerError;

/// Unacknowledged deliveries tracked per queue before the oldest is dropped.
pub const DEFAULT_UNACKED_LIMIT: usize = 1024;

#[derive(Debug)]
pub struct Broker {
    clients: HashMap<ClientId, Client>,
    queues: HashMap<String, Queue>,
    unacked: HashMap<u64, Delivery>,
    // Outstanding tags per queue, oldest first.
    pending: HashMap<String, VecDeque<u64>>,
    unacked_limit: usize,
    next_tag: u64,
}

impl Default for Broker {
    fn default() -> Self {
        Self::with_unacked_limit(DEFAULT_UNACKED_LIMIT)
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A broker that tracks at most `limit` unacknowledged deliveries per
    /// queue. A limit of zero is treated as one.
    pub fn with_unacked_limit(limit: usize) -> Self {
        Self {
            clients: HashMap::new(),
            queues: HashMap::new(),
            unacked: HashMap::new(),
            pending: HashMap::new(),
            unacked_limit: limit.max(1),
            next_tag: 0,
        }
    }

    pub fn register_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    /// Sends one frame to a registered client. Unknown or closed clients are
    /// logged and skipped.
    pub fn send_to(&self, client_id: &str, frame: &ServerMessage) {
        let Some(client) = self.clients.get(client_id) else {
            warn!("No client registered with id: {client_id}");
            return;
        };
        let text = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize frame for {client_id}: {e}");
                return;
            }
        };
        if let Err(e) = client.sender.send(WsMessage::text(text)) {
            warn!("Failed to send to {client_id}: {e}");
        }
    }

    /// Creates a queue owned by `owner`. Re-declaring one of your own queues
    /// is a no-op; a name held by another connection is refused.
    pub fn declare(
        &mut self,
        owner: &str,
        name: Option<String>,
    ) -> Result<String, BrokerError> {
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => format!("amq.gen-{}", Uuid::new_v4()),
        };

        match self.queues.get(&name) {
            Some(queue) if queue.owner != owner => Err(BrokerError::QueueInUse(name)),
            Some(_) => Ok(name),
            None => {
                self.queues
                    .insert(name.clone(), Queue::new(&name, owner.to_string()));
                debug!("{owner} declared queue {name}");
                Ok(name)
            }
        }
    }

    pub fn bind(&mut self, owner: &str, queue: &str, topic: &str) -> Result<(), BrokerError> {
        let filter = TopicFilter::parse(topic)?;
        let queue = self.owned_queue_mut(owner, queue)?;
        queue.bind(filter);
        Ok(())
    }

    pub fn consume(&mut self, owner: &str, queue: &str) -> Result<(), BrokerError> {
        let queue = self.owned_queue_mut(owner, queue)?;
        queue.consuming = true;
        Ok(())
    }

    /// Routes a message to every consuming queue bound to `topic`.
    ///
    /// Returns how many deliveries were made.
    pub fn publish(&mut self, topic: &str, payload: &str) -> usize {
        let timestamp = chrono::Utc::now().timestamp_millis();

        let targets: Vec<(String, ClientId)> = self
            .queues
            .values()
            .filter(|q| q.consuming && q.accepts(topic))
            .map(|q| (q.name.clone(), q.owner.clone()))
            .collect();

        if targets.is_empty() {
            debug!("No queue bound to '{topic}', dropping message");
            return 0;
        }

        for (queue, owner) in &targets {
            self.next_tag += 1;
            let delivery = Delivery {
                queue: queue.clone(),
                topic: topic.to_string(),
                payload: payload.to_string(),
                delivery_tag: self.next_tag,
                timestamp,
            };
            self.send_to(owner, &ServerMessage::from(&delivery));
            self.track(delivery);
        }

        targets.len()
    }

    pub fn ack(&mut self, owner: &str, delivery_tag: u64) -> Result<(), BrokerError> {
        let owns = self
            .unacked
            .get(&delivery_tag)
            .and_then(|d| self.queues.get(&d.queue))
            .is_some_and(|q| q.owner == owner);
        if !owns {
            return Err(BrokerError::UnknownDeliveryTag(delivery_tag));
        }
        if let Some(delivery) = self.unacked.remove(&delivery_tag) {
            if let Some(tags) = self.pending.get_mut(&delivery.queue) {
                tags.retain(|&tag| tag != delivery_tag);
            }
        }
        Ok(())
    }

    pub fn unacked_count(&self) -> usize {
        self.unacked.len()
    }

    pub fn queue(&self, name: &str) -> Option<&Queue> {
        self.queues.get(name)
    }

    /// Cleans up a client by removing it, its queues and their pending
    /// deliveries.
    pub fn cleanup_client(&mut self, client_id: &str) {
        self.clients.remove(client_id);
        self.queues.retain(|_, q| q.owner != client_id);
        let queues = &self.queues;
        self.unacked.retain(|_, d| queues.contains_key(&d.queue));
        self.pending.retain(|name, _| queues.contains_key(name));
        debug!("Cleaned up client {client_id}");
    }

    fn track(&mut self, delivery: Delivery) {
        let tags = self.pending.entry(delivery.queue.clone()).or_default();
        tags.push_back(delivery.delivery_tag);
        let overflow = if tags.len() > self.unacked_limit {
            tags.pop_front()
        } else {
            None
        };
        if let Some(oldest) = overflow {
            warn!(
                "Queue {} has {} unacknowledged deliveries; forgetting tag {oldest}",
                delivery.queue, self.unacked_limit
            );
            self.unacked.remove(&oldest);
        }
        self.unacked.insert(delivery.delivery_tag, delivery);
    }

    fn owned_queue_mut(&mut self, owner: &str, name: &str) -> Result<&mut Queue, BrokerError> {
        match self.queues.get_mut(name) {
            Some(queue) if queue.owner == owner => Ok(queue),
            Some(_) => Err(BrokerError::QueueInUse(name.to_string())),
            None => Err(BrokerError::UnknownQueue(name.to_string())),
        }
    }
}
