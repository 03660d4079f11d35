use crate::broker::client::ClientId;
use crate::broker::topic::TopicFilter;

/// A queue on the relay broker.
///
/// Queues are exclusive to the connection that declared them and go away
/// with it. A queue only receives messages once its owner starts consuming.
#[derive(Debug)]
pub struct Queue {
    pub name: String,
    pub owner: ClientId,
    pub bindings: Vec<TopicFilter>,
    pub consuming: bool,
}

impl Queue {
    pub fn new(name: &str, owner: ClientId) -> Self {
        Self {
            name: name.to_string(),
            owner,
            bindings: Vec::new(),
            consuming: false,
        }
    }

    /// Adds a binding. Binding the same filter twice has no effect.
    pub fn bind(&mut self, filter: TopicFilter) {
        if !self.bindings.contains(&filter) {
            self.bindings.push(filter);
        }
    }

    /// True when any binding matches. Several matching bindings still mean
    /// a single delivery.
    pub fn accepts(&self, topic: &str) -> bool {
        self.bindings.iter().any(|filter| filter.matches(topic))
    }
}
