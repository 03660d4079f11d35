use crate::utils::error::BrokerError;

/// A topic filter a queue is bound with.
///
/// Topics and filters are dot-separated words. In a filter `*` stands for
/// exactly one word and `#` for zero or more words; every other word must
/// match literally, so `log.ERROR` only ever matches `log.ERROR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicFilter {
    pattern: String,
}

impl TopicFilter {
    pub fn parse(pattern: &str) -> Result<Self, BrokerError> {
        if pattern.is_empty() || pattern.split('.').any(str::is_empty) {
            return Err(BrokerError::InvalidFilter(pattern.to_string()));
        }
        Ok(Self {
            pattern: pattern.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, topic: &str) -> bool {
        let pattern: Vec<&str> = self.pattern.split('.').collect();
        let topic: Vec<&str> = topic.split('.').collect();
        matches_words(&pattern, &topic)
    }
}

// Row-by-row match table: `row[j]` is true when the filter words seen so far
// match the first `j` topic words. Runs in O(filter words * topic words).
fn matches_words(pattern: &[&str], topic: &[&str]) -> bool {
    let mut row = vec![false; topic.len() + 1];
    row[0] = true;

    for word in pattern {
        let mut next = vec![false; topic.len() + 1];
        match *word {
            "#" => {
                let mut reachable = false;
                for j in 0..=topic.len() {
                    reachable |= row[j];
                    next[j] = reachable;
                }
            }
            "*" => {
                for j in 1..=topic.len() {
                    next[j] = row[j - 1];
                }
            }
            literal => {
                for j in 1..=topic.len() {
                    next[j] = row[j - 1] && topic[j - 1] == literal;
                }
            }
        }
        if !next.contains(&true) {
            return false;
        }
        row = next;
    }

    row[topic.len()]
}
