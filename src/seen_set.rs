use std::collections::{HashSet, VecDeque};

use log::debug;

/// Identifiers of messages already reported by this process.
///
/// Unbounded by default. With a capacity, the oldest identifier is evicted
/// once the set grows past it.
#[derive(Debug, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: Option<usize>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        SeenSet {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if !self.ids.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());

        if let Some(capacity) = self.capacity {
            while self.order.len() > capacity {
                if let Some(oldest) = self.order.pop_front() {
                    debug!("Seen set full, forgetting {}", oldest);
                    self.ids.remove(&oldest);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
