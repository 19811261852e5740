// src/sink.rs
//! Action delivery.
//!
//! The pipeline hands every action to an [`ActionSink`]. [`ActionQueue`] is
//! the cross-thread sink: the frame loop pushes, an independent consumer
//! drains it on its own schedule.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::mapper::Action;

pub trait ActionSink {
    fn deliver(&mut self, action: Action);
}

impl ActionSink for Vec<Action> {
    fn deliver(&mut self, action: Action) {
        self.push(action);
    }
}

/// Bounded FIFO shared between producer and consumer. When full, the oldest
/// pending action is dropped.
#[derive(Debug, Clone)]
pub struct ActionQueue {
    inner: Arc<Mutex<VecDeque<Action>>>,
    capacity: usize,
}

impl ActionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Action>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, action: Action) {
        let mut queue = self.lock();
        if queue.len() >= self.capacity {
            if let Some(dropped) = queue.pop_front() {
                warn!("Action queue full, dropping oldest {}", dropped.kind);
            }
        }
        queue.push_back(action);
    }

    /// Take every pending action in arrival order.
    pub fn drain(&self) -> Vec<Action> {
        self.lock().drain(..).collect()
    }

    /// Drain as a JSON array, the shape a polling client receives.
    pub fn drain_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.drain())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl ActionSink for ActionQueue {
    fn deliver(&mut self, action: Action) {
        self.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ActionKind;

    #[test]
    fn test_fifo_order() {
        let queue = ActionQueue::new(8);
        queue.push(Action::new(ActionKind::ZoomIn));
        queue.push(Action::new(ActionKind::Rotate));
        queue.push(Action::new(ActionKind::Select));
        let kinds: Vec<_> = queue.drain().into_iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::ZoomIn, ActionKind::Rotate, ActionKind::Select]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue = ActionQueue::new(2);
        queue.push(Action::new(ActionKind::ZoomIn));
        queue.push(Action::new(ActionKind::ZoomOut));
        queue.push(Action::new(ActionKind::Tilt));
        assert_eq!(queue.len(), 2);
        let kinds: Vec<_> = queue.drain().into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ActionKind::ZoomOut, ActionKind::Tilt]);
    }

    #[test]
    fn test_clones_share_the_queue() {
        let producer = ActionQueue::new(4);
        let consumer = producer.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..3 {
                producer.push(Action::new(ActionKind::PauseToggle));
            }
        });
        handle.join().unwrap();
        assert_eq!(consumer.drain().len(), 3);
    }

    #[test]
    fn test_drain_json() {
        let mut queue = ActionQueue::new(4);
        queue.deliver(Action::new(ActionKind::Select).with("position", "center"));
        assert_eq!(
            queue.drain_json().unwrap(),
            r#"[{"kind":"select","parameters":{"position":"center"}}]"#
        );
        assert_eq!(queue.drain_json().unwrap(), "[]");
    }
}
