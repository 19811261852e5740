// src/diagnostics.rs
//! Recent-event history and per-tick timing.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

use crate::gesture::GestureEvent;

/// Ring buffer of the most recently emitted events, oldest first.
#[derive(Debug, Clone)]
pub struct GestureHistory {
    events: VecDeque<GestureEvent>,
    capacity: usize,
}

impl GestureHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: GestureEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureEvent> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&GestureEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Rolling average of processing time over the last `window` ticks.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    /// Ticks per second the pipeline could sustain at the current cost.
    pub avg_fps: f64,
    /// Seconds.
    pub avg_processing_time: f64,
    pub ticks: u64,
    #[serde(skip)]
    frame_times: VecDeque<f64>,
    #[serde(skip)]
    window: usize,
}

impl PerformanceMetrics {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            ticks: 0,
            frame_times: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.ticks += 1;
        self.frame_times.push_front(elapsed.as_secs_f64());
        if self.frame_times.len() > self.window {
            self.frame_times.pop_back();
        }

        self.avg_processing_time =
            self.frame_times.iter().sum::<f64>() / self.frame_times.len() as f64;
        self.avg_fps = if self.avg_processing_time > 0.0 {
            1.0 / self.avg_processing_time
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureKind, GestureParameters};

    fn event(timestamp: f64) -> GestureEvent {
        GestureEvent {
            kind: GestureKind::Tap,
            confidence: 0.5,
            timestamp,
            parameters: GestureParameters::default(),
        }
    }

    #[test]
    fn test_history_keeps_latest() {
        let mut history = GestureHistory::new(3);
        for i in 0..5 {
            history.push(event(i as f64));
        }
        assert_eq!(history.len(), 3);
        let stamps: Vec<f64> = history.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![2.0, 3.0, 4.0]);
        assert_eq!(history.latest().map(|e| e.timestamp), Some(4.0));
    }

    #[test]
    fn test_metrics_average_over_window() {
        let mut metrics = PerformanceMetrics::new(2);
        metrics.record(Duration::from_millis(10));
        metrics.record(Duration::from_millis(20));
        metrics.record(Duration::from_millis(40));
        assert_eq!(metrics.ticks, 3);
        assert!((metrics.avg_processing_time - 0.030).abs() < 1e-9);
        assert!((metrics.avg_fps - 1.0 / 0.030).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_does_not_divide_by_zero() {
        let mut metrics = PerformanceMetrics::new(4);
        metrics.record(Duration::ZERO);
        assert_eq!(metrics.avg_fps, 0.0);
    }
}
