// src/recognizer/debounce.rs
//! Temporal stabilization shared by every detector.

use crate::gesture::{GestureEvent, GestureKind, GestureParameters};

/// A detector's proposal for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub kind: GestureKind,
    pub confidence: f64,
    pub parameters: GestureParameters,
}

impl Candidate {
    pub fn into_event(self, timestamp: f64) -> GestureEvent {
        GestureEvent {
            kind: self.kind,
            confidence: self.confidence,
            timestamp,
            parameters: self.parameters,
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    candidate: Candidate,
    count: u32,
}

/// Confirms a candidate once it has been seen on `required` consecutive
/// ticks. The confirmed candidate is the first sample of the run.
#[derive(Debug, Clone)]
pub struct Debouncer {
    required: u32,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            pending: None,
        }
    }

    /// Feed this tick's candidate (or its absence).
    pub fn observe(&mut self, candidate: Option<Candidate>) -> Option<Candidate> {
        let Some(candidate) = candidate else {
            self.pending = None;
            return None;
        };

        let same = matches!(&self.pending, Some(p) if p.candidate.kind == candidate.kind);
        if same {
            if let Some(pending) = self.pending.as_mut() {
                pending.count += 1;
            }
        } else {
            self.pending = Some(Pending { candidate, count: 1 });
        }

        if self.pending_count() >= self.required {
            self.pending.take().map(|p| p.candidate)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Length of the current run.
    pub fn pending_count(&self) -> u32 {
        self.pending.as_ref().map_or(0, |p| p.count)
    }
}

/// Global quiet period after an emitted event.
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: f64,
    last_emit: Option<f64>,
}

impl Cooldown {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            last_emit: None,
        }
    }

    /// A clock that went backwards (new session) ends the quiet period.
    pub fn is_active(&self, now: f64) -> bool {
        self.last_emit
            .map_or(false, |last| now >= last && now - last < self.duration)
    }

    pub fn start(&mut self, now: f64) {
        self.last_emit = Some(now);
    }

    pub fn clear(&mut self) {
        self.last_emit = None;
    }
}
