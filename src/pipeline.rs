// src/pipeline.rs
//! One tick: scale → smooth → recognize → map.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, FrameConfig, GestureConfig};
use crate::diagnostics::{GestureHistory, PerformanceMetrics};
use crate::gesture::GestureEvent;
use crate::landmarks::HandFrame;
use crate::mapper::{Action, EnableTable, GestureMapper};
use crate::recognizer::{GestureRecognizer, RecognizerStats};
use crate::sink::ActionSink;
use crate::smoothing::Smoother;

/// A recorded or live detector result for one tick. `hand` is `None` when
/// nothing was detected; x, y are normalized to the frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickInput {
    pub timestamp: f64,
    #[serde(default)]
    pub hand: Option<HandFrame>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TickOutcome {
    pub event: Option<GestureEvent>,
    pub action: Option<Action>,
}

/// Owns every stage of the per-frame flow. Single-owner, like the
/// recognizer inside it.
pub struct GesturePipeline {
    frame: FrameConfig,
    smoother: Smoother,
    recognizer: GestureRecognizer,
    mapper: GestureMapper,
    history: GestureHistory,
    metrics: PerformanceMetrics,
}

impl GesturePipeline {
    pub fn new(config: &GestureConfig) -> Result<Self, ConfigError> {
        let recognizer = GestureRecognizer::new(config)?;
        info!(
            "Gesture pipeline ready ({}x{} @ {} fps, {:?} smoothing)",
            config.frame.width, config.frame.height, config.frame.fps, config.smoothing.method
        );
        Ok(Self {
            frame: config.frame.clone(),
            smoother: Smoother::new(&config.smoothing, config.frame.fps),
            recognizer,
            mapper: GestureMapper::from_config(config),
            history: GestureHistory::new(config.diagnostics.history_length),
            metrics: PerformanceMetrics::new(config.diagnostics.metrics_window),
        })
    }

    pub fn tick(&mut self, input: &TickInput) -> TickOutcome {
        self.process(input.timestamp, input.hand.as_ref())
    }

    pub fn process(&mut self, timestamp: f64, hand: Option<&HandFrame>) -> TickOutcome {
        let start = Instant::now();

        let scaled = hand
            .filter(|h| self.recognizer.admit(h))
            .map(|h| h.to_pixel_space(self.frame.width, self.frame.height));
        let smoothed = self.smoother.smooth(scaled.as_ref());
        let event = self.recognizer.tick(timestamp, smoothed.as_ref());
        if self.recognizer.hand_lost() && !self.smoother.is_empty() {
            debug!("Hand lost, clearing smoothing window");
            self.smoother.reset();
        }

        let action = event.as_ref().and_then(|e| self.mapper.map(e));
        if let Some(event) = &event {
            self.history.push(event.clone());
        }

        self.metrics.record(start.elapsed());
        TickOutcome { event, action }
    }

    /// Process one tick and hand any resulting action to `sink`.
    pub fn run<S: ActionSink + ?Sized>(&mut self, input: &TickInput, sink: &mut S) -> TickOutcome {
        let outcome = self.tick(input);
        if let Some(action) = &outcome.action {
            sink.deliver(action.clone());
        }
        outcome
    }

    pub fn enable_table(&self) -> EnableTable {
        self.mapper.enable_table()
    }

    pub fn mapper_mut(&mut self) -> &mut GestureMapper {
        &mut self.mapper
    }

    pub fn history(&self) -> &GestureHistory {
        &self.history
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn stats(&self) -> RecognizerStats {
        self.recognizer.stats()
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.recognizer.reset();
        self.history.clear();
    }
}
