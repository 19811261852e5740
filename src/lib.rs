// src/lib.rs
//! Hand-gesture recognition for driving a 3D viewer.
//!
//! Frames of 21 hand landmarks go in; debounced gesture events and viewer
//! actions come out. See [`GesturePipeline`] for the per-tick flow.

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod mapper;
pub mod pipeline;
pub mod recognizer;
pub mod sink;
pub mod smoothing;
pub mod view;

pub use config::{ConfigError, GestureConfig};
pub use data::SessionRecorder;
pub use gesture::{GestureEvent, GestureKind, GestureParameters};
pub use landmarks::{FrameError, HandFrame, Handedness, Landmark};
pub use mapper::{Action, ActionKind, EnableTable, GestureMapper, MappingFn, ParamValue};
pub use pipeline::{GesturePipeline, TickInput, TickOutcome};
pub use recognizer::{GestureRecognizer, RecognizerStats};
pub use sink::{ActionQueue, ActionSink};
pub use smoothing::Smoother;
pub use view::ViewState;
