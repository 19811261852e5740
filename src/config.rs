// src/config.rs
//! Tunable parameters for the whole pipeline.
//!
//! Every section deserializes with defaults, so a config file only needs the
//! values it overrides. `validate` is called by every constructor that takes
//! a config; a violation is fatal before the first frame is processed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::GestureKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{detector}: close threshold {close} must be below open threshold {open}")]
    InvertedHysteresis {
        detector: &'static str,
        close: f64,
        open: f64,
    },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Camera geometry used to scale normalized landmarks into pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: f64,
    pub height: f64,
    pub fps: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            fps: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    #[default]
    MovingAverage,
    Kalman,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Frames averaged per landmark (moving average only).
    pub window: usize,
    pub method: SmoothingMethod,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: 5,
            method: SmoothingMethod::MovingAverage,
        }
    }
}

/// Two-threshold band. A value must cross `close` to close and `open` to
/// open again, so noise around one boundary cannot toggle the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisBand {
    pub open: f64,
    pub close: f64,
}

impl HysteresisBand {
    fn validate(&self, detector: &'static str) -> Result<(), ConfigError> {
        positive(detector, self.close)?;
        positive(detector, self.open)?;
        if self.close >= self.open {
            return Err(ConfigError::InvertedHysteresis {
                detector,
                close: self.close,
                open: self.open,
            });
        }
        Ok(())
    }
}

/// Thumb-index gap thresholds, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    pub open_threshold: f64,
    pub close_threshold: f64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            open_threshold: 100.0,
            close_threshold: 30.0,
        }
    }
}

impl PinchConfig {
    pub fn band(&self) -> HysteresisBand {
        HysteresisBand {
            open: self.open_threshold,
            close: self.close_threshold,
        }
    }
}

/// Normalized spread thresholds (fingertip distance / hand size).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    pub open_threshold: f64,
    pub close_threshold: f64,
}

impl Default for PalmConfig {
    fn default() -> Self {
        Self {
            open_threshold: 0.9,
            close_threshold: 0.6,
        }
    }
}

impl PalmConfig {
    pub fn band(&self) -> HysteresisBand {
        HysteresisBand {
            open: self.open_threshold,
            close: self.close_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Minimum palm displacement, in pixels.
    pub threshold: f64,
    /// Samples older than this are evicted; longer motions are drifts.
    pub max_duration_secs: f64,
    /// Pixels per second.
    pub min_velocity: f64,
    /// Largest allowed minor/major axis ratio.
    pub direction_tolerance: f64,
    /// Samples needed before a displacement is measured.
    pub min_samples: usize,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            max_duration_secs: 0.3,
            min_velocity: 50.0,
            direction_tolerance: 0.3,
            min_samples: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    /// Per-frame fingertip depth drop that counts as a tap.
    pub z_threshold: f64,
    /// Index fingertip extension (hand-size units) needed in the prior frame.
    pub extension_threshold: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            z_threshold: 0.05,
            extension_threshold: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// Consecutive ticks a candidate must persist.
    pub debounce_frames: u32,
    /// Global quiet period after any emitted event.
    pub cooldown_secs: f64,
    /// Events below this confidence are discarded.
    pub confidence_threshold: f64,
    /// Frames the detector is less sure of than this count as missing.
    pub min_detection_confidence: f64,
    /// Consecutive missing ticks before every detector resets.
    pub hand_lost_frames: u32,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            debounce_frames: 2,
            cooldown_secs: 0.5,
            confidence_threshold: 0.05,
            min_detection_confidence: 0.5,
            hand_lost_frames: 1,
        }
    }
}

/// Scaling from gesture measurements to action parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Multiplicative zoom per pinch.
    pub zoom_step: f64,
    pub pinch_zoom_speed: f64,
    /// Degrees of heading per pixel of horizontal swipe.
    pub rotation_sensitivity: f64,
    /// Degrees of pitch per pixel of vertical swipe.
    pub pan_sensitivity: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.2,
            pinch_zoom_speed: 0.5,
            rotation_sensitivity: 0.2,
            pan_sensitivity: 0.1,
        }
    }
}

/// Home camera pose and zoom limits for the view controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub home_latitude: f64,
    pub home_longitude: f64,
    /// Meters.
    pub home_altitude: f64,
    pub home_pitch: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            home_latitude: 40.7128,
            home_longitude: -74.0060,
            home_altitude: 10_000_000.0,
            home_pitch: -90.0,
            min_altitude: 1_000.0,
            max_altitude: 20_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Recent events kept for display.
    pub history_length: usize,
    /// Pending actions kept before the oldest is dropped.
    pub queue_capacity: usize,
    /// Ticks averaged by the performance metrics.
    pub metrics_window: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            history_length: 5,
            queue_capacity: 256,
            metrics_window: 30,
        }
    }
}

fn all_enabled() -> BTreeMap<GestureKind, bool> {
    GestureKind::ALL.iter().map(|k| (*k, true)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub frame: FrameConfig,
    pub smoothing: SmoothingConfig,
    pub pinch: PinchConfig,
    pub palm: PalmConfig,
    pub swipe: SwipeConfig,
    pub tap: TapConfig,
    pub stabilization: StabilizationConfig,
    pub mapping: MappingConfig,
    /// Kinds missing from the map are enabled.
    pub enabled: BTreeMap<GestureKind, bool>,
    pub view: ViewConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            smoothing: SmoothingConfig::default(),
            pinch: PinchConfig::default(),
            palm: PalmConfig::default(),
            swipe: SwipeConfig::default(),
            tap: TapConfig::default(),
            stabilization: StabilizationConfig::default(),
            mapping: MappingConfig::default(),
            enabled: all_enabled(),
            view: ViewConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn within(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

fn at_least_one(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCount { name })
    } else {
        Ok(())
    }
}

impl GestureConfig {
    /// Reject settings that would break an invariant of the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("frame.width", self.frame.width)?;
        positive("frame.height", self.frame.height)?;
        positive("frame.fps", self.frame.fps)?;

        at_least_one("smoothing.window", self.smoothing.window)?;

        self.pinch.band().validate("pinch")?;
        self.palm.band().validate("palm")?;

        positive("swipe.threshold", self.swipe.threshold)?;
        positive("swipe.max_duration_secs", self.swipe.max_duration_secs)?;
        within("swipe.min_velocity", self.swipe.min_velocity, 0.0, f64::MAX)?;
        within(
            "swipe.direction_tolerance",
            self.swipe.direction_tolerance,
            0.0,
            1.0,
        )?;
        positive("swipe.direction_tolerance", self.swipe.direction_tolerance)?;
        if self.swipe.min_samples < 2 {
            return Err(ConfigError::OutOfRange {
                name: "swipe.min_samples",
                value: self.swipe.min_samples as f64,
                min: 2.0,
                max: f64::MAX,
            });
        }

        positive("tap.z_threshold", self.tap.z_threshold)?;
        within("tap.extension_threshold", self.tap.extension_threshold, 0.0, f64::MAX)?;

        let stab = &self.stabilization;
        at_least_one("stabilization.debounce_frames", stab.debounce_frames as usize)?;
        at_least_one("stabilization.hand_lost_frames", stab.hand_lost_frames as usize)?;
        within("stabilization.cooldown_secs", stab.cooldown_secs, 0.0, f64::MAX)?;
        within(
            "stabilization.confidence_threshold",
            stab.confidence_threshold,
            0.0,
            1.0,
        )?;
        within(
            "stabilization.min_detection_confidence",
            stab.min_detection_confidence,
            0.0,
            1.0,
        )?;

        positive("mapping.zoom_step", self.mapping.zoom_step)?;
        within(
            "mapping.pinch_zoom_speed",
            self.mapping.pinch_zoom_speed,
            0.0,
            f64::MAX,
        )?;
        within(
            "mapping.rotation_sensitivity",
            self.mapping.rotation_sensitivity,
            0.0,
            f64::MAX,
        )?;
        within("mapping.pan_sensitivity", self.mapping.pan_sensitivity, 0.0, f64::MAX)?;

        positive("view.min_altitude", self.view.min_altitude)?;
        if self.view.min_altitude > self.view.max_altitude {
            return Err(ConfigError::OutOfRange {
                name: "view.max_altitude",
                value: self.view.max_altitude,
                min: self.view.min_altitude,
                max: f64::MAX,
            });
        }

        at_least_one("diagnostics.history_length", self.diagnostics.history_length)?;
        at_least_one("diagnostics.queue_capacity", self.diagnostics.queue_capacity)?;
        at_least_one("diagnostics.metrics_window", self.diagnostics.metrics_window)?;
        Ok(())
    }

    /// Whether a kind starts out enabled.
    pub fn is_enabled(&self, kind: GestureKind) -> bool {
        self.enabled.get(&kind).copied().unwrap_or(true)
    }

    /// Parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// `config.json` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gesture-control")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load the default config file if one exists, otherwise use defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}
