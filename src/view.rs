// src/view.rs
//! Reference consumer: a globe camera driven by actions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ViewConfig;
use crate::mapper::{Action, ActionKind};
use crate::sink::ActionSink;

/// Camera pose in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub camera: Camera,
    pub paused: bool,
    pub selections: u64,
    #[serde(skip)]
    config: ViewConfig,
}

impl ViewState {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            camera: home(&config),
            paused: false,
            selections: 0,
            config,
        }
    }

    pub fn apply(&mut self, action: &Action) {
        let camera = &mut self.camera;
        match action.kind {
            ActionKind::ZoomIn => {
                let factor = action.number("factor").unwrap_or(1.0);
                camera.altitude = (camera.altitude / factor).max(self.config.min_altitude);
            }
            ActionKind::ZoomOut => {
                let factor = action.number("factor").unwrap_or(1.0);
                camera.altitude = (camera.altitude * factor).min(self.config.max_altitude);
            }
            ActionKind::Rotate => {
                let angle = action.number("angle").unwrap_or(0.0);
                camera.heading = (camera.heading + angle).rem_euclid(360.0);
            }
            ActionKind::Tilt => {
                let angle = action.number("angle").unwrap_or(0.0);
                camera.pitch = (camera.pitch + angle).clamp(-90.0, 0.0);
            }
            ActionKind::Select => self.selections += 1,
            ActionKind::ResetView => self.camera = home(&self.config),
            ActionKind::PauseToggle => self.paused = !self.paused,
        }
        debug!("Applied {} -> {:?}", action.kind, self.camera);
    }
}

fn home(config: &ViewConfig) -> Camera {
    Camera {
        latitude: config.home_latitude,
        longitude: config.home_longitude,
        altitude: config.home_altitude,
        heading: 0.0,
        pitch: config.home_pitch,
        roll: 0.0,
    }
}

impl ActionSink for ViewState {
    fn deliver(&mut self, action: Action) {
        self.apply(&action);
    }
}
