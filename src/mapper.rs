// src/mapper.rs
//! Gesture events to viewer actions.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GestureConfig, MappingConfig};
use crate::gesture::{GestureEvent, GestureKind};

/// Commands understood by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ZoomIn,
    ZoomOut,
    Rotate,
    Tilt,
    Select,
    ResetView,
    PauseToggle,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::Rotate => "rotate",
            Self::Tilt => "tilt",
            Self::Select => "select",
            Self::ResetView => "reset_view",
            Self::PauseToggle => "pause_toggle",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// `{"kind": "...", "parameters": {"name": number | string}}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.parameters.get(name) {
            Some(ParamValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.parameters.get(name) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// Shared, runtime-mutable gesture enable flags.
///
/// Clones share the same table; the application flips entries while the
/// mapper reads them.
#[derive(Debug, Clone, Default)]
pub struct EnableTable {
    inner: Arc<RwLock<BTreeMap<GestureKind, bool>>>,
}

impl EnableTable {
    pub fn new(initial: BTreeMap<GestureKind, bool>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Kinds without an entry are enabled.
    pub fn is_enabled(&self, kind: GestureKind) -> bool {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.get(&kind).copied().unwrap_or(true)
    }

    pub fn set(&self, kind: GestureKind, enabled: bool) {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        table.insert(kind, enabled);
    }

    pub fn enable(&self, kind: GestureKind) {
        self.set(kind, true);
    }

    pub fn disable(&self, kind: GestureKind) {
        self.set(kind, false);
    }

    pub fn snapshot(&self) -> BTreeMap<GestureKind, bool> {
        GestureKind::ALL
            .iter()
            .map(|k| (*k, self.is_enabled(*k)))
            .collect()
    }
}

/// Replaces the built-in template for one gesture.
pub type MappingFn = Box<dyn Fn(&GestureEvent) -> Action + Send>;

/// Stateless translation from a confirmed gesture to an action template.
pub struct GestureMapper {
    mapping: MappingConfig,
    enabled: EnableTable,
    custom: BTreeMap<GestureKind, MappingFn>,
}

impl GestureMapper {
    pub fn new(mapping: MappingConfig, enabled: EnableTable) -> Self {
        Self {
            mapping,
            enabled,
            custom: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(
            config.mapping.clone(),
            EnableTable::new(config.enabled.clone()),
        )
    }

    /// Handle for toggling gestures at runtime.
    pub fn enable_table(&self) -> EnableTable {
        self.enabled.clone()
    }

    /// Route `kind` through `mapping` instead of its template. The enable
    /// table still applies.
    pub fn set_custom_mapping<F>(&mut self, kind: GestureKind, mapping: F)
    where
        F: Fn(&GestureEvent) -> Action + Send + 'static,
    {
        debug!("Custom mapping set for {}", kind);
        self.custom.insert(kind, Box::new(mapping));
    }

    pub fn clear_custom_mapping(&mut self, kind: GestureKind) {
        self.custom.remove(&kind);
    }

    pub fn map(&self, event: &GestureEvent) -> Option<Action> {
        if !self.enabled.is_enabled(event.kind) {
            debug!("{} is disabled, no action", event.kind);
            return None;
        }
        if let Some(custom) = self.custom.get(&event.kind) {
            return Some(custom(event));
        }
        Some(self.template(event))
    }

    fn template(&self, event: &GestureEvent) -> Action {
        let params = &event.parameters;
        let distance = params.distance.unwrap_or(0.0);
        let velocity = params.velocity.unwrap_or(0.0);
        let m = &self.mapping;

        match event.kind {
            GestureKind::PinchIn => Action::new(ActionKind::ZoomOut)
                .with("factor", m.zoom_step)
                .with("sensitivity", m.pinch_zoom_speed),
            GestureKind::PinchOut => Action::new(ActionKind::ZoomIn)
                .with("factor", m.zoom_step)
                .with("sensitivity", m.pinch_zoom_speed),
            GestureKind::SwipeLeft => Action::new(ActionKind::Rotate)
                .with("angle", -distance * m.rotation_sensitivity)
                .with("velocity", velocity),
            GestureKind::SwipeRight => Action::new(ActionKind::Rotate)
                .with("angle", distance * m.rotation_sensitivity)
                .with("velocity", velocity),
            GestureKind::SwipeUp => Action::new(ActionKind::Tilt)
                .with("angle", -distance * m.pan_sensitivity)
                .with("velocity", velocity),
            GestureKind::SwipeDown => Action::new(ActionKind::Tilt)
                .with("angle", distance * m.pan_sensitivity)
                .with("velocity", velocity),
            GestureKind::Tap => Action::new(ActionKind::Select)
                .with("position", "center")
                .with("depth_change", params.depth_change.unwrap_or(0.0)),
            GestureKind::PalmOpen => Action::new(ActionKind::ResetView),
            GestureKind::PalmClose => Action::new(ActionKind::PauseToggle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureParameters;

    fn event(kind: GestureKind, parameters: GestureParameters) -> GestureEvent {
        GestureEvent {
            kind,
            confidence: 0.8,
            timestamp: 1.0,
            parameters,
        }
    }

    fn swipe(kind: GestureKind, distance: f64) -> GestureEvent {
        event(
            kind,
            GestureParameters {
                distance: Some(distance),
                velocity: Some(800.0),
                ..Default::default()
            },
        )
    }

    fn mapper() -> GestureMapper {
        GestureMapper::from_config(&GestureConfig::default())
    }

    #[test]
    fn test_pinch_maps_to_inverse_zoom() {
        let mapper = mapper();
        let zoom_out = mapper
            .map(&event(GestureKind::PinchIn, GestureParameters::default()))
            .unwrap();
        assert_eq!(zoom_out.kind, ActionKind::ZoomOut);
        assert_eq!(zoom_out.number("factor"), Some(1.2));
        assert_eq!(zoom_out.number("sensitivity"), Some(0.5));

        let zoom_in = mapper
            .map(&event(GestureKind::PinchOut, GestureParameters::default()))
            .unwrap();
        assert_eq!(zoom_in.kind, ActionKind::ZoomIn);
    }

    #[test]
    fn test_swipes_scale_by_sensitivity() {
        let mapper = mapper();
        let cases = [
            (GestureKind::SwipeLeft, ActionKind::Rotate, -24.0),
            (GestureKind::SwipeRight, ActionKind::Rotate, 24.0),
            (GestureKind::SwipeUp, ActionKind::Tilt, -12.0),
            (GestureKind::SwipeDown, ActionKind::Tilt, 12.0),
        ];
        for (gesture, kind, angle) in cases {
            let action = mapper.map(&swipe(gesture, 120.0)).unwrap();
            assert_eq!(action.kind, kind);
            assert!((action.number("angle").unwrap() - angle).abs() < 1e-9);
            assert_eq!(action.number("velocity"), Some(800.0));
        }
    }

    #[test]
    fn test_tap_selects_center() {
        let action = mapper()
            .map(&event(
                GestureKind::Tap,
                GestureParameters {
                    depth_change: Some(-0.08),
                    ..Default::default()
                },
            ))
            .unwrap();
        assert_eq!(action.kind, ActionKind::Select);
        assert_eq!(action.text("position"), Some("center"));
        assert_eq!(action.number("depth_change"), Some(-0.08));
    }

    #[test]
    fn test_palm_actions_have_no_parameters() {
        let mapper = mapper();
        let reset = mapper
            .map(&event(GestureKind::PalmOpen, GestureParameters::default()))
            .unwrap();
        assert_eq!(reset.kind, ActionKind::ResetView);
        assert!(reset.parameters.is_empty());
        let pause = mapper
            .map(&event(GestureKind::PalmClose, GestureParameters::default()))
            .unwrap();
        assert_eq!(pause.kind, ActionKind::PauseToggle);
    }

    #[test]
    fn test_custom_mapping_overrides_template() {
        let mut mapper = mapper();
        mapper.set_custom_mapping(GestureKind::PinchIn, |e| {
            Action::new(ActionKind::ZoomIn).with("factor", e.confidence * 2.0)
        });
        let action = mapper
            .map(&event(GestureKind::PinchIn, GestureParameters::default()))
            .unwrap();
        assert_eq!(action.kind, ActionKind::ZoomIn);
        assert_eq!(action.number("factor"), Some(1.6));

        // other gestures keep their templates
        let out = mapper
            .map(&event(GestureKind::PinchOut, GestureParameters::default()))
            .unwrap();
        assert_eq!(out.kind, ActionKind::ZoomIn);
        assert_eq!(out.number("factor"), Some(1.2));

        mapper.enable_table().disable(GestureKind::PinchIn);
        assert!(mapper
            .map(&event(GestureKind::PinchIn, GestureParameters::default()))
            .is_none());

        mapper.enable_table().enable(GestureKind::PinchIn);
        mapper.clear_custom_mapping(GestureKind::PinchIn);
        let restored = mapper
            .map(&event(GestureKind::PinchIn, GestureParameters::default()))
            .unwrap();
        assert_eq!(restored.kind, ActionKind::ZoomOut);
    }

    #[test]
    fn test_disabled_gesture_maps_to_nothing() {
        let mapper = mapper();
        let table = mapper.enable_table();
        table.disable(GestureKind::PalmClose);
        assert!(mapper
            .map(&event(GestureKind::PalmClose, GestureParameters::default()))
            .is_none());
        assert!(mapper
            .map(&event(GestureKind::PalmOpen, GestureParameters::default()))
            .is_some());

        table.enable(GestureKind::PalmClose);
        assert!(mapper
            .map(&event(GestureKind::PalmClose, GestureParameters::default()))
            .is_some());
    }

    #[test]
    fn test_disabled_in_config() {
        let mut config = GestureConfig::default();
        config.enabled.insert(GestureKind::Tap, false);
        let mapper = GestureMapper::from_config(&config);
        assert!(mapper
            .map(&event(GestureKind::Tap, GestureParameters::default()))
            .is_none());
        assert!(!mapper.enable_table().snapshot()[&GestureKind::Tap]);
    }

    #[test]
    fn test_action_json_shape() {
        let action = mapper()
            .map(&event(GestureKind::PinchIn, GestureParameters::default()))
            .unwrap();
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"kind":"zoom_out","parameters":{"factor":1.2,"sensitivity":0.5}}"#
        );
        let select: Action =
            serde_json::from_str(r#"{"kind":"select","parameters":{"position":"center"}}"#)
                .unwrap();
        assert_eq!(select.text("position"), Some("center"));
    }
}
