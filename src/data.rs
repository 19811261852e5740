// src/data.rs
use crate::pipeline::{TickInput, TickOutcome};
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct TickRecord {
    timestamp: f64,
    frame: u64,
    hand_detected: bool,
    detection_confidence: Option<f64>,
    gesture: Option<String>,
    gesture_confidence: Option<f64>,
    action: Option<String>,
    // JSON object, empty when there is no action
    action_parameters: String,
}

/// Collects one row per tick and writes the session to disk.
pub struct SessionRecorder {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<TickRecord>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn add_tick(&mut self, input: &TickInput, outcome: &TickOutcome) -> Result<()> {
        let action_parameters = match &outcome.action {
            Some(action) => serde_json::to_string(&action.parameters)
                .context("failed to encode action parameters")?,
            None => String::new(),
        };

        self.records.push(TickRecord {
            timestamp: input.timestamp,
            frame: self.records.len() as u64,
            hand_detected: input.hand.is_some(),
            detection_confidence: input.hand.as_ref().map(|h| h.confidence),
            gesture: outcome.event.as_ref().map(|e| e.kind.as_str().to_string()),
            gesture_confidence: outcome.event.as_ref().map(|e| e.confidence),
            action: outcome.action.as_ref().map(|a| a.kind.as_str().to_string()),
            action_parameters,
        });
        Ok(())
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("gesture_data.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self.session_dir().join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        std::fs::write(&report_path, self.create_html_report())
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        Ok(report_path)
    }

    fn gesture_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for gesture in self.records.iter().filter_map(|r| r.gesture.as_deref()) {
            *counts.entry(gesture).or_insert(0) += 1;
        }
        counts
    }

    fn create_html_report(&self) -> String {
        let total_ticks = self.records.len();
        let detected = self.records.iter().filter(|r| r.hand_detected).count();
        let detection_rate = if total_ticks == 0 {
            0.0
        } else {
            detected as f64 / total_ticks as f64 * 100.0
        };
        let actions = self.records.iter().filter(|r| r.action.is_some()).count();

        let rows: String = self
            .gesture_counts()
            .iter()
            .map(|(gesture, count)| {
                format!(
                    r#"
        <div class="stat-item">
            <span class="stat-label">{}:</span>
            <span class="stat-value">{}</span>
        </div>"#,
                    gesture, count
                )
            })
            .collect();

        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <title>Gesture Session Report - {}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>Gesture Session Report</h1>
    <div class="stats">
        <h2>Session: {}</h2>
        <div class="stat-item">
            <span class="stat-label">Total Ticks:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Hand Detection Rate:</span>
            <span class="stat-value">{:.1}%</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Actions Delivered:</span>
            <span class="stat-value">{}</span>
        </div>
        <h2>Gestures</h2>{}
    </div>
</body>
</html>
        "#,
            self.session_name, self.session_name, total_ticks, detection_rate, actions, rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureEvent, GestureKind, GestureParameters};
    use crate::mapper::{Action, ActionKind};

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gesture_control_{}_{}", name, std::process::id()))
    }

    fn recorder_with_ticks(dir: &Path) -> SessionRecorder {
        let mut recorder = SessionRecorder::new(dir, Some("test_session".to_string()));
        let empty = TickInput {
            timestamp: 0.0,
            hand: None,
        };
        recorder.add_tick(&empty, &TickOutcome::default()).unwrap();
        let outcome = TickOutcome {
            event: Some(GestureEvent {
                kind: GestureKind::SwipeRight,
                confidence: 0.2,
                timestamp: 0.1,
                parameters: GestureParameters::default(),
            }),
            action: Some(Action::new(ActionKind::Rotate).with("angle", 24.0)),
        };
        recorder
            .add_tick(
                &TickInput {
                    timestamp: 0.1,
                    hand: None,
                },
                &outcome,
            )
            .unwrap();
        recorder
    }

    #[test]
    fn test_default_session_name() {
        let recorder = SessionRecorder::new("out", None);
        assert!(recorder.session_name().starts_with("session_"));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_export_csv() {
        let dir = scratch_dir("csv");
        let recorder = recorder_with_ticks(&dir);
        let path = recorder.export_csv().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("timestamp,frame,hand_detected"));
        assert_eq!(lines.count(), 2);
        assert!(text.contains("swipe_right"));
        assert!(text.contains("rotate"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_report_lists_gestures() {
        let dir = scratch_dir("report");
        let recorder = recorder_with_ticks(&dir);
        let path = recorder.generate_report().unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("test_session"));
        assert!(html.contains("swipe_right"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_report_has_zero_rate() {
        let recorder = SessionRecorder::new(scratch_dir("empty"), Some("empty".to_string()));
        assert!(recorder.create_html_report().contains("0.0%"));
    }
}
