use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::landmarks::{Joint, Side};
use crate::orientation::OrientationState;
use crate::rom::RomSnapshot;

/// One joint/side measurement within a frame report.
///
/// A missing angle serializes as `null`, never as 0 -- zero degrees is a real
/// measurement. Suppressed or unmeasurable sides still carry their channel's
/// accumulated ROM statistics.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JointReading {
    pub joint: Joint,
    pub side: Side,
    pub exercise: String,
    pub angle_raw: Option<f64>,
    pub angle_filtered: Option<f64>,
    pub clamped: bool,
    pub movement_phase: Option<String>,
    pub rom: RomSnapshot,
    pub asymmetry: Option<f64>,
}

impl JointReading {
    /// A reading for a side that produced no measurement this frame
    pub fn missing(joint: Joint, side: Side, exercise: &str, rom: RomSnapshot) -> Self {
        Self {
            joint,
            side,
            exercise: exercise.to_string(),
            angle_raw: None,
            angle_filtered: None,
            clamped: false,
            movement_phase: None,
            rom,
            asymmetry: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.angle_filtered.is_none()
    }
}

/// Everything the engine emits for one processed frame
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FrameReport {
    pub session_id: Uuid,
    /// Monotonic frame counter within the session, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub orientation: OrientationState,
    /// The authoritative side in a profile view; `None` in frontal view
    pub primary_side: Option<Side>,
    /// Whether the committed orientation suits the configured exercise.
    /// Callers use this to prompt the subject to turn; the engine keeps
    /// measuring either way.
    pub orientation_matches_exercise: bool,
    pub readings: Vec<JointReading>,
}

impl FrameReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Get this frame's reading for one body side
    pub fn reading(&self, side: Side) -> Option<&JointReading> {
        self.readings.iter().find(|r| r.side == side)
    }

    /// Whether any side produced a measurable angle this frame
    pub fn has_measurement(&self) -> bool {
        self.readings.iter().any(|r| !r.is_missing())
    }
}

/// Final per-channel statistics reported when a session ends
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChannelSummary {
    pub joint: Joint,
    pub side: Side,
    pub exercise: String,
    pub rom: RomSnapshot,
    pub last_phase: Option<String>,
}

/// End-of-session report covering every channel the session touched
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub exercise: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub frames_with_measurement: u64,
    pub channels: Vec<ChannelSummary>,
    pub peak_asymmetry: Option<f64>,
}

impl SessionSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
