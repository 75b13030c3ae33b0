use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::OrientationConfig;
use crate::landmarks::{LandmarkFrame, LandmarkIndex, Side};

/// Camera view classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewOrientation {
    /// Subject faces the camera; both body sides are usable
    Frontal,
    /// Subject is seen in profile; one side is authoritative
    Sagittal,
    /// Too little landmark data to classify the view
    Unknown,
}

impl ViewOrientation {
    /// Get the orientation name as a string for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewOrientation::Frontal => "frontal",
            ViewOrientation::Sagittal => "sagittal",
            ViewOrientation::Unknown => "unknown",
        }
    }
}

/// Which way the subject faces, in image coordinates (the direction the nose
/// points on screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingDirection {
    /// Nose near the shoulder midpoint: facing the camera
    Frontal,
    /// Nose left of the shoulder midpoint on screen
    Left,
    /// Nose right of the shoulder midpoint on screen
    Right,
}

impl FacingDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingDirection::Frontal => "frontal",
            FacingDirection::Left => "left",
            FacingDirection::Right => "right",
        }
    }
}

/// The classifier's output for one frame.
///
/// `orientation` is the hysteresis-stabilized committed label;
/// `dominant_side` and `facing` are refreshed from the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationState {
    pub orientation: ViewOrientation,
    pub dominant_side: Option<Side>,
    pub facing: FacingDirection,
    pub confidence: f64,
}

impl OrientationState {
    /// The "insufficient data" state: UNKNOWN with zero confidence
    pub fn unknown() -> Self {
        Self {
            orientation: ViewOrientation::Unknown,
            dominant_side: None,
            facing: FacingDirection::Frontal,
            confidence: 0.0,
        }
    }
}

/// One raw (pre-hysteresis) classification with its confidence weight
#[derive(Debug, Clone, Copy)]
struct RawClassification {
    orientation: ViewOrientation,
    confidence: f64,
}

/// Classifies the camera view from shoulder geometry, stabilized over time.
///
/// The raw rule labels a frame FRONTAL when the normalized shoulder
/// separation and both shoulder visibilities clear their thresholds, and
/// SAGITTAL otherwise. Raw labels feed a bounded history; the committed label
/// only changes when the confidence-weighted vote for the challenger leads
/// the incumbent by the configured margin. Without the hysteresis the label
/// flaps whenever arm movement transiently drops a shoulder's visibility.
pub struct OrientationClassifier {
    config: OrientationConfig,
    history: VecDeque<RawClassification>,
    committed: ViewOrientation,
    state: OrientationState,
}

impl OrientationClassifier {
    /// Create a classifier with the given thresholds
    pub fn new(config: OrientationConfig) -> Self {
        let capacity = config.history_size;
        Self {
            config,
            history: VecDeque::with_capacity(capacity),
            committed: ViewOrientation::Unknown,
            state: OrientationState::unknown(),
        }
    }

    /// Classify one frame and update the committed state.
    ///
    /// Frames with too little landmark data return the UNKNOWN state and do
    /// not disturb the committed history; callers decide whether to hold the
    /// last committed state or surface "insufficient data".
    pub fn classify(&mut self, frame: &LandmarkFrame) -> OrientationState {
        let left = frame.get(LandmarkIndex::LeftShoulder);
        let right = frame.get(LandmarkIndex::RightShoulder);

        let (left, right) = match (left, right) {
            (Some(left), Some(right)) => (left, right),
            _ => {
                trace!("Shoulder landmarks absent, orientation unknown");
                return OrientationState::unknown();
            }
        };

        if frame.count_visible(self.config.min_visibility_threshold) < self.config.min_landmarks {
            trace!("Too few visible landmarks, orientation unknown");
            return OrientationState::unknown();
        }

        let separation = (left.x - right.x).abs();
        let avg_visibility = (left.visibility + right.visibility) / 2.0;

        let frontal = separation > self.config.separation_threshold
            && avg_visibility > self.config.avg_visibility_threshold
            && left.visibility > self.config.min_visibility_threshold
            && right.visibility > self.config.min_visibility_threshold;

        let raw = RawClassification {
            orientation: if frontal {
                ViewOrientation::Frontal
            } else {
                ViewOrientation::Sagittal
            },
            confidence: avg_visibility.clamp(0.0, 1.0),
        };
        trace!(
            "Raw orientation {:?} (separation {:.3}, avg visibility {:.2})",
            raw.orientation,
            separation,
            avg_visibility
        );

        if self.history.len() == self.config.history_size {
            self.history.pop_front();
        }
        self.history.push_back(raw);

        let confidence = self.update_committed(raw);

        let dominant_side = if self.committed == ViewOrientation::Sagittal {
            Some(if left.visibility >= right.visibility {
                Side::Left
            } else {
                Side::Right
            })
        } else {
            None
        };

        let facing = match frame.get(LandmarkIndex::Nose) {
            Some(nose) => {
                let midpoint_x = (left.x + right.x) / 2.0;
                let offset = nose.x - midpoint_x;
                if offset.abs() <= self.config.nose_dead_zone {
                    FacingDirection::Frontal
                } else if offset < 0.0 {
                    FacingDirection::Left
                } else {
                    FacingDirection::Right
                }
            }
            None => FacingDirection::Frontal,
        };

        self.state = OrientationState {
            orientation: self.committed,
            dominant_side,
            facing,
            confidence,
        };
        self.state
    }

    /// Apply the hysteresis vote and return the committed label's confidence
    fn update_committed(&mut self, raw: RawClassification) -> f64 {
        // Follow the raw label until enough history exists to vote
        if self.history.len() < self.config.min_samples {
            if self.committed != raw.orientation {
                debug!(
                    "Orientation {} -> {} (warm-up, {} samples)",
                    self.committed.as_str(),
                    raw.orientation.as_str(),
                    self.history.len()
                );
                self.committed = raw.orientation;
            }
            return raw.confidence;
        }

        let mut frontal_weight = 0.0;
        let mut sagittal_weight = 0.0;
        for sample in self.history.iter().rev().take(self.config.vote_window) {
            match sample.orientation {
                ViewOrientation::Frontal => frontal_weight += sample.confidence,
                ViewOrientation::Sagittal => sagittal_weight += sample.confidence,
                ViewOrientation::Unknown => {}
            }
        }

        let (committed_weight, challenger, challenger_weight) = match self.committed {
            ViewOrientation::Frontal => (frontal_weight, ViewOrientation::Sagittal, sagittal_weight),
            ViewOrientation::Sagittal => (sagittal_weight, ViewOrientation::Frontal, frontal_weight),
            // Unknown committed label resolves to whichever side leads
            ViewOrientation::Unknown => {
                if frontal_weight >= sagittal_weight {
                    (sagittal_weight, ViewOrientation::Frontal, frontal_weight)
                } else {
                    (frontal_weight, ViewOrientation::Sagittal, sagittal_weight)
                }
            }
        };

        if challenger_weight > committed_weight + self.config.change_margin {
            debug!(
                "Orientation {} -> {} (weights {:.2} vs {:.2})",
                self.committed.as_str(),
                challenger.as_str(),
                challenger_weight,
                committed_weight
            );
            self.committed = challenger;
        }

        let total = frontal_weight + sagittal_weight;
        if total > 0.0 {
            let committed_weight = match self.committed {
                ViewOrientation::Frontal => frontal_weight,
                _ => sagittal_weight,
            };
            committed_weight / total
        } else {
            0.0
        }
    }

    /// The most recently emitted state
    pub fn state(&self) -> OrientationState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use chrono::Utc;

    fn create_classifier() -> OrientationClassifier {
        OrientationClassifier::new(OrientationConfig::default())
    }

    /// Shoulders wide apart and highly visible, hips for landmark count
    fn create_frontal_frame() -> LandmarkFrame {
        LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::Nose, Landmark::new(0.5, 0.1, 0.95))
            .with(LandmarkIndex::LeftShoulder, Landmark::new(0.4, 0.3, 0.9))
            .with(LandmarkIndex::RightShoulder, Landmark::new(0.6, 0.3, 0.9))
            .with(LandmarkIndex::LeftHip, Landmark::new(0.42, 0.6, 0.9))
            .with(LandmarkIndex::RightHip, Landmark::new(0.58, 0.6, 0.9))
    }

    /// Shoulders nearly overlapping horizontally: profile view
    fn create_profile_frame() -> LandmarkFrame {
        LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::Nose, Landmark::new(0.42, 0.1, 0.95))
            .with(LandmarkIndex::LeftShoulder, Landmark::new(0.5, 0.3, 0.9))
            .with(LandmarkIndex::RightShoulder, Landmark::new(0.52, 0.3, 0.9))
            .with(LandmarkIndex::LeftHip, Landmark::new(0.5, 0.6, 0.9))
            .with(LandmarkIndex::RightHip, Landmark::new(0.52, 0.6, 0.9))
    }

    #[test]
    fn test_frontal_classification() {
        let mut classifier = create_classifier();
        let state = classifier.classify(&create_frontal_frame());

        assert_eq!(state.orientation, ViewOrientation::Frontal);
        assert_eq!(state.dominant_side, None);
        assert!(state.confidence > 0.0);
    }

    #[test]
    fn test_sagittal_dominant_side() {
        let mut classifier = create_classifier();
        let frame = create_profile_frame()
            .with(LandmarkIndex::RightShoulder, Landmark::new(0.52, 0.3, 0.5));

        let state = classifier.classify(&frame);

        assert_eq!(state.orientation, ViewOrientation::Sagittal);
        assert_eq!(state.dominant_side, Some(Side::Left));
    }

    #[test]
    fn test_unknown_when_shoulders_missing() {
        let mut classifier = create_classifier();
        let frame = LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::Nose, Landmark::new(0.5, 0.1, 0.95));

        let state = classifier.classify(&frame);

        assert_eq!(state.orientation, ViewOrientation::Unknown);
        assert_eq!(state.confidence, 0.0);
        assert_eq!(state.dominant_side, None);
    }

    #[test]
    fn test_facing_direction_from_nose_offset() {
        let mut classifier = create_classifier();

        let centered = classifier.classify(&create_frontal_frame());
        assert_eq!(centered.facing, FacingDirection::Frontal);

        let frame = create_frontal_frame().with(LandmarkIndex::Nose, Landmark::new(0.38, 0.1, 0.95));
        let looking_left = classifier.classify(&frame);
        assert_eq!(looking_left.facing, FacingDirection::Left);

        let frame = create_frontal_frame().with(LandmarkIndex::Nose, Landmark::new(0.62, 0.1, 0.95));
        let looking_right = classifier.classify(&frame);
        assert_eq!(looking_right.facing, FacingDirection::Right);
    }

    #[test]
    fn test_dead_zone_holds_frontal_facing() {
        let mut classifier = create_classifier();

        // Offset 0.03 is inside the 0.05 dead zone
        let frame = create_frontal_frame().with(LandmarkIndex::Nose, Landmark::new(0.53, 0.1, 0.95));
        let state = classifier.classify(&frame);
        assert_eq!(state.facing, FacingDirection::Frontal);
    }

    #[test]
    fn test_hysteresis_ignores_alternating_low_margin_labels() {
        let mut classifier = create_classifier();

        // Commit FRONTAL with a steady warm-up run
        for _ in 0..8 {
            classifier.classify(&create_frontal_frame());
        }
        assert_eq!(classifier.state().orientation, ViewOrientation::Frontal);

        // Alternate raw labels with equal confidence: neither side ever leads
        // the weighted vote by the change margin
        for _ in 0..15 {
            let state = classifier.classify(&create_profile_frame());
            assert_eq!(state.orientation, ViewOrientation::Frontal);

            let state = classifier.classify(&create_frontal_frame());
            assert_eq!(state.orientation, ViewOrientation::Frontal);
        }
    }

    #[test]
    fn test_sustained_evidence_changes_commitment() {
        let mut classifier = create_classifier();

        for _ in 0..8 {
            classifier.classify(&create_frontal_frame());
        }
        assert_eq!(classifier.state().orientation, ViewOrientation::Frontal);

        // A sustained profile view takes over once its vote clears the margin
        let mut committed = ViewOrientation::Frontal;
        for _ in 0..20 {
            committed = classifier.classify(&create_profile_frame()).orientation;
        }
        assert_eq!(committed, ViewOrientation::Sagittal);
    }

    #[test]
    fn test_unknown_frames_do_not_disturb_history() {
        let mut classifier = create_classifier();

        for _ in 0..8 {
            classifier.classify(&create_frontal_frame());
        }

        let empty = LandmarkFrame::new(Utc::now());
        let state = classifier.classify(&empty);
        assert_eq!(state.orientation, ViewOrientation::Unknown);
        assert_eq!(state.confidence, 0.0);

        // The committed label picks right back up
        let state = classifier.classify(&create_frontal_frame());
        assert_eq!(state.orientation, ViewOrientation::Frontal);
    }
}
