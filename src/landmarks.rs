use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RomcamError};

/// Number of landmarks in the upstream estimator's schema
pub const LANDMARK_COUNT: usize = 33;

/// Body keypoint indices matching the upstream 33-point pose estimator schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    /// All landmark indices in schema order
    pub const ALL: [LandmarkIndex; LANDMARK_COUNT] = [
        LandmarkIndex::Nose,
        LandmarkIndex::LeftEyeInner,
        LandmarkIndex::LeftEye,
        LandmarkIndex::LeftEyeOuter,
        LandmarkIndex::RightEyeInner,
        LandmarkIndex::RightEye,
        LandmarkIndex::RightEyeOuter,
        LandmarkIndex::LeftEar,
        LandmarkIndex::RightEar,
        LandmarkIndex::MouthLeft,
        LandmarkIndex::MouthRight,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::LeftElbow,
        LandmarkIndex::RightElbow,
        LandmarkIndex::LeftWrist,
        LandmarkIndex::RightWrist,
        LandmarkIndex::LeftPinky,
        LandmarkIndex::RightPinky,
        LandmarkIndex::LeftIndex,
        LandmarkIndex::RightIndex,
        LandmarkIndex::LeftThumb,
        LandmarkIndex::RightThumb,
        LandmarkIndex::LeftHip,
        LandmarkIndex::RightHip,
        LandmarkIndex::LeftKnee,
        LandmarkIndex::RightKnee,
        LandmarkIndex::LeftAnkle,
        LandmarkIndex::RightAnkle,
        LandmarkIndex::LeftHeel,
        LandmarkIndex::RightHeel,
        LandmarkIndex::LeftFootIndex,
        LandmarkIndex::RightFootIndex,
    ];

    /// Get the numeric schema index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a landmark index by its numeric schema position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the contralateral partner landmark (left ankle <-> right ankle).
    /// Midline landmarks (the nose) are their own partner.
    pub fn opposite(self) -> Self {
        match self {
            LandmarkIndex::Nose => LandmarkIndex::Nose,
            LandmarkIndex::LeftEyeInner => LandmarkIndex::RightEyeInner,
            LandmarkIndex::LeftEye => LandmarkIndex::RightEye,
            LandmarkIndex::LeftEyeOuter => LandmarkIndex::RightEyeOuter,
            LandmarkIndex::RightEyeInner => LandmarkIndex::LeftEyeInner,
            LandmarkIndex::RightEye => LandmarkIndex::LeftEye,
            LandmarkIndex::RightEyeOuter => LandmarkIndex::LeftEyeOuter,
            LandmarkIndex::LeftEar => LandmarkIndex::RightEar,
            LandmarkIndex::RightEar => LandmarkIndex::LeftEar,
            LandmarkIndex::MouthLeft => LandmarkIndex::MouthRight,
            LandmarkIndex::MouthRight => LandmarkIndex::MouthLeft,
            LandmarkIndex::LeftShoulder => LandmarkIndex::RightShoulder,
            LandmarkIndex::RightShoulder => LandmarkIndex::LeftShoulder,
            LandmarkIndex::LeftElbow => LandmarkIndex::RightElbow,
            LandmarkIndex::RightElbow => LandmarkIndex::LeftElbow,
            LandmarkIndex::LeftWrist => LandmarkIndex::RightWrist,
            LandmarkIndex::RightWrist => LandmarkIndex::LeftWrist,
            LandmarkIndex::LeftPinky => LandmarkIndex::RightPinky,
            LandmarkIndex::RightPinky => LandmarkIndex::LeftPinky,
            LandmarkIndex::LeftIndex => LandmarkIndex::RightIndex,
            LandmarkIndex::RightIndex => LandmarkIndex::LeftIndex,
            LandmarkIndex::LeftThumb => LandmarkIndex::RightThumb,
            LandmarkIndex::RightThumb => LandmarkIndex::LeftThumb,
            LandmarkIndex::LeftHip => LandmarkIndex::RightHip,
            LandmarkIndex::RightHip => LandmarkIndex::LeftHip,
            LandmarkIndex::LeftKnee => LandmarkIndex::RightKnee,
            LandmarkIndex::RightKnee => LandmarkIndex::LeftKnee,
            LandmarkIndex::LeftAnkle => LandmarkIndex::RightAnkle,
            LandmarkIndex::RightAnkle => LandmarkIndex::LeftAnkle,
            LandmarkIndex::LeftHeel => LandmarkIndex::RightHeel,
            LandmarkIndex::RightHeel => LandmarkIndex::LeftHeel,
            LandmarkIndex::LeftFootIndex => LandmarkIndex::RightFootIndex,
            LandmarkIndex::RightFootIndex => LandmarkIndex::LeftFootIndex,
        }
    }

    /// Which body side the landmark belongs to, if it is side-labeled.
    /// In the schema every left landmark precedes its right partner.
    pub fn side(self) -> Option<Side> {
        let partner = self.opposite();
        if partner == self {
            None
        } else if self.index() < partner.index() {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Translate a side-labeled landmark to the requested body side.
    /// Midline landmarks are returned unchanged.
    pub fn for_side(self, side: Side) -> Self {
        match self.side() {
            Some(current) if current != side => self.opposite(),
            _ => self,
        }
    }
}

/// Anatomical body side. Past the mirror-correction boundary this always means
/// the subject's true left/right, never the estimator's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Get the side name as a string for channel labels and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Joints the engine can measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Shoulder,
    Elbow,
    Hip,
    Knee,
    Ankle,
    Neck,
}

impl Joint {
    /// Get the joint name as a string for channel labels and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::Hip => "hip",
            Joint::Knee => "knee",
            Joint::Ankle => "ankle",
            Joint::Neck => "neck",
        }
    }
}

/// A single tracked body keypoint for one frame.
///
/// Coordinates are normalized to the image (x, y in [0, 1]). Depth is the
/// estimator's relative z where lower means closer to the camera. Landmarks
/// are immutable value data; the engine only ever reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position in [0, 1]
    pub x: f64,
    /// Normalized vertical position in [0, 1]
    pub y: f64,
    /// Relative depth, lower = closer to the camera
    pub z: Option<f64>,
    /// Detection confidence in [0, 1]
    pub visibility: f64,
}

impl Landmark {
    /// Create a landmark without depth information
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility,
        }
    }

    /// Create a landmark with relative depth
    pub fn with_depth(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            visibility,
        }
    }

    /// Get the 2D position as a tuple
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Check whether the landmark clears a visibility threshold
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility >= threshold
    }
}

/// One frame's landmark set, indexed by the fixed 33-point schema.
///
/// Slots for landmarks the estimator did not report are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Capture timestamp supplied by the pose-estimation collaborator
    pub timestamp: DateTime<Utc>,
    landmarks: [Option<Landmark>; LANDMARK_COUNT],
}

impl LandmarkFrame {
    /// Create an empty frame with the given capture timestamp
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            landmarks: [None; LANDMARK_COUNT],
        }
    }

    /// Build a frame from a slice of optional landmarks in schema order.
    /// The slice must contain exactly one entry per schema index.
    pub fn from_slice(timestamp: DateTime<Utc>, landmarks: &[Option<Landmark>]) -> Result<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(RomcamError::invalid_frame(format!(
                "expected {} landmark slots, got {}",
                LANDMARK_COUNT,
                landmarks.len()
            )));
        }

        let mut frame = Self::new(timestamp);
        for (slot, landmark) in frame.landmarks.iter_mut().zip(landmarks.iter()) {
            *slot = *landmark;
        }
        Ok(frame)
    }

    /// Set a landmark slot
    pub fn set(&mut self, index: LandmarkIndex, landmark: Landmark) {
        self.landmarks[index.index()] = Some(landmark);
    }

    /// Set a landmark slot, consuming and returning the frame (test ergonomics)
    pub fn with(mut self, index: LandmarkIndex, landmark: Landmark) -> Self {
        self.set(index, landmark);
        self
    }

    /// Get a landmark by schema index
    pub fn get(&self, index: LandmarkIndex) -> Option<Landmark> {
        self.landmarks[index.index()]
    }

    /// Get a landmark only if it clears the visibility threshold
    pub fn visible(&self, index: LandmarkIndex, threshold: f64) -> Option<Landmark> {
        self.get(index).filter(|l| l.is_visible(threshold))
    }

    /// Count how many landmarks clear the visibility threshold
    pub fn count_visible(&self, threshold: f64) -> usize {
        self.landmarks
            .iter()
            .flatten()
            .filter(|l| l.is_visible(threshold))
            .count()
    }

    /// Swap two landmark slots in place
    pub(crate) fn swap(&mut self, a: LandmarkIndex, b: LandmarkIndex) {
        self.landmarks.swap(a.index(), b.index());
    }
}
