pub mod config;
pub mod error;
pub mod landmarks;
pub mod mirror;
pub mod orientation;
pub mod geometry;
pub mod selector;
pub mod filter;
pub mod rom;
pub mod report;
pub mod session;
pub mod manager;

pub use config::{
    EngineConfig, ExerciseConfig, ExerciseLandmarks, FilterConfig, FilterMode, OrientationConfig,
    RomConfig, SelectorConfig, SessionConfig,
};
pub use error::{Result, RomcamError};
pub use landmarks::{Joint, Landmark, LandmarkFrame, LandmarkIndex, Side, LANDMARK_COUNT};
pub use mirror::MirrorCorrector;
pub use orientation::{FacingDirection, OrientationClassifier, OrientationState, ViewOrientation};
pub use geometry::{measure_angle, AngleModel, AngleResult, AngleValue, ReferenceVector};
pub use selector::{select_primary, SelectionCriterion, SideCandidate, SideSelection};
pub use filter::AngleFilter;
pub use rom::{classify_phase, AsymmetryTracker, PhaseBand, RomSnapshot, RomTracker};
pub use report::{ChannelSummary, FrameReport, JointReading, SessionSummary};
pub use session::{AnalysisSession, ChannelKey};
pub use manager::SessionManager;
