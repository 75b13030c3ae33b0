use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::RomcamError;
use crate::geometry::{AngleModel, ReferenceVector};
use crate::landmarks::{Joint, LandmarkIndex, Side};
use crate::orientation::ViewOrientation;
use crate::rom::PhaseBand;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    pub orientation: OrientationConfig,
    pub filter: FilterConfig,
    pub selector: SelectorConfig,
    pub rom: RomConfig,
    pub session: SessionConfig,

    /// Exercise catalog keyed by exercise identifier. A configuration file
    /// that defines its own `[exercises.*]` tables replaces the built-in
    /// catalog entirely.
    #[serde(default = "default_exercise_catalog")]
    pub exercises: HashMap<String, ExerciseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OrientationConfig {
    /// Normalized shoulder separation above which a view can be frontal
    #[serde(default = "default_separation_threshold")]
    pub separation_threshold: f64,

    /// Minimum average shoulder visibility for a frontal label
    #[serde(default = "default_avg_visibility_threshold")]
    pub avg_visibility_threshold: f64,

    /// Minimum individual shoulder visibility for a frontal label
    #[serde(default = "default_min_visibility_threshold")]
    pub min_visibility_threshold: f64,

    /// Horizontal nose offset treated as "facing the camera"
    #[serde(default = "default_nose_dead_zone")]
    pub nose_dead_zone: f64,

    /// Raw classifications retained for hysteresis voting
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Samples required before the committed label may change
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Most recent classifications counted in the weighted vote
    #[serde(default = "default_vote_window")]
    pub vote_window: usize,

    /// Weighted-vote lead a challenger needs to displace the committed label
    #[serde(default = "default_change_margin")]
    pub change_margin: f64,

    /// Minimum visible landmarks for any classification at all
    #[serde(default = "default_min_landmarks")]
    pub min_landmarks: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilterConfig {
    /// Rolling window capacity per angle channel
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Statistic emitted from the window
    #[serde(default = "default_filter_mode")]
    pub mode: FilterMode,

    /// Idle time after which a channel's window is cleared
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

/// Statistic the temporal filter emits from its window
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Median,
    Mean,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SelectorConfig {
    /// Depth difference above which the closer side wins outright
    #[serde(default = "default_depth_threshold")]
    pub depth_threshold: f64,

    /// Visibility threshold for landmark quality scoring and angle inputs
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RomConfig {
    /// Track ROM extrema from raw angles instead of filtered output
    #[serde(default = "default_track_raw_extrema")]
    pub track_raw_extrema: bool,

    /// Report left/right asymmetry when both sides are valid in a frame
    #[serde(default = "default_report_asymmetry")]
    pub report_asymmetry: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Idle time after which the session manager may prune a session
    #[serde(default = "default_stale_timeout_seconds")]
    pub stale_timeout_seconds: u64,
}

/// Per-exercise measurement policy.
///
/// Landmark roles are authored for the anatomical LEFT side; the engine
/// mirrors them through the schema's left/right pairing for the right side.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExerciseConfig {
    /// Joint this exercise measures
    pub joint: Joint,

    /// Angle model used by the geometry engine
    pub model: AngleModel,

    /// Fixed reference direction when the view is frontal
    #[serde(default)]
    pub reference_frontal: Option<ReferenceVector>,

    /// Fixed reference direction when the view is sagittal
    #[serde(default)]
    pub reference_sagittal: Option<ReferenceVector>,

    /// Camera view the exercise is designed for
    pub expected_orientation: ViewOrientation,

    /// Landmark roles (left-side convention)
    pub landmarks: ExerciseLandmarks,

    /// Anatomically valid angle range; values outside are clamped and flagged
    pub valid_range: (f64, f64),

    /// Ordered movement-phase bands, lowest first. Empty disables phase labels.
    #[serde(default)]
    pub phase_bands: Vec<PhaseBand>,

    /// Report a signed angle (cross-product direction with side parity)
    #[serde(default)]
    pub signed: bool,

    /// Convert the three-point internal angle to 180 - angle (0 = extended)
    #[serde(default)]
    pub clinical_conversion: bool,

    /// Track ROM extrema on the absolute excursion instead of the signed value
    #[serde(default)]
    pub absolute_excursion: bool,
}

/// Landmark roles for one exercise, authored for the anatomical left side
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct ExerciseLandmarks {
    /// Joint vertex landmark
    pub vertex: LandmarkIndex,

    /// Proximal neighbor (three-point model only)
    #[serde(default)]
    pub proximal: Option<LandmarkIndex>,

    /// Distal neighbor (the moving segment endpoint)
    pub distal: LandmarkIndex,
}

impl ExerciseConfig {
    /// Resolve the fixed reference direction for a view, falling back to the
    /// other view's reference and finally to the expected view under UNKNOWN.
    pub fn reference_for(&self, orientation: ViewOrientation) -> Option<ReferenceVector> {
        match orientation {
            ViewOrientation::Frontal => self.reference_frontal.or(self.reference_sagittal),
            ViewOrientation::Sagittal => self.reference_sagittal.or(self.reference_frontal),
            ViewOrientation::Unknown => match self.expected_orientation {
                ViewOrientation::Frontal => self.reference_frontal.or(self.reference_sagittal),
                _ => self.reference_sagittal.or(self.reference_frontal),
            },
        }
    }

    /// Check a committed orientation against the exercise's expected view
    pub fn matches_orientation(&self, orientation: ViewOrientation) -> bool {
        orientation == self.expected_orientation
    }

    /// Landmark roles resolved to one body side
    pub fn landmarks_for_side(
        &self,
        side: Side,
    ) -> (LandmarkIndex, Option<LandmarkIndex>, LandmarkIndex) {
        (
            self.landmarks.vertex.for_side(side),
            self.landmarks.proximal.map(|p| p.for_side(side)),
            self.landmarks.distal.for_side(side),
        )
    }

    /// All landmarks the angle computation needs on one side
    pub fn required_landmarks(&self, side: Side) -> Vec<LandmarkIndex> {
        let (vertex, proximal, distal) = self.landmarks_for_side(side);
        let mut required = vec![vertex, distal];
        if let Some(proximal) = proximal {
            required.push(proximal);
        }
        required
    }
}

impl EngineConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("romcam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default(
                "orientation.separation_threshold",
                default_separation_threshold(),
            )?
            .set_default(
                "orientation.avg_visibility_threshold",
                default_avg_visibility_threshold(),
            )?
            .set_default(
                "orientation.min_visibility_threshold",
                default_min_visibility_threshold(),
            )?
            .set_default("orientation.nose_dead_zone", default_nose_dead_zone())?
            .set_default("orientation.history_size", default_history_size() as i64)?
            .set_default("orientation.min_samples", default_min_samples() as i64)?
            .set_default("orientation.vote_window", default_vote_window() as i64)?
            .set_default("orientation.change_margin", default_change_margin())?
            .set_default("orientation.min_landmarks", default_min_landmarks() as i64)?
            .set_default("filter.window_size", default_window_size() as i64)?
            .set_default("filter.mode", "Median")?
            .set_default("filter.idle_timeout_ms", default_idle_timeout_ms() as i64)?
            .set_default("selector.depth_threshold", default_depth_threshold())?
            .set_default(
                "selector.visibility_threshold",
                default_visibility_threshold(),
            )?
            .set_default("rom.track_raw_extrema", default_track_raw_extrema())?
            .set_default("rom.report_asymmetry", default_report_asymmetry())?
            .set_default(
                "session.stale_timeout_seconds",
                default_stale_timeout_seconds() as i64,
            )?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with ROMCAM_ prefix; a double
            // underscore separates nesting levels so snake_case keys stay
            // intact (ROMCAM_FILTER__WINDOW_SIZE -> filter.window_size)
            .add_source(
                Environment::with_prefix("ROMCAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;

        info!(
            "Configuration loaded successfully ({} exercises)",
            config.exercises.len()
        );
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Write the configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let rendered = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), rendered)?;
        info!("Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Look up an exercise policy by identifier.
    ///
    /// Also guards the reference-vector policy for configurations that were
    /// never passed through `validate()`, so a broken exercise fails here
    /// rather than mid-measurement.
    pub fn exercise(&self, exercise_id: &str) -> crate::error::Result<&ExerciseConfig> {
        let exercise = self
            .exercises
            .get(exercise_id)
            .ok_or_else(|| RomcamError::unknown_exercise(exercise_id))?;

        if exercise.model == AngleModel::FixedReference
            && exercise.reference_for(exercise.expected_orientation).is_none()
        {
            return Err(RomcamError::configuration_mismatch(
                exercise_id,
                "fixed-reference model has no reference vector",
            ));
        }
        Ok(exercise)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate orientation thresholds
        if self.orientation.separation_threshold <= 0.0 {
            return Err(ConfigError::Message(
                "Orientation separation_threshold must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.orientation.avg_visibility_threshold)
            || !(0.0..=1.0).contains(&self.orientation.min_visibility_threshold)
        {
            return Err(ConfigError::Message(
                "Orientation visibility thresholds must be within [0, 1]".to_string(),
            ));
        }

        if self.orientation.nose_dead_zone < 0.0 {
            return Err(ConfigError::Message(
                "Orientation nose_dead_zone must not be negative".to_string(),
            ));
        }

        // Validate hysteresis sizing
        if self.orientation.history_size == 0 {
            return Err(ConfigError::Message(
                "Orientation history_size must be greater than 0".to_string(),
            ));
        }

        if self.orientation.min_samples >= self.orientation.history_size {
            return Err(ConfigError::Message(
                "Orientation min_samples must be smaller than history_size".to_string(),
            ));
        }

        if self.orientation.vote_window == 0
            || self.orientation.vote_window > self.orientation.history_size
        {
            return Err(ConfigError::Message(
                "Orientation vote_window must be within 1..=history_size".to_string(),
            ));
        }

        if self.orientation.change_margin <= 0.0 {
            return Err(ConfigError::Message(
                "Orientation change_margin must be greater than 0".to_string(),
            ));
        }

        // Validate filter settings
        if self.filter.window_size == 0 {
            return Err(ConfigError::Message(
                "Filter window_size must be greater than 0".to_string(),
            ));
        }

        if self.filter.idle_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Filter idle_timeout_ms must be greater than 0".to_string(),
            ));
        }

        // Validate selector settings
        if self.selector.depth_threshold < 0.0 {
            return Err(ConfigError::Message(
                "Selector depth_threshold must not be negative".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.selector.visibility_threshold) {
            return Err(ConfigError::Message(
                "Selector visibility_threshold must be within [0, 1]".to_string(),
            ));
        }

        // Validate session settings
        if self.session.stale_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Session stale_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        // Validate the exercise catalog
        if self.exercises.is_empty() {
            return Err(ConfigError::Message(
                "Exercise catalog must not be empty".to_string(),
            ));
        }

        for (exercise_id, exercise) in &self.exercises {
            Self::validate_exercise(exercise_id, exercise)?;
        }

        Ok(())
    }

    fn validate_exercise(exercise_id: &str, exercise: &ExerciseConfig) -> Result<(), ConfigError> {
        if exercise.expected_orientation == ViewOrientation::Unknown {
            return Err(ConfigError::Message(format!(
                "Exercise {}: expected_orientation must be Frontal or Sagittal",
                exercise_id
            )));
        }

        if exercise.valid_range.0 >= exercise.valid_range.1 {
            return Err(ConfigError::Message(format!(
                "Exercise {}: valid_range minimum must be below maximum",
                exercise_id
            )));
        }

        match exercise.model {
            AngleModel::FixedReference => {
                if exercise.reference_for(exercise.expected_orientation).is_none() {
                    return Err(ConfigError::Message(format!(
                        "Exercise {}: fixed-reference model requires a reference vector",
                        exercise_id
                    )));
                }
            }
            AngleModel::ThreePoint => {
                if exercise.landmarks.proximal.is_none() {
                    return Err(ConfigError::Message(format!(
                        "Exercise {}: three-point model requires a proximal landmark",
                        exercise_id
                    )));
                }
            }
        }

        if exercise.landmarks.vertex == exercise.landmarks.distal {
            return Err(ConfigError::Message(format!(
                "Exercise {}: vertex and distal landmarks must differ",
                exercise_id
            )));
        }

        // Phase bands must be ordered with exactly one open-ended final band
        if !exercise.phase_bands.is_empty() {
            let mut previous: Option<f64> = None;
            for (position, band) in exercise.phase_bands.iter().enumerate() {
                if band.label.is_empty() {
                    return Err(ConfigError::Message(format!(
                        "Exercise {}: phase band labels must not be empty",
                        exercise_id
                    )));
                }

                let is_last = position == exercise.phase_bands.len() - 1;
                match band.below {
                    Some(upper) => {
                        if is_last {
                            return Err(ConfigError::Message(format!(
                                "Exercise {}: final phase band must be open-ended",
                                exercise_id
                            )));
                        }
                        if let Some(previous) = previous {
                            if upper <= previous {
                                return Err(ConfigError::Message(format!(
                                    "Exercise {}: phase band breakpoints must increase",
                                    exercise_id
                                )));
                            }
                        }
                        previous = Some(upper);
                    }
                    None => {
                        if !is_last {
                            return Err(ConfigError::Message(format!(
                                "Exercise {}: only the final phase band may be open-ended",
                                exercise_id
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            orientation: OrientationConfig::default(),
            filter: FilterConfig::default(),
            selector: SelectorConfig::default(),
            rom: RomConfig::default(),
            session: SessionConfig::default(),
            exercises: default_exercise_catalog(),
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            separation_threshold: default_separation_threshold(),
            avg_visibility_threshold: default_avg_visibility_threshold(),
            min_visibility_threshold: default_min_visibility_threshold(),
            nose_dead_zone: default_nose_dead_zone(),
            history_size: default_history_size(),
            min_samples: default_min_samples(),
            vote_window: default_vote_window(),
            change_margin: default_change_margin(),
            min_landmarks: default_min_landmarks(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            mode: default_filter_mode(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            depth_threshold: default_depth_threshold(),
            visibility_threshold: default_visibility_threshold(),
        }
    }
}

impl Default for RomConfig {
    fn default() -> Self {
        Self {
            track_raw_extrema: default_track_raw_extrema(),
            report_asymmetry: default_report_asymmetry(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stale_timeout_seconds: default_stale_timeout_seconds(),
        }
    }
}

// Default value functions
fn default_separation_threshold() -> f64 {
    0.12
}
fn default_avg_visibility_threshold() -> f64 {
    0.5
}
fn default_min_visibility_threshold() -> f64 {
    0.4
}
fn default_nose_dead_zone() -> f64 {
    0.05
}
fn default_history_size() -> usize {
    20
}
fn default_min_samples() -> usize {
    8
}
fn default_vote_window() -> usize {
    12
}
fn default_change_margin() -> f64 {
    2.0
}
fn default_min_landmarks() -> usize {
    4
}

fn default_window_size() -> usize {
    5
}
fn default_filter_mode() -> FilterMode {
    FilterMode::Median
}
fn default_idle_timeout_ms() -> u64 {
    2000
}

fn default_depth_threshold() -> f64 {
    0.05
}
fn default_visibility_threshold() -> f64 {
    0.5
}

fn default_track_raw_extrema() -> bool {
    true
}
fn default_report_asymmetry() -> bool {
    true
}

fn default_stale_timeout_seconds() -> u64 {
    300
}

fn band<S: Into<String>>(label: S, below: Option<f64>) -> PhaseBand {
    PhaseBand {
        label: label.into(),
        below,
    }
}

/// Built-in exercise catalog covering the joints the engine ships support for
fn default_exercise_catalog() -> HashMap<String, ExerciseConfig> {
    let mut exercises = HashMap::new();

    exercises.insert(
        "neck_lateral_flexion".to_string(),
        ExerciseConfig {
            joint: Joint::Neck,
            model: AngleModel::FixedReference,
            reference_frontal: Some(ReferenceVector::VerticalUp),
            reference_sagittal: None,
            expected_orientation: ViewOrientation::Frontal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftShoulder,
                proximal: None,
                distal: LandmarkIndex::LeftEar,
            },
            // Head tilt measured per side as shoulder-to-ear against vertical;
            // a nose-to-shoulder-midline vector would need a synthesized
            // vertex the landmark roles cannot express.
            valid_range: (0.0, 45.0),
            phase_bands: vec![
                band("neutral", Some(15.0)),
                band("mild_tilt", Some(30.0)),
                band("deep_tilt", Some(40.0)),
                band("full_tilt", None),
            ],
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "shoulder_flexion".to_string(),
        ExerciseConfig {
            joint: Joint::Shoulder,
            model: AngleModel::FixedReference,
            reference_frontal: Some(ReferenceVector::VerticalDown),
            reference_sagittal: Some(ReferenceVector::VerticalDown),
            expected_orientation: ViewOrientation::Sagittal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftShoulder,
                proximal: None,
                distal: LandmarkIndex::LeftElbow,
            },
            valid_range: (-60.0, 180.0),
            phase_bands: vec![
                band("extension", Some(0.0)),
                band("flexion", Some(150.0)),
                band("full_elevation", None),
            ],
            signed: true,
            clinical_conversion: false,
            absolute_excursion: true,
        },
    );

    exercises.insert(
        "shoulder_abduction".to_string(),
        ExerciseConfig {
            joint: Joint::Shoulder,
            model: AngleModel::FixedReference,
            reference_frontal: Some(ReferenceVector::VerticalDown),
            reference_sagittal: Some(ReferenceVector::VerticalDown),
            expected_orientation: ViewOrientation::Frontal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftShoulder,
                proximal: None,
                distal: LandmarkIndex::LeftElbow,
            },
            valid_range: (0.0, 180.0),
            phase_bands: vec![
                band("neutral", Some(30.0)),
                band("abduction", Some(90.0)),
                band("elevation", None),
            ],
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "elbow_flexion".to_string(),
        ExerciseConfig {
            joint: Joint::Elbow,
            model: AngleModel::ThreePoint,
            reference_frontal: None,
            reference_sagittal: None,
            expected_orientation: ViewOrientation::Sagittal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftElbow,
                proximal: Some(LandmarkIndex::LeftShoulder),
                distal: LandmarkIndex::LeftWrist,
            },
            valid_range: (0.0, 160.0),
            phase_bands: vec![
                band("extended", Some(30.0)),
                band("flexing", Some(120.0)),
                band("full_flexion", None),
            ],
            signed: false,
            clinical_conversion: true,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "hip_flexion".to_string(),
        ExerciseConfig {
            joint: Joint::Hip,
            model: AngleModel::FixedReference,
            reference_frontal: Some(ReferenceVector::VerticalDown),
            reference_sagittal: Some(ReferenceVector::VerticalDown),
            expected_orientation: ViewOrientation::Sagittal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftHip,
                proximal: None,
                distal: LandmarkIndex::LeftKnee,
            },
            valid_range: (-30.0, 130.0),
            phase_bands: vec![
                band("extension", Some(0.0)),
                band("flexion", Some(90.0)),
                band("deep_flexion", None),
            ],
            signed: true,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "hip_abduction".to_string(),
        ExerciseConfig {
            joint: Joint::Hip,
            model: AngleModel::FixedReference,
            reference_frontal: Some(ReferenceVector::VerticalDown),
            reference_sagittal: Some(ReferenceVector::VerticalDown),
            expected_orientation: ViewOrientation::Frontal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftHip,
                proximal: None,
                distal: LandmarkIndex::LeftKnee,
            },
            valid_range: (0.0, 60.0),
            phase_bands: vec![
                band("neutral", Some(15.0)),
                band("abduction", Some(40.0)),
                band("wide_abduction", None),
            ],
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "knee_flexion".to_string(),
        ExerciseConfig {
            joint: Joint::Knee,
            model: AngleModel::ThreePoint,
            reference_frontal: None,
            reference_sagittal: None,
            expected_orientation: ViewOrientation::Sagittal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftKnee,
                proximal: Some(LandmarkIndex::LeftHip),
                distal: LandmarkIndex::LeftAnkle,
            },
            // Raw internal angle: 180 = straight leg. The clinical inversion
            // stays configurable until the convention is validated.
            valid_range: (30.0, 180.0),
            phase_bands: vec![
                band("deep_flexion", Some(100.0)),
                band("flexion", Some(160.0)),
                band("extended", None),
            ],
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises.insert(
        "ankle_dorsiflexion".to_string(),
        ExerciseConfig {
            joint: Joint::Ankle,
            model: AngleModel::ThreePoint,
            reference_frontal: None,
            reference_sagittal: None,
            expected_orientation: ViewOrientation::Sagittal,
            landmarks: ExerciseLandmarks {
                vertex: LandmarkIndex::LeftAnkle,
                proximal: Some(LandmarkIndex::LeftKnee),
                distal: LandmarkIndex::LeftFootIndex,
            },
            valid_range: (40.0, 110.0),
            phase_bands: vec![
                band("plantarflexion", Some(80.0)),
                band("neutral", Some(100.0)),
                band("dorsiflexion", None),
            ],
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        },
    );

    exercises
}
