use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::ExerciseConfig;
use crate::landmarks::{Landmark, LandmarkFrame, Side};
use crate::orientation::ViewOrientation;

/// Vector magnitudes below this are treated as degenerate (occluded or
/// overlapping landmarks) and produce a MISSING angle
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Angle model an exercise is measured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleModel {
    /// Angle between a configured absolute direction and the vertex->distal segment
    FixedReference,
    /// Internal angle at the vertex between the proximal and distal segments
    ThreePoint,
}

/// Absolute reference directions for the fixed-reference model, in image
/// coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceVector {
    VerticalDown,
    VerticalUp,
    Horizontal,
}

impl ReferenceVector {
    /// Unit components of the reference direction
    pub fn components(self) -> (f64, f64) {
        match self {
            ReferenceVector::VerticalDown => (0.0, 1.0),
            ReferenceVector::VerticalUp => (0.0, -1.0),
            ReferenceVector::Horizontal => (1.0, 0.0),
        }
    }
}

/// A measured angle in degrees, or the explicit absence of one.
///
/// MISSING is never conflated with 0.0 -- zero is a valid measured angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleValue {
    Measured(f64),
    Missing,
}

impl AngleValue {
    /// Get the measured degrees, if any
    pub fn degrees(self) -> Option<f64> {
        match self {
            AngleValue::Measured(degrees) => Some(degrees),
            AngleValue::Missing => None,
        }
    }

    /// Check whether the value is missing
    pub fn is_missing(self) -> bool {
        matches!(self, AngleValue::Missing)
    }
}

/// One joint angle computation for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleResult {
    /// The measured value after sign and clamping, or MISSING
    pub value: AngleValue,
    /// Whether the value carries a flexion(+)/extension(-) sign
    pub signed: bool,
    /// Whether the raw value fell outside the anatomical range and was clamped
    pub clamped: bool,
}

impl AngleResult {
    /// A missing result (occlusion, degenerate vectors, suppressed side)
    pub fn missing() -> Self {
        Self {
            value: AngleValue::Missing,
            signed: false,
            clamped: false,
        }
    }
}

/// 2D vector from landmark `a` to landmark `b`
fn segment(a: Landmark, b: Landmark) -> (f64, f64) {
    (b.x - a.x, b.y - a.y)
}

fn magnitude(v: (f64, f64)) -> f64 {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}

fn dot(u: (f64, f64), v: (f64, f64)) -> f64 {
    u.0 * v.0 + u.1 * v.1
}

/// 2D cross product (z component of the 3D cross)
fn cross(u: (f64, f64), v: (f64, f64)) -> f64 {
    u.0 * v.1 - u.1 * v.0
}

/// Unsigned angle between two vectors in degrees, in [0, 180].
///
/// Degenerate (near zero-length) vectors yield MISSING, never 0 or NaN.
pub fn unsigned_angle(u: (f64, f64), v: (f64, f64)) -> AngleValue {
    let mag_u = magnitude(u);
    let mag_v = magnitude(v);

    if mag_u < DEGENERATE_EPSILON || mag_v < DEGENERATE_EPSILON {
        return AngleValue::Missing;
    }

    let cosine = (dot(u, v) / (mag_u * mag_v)).clamp(-1.0, 1.0);
    AngleValue::Measured(cosine.acos().to_degrees())
}

/// Signed angle between two vectors with the side-dependent direction parity:
/// on the left side a positive cross product is positive, on the right side a
/// negative cross product is positive.
pub fn signed_angle(u: (f64, f64), v: (f64, f64), side: Side) -> AngleValue {
    match unsigned_angle(u, v) {
        AngleValue::Measured(degrees) => {
            AngleValue::Measured(degrees * direction_sign(cross(u, v), side))
        }
        AngleValue::Missing => AngleValue::Missing,
    }
}

fn direction_sign(cross: f64, side: Side) -> f64 {
    let positive = match side {
        Side::Left => cross > 0.0,
        Side::Right => cross < 0.0,
    };
    if positive {
        1.0
    } else {
        -1.0
    }
}

/// Clamp a value to an anatomical range, reporting whether clamping occurred
pub fn clamp_to_range(value: f64, range: (f64, f64)) -> (f64, bool) {
    if value < range.0 {
        (range.0, true)
    } else if value > range.1 {
        (range.1, true)
    } else {
        (value, false)
    }
}

/// Compute one side's joint angle for an exercise.
///
/// Resolves the exercise's landmark roles to the requested side, gates them on
/// the visibility threshold, applies the configured angle model, sign
/// convention, and anatomical clamping. Any missing or degenerate input makes
/// the result MISSING rather than an error; only the surrounding
/// configuration can be invalid, and that is rejected at load time.
pub fn measure_angle(
    exercise: &ExerciseConfig,
    orientation: ViewOrientation,
    side: Side,
    frame: &LandmarkFrame,
    min_visibility: f64,
) -> AngleResult {
    let (vertex_index, proximal_index, distal_index) = exercise.landmarks_for_side(side);

    let vertex = match frame.visible(vertex_index, min_visibility) {
        Some(landmark) => landmark,
        None => {
            trace!("{:?} vertex {:?} below visibility threshold", side, vertex_index);
            return AngleResult::missing();
        }
    };
    let distal = match frame.visible(distal_index, min_visibility) {
        Some(landmark) => landmark,
        None => {
            trace!("{:?} distal {:?} below visibility threshold", side, distal_index);
            return AngleResult::missing();
        }
    };

    let (u, v) = match exercise.model {
        AngleModel::FixedReference => {
            let reference = match exercise.reference_for(orientation) {
                Some(reference) => reference,
                None => {
                    debug!(
                        "No reference vector for orientation {:?}, reporting missing",
                        orientation
                    );
                    return AngleResult::missing();
                }
            };
            (reference.components(), segment(vertex, distal))
        }
        AngleModel::ThreePoint => {
            let proximal_index = match proximal_index {
                Some(index) => index,
                None => return AngleResult::missing(),
            };
            let proximal = match frame.visible(proximal_index, min_visibility) {
                Some(landmark) => landmark,
                None => {
                    trace!(
                        "{:?} proximal {:?} below visibility threshold",
                        side,
                        proximal_index
                    );
                    return AngleResult::missing();
                }
            };
            (segment(vertex, proximal), segment(vertex, distal))
        }
    };

    let raw = match unsigned_angle(u, v) {
        AngleValue::Measured(degrees) => degrees,
        AngleValue::Missing => {
            trace!("{:?} {:?} angle degenerate", side, exercise.joint);
            return AngleResult::missing();
        }
    };

    let converted = if exercise.clinical_conversion && exercise.model == AngleModel::ThreePoint {
        180.0 - raw
    } else {
        raw
    };

    let directed = if exercise.signed {
        converted * direction_sign(cross(u, v), side)
    } else {
        converted
    };

    let (clamped_value, clamped) = clamp_to_range(directed, exercise.valid_range);
    if clamped {
        debug!(
            "{:?} {:?} angle {:.1} outside [{:.1}, {:.1}], clamped",
            side, exercise.joint, directed, exercise.valid_range.0, exercise.valid_range.1
        );
    }

    AngleResult {
        value: AngleValue::Measured(clamped_value),
        signed: exercise.signed,
        clamped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExerciseLandmarks;
    use crate::landmarks::{Joint, LandmarkIndex};
    use chrono::Utc;

    const EPSILON: f64 = 1e-9;

    fn create_threepoint_exercise() -> ExerciseConfig {
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
            valid_range: (0.0, 180.0),
            phase_bands: Vec::new(),
            signed: false,
            clinical_conversion: false,
            absolute_excursion: false,
        }
    }

    fn create_fixed_reference_exercise() -> ExerciseConfig {
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
            valid_range: (-180.0, 180.0),
            phase_bands: Vec::new(),
            signed: true,
            clinical_conversion: false,
            absolute_excursion: false,
        }
    }

    fn create_tripod_frame() -> LandmarkFrame {
        // Knee straight above the ankle, foot straight ahead: 90 degrees
        LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::LeftAnkle, Landmark::new(0.5, 0.8, 0.9))
            .with(LandmarkIndex::LeftKnee, Landmark::new(0.5, 0.5, 0.9))
            .with(LandmarkIndex::LeftFootIndex, Landmark::new(0.6, 0.8, 0.9))
    }

    #[test]
    fn test_angle_is_symmetric() {
        let u = (1.0, 0.3);
        let v = (-0.2, 0.9);

        let ab = unsigned_angle(u, v).degrees().unwrap();
        let ba = unsigned_angle(v, u).degrees().unwrap();
        assert!((ab - ba).abs() < EPSILON);
    }

    #[test]
    fn test_signed_angle_is_antisymmetric() {
        let u = (1.0, 0.0);
        let v = (0.0, 1.0);

        let ab = signed_angle(u, v, Side::Left).degrees().unwrap();
        let ba = signed_angle(v, u, Side::Left).degrees().unwrap();
        assert!((ab + ba).abs() < EPSILON);
    }

    #[test]
    fn test_identical_and_opposite_vectors() {
        let v = (0.6, -0.8);

        let same = unsigned_angle(v, v).degrees().unwrap();
        assert!(same.abs() < EPSILON);

        let opposite = unsigned_angle(v, (-v.0, -v.1)).degrees().unwrap();
        assert!((opposite - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_degenerate_vectors_are_missing() {
        assert!(unsigned_angle((0.0, 0.0), (1.0, 0.0)).is_missing());
        assert!(unsigned_angle((1.0, 0.0), (0.0, 0.0)).is_missing());
        assert!(signed_angle((0.0, 0.0), (1.0, 0.0), Side::Left).is_missing());
    }

    #[test]
    fn test_side_parity_inverts_sign() {
        let u = (0.0, 1.0);
        let v = (1.0, 0.0);

        let left = signed_angle(u, v, Side::Left).degrees().unwrap();
        let right = signed_angle(u, v, Side::Right).degrees().unwrap();
        assert!((left + right).abs() < EPSILON);
        assert!((left.abs() - 90.0).abs() < EPSILON);
    }

    #[test]
    fn test_clamp_to_range() {
        assert_eq!(clamp_to_range(95.0, (40.0, 110.0)), (95.0, false));
        assert_eq!(clamp_to_range(120.0, (40.0, 110.0)), (110.0, true));
        assert_eq!(clamp_to_range(10.0, (40.0, 110.0)), (40.0, true));
        assert_eq!(clamp_to_range(40.0, (40.0, 110.0)), (40.0, false));
    }

    #[test]
    fn test_three_point_right_angle() {
        let exercise = create_threepoint_exercise();
        let frame = create_tripod_frame();

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        let degrees = result.value.degrees().unwrap();
        assert!((degrees - 90.0).abs() < 1e-6);
        assert!(!result.clamped);
    }

    #[test]
    fn test_clinical_conversion_of_right_angle() {
        let mut exercise = create_threepoint_exercise();
        exercise.clinical_conversion = true;
        let frame = create_tripod_frame();

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        // 180 - 90 is still 90
        let degrees = result.value.degrees().unwrap();
        assert!((degrees - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamping_flags_result() {
        let mut exercise = create_threepoint_exercise();
        exercise.valid_range = (0.0, 80.0);
        let frame = create_tripod_frame();

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        assert_eq!(result.value.degrees(), Some(80.0));
        assert!(result.clamped);
    }

    #[test]
    fn test_low_visibility_is_missing() {
        let exercise = create_threepoint_exercise();
        let frame = create_tripod_frame()
            .with(LandmarkIndex::LeftFootIndex, Landmark::new(0.6, 0.8, 0.2));

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        assert!(result.value.is_missing());
        assert!(!result.clamped);
    }

    #[test]
    fn test_coincident_landmarks_are_missing() {
        let exercise = create_threepoint_exercise();
        let frame = create_tripod_frame()
            .with(LandmarkIndex::LeftFootIndex, Landmark::new(0.5, 0.8, 0.9));

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        assert!(result.value.is_missing());
    }

    #[test]
    fn test_fixed_reference_signed_measurement() {
        let exercise = create_fixed_reference_exercise();

        // Thigh swung forward horizontally from the hip
        let frame = LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::LeftHip, Landmark::new(0.5, 0.5, 0.9))
            .with(LandmarkIndex::LeftKnee, Landmark::new(0.7, 0.5, 0.9));

        let left = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );
        assert!(left.signed);
        let left_degrees = left.value.degrees().unwrap();
        assert!((left_degrees.abs() - 90.0).abs() < 1e-6);

        // Same geometry read as the right side inverts the sign convention
        let frame = LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::RightHip, Landmark::new(0.5, 0.5, 0.9))
            .with(LandmarkIndex::RightKnee, Landmark::new(0.7, 0.5, 0.9));
        let right = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Right,
            &frame,
            0.5,
        );
        let right_degrees = right.value.degrees().unwrap();
        assert!((left_degrees + right_degrees).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_leg_reads_zero() {
        let exercise = create_fixed_reference_exercise();

        let frame = LandmarkFrame::new(Utc::now())
            .with(LandmarkIndex::LeftHip, Landmark::new(0.5, 0.4, 0.9))
            .with(LandmarkIndex::LeftKnee, Landmark::new(0.5, 0.7, 0.9));

        let result = measure_angle(
            &exercise,
            ViewOrientation::Sagittal,
            Side::Left,
            &frame,
            0.5,
        );

        assert!(result.value.degrees().unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_reference_vector_components() {
        assert_eq!(ReferenceVector::VerticalDown.components(), (0.0, 1.0));
        assert_eq!(ReferenceVector::VerticalUp.components(), (0.0, -1.0));
        assert_eq!(ReferenceVector::Horizontal.components(), (1.0, 0.0));
    }
}
