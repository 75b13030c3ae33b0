use tracing::debug;

use crate::config::SelectorConfig;
use crate::geometry::AngleValue;
use crate::landmarks::Side;

/// One side's candidacy evidence for the current frame
#[derive(Debug, Clone, Copy)]
pub struct SideCandidate {
    pub side: Side,
    /// Relative depth of the vertex landmark, lower = closer to the camera
    pub depth: Option<f64>,
    /// Count of the angle's required landmarks above the visibility threshold
    pub quality: usize,
    /// The side's raw angle for this frame
    pub angle: AngleValue,
    /// Vertex landmark visibility
    pub vertex_visibility: f64,
}

impl SideCandidate {
    /// A candidate with no usable evidence at all
    pub fn empty(side: Side) -> Self {
        Self {
            side,
            depth: None,
            quality: 0,
            angle: AngleValue::Missing,
            vertex_visibility: 0.0,
        }
    }
}

/// Which criterion decided a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCriterion {
    /// One side was decisively closer to the camera
    Depth,
    /// One side had more required landmarks above the visibility threshold
    Quality,
    /// One side produced a measurable angle while the other was missing
    AngleValidity,
    /// One vertex landmark was more visible
    VertexVisibility,
    /// Nothing was decisive; the dominant-side hint (or left) was used
    Fallback,
}

/// Outcome of primary-side selection
#[derive(Debug, Clone, Copy)]
pub struct SideSelection {
    pub side: Side,
    pub criterion: SelectionCriterion,
}

/// Pick the single authoritative side for a profile view.
///
/// Criteria are evaluated in strict priority order and the first decisive one
/// wins: (1) relative depth when the difference exceeds the threshold, (2)
/// landmark-quality score, (3) angle validity, (4) vertex visibility. When
/// nothing is decisive the caller's dominant-side hint breaks the tie. The
/// caller must force the losing side's result to MISSING for this frame.
pub fn select_primary(
    left: &SideCandidate,
    right: &SideCandidate,
    config: &SelectorConfig,
    dominant_hint: Option<Side>,
) -> SideSelection {
    // (1) Relative depth: the decisively closer side wins
    if let (Some(left_depth), Some(right_depth)) = (left.depth, right.depth) {
        if (left_depth - right_depth).abs() > config.depth_threshold {
            let side = if left_depth < right_depth {
                Side::Left
            } else {
                Side::Right
            };
            debug!(
                "Primary side {:?} by depth ({:.3} vs {:.3})",
                side, left_depth, right_depth
            );
            return SideSelection {
                side,
                criterion: SelectionCriterion::Depth,
            };
        }
    }

    // (2) Landmark quality score
    if left.quality != right.quality {
        let side = if left.quality > right.quality {
            Side::Left
        } else {
            Side::Right
        };
        debug!(
            "Primary side {:?} by landmark quality ({} vs {})",
            side, left.quality, right.quality
        );
        return SideSelection {
            side,
            criterion: SelectionCriterion::Quality,
        };
    }

    // (3) Angle validity: a measurable angle beats a missing one
    match (left.angle.is_missing(), right.angle.is_missing()) {
        (false, true) => {
            debug!("Primary side Left by angle validity");
            return SideSelection {
                side: Side::Left,
                criterion: SelectionCriterion::AngleValidity,
            };
        }
        (true, false) => {
            debug!("Primary side Right by angle validity");
            return SideSelection {
                side: Side::Right,
                criterion: SelectionCriterion::AngleValidity,
            };
        }
        _ => {}
    }

    // (4) Vertex visibility
    if left.vertex_visibility != right.vertex_visibility {
        let side = if left.vertex_visibility > right.vertex_visibility {
            Side::Left
        } else {
            Side::Right
        };
        debug!(
            "Primary side {:?} by vertex visibility ({:.2} vs {:.2})",
            side, left.vertex_visibility, right.vertex_visibility
        );
        return SideSelection {
            side,
            criterion: SelectionCriterion::VertexVisibility,
        };
    }

    let side = dominant_hint.unwrap_or(Side::Left);
    debug!("Primary side {:?} by fallback", side);
    SideSelection {
        side,
        criterion: SelectionCriterion::Fallback,
    }
}
