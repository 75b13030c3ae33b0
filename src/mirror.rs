use tracing::trace;

use crate::landmarks::{LandmarkFrame, LandmarkIndex, Side};

/// Remaps estimator-labeled left/right landmarks to the subject's anatomical
/// left/right.
///
/// Pose estimators label sides from the camera's point of view, so a subject
/// facing the camera has their anatomical left reported as estimator-right.
/// This correction is the single authoritative remapping point in the
/// pipeline: it runs once, first, on every frame, and no other component may
/// re-apply or undo it. The swap is its own involution, which is what lets
/// integration tests detect a double application elsewhere.
pub struct MirrorCorrector;

impl MirrorCorrector {
    /// Produce the anatomically-labeled frame for an estimator-labeled one.
    /// The input frame is left untouched.
    pub fn correct(frame: &LandmarkFrame) -> LandmarkFrame {
        let mut corrected = frame.clone();

        for index in LandmarkIndex::ALL {
            // Swap each pair once, from its left member
            if index.side() == Some(Side::Left) {
                corrected.swap(index, index.opposite());
            }
        }

        trace!("Mirror correction applied");
        corrected
    }
}
