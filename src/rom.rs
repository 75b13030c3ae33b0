use serde::{Deserialize, Serialize};
use tracing::trace;

/// One movement-phase band, bounded above by `below` (exclusive).
///
/// Bands are evaluated in order and the final band of an exercise leaves
/// `below` unset so every angle classifies. Breakpoints are configuration
/// data, not engine logic.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PhaseBand {
    pub label: String,
    /// Upper bound in degrees; `None` marks the open-ended final band
    pub below: Option<f64>,
}

/// Classify an angle into the first matching band.
///
/// Returns `None` only for an empty band list; a well-formed exercise always
/// ends with an open-ended band.
pub fn classify_phase(value: f64, bands: &[PhaseBand]) -> Option<&str> {
    for band in bands {
        match band.below {
            Some(bound) if value < bound => return Some(&band.label),
            Some(_) => continue,
            None => return Some(&band.label),
        }
    }
    None
}

/// Running range-of-motion statistics for one angle channel.
///
/// `current` always reflects the latest filtered sample. Extrema come from
/// raw samples when `track_raw_extrema` is set, so a brief true peak still
/// counts even if the filter smooths it away. With `absolute_excursion` all
/// tracked values use magnitude only, for exercises where excursion away from
/// neutral matters more than direction.
#[derive(Debug, Clone)]
pub struct RomTracker {
    track_raw_extrema: bool,
    absolute_excursion: bool,
    current: Option<f64>,
    max: Option<f64>,
    min: Option<f64>,
    sample_count: u64,
    clamped_samples: u64,
}

impl RomTracker {
    pub fn new(track_raw_extrema: bool, absolute_excursion: bool) -> Self {
        Self {
            track_raw_extrema,
            absolute_excursion,
            current: None,
            max: None,
            min: None,
            sample_count: 0,
            clamped_samples: 0,
        }
    }

    /// Record one valid sample pair (filtered and raw) for the channel
    pub fn update(&mut self, filtered: f64, raw: f64, clamped: bool) {
        let current = self.oriented(filtered);
        let extremum_source = if self.track_raw_extrema {
            self.oriented(raw)
        } else {
            current
        };

        self.current = Some(current);
        self.max = Some(match self.max {
            Some(max) => max.max(extremum_source),
            None => extremum_source,
        });
        self.min = Some(match self.min {
            Some(min) => min.min(extremum_source),
            None => extremum_source,
        });
        self.sample_count += 1;
        if clamped {
            self.clamped_samples += 1;
        }
        trace!(
            "ROM sample {}: current {:.1}, max {:.1}, min {:.1}",
            self.sample_count,
            current,
            self.max.unwrap_or(f64::NAN),
            self.min.unwrap_or(f64::NAN)
        );
    }

    fn oriented(&self, value: f64) -> f64 {
        if self.absolute_excursion {
            value.abs()
        } else {
            value
        }
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn clamped_samples(&self) -> u64 {
        self.clamped_samples
    }

    /// Total excursion covered so far (`max - min`)
    pub fn excursion(&self) -> Option<f64> {
        match (self.max, self.min) {
            (Some(max), Some(min)) => Some(max - min),
            _ => None,
        }
    }

    /// Restart extrema and counters; the next sample seeds a fresh range.
    ///
    /// Smoothing state lives in the channel's `AngleFilter` and is deliberately
    /// untouched by a ROM reset.
    pub fn reset(&mut self) {
        self.current = None;
        self.max = None;
        self.min = None;
        self.sample_count = 0;
        self.clamped_samples = 0;
    }

    pub fn snapshot(&self) -> RomSnapshot {
        RomSnapshot {
            current: self.current,
            max: self.max,
            min: self.min,
            excursion: self.excursion(),
            sample_count: self.sample_count,
            clamped_samples: self.clamped_samples,
        }
    }
}

/// Point-in-time copy of a channel's ROM statistics
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RomSnapshot {
    pub current: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub excursion: Option<f64>,
    pub sample_count: u64,
    pub clamped_samples: u64,
}

/// Left/right difference for a joint, with the session's peak retained
#[derive(Debug, Clone, Default)]
pub struct AsymmetryTracker {
    current: Option<f64>,
    peak: Option<f64>,
}

impl AsymmetryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from both sides' current angles; asymmetry is only defined when
    /// both produced a valid sample this frame.
    pub fn update(&mut self, left: Option<f64>, right: Option<f64>) -> Option<f64> {
        self.current = match (left, right) {
            (Some(left), Some(right)) => {
                let asymmetry = (left - right).abs();
                self.peak = Some(match self.peak {
                    Some(peak) => peak.max(asymmetry),
                    None => asymmetry,
                });
                Some(asymmetry)
            }
            _ => None,
        };
        self.current
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn peak(&self) -> Option<f64> {
        self.peak
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.peak = None;
    }
}
