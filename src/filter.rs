use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::config::{FilterConfig, FilterMode};

/// Rolling temporal filter for one angle channel.
///
/// Holds the most recent measured raw angles in a fixed-capacity window and
/// emits the window's median (or mean) as the smoothed value. The output is
/// defined from the very first sample: a partial window is filtered over its
/// current contents, and an even-count median averages the two central values.
/// Missing angles never reach the filter, so gaps neither pollute nor reset
/// the window; only the idle timeout clears it.
#[derive(Debug, Clone)]
pub struct AngleFilter {
    window: VecDeque<f64>,
    capacity: usize,
    mode: FilterMode,
    idle_timeout_ms: u64,
    last_sample_at: Option<DateTime<Utc>>,
    total_samples: u64,
}

impl AngleFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window_size),
            capacity: config.window_size,
            mode: config.mode,
            idle_timeout_ms: config.idle_timeout_ms,
            last_sample_at: None,
            total_samples: 0,
        }
    }

    /// Feed one raw angle sample and return the smoothed value.
    ///
    /// If the channel has been idle longer than the configured timeout the
    /// window is cleared first, so a new movement bout starts from its own
    /// samples instead of stale ones.
    pub fn apply(&mut self, value: f64, at: DateTime<Utc>) -> f64 {
        if let Some(last) = self.last_sample_at {
            let idle_ms = (at - last).num_milliseconds();
            if idle_ms > self.idle_timeout_ms as i64 {
                debug!(
                    "Channel idle for {}ms, clearing filter window ({} samples)",
                    idle_ms,
                    self.window.len()
                );
                self.window.clear();
            }
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.last_sample_at = Some(at);
        self.total_samples += 1;

        let filtered = match self.mode {
            FilterMode::Median => median(&self.window),
            FilterMode::Mean => mean(&self.window),
        };
        trace!(
            "Filtered {:.1} -> {:.1} over {} samples",
            value,
            filtered,
            self.window.len()
        );
        filtered
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Total samples accepted over the filter's lifetime, across idle clears
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn clear(&mut self) {
        self.window.clear();
        self.last_sample_at = None;
    }
}

fn median(window: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = window.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn mean(window: &VecDeque<f64>) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}
