//! Rolling detection-latency statistics driving adaptive tracker quality.
//!
//! Latencies are collected over a fixed window. Once the window is full its
//! mean is compared against a budget: above it recommends a downgrade, below
//! half of it an upgrade. The window is cleared after every recommendation so
//! the next decision only sees frames detected at the new quality.

use crate::constants::UPGRADE_HEADROOM_RATIO;
use std::collections::VecDeque;
use std::time::Duration;

/// Quality change recommended by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityAdjustment {
    Downgrade,
    Upgrade,
}

/// Latency monitor over a rolling window
pub struct LatencyMonitor {
    window_size: usize,
    budget_ms: f64,
    history: VecDeque<f64>,
}

impl LatencyMonitor {
    /// Create a new latency monitor
    ///
    /// # Panics
    ///
    /// Panics if the window is empty or the budget is not positive
    #[must_use]
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        assert!(window_size > 0, "Window size must be positive");
        assert!(budget_ms > 0.0, "Latency budget must be positive");
        Self {
            window_size,
            budget_ms,
            history: VecDeque::with_capacity(window_size),
        }
    }

    /// Record one detection latency, returning a recommendation once the
    /// window is full and its mean leaves the comfortable band
    pub fn record(&mut self, latency: Duration) -> Option<QualityAdjustment> {
        if self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back(latency.as_secs_f64() * 1000.0);

        let stats = self.stats()?;
        let adjustment = if stats.mean > self.budget_ms {
            QualityAdjustment::Downgrade
        } else if stats.mean < self.budget_ms * UPGRADE_HEADROOM_RATIO {
            QualityAdjustment::Upgrade
        } else {
            return None;
        };

        log::debug!(
            "Mean detection latency {:.1} ms against {:.1} ms budget: {:?}",
            stats.mean,
            self.budget_ms,
            adjustment
        );
        self.history.clear();
        Some(adjustment)
    }

    /// Statistics of the current window, `None` until it is full
    #[must_use]
    pub fn stats(&self) -> Option<Statistics> {
        if self.history.len() < self.window_size {
            return None;
        }
        Some(Self::calculate_stats(&self.history))
    }

    #[must_use]
    pub fn budget_ms(&self) -> f64 {
        self.budget_ms
    }

    /// Reset the monitor
    pub fn reset(&mut self) {
        self.history.clear();
    }

    fn calculate_stats(data: &VecDeque<f64>) -> Statistics {
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Statistics {
            mean,
            std_dev: variance.sqrt(),
            min: data.iter().copied().fold(f64::INFINITY, f64::min),
            max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Summary of a latency window in milliseconds
#[derive(Debug, Clone, Copy)]
pub struct Statistics {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}
