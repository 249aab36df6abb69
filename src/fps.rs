//! Rolling frames-per-second estimate.

use std::time::{Duration, Instant};

/// Number of samples in the moving average.
pub const FPS_WINDOW: usize = 10;

/// Moving average over the last [`FPS_WINDOW`] instantaneous rates.
///
/// Slots start at zero, so the first few reports read low until the
/// window has filled.
#[derive(Debug, Clone)]
pub struct FpsEstimator {
    /// Front is the most recent sample
    samples: [f64; FPS_WINDOW],
    last: Instant,
}

impl Default for FpsEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsEstimator {
    pub fn new() -> Self {
        Self {
            samples: [0.0; FPS_WINDOW],
            last: Instant::now(),
        }
    }

    /// Record a render happening now and return the updated average.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.record(elapsed)
    }

    /// Push the rate for one frame that took `elapsed`, return the average.
    pub fn record(&mut self, elapsed: Duration) -> f64 {
        // A zero interval would be an infinite rate; count it as one microsecond
        let secs = elapsed.as_secs_f64().max(1e-6);
        self.samples.rotate_right(1);
        self.samples[0] = 1.0 / secs;
        self.average()
    }

    /// Arithmetic mean of all slots.
    pub fn average(&self) -> f64 {
        self.samples.iter().sum::<f64>() / FPS_WINDOW as f64
    }

    /// Current window contents, most recent first.
    pub fn samples(&self) -> &[f64; FPS_WINDOW] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_average_is_zero() {
        let fps = FpsEstimator::new();
        assert_eq!(fps.average(), 0.0);
    }

    #[test]
    fn test_warm_up_biases_low() {
        let mut fps = FpsEstimator::new();
        let avg = fps.record(Duration::from_millis(100));
        // 10 fps in one slot of ten
        assert!((avg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_converges_after_full_window() {
        let mut fps = FpsEstimator::new();
        let d = Duration::from_millis(40);
        let mut avg = 0.0;
        for _ in 0..FPS_WINDOW {
            avg = fps.record(d);
        }
        assert!((avg - 25.0).abs() < 1e-9, "average was {}", avg);
    }

    #[test]
    fn test_front_is_most_recent() {
        let mut fps = FpsEstimator::new();
        fps.record(Duration::from_millis(500));
        fps.record(Duration::from_millis(250));
        let samples = fps.samples();
        assert!((samples[0] - 4.0).abs() < 1e-9);
        assert!((samples[1] - 2.0).abs() < 1e-9);
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn test_oldest_sample_is_discarded() {
        let mut fps = FpsEstimator::new();
        fps.record(Duration::from_millis(1));
        for _ in 0..FPS_WINDOW {
            fps.record(Duration::from_secs(1));
        }
        assert!(fps.samples().iter().all(|&s| (s - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_zero_interval_stays_finite() {
        let mut fps = FpsEstimator::new();
        let avg = fps.record(Duration::ZERO);
        assert!(avg.is_finite());
    }
}
