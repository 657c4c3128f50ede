//! Smartwatch samples and their aggregation into fixed windows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{Timestamp, floor_to_window};

/// Plausible wrist temperature range in °C.
pub const WRIST_TEMP_CLIP: (f64, f64) = (14.0, 43.0);
/// Plausible heart rate range in bpm.
pub const HEART_RATE_CLIP: (f64, f64) = (40.0, 210.0);
/// Width of an aggregation window in seconds.
pub const WINDOW_SECS: u32 = 5;

/// A raw sample pushed by the smartwatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearableSample {
    pub timestamp: Timestamp,
    pub wrist_temp_in_celsius: f64,
    pub heart_rate_in_bpm: f64,
}

impl WearableSample {
    #[must_use]
    pub fn clipped(mut self) -> Self {
        self.wrist_temp_in_celsius = self
            .wrist_temp_in_celsius
            .clamp(WRIST_TEMP_CLIP.0, WRIST_TEMP_CLIP.1);
        self.heart_rate_in_bpm = self
            .heart_rate_in_bpm
            .clamp(HEART_RATE_CLIP.0, HEART_RATE_CLIP.1);
        self
    }

    /// Inter-beat interval in milliseconds.
    #[must_use]
    pub fn ibi_in_ms(&self) -> f64 {
        60_000.0 / self.heart_rate_in_bpm
    }
}

/// Aggregate of all samples that fall into one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearableWindow {
    pub start: Timestamp,
    pub wrist_temp_in_celsius: f64,
    pub heart_rate_in_bpm: f64,
    pub ibi_in_ms: f64,
    /// Sample standard deviation of the inter-beat intervals.
    pub sdnn_in_ms: Option<f64>,
    pub samples: usize,
}

/// Clip, bucket and average samples into epoch-aligned windows, oldest first.
///
/// Samples with non-finite values are dropped before aggregation.
///
/// # Errors
///
/// Returns [`ValidationError::EmptySamples`] when no usable sample remains.
pub fn aggregate_windows(
    samples: &[WearableSample],
    window_secs: u32,
) -> Result<Vec<WearableWindow>, ValidationError> {
    let mut buckets: BTreeMap<Timestamp, Vec<WearableSample>> = BTreeMap::new();
    for sample in samples
        .iter()
        .filter(|s| s.wrist_temp_in_celsius.is_finite() && s.heart_rate_in_bpm.is_finite())
    {
        buckets
            .entry(floor_to_window(sample.timestamp, window_secs))
            .or_default()
            .push(sample.clipped());
    }
    if buckets.is_empty() {
        return Err(ValidationError::EmptySamples);
    }
    Ok(buckets
        .into_iter()
        .map(|(start, bucket)| summarize(start, &bucket))
        .collect())
}

#[allow(clippy::cast_precision_loss)]
fn summarize(start: Timestamp, bucket: &[WearableSample]) -> WearableWindow {
    let n = bucket.len() as f64;
    let mean = |f: fn(&WearableSample) -> f64| bucket.iter().map(f).sum::<f64>() / n;
    let ibi_mean = mean(WearableSample::ibi_in_ms);
    let sdnn = (bucket.len() >= 2).then(|| {
        let variance = bucket
            .iter()
            .map(|s| (s.ibi_in_ms() - ibi_mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    });
    WearableWindow {
        start,
        wrist_temp_in_celsius: mean(|s| s.wrist_temp_in_celsius),
        heart_rate_in_bpm: mean(|s| s.heart_rate_in_bpm),
        ibi_in_ms: ibi_mean,
        sdnn_in_ms: sdnn,
        samples: bucket.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample(offset_secs: i64, wrist: f64, hr: f64) -> WearableSample {
        WearableSample {
            timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
            wrist_temp_in_celsius: wrist,
            heart_rate_in_bpm: hr,
        }
    }

    #[test]
    fn should_reject_empty_input() {
        assert_eq!(
            aggregate_windows(&[], WINDOW_SECS),
            Err(ValidationError::EmptySamples)
        );
    }

    #[test]
    fn should_reject_input_without_finite_samples() {
        let samples = [sample(0, f64::NAN, 60.0)];
        assert_eq!(
            aggregate_windows(&samples, WINDOW_SECS),
            Err(ValidationError::EmptySamples)
        );
    }

    #[test]
    fn should_clip_implausible_values() {
        let clipped = sample(0, 50.0, 20.0).clipped();
        assert!((clipped.wrist_temp_in_celsius - 43.0).abs() < f64::EPSILON);
        assert!((clipped.heart_rate_in_bpm - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_bucket_samples_into_windows() {
        let samples = [
            sample(6, 33.0, 60.0),
            sample(0, 32.0, 60.0),
            sample(3, 34.0, 60.0),
        ];
        let windows = aggregate_windows(&samples, WINDOW_SECS).unwrap();

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].samples, 2);
        assert!((windows[0].wrist_temp_in_celsius - 33.0).abs() < 1e-9);
        assert!(windows[0].start < windows[1].start);
        assert_eq!(windows[1].samples, 1);
    }

    #[test]
    fn should_compute_ibi_and_sdnn() {
        // 60 bpm -> 1000 ms, 120 bpm -> 500 ms
        let samples = [sample(0, 33.0, 60.0), sample(1, 33.0, 120.0)];
        let windows = aggregate_windows(&samples, WINDOW_SECS).unwrap();

        assert!((windows[0].ibi_in_ms - 750.0).abs() < 1e-9);
        let sdnn = windows[0].sdnn_in_ms.unwrap();
        assert!((sdnn - 353.553_390_593).abs() < 1e-6);
    }

    #[test]
    fn should_leave_sdnn_empty_for_single_sample() {
        let windows = aggregate_windows(&[sample(0, 33.0, 75.0)], WINDOW_SECS).unwrap();
        assert_eq!(windows[0].sdnn_in_ms, None);
        assert!((windows[0].ibi_in_ms - 800.0).abs() < 1e-9);
    }
}
