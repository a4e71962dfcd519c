//! Normalized collapse progress
//!
//! Pure data plus invariants. `progress` is 0 when the header is fully
//! expanded and 1 when it is fully collapsed; `threshold` is the scroll
//! distance that maps to 1.

use crate::error::{Result, SyncError};

/// Map a vertical offset onto `[0, 1]` for the given threshold.
///
/// A zero (or negative) threshold yields 0 rather than dividing by zero.
pub fn compute_progress(offset: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 || offset.is_nan() {
        return 0.0;
    }
    (offset / threshold).clamp(0.0, 1.0)
}

/// Authoritative progress value and the threshold it is measured against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    progress: f64,
    threshold: f64,
    raw_offset: f64,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ProgressState {
    /// Create a fully expanded state. Negative or NaN thresholds are treated as 0.
    pub fn new(threshold: f64) -> Self {
        Self {
            progress: 0.0,
            threshold: if threshold.is_nan() { 0.0 } else { threshold.max(0.0) },
            raw_offset: 0.0,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Last known offset of the progress source, clamped to `[0, threshold]`
    pub fn raw_offset(&self) -> f64 {
        self.raw_offset
    }

    /// Progress for an offset against the current threshold
    pub fn compute_progress(&self, offset: f64) -> f64 {
        compute_progress(offset, self.threshold)
    }

    /// Offset that corresponds to `progress` against the current threshold
    pub fn offset_for(&self, progress: f64) -> f64 {
        progress * self.threshold
    }

    /// Assign progress directly.
    ///
    /// Returns `Ok(false)` when `value` is bit-identical to the current
    /// progress; callers skip all propagation in that case.
    pub fn set_progress(&mut self, value: f64) -> Result<bool> {
        if !(0.0..=1.0).contains(&value) {
            return Err(SyncError::ProgressOutOfRange(value));
        }
        if value.to_bits() == self.progress.to_bits() {
            return Ok(false);
        }
        self.progress = value;
        self.raw_offset = self.offset_for(value);
        Ok(true)
    }

    /// Assign the threshold.
    ///
    /// Stored progress is kept as-is; consumers recompute their mapping
    /// against the new threshold. Returns `Ok(false)` for a bit-identical value.
    pub fn set_threshold(&mut self, value: f64) -> Result<bool> {
        if value.is_nan() || value < 0.0 {
            return Err(SyncError::NegativeThreshold(value));
        }
        if value.to_bits() == self.threshold.to_bits() {
            return Ok(false);
        }
        self.threshold = value;
        Ok(true)
    }

    /// Derive progress from an offset reported by the progress source.
    ///
    /// Returns whether the stored progress changed.
    pub fn update_from_offset(&mut self, offset: f64) -> bool {
        let clamped = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.threshold)
        };
        self.raw_offset = clamped;
        let next = compute_progress(clamped, self.threshold);
        if next.to_bits() == self.progress.to_bits() {
            return false;
        }
        self.progress = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_progress_clamps() {
        assert_eq!(compute_progress(75.0, 150.0), 0.5);
        assert_eq!(compute_progress(-20.0, 150.0), 0.0);
        assert_eq!(compute_progress(400.0, 150.0), 1.0);
    }

    #[test]
    fn test_compute_progress_zero_threshold() {
        assert_eq!(compute_progress(75.0, 0.0), 0.0);
        assert_eq!(compute_progress(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_compute_progress_matches_formula() {
        for threshold in [1.0, 37.5, 150.0, 1024.0] {
            for step in 0..=40 {
                let offset = step as f64 * 7.3 - 20.0;
                let expected = (offset / threshold).clamp(0.0, 1.0);
                assert_eq!(compute_progress(offset, threshold), expected);
            }
        }
    }

    #[test]
    fn test_set_progress_range() {
        let mut state = ProgressState::new(150.0);
        assert!(matches!(
            state.set_progress(1.5),
            Err(SyncError::ProgressOutOfRange(_))
        ));
        assert!(matches!(
            state.set_progress(-0.1),
            Err(SyncError::ProgressOutOfRange(_))
        ));
        assert!(state.set_progress(f64::NAN).is_err());
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_set_progress_same_value_is_noop() {
        let mut state = ProgressState::new(150.0);
        assert!(state.set_progress(0.4).unwrap());
        assert!(!state.set_progress(0.4).unwrap());
        assert!((state.raw_offset() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_zero_is_a_distinct_value() {
        let mut state = ProgressState::new(150.0);
        // Bit-for-bit comparison: -0.0 differs from 0.0
        assert!(state.set_progress(-0.0).unwrap());
    }

    #[test]
    fn test_set_threshold_keeps_progress() {
        let mut state = ProgressState::new(150.0);
        state.set_progress(0.6).unwrap();
        assert!(state.set_threshold(0.0).unwrap());
        assert_eq!(state.compute_progress(90.0), 0.0);
        assert_eq!(state.progress(), 0.6);
        assert!(!state.set_threshold(0.0).unwrap());
        assert!(matches!(
            state.set_threshold(-3.0),
            Err(SyncError::NegativeThreshold(_))
        ));
    }

    #[test]
    fn test_update_from_offset() {
        let mut state = ProgressState::new(150.0);
        assert!(state.update_from_offset(75.0));
        assert_eq!(state.progress(), 0.5);
        assert!(!state.update_from_offset(75.0));

        assert!(state.update_from_offset(900.0));
        assert_eq!(state.raw_offset(), 150.0);
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_update_from_offset_zero_threshold() {
        let mut state = ProgressState::new(0.0);
        assert!(!state.update_from_offset(40.0));
        assert_eq!(state.progress(), 0.0);
        assert_eq!(state.raw_offset(), 0.0);
    }
}
