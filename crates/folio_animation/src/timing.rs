//! Timing curves
//!
//! Map an animation's time fraction (0.0 → 1.0) to a value-space progress.

use crate::spring::spring_progress;

/// The timing curve of an animation or of one of its tracks
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum TimingCurve {
    #[default]
    Linear,
    /// Cubic ease-in-out
    EaseInOut,
    /// Damped spring settling at the end of the duration
    Spring { damping_ratio: f32 },
}

impl TimingCurve {
    pub fn spring(damping_ratio: f32) -> Self {
        TimingCurve::Spring { damping_ratio }
    }

    /// Map a time fraction to progress. Input is clamped to [0, 1]; spring
    /// curves may return values above 1.0 while overshooting.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingCurve::Linear => t,
            TimingCurve::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            TimingCurve::Spring { damping_ratio } => spring_progress(*damping_ratio, t),
        }
    }
}

/// Timing of a single track relative to its animator
///
/// A track with `relative_duration` 0.6 completes when its animator is 60%
/// through its duration, like a nested animation started alongside the
/// parent with a shorter duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackTiming {
    /// Fraction of the animator's duration this track spans (0, 1]
    pub relative_duration: f32,
    /// Curve override; `None` inherits the animator's curve
    pub curve: Option<TimingCurve>,
}

impl Default for TrackTiming {
    fn default() -> Self {
        Self {
            relative_duration: 1.0,
            curve: None,
        }
    }
}

impl TrackTiming {
    /// A nested track spanning part of the animator with its own curve
    pub fn nested(relative_duration: f32, curve: TimingCurve) -> Self {
        Self {
            relative_duration: relative_duration.clamp(0.0, 1.0),
            curve: Some(curve),
        }
    }

    /// Local time fraction of this track at the animator's `fraction`
    pub fn local_fraction(&self, fraction: f32) -> f32 {
        if self.relative_duration <= 0.0 {
            return if fraction > 0.0 { 1.0 } else { 0.0 };
        }
        (fraction / self.relative_duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_clamps() {
        assert_eq!(TimingCurve::Linear.apply(-1.0), 0.0);
        assert_eq!(TimingCurve::Linear.apply(0.25), 0.25);
        assert_eq!(TimingCurve::Linear.apply(3.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let curve = TimingCurve::EaseInOut;
        assert_eq!(curve.apply(0.5), 0.5);
        assert!((curve.apply(0.2) + curve.apply(0.8) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_nested_track_finishes_early() {
        let timing = TrackTiming::nested(0.6, TimingCurve::Linear);
        assert!((timing.local_fraction(0.3) - 0.5).abs() < 1e-6);
        assert_eq!(timing.local_fraction(0.6), 1.0);
        assert_eq!(timing.local_fraction(0.9), 1.0);
    }
}
