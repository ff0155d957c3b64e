//! Easing catalog.
//!
//! Every curve maps `t ∈ [0, 1]` to perceptual progress and returns exactly
//! `0.0` at `t = 0` and exactly `1.0` at `t = 1`, so settled particles land on
//! their targets without floating point residue.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Default thresholds of the quantized glitch curve
pub const DEFAULT_GLITCH_STEPS: [f32; 3] = [0.2, 0.5, 0.8];

/// Output levels of the quantized glitch curve, one per step interval
const GLITCH_LEVELS: [f32; 4] = [0.0, 0.2, 0.8, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOutCubic,
    EaseOutExpo,
    EaseInOutCubic,
    EaseInOutExpo,
    EaseOutElastic,
    EaseOutBack,
    /// Hard steps at [`DEFAULT_GLITCH_STEPS`]
    Steps,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        self.apply_with_steps(t, &DEFAULT_GLITCH_STEPS)
    }

    /// Like [`Easing::apply`], with custom thresholds for [`Easing::Steps`].
    pub fn apply_with_steps(self, t: f32, steps: &[f32; 3]) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseOutExpo => 1.0 - 2f32.powf(-10.0 * t),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInOutExpo => {
                if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::EaseOutElastic => {
                let c4 = (2.0 * PI) / 3.0;
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Easing::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Easing::Steps => {
                let step = steps.iter().take_while(|&&edge| t >= edge).count();
                GLITCH_LEVELS[step]
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::EaseOutExpo => "ease-out-expo",
            Easing::EaseInOutCubic => "ease-in-out-cubic",
            Easing::EaseInOutExpo => "ease-in-out-expo",
            Easing::EaseOutElastic => "ease-out-elastic",
            Easing::EaseOutBack => "ease-out-back",
            Easing::Steps => "steps",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: [Easing; 8] = [
        Easing::Linear,
        Easing::EaseOutCubic,
        Easing::EaseOutExpo,
        Easing::EaseInOutCubic,
        Easing::EaseInOutExpo,
        Easing::EaseOutElastic,
        Easing::EaseOutBack,
        Easing::Steps,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in CATALOG {
            assert_eq!(easing.apply(0.0), 0.0, "{} at 0", easing.name());
            assert_eq!(easing.apply(1.0), 1.0, "{} at 1", easing.name());
        }
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        for easing in CATALOG {
            assert_eq!(easing.apply(-0.5), 0.0);
            assert_eq!(easing.apply(3.0), 1.0);
        }
    }

    #[test]
    fn test_elastic_and_back_overshoot() {
        let elastic_peak = (1..100)
            .map(|i| Easing::EaseOutElastic.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(elastic_peak > 1.0);

        let back_peak = (1..100)
            .map(|i| Easing::EaseOutBack.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(back_peak > 1.0);
    }

    #[test]
    fn test_in_out_cubic_is_symmetric_at_midpoint() {
        assert!((Easing::EaseInOutCubic.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::EaseInOutExpo.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_steps_quantize() {
        assert_eq!(Easing::Steps.apply(0.1), 0.0);
        assert_eq!(Easing::Steps.apply(0.3), 0.2);
        assert_eq!(Easing::Steps.apply(0.6), 0.8);
        assert_eq!(Easing::Steps.apply(0.9), 1.0);

        let custom = [0.1, 0.2, 0.3];
        assert_eq!(Easing::Steps.apply_with_steps(0.25, &custom), 0.8);
    }
}
