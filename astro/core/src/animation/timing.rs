//! Easing Curves
//!
//! Maps linear progress onto eased progress for the travel phase. Renderers
//! receive the easing by value and either evaluate it per frame or translate
//! it with [`EasingFunction::css_timing`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Easing functions for smooth travel along a trajectory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EasingFunction {
    /// No easing (constant speed)
    Linear,

    /// Slow start, fast end
    EaseIn,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Cubic ease in
    EaseInCubic,

    /// Cubic ease out
    EaseOutCubic,

    /// Cubic ease in and out
    #[default]
    EaseInOutCubic,

    /// Overshoot then settle
    EaseOutBack,
}

impl EasingFunction {
    /// Every supported easing, in declaration order
    pub const ALL: [EasingFunction; 8] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseOutBack,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1.powi(3) + c1 * t_minus_1.powi(2)
            }
        }
    }

    /// Configuration name (kebab-case)
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::EaseInCubic => "ease-in-cubic",
            Self::EaseOutCubic => "ease-out-cubic",
            Self::EaseInOutCubic => "ease-in-out-cubic",
            Self::EaseOutBack => "ease-out-back",
        }
    }

    /// Equivalent CSS / Web Animations timing function
    #[must_use]
    pub fn css_timing(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "cubic-bezier(0.11, 0, 0.5, 0)",
            Self::EaseOut => "cubic-bezier(0.5, 1, 0.89, 1)",
            Self::EaseInOut => "cubic-bezier(0.45, 0, 0.55, 1)",
            Self::EaseInCubic => "cubic-bezier(0.32, 0, 0.67, 0)",
            Self::EaseOutCubic => "cubic-bezier(0.33, 1, 0.68, 1)",
            Self::EaseInOutCubic => "cubic-bezier(0.65, 0, 0.35, 1)",
            Self::EaseOutBack => "cubic-bezier(0.34, 1.56, 0.64, 1)",
        }
    }
}

impl FromStr for EasingFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|easing| easing.name() == normalized)
            .ok_or_else(|| format!("unknown easing '{s}'"))
    }
}

impl std::fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_linear() {
        assert!((EasingFunction::Linear.apply(0.0)).abs() < f64::EPSILON);
        assert!((EasingFunction::Linear.apply(0.5) - 0.5).abs() < f64::EPSILON);
        assert!((EasingFunction::Linear.apply(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in EasingFunction::ALL {
            // All easings should map 0 -> 0 and 1 -> 1
            assert!(
                easing.apply(0.0).abs() < 0.001,
                "{easing:?} at 0.0 = {}",
                easing.apply(0.0)
            );
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 0.001,
                "{easing:?} at 1.0 = {}",
                easing.apply(1.0)
            );
        }
    }

    #[test]
    fn test_easing_clamps_input() {
        assert_eq!(EasingFunction::EaseInOutCubic.apply(-1.0), 0.0);
        assert_eq!(EasingFunction::EaseInOutCubic.apply(2.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_cubic_is_symmetric() {
        let easing = EasingFunction::EaseInOutCubic;
        assert!((easing.apply(0.5) - 0.5).abs() < 1e-9);
        assert!((easing.apply(0.25) + easing.apply(0.75) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "ease-in-out-cubic".parse::<EasingFunction>(),
            Ok(EasingFunction::EaseInOutCubic)
        );
        assert_eq!(
            "EASE_OUT".parse::<EasingFunction>(),
            Ok(EasingFunction::EaseOut)
        );
        assert!("wobble".parse::<EasingFunction>().is_err());

        for easing in EasingFunction::ALL {
            assert_eq!(easing.to_string().parse::<EasingFunction>(), Ok(easing));
        }
    }
}
