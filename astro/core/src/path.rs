//! Path Motion Planner
//!
//! Pure geometry and timing for one movement: a single cubic Bézier from the
//! current anchor to the target, plus the staggered start offsets and the
//! falloff styling of the trail indicators that replay it.
//!
//! Both control points are pushed off the straight line in opposite
//! perpendicular directions, the second one less than the first, so the
//! outbound and return arcs of a round trip are never mirror images. The
//! sway is jittered per move so repeated hops do not look identical.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{ColorFade, IndicatorStyle};
use crate::config::{AstroConfig, CurveConfig, TrailConfig};
use crate::geometry::Position;

/// Distances below this are treated as "no movement"
const MIN_TRAVEL: f64 = 1e-6;

/// A cubic Bézier curve
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicCurve {
    /// Start anchor
    pub start: Position,
    /// First control point
    pub control1: Position,
    /// Second control point
    pub control2: Position,
    /// End anchor
    pub end: Position,
}

impl CubicCurve {
    /// Evaluate the curve at `t` (clamped to 0.0-1.0)
    #[must_use]
    pub fn point_at(&self, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Position::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// Whether start and end coincide
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.start.distance_to(self.end) < MIN_TRAVEL
    }

    /// Perpendicular distance of `point` from the start-end line
    #[must_use]
    pub fn distance_from_chord(&self, point: Position) -> f64 {
        let length = self.start.distance_to(self.end);
        if length < MIN_TRAVEL {
            return point.distance_to(self.start);
        }
        let (dx, dy) = (self.end.x - self.start.x, self.end.y - self.start.y);
        ((point.x - self.start.x) * dy - (point.y - self.start.y) * dx).abs() / length
    }

    /// SVG path data (`M … C …`)
    #[must_use]
    pub fn svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Planned motion for one movement task
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// Path shared by every indicator
    pub curve: CubicCurve,
    /// Perpendicular offset applied to the first control point
    pub sway: f64,
    /// Start delay per indicator (index 0 is the lead, always zero)
    pub delays: Vec<Duration>,
    /// Style per indicator, same order as `delays`
    pub styles: Vec<IndicatorStyle>,
}

impl Trajectory {
    /// Position along the path at progress `t`
    #[must_use]
    pub fn point_at(&self, t: f64) -> Position {
        self.curve.point_at(t)
    }

    /// SVG path data for renderers that animate along paths
    #[must_use]
    pub fn svg_path(&self) -> String {
        self.curve.svg_path()
    }

    /// Number of indicators (lead included)
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.delays.len()
    }

    /// Delay of the last indicator to start
    #[must_use]
    pub fn tail_delay(&self) -> Duration {
        self.delays.last().copied().unwrap_or_default()
    }
}

/// Builds trajectories from curve and trail settings
#[derive(Clone, Debug)]
pub struct PathPlanner {
    curve: CurveConfig,
    trail: TrailConfig,
}

impl PathPlanner {
    /// Create a planner
    #[must_use]
    pub fn new(curve: CurveConfig, trail: TrailConfig) -> Self {
        Self { curve, trail }
    }

    /// Create a planner from the engine configuration
    #[must_use]
    pub fn from_config(config: &AstroConfig) -> Self {
        Self::new(config.curve.clone(), config.trail.clone())
    }

    /// Plan a move using the thread-local RNG for sway jitter
    #[must_use]
    pub fn build_trajectory(&self, start: Position, end: Position) -> Trajectory {
        self.build_trajectory_with(start, end, &mut rand::thread_rng())
    }

    /// Plan a move with an explicit RNG
    pub fn build_trajectory_with<R: Rng + ?Sized>(
        &self,
        start: Position,
        end: Position,
        rng: &mut R,
    ) -> Trajectory {
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        let length = dx.hypot(dy);

        let (curve, sway) = if length < MIN_TRAVEL {
            let curve = CubicCurve {
                start,
                control1: start,
                control2: start,
                end: start,
            };
            (curve, 0.0)
        } else {
            let jitter = if self.curve.sway_jitter > 0.0 {
                rng.gen_range(-self.curve.sway_jitter..=self.curve.sway_jitter)
            } else {
                0.0
            };
            let sway = (self.curve.sway * (1.0 + jitter)).min(length * self.curve.max_sway_fraction);

            // Unit normal to the chord
            let (nx, ny) = (-dy / length, dx / length);
            let second = sway * self.curve.second_sway_ratio;

            let along1 = start.lerp(end, self.curve.first_control);
            let along2 = start.lerp(end, self.curve.second_control);
            let curve = CubicCurve {
                start,
                control1: along1.offset(nx * sway, ny * sway),
                control2: along2.offset(-nx * second, -ny * second),
                end,
            };
            (curve, sway)
        };

        Trajectory {
            curve,
            sway,
            delays: self.stagger_delays(),
            styles: self.indicator_styles(),
        }
    }

    /// Indicators per move, lead included
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.trail.count + 1
    }

    /// Start delay per indicator, linear in index
    #[must_use]
    pub fn stagger_delays(&self) -> Vec<Duration> {
        (0..self.indicator_count())
            .map(|i| self.trail.stagger * u32::try_from(i).unwrap_or(u32::MAX))
            .collect()
    }

    /// Style per indicator with opacity/scale falloff from the lead
    #[must_use]
    pub fn indicator_styles(&self) -> Vec<IndicatorStyle> {
        let trail = &self.trail;
        (0..self.indicator_count())
            .map(|index| {
                #[allow(clippy::cast_precision_loss)]
                let step = index as f64;
                IndicatorStyle {
                    index,
                    opacity: (1.0 - trail.opacity_falloff * step).max(trail.min_opacity),
                    scale: (1.0 - trail.scale_falloff * step).max(trail.min_scale),
                    blur: trail.blur_step * step,
                    size: trail.dot_size,
                    color: if index == 0 {
                        trail.lead_fade_from
                    } else {
                        trail.dot_color
                    },
                }
            })
            .collect()
    }

    /// The lead indicator's neutral-to-accent fade
    #[must_use]
    pub fn lead_fade(&self) -> ColorFade {
        ColorFade {
            from: self.trail.lead_fade_from,
            to: self.trail.accent_color,
            duration: self.trail.lead_fade_duration,
        }
    }
}
