//! The periodic signal library.
//!
//! Every motion formula in Roomloop is a [`Signal`]: a small closed-form
//! expression tree over the time variable `t`. The tree is the single
//! source of truth for both rendering paths: the timeline/preview path
//! calls [`Signal::eval`] per frame, and the batch path renders the same
//! tree to an FFmpeg expression string (`roomloop-fx`). Keeping one
//! definition removes preview/render drift by construction.
//!
//! All signals are total: defined for every real `t` and every parameter
//! value, with internal clamping where a formula could otherwise produce a
//! nonsensical frame.

use serde::{Deserialize, Serialize};

use crate::theme::{RoomConfig, Theme};

use std::f64::consts::PI;

/// Base angular frequency of the ambient camera drift, in rad/s.
const DRIFT_BASE_FREQ: f64 = 1e-4;

/// Lowest brightness the flicker signal may reach.
const FLICKER_FLOOR: f64 = 0.05;

/// A scalar signal over the time variable `t` (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    /// The time variable `t`.
    Time,
    /// A constant value.
    Const(f64),
    /// sin(x).
    Sin(Box<Signal>),
    /// cos(x).
    Cos(Box<Signal>),
    Add(Box<Signal>, Box<Signal>),
    Sub(Box<Signal>, Box<Signal>),
    Mul(Box<Signal>, Box<Signal>),
    /// Euclidean remainder: the result is always in `[0, rhs)` for a
    /// positive divisor, regardless of the dividend's sign.
    Mod(Box<Signal>, Box<Signal>),
    /// max(x, floor).
    Max(Box<Signal>, f64),
}

impl Signal {
    /// A constant signal.
    pub fn constant(v: f64) -> Self {
        Signal::Const(v)
    }

    /// The time variable.
    pub fn time() -> Self {
        Signal::Time
    }

    pub fn sin(self) -> Self {
        Signal::Sin(Box::new(self))
    }

    pub fn cos(self) -> Self {
        Signal::Cos(Box::new(self))
    }

    pub fn add(self, rhs: Signal) -> Self {
        Signal::Add(Box::new(self), Box::new(rhs))
    }

    pub fn sub(self, rhs: Signal) -> Self {
        Signal::Sub(Box::new(self), Box::new(rhs))
    }

    pub fn mul(self, rhs: Signal) -> Self {
        Signal::Mul(Box::new(self), Box::new(rhs))
    }

    pub fn modulo(self, rhs: Signal) -> Self {
        Signal::Mod(Box::new(self), Box::new(rhs))
    }

    /// Multiply by a constant factor.
    pub fn scaled(self, k: f64) -> Self {
        self.mul(Signal::constant(k))
    }

    /// Add a constant offset.
    pub fn offset(self, k: f64) -> Self {
        self.add(Signal::constant(k))
    }

    /// Clamp the signal from below.
    pub fn floor_at(self, floor: f64) -> Self {
        Signal::Max(Box::new(self), floor)
    }

    /// Evaluate the signal at time `t`. Total and deterministic.
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            Signal::Time => t,
            Signal::Const(v) => *v,
            Signal::Sin(x) => x.eval(t).sin(),
            Signal::Cos(x) => x.eval(t).cos(),
            Signal::Add(a, b) => a.eval(t) + b.eval(t),
            Signal::Sub(a, b) => a.eval(t) - b.eval(t),
            Signal::Mul(a, b) => a.eval(t) * b.eval(t),
            Signal::Mod(a, b) => {
                let d = b.eval(t);
                if d == 0.0 {
                    0.0
                } else {
                    a.eval(t).rem_euclid(d)
                }
            }
            Signal::Max(x, floor) => x.eval(t).max(*floor),
        }
    }

    /// Fold the tree to a constant, if it does not depend on `t`.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Signal::Time => None,
            Signal::Const(v) => Some(*v),
            Signal::Sin(x) => x.as_const().map(f64::sin),
            Signal::Cos(x) => x.as_const().map(f64::cos),
            Signal::Add(a, b) => Some(a.as_const()? + b.as_const()?),
            Signal::Sub(a, b) => Some(a.as_const()? - b.as_const()?),
            Signal::Mul(a, b) => Some(a.as_const()? * b.as_const()?),
            Signal::Mod(a, b) => {
                let d = b.as_const()?;
                if d == 0.0 {
                    Some(0.0)
                } else {
                    Some(a.as_const()?.rem_euclid(d))
                }
            }
            Signal::Max(x, floor) => x.as_const().map(|v| v.max(*floor)),
        }
    }

    /// True when the signal is the constant `v` (up to rounding).
    pub fn is_const(&self, v: f64) -> bool {
        matches!(self.as_const(), Some(c) if (c - v).abs() < 1e-12)
    }
}

/// Breathing scale: `1 + I * sin(2π t / D)`, bounded in `[1-I, 1+I]`.
///
/// Intensity is clamped to keep the scale positive; a degenerate duration
/// or zero intensity collapses to the constant 1.
pub fn breathing_scale(duration: f64, intensity: f64) -> Signal {
    let intensity = intensity.clamp(0.0, 0.99);
    if intensity == 0.0 || duration <= 0.0 {
        return Signal::constant(1.0);
    }
    Signal::time()
        .scaled(2.0 * PI / duration)
        .sin()
        .scaled(intensity)
        .offset(1.0)
}

/// Brightness pulse: `1 + 0.1 * P * sin(2π t / D)`.
pub fn brightness_pulse(duration: f64, pulse: f64) -> Signal {
    let amount = 0.1 * pulse.max(0.0);
    if amount == 0.0 || duration <= 0.0 {
        return Signal::constant(1.0);
    }
    Signal::time()
        .scaled(2.0 * PI / duration)
        .sin()
        .scaled(amount)
        .offset(1.0)
}

/// Candle/lamp flicker: three incommensurate frequencies averaged so the
/// pattern never exactly repeats over short windows.
///
/// `1 + I * 0.15 * (sin(8t)*0.3 + sin(13t)*0.2 + sin(5t)*0.1) / 3`,
/// floored so brightness can never collapse to zero.
pub fn flicker(intensity: f64) -> Signal {
    let intensity = intensity.max(0.0);
    if intensity == 0.0 {
        return Signal::constant(1.0);
    }
    let irregular = Signal::time()
        .scaled(8.0)
        .sin()
        .scaled(0.3)
        .add(Signal::time().scaled(13.0).sin().scaled(0.2))
        .add(Signal::time().scaled(5.0).sin().scaled(0.1))
        .scaled(1.0 / 3.0);
    irregular
        .scaled(intensity * 0.15)
        .offset(1.0)
        .floor_at(FLICKER_FLOOR)
}

/// Horizontal camera drift as a fraction of frame width.
pub fn drift_x(motion: f64) -> Signal {
    if motion == 0.0 {
        return Signal::constant(0.0);
    }
    Signal::time()
        .scaled(DRIFT_BASE_FREQ)
        .sin()
        .scaled(motion * 0.01)
}

/// Vertical camera drift as a fraction of frame height. Runs at 0.7x the
/// horizontal frequency so the path never closes into a circle.
pub fn drift_y(motion: f64) -> Signal {
    if motion == 0.0 {
        return Signal::constant(0.0);
    }
    Signal::time()
        .scaled(DRIFT_BASE_FREQ * 0.7)
        .cos()
        .scaled(motion * 0.01)
}

/// Slow zoom factor centered at 1.0, at half the drift frequency.
pub fn drift_zoom(motion: f64) -> Signal {
    if motion == 0.0 {
        return Signal::constant(1.0);
    }
    Signal::time()
        .scaled(DRIFT_BASE_FREQ * 0.5)
        .sin()
        .scaled(motion * 0.005)
        .offset(1.0)
}

/// Vertical crop offset of the infinite lift, in pixels.
///
/// `mod(t * speed_px, double_height)` with euclidean wrap: the offset
/// sweeps the doubled frame linearly and wraps with no discontinuity.
pub fn lift_offset(speed_px_per_s: f64, double_height: f64) -> Signal {
    Signal::time()
        .scaled(speed_px_per_s)
        .modulo(Signal::constant(double_height))
}

/// Vignette overlay alpha for a strength in `[0, 1]`.
pub fn vignette_weight(strength: f64) -> f64 {
    strength.clamp(0.0, 1.0) * 0.5
}

/// A three-channel color-balance adjustment derived from a single warmth
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBalance {
    /// Red channel bias.
    pub red: f64,
    /// Green channel bias.
    pub green: f64,
    /// Blue channel bias.
    pub blue: f64,
}

impl ColorBalance {
    /// The zero-bias adjustment.
    pub fn neutral() -> Self {
        Self {
            red: 0.0,
            green: 0.0,
            blue: 0.0,
        }
    }

    /// True when all channel biases are zero (up to rounding).
    pub fn is_neutral(&self) -> bool {
        self.red.abs() < 1e-12 && self.green.abs() < 1e-12 && self.blue.abs() < 1e-12
    }
}

/// Map a `[0, 1]` warmth parameter to channel biases.
///
/// 0.5 is neutral; warmer values bias red/green up and blue down, cooler
/// values mirror the adjustment.
pub fn warmth_balance(warmth: f64) -> ColorBalance {
    let shift = warmth.clamp(0.0, 1.0) - 0.5;
    ColorBalance {
        red: shift * 0.4,
        green: shift * 0.2,
        blue: -shift * 0.4,
    }
}

/// The fully-resolved signal set of one configuration.
///
/// Built once per config (and per resolution, which the lift offset
/// depends on), then shared by the timeline generator, the preview
/// renderer and the filter graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPlan {
    /// Frame scale multiplier (breathing).
    pub scale: Signal,
    /// Brightness multiplier (pulse or flicker), centered at 1.0.
    pub brightness: Signal,
    /// Horizontal drift as a fraction of frame width.
    pub drift_x: Signal,
    /// Vertical drift as a fraction of frame height.
    pub drift_y: Signal,
    /// Zoom factor centered at 1.0.
    pub zoom: Signal,
    /// Constant warmth color balance.
    pub warmth: ColorBalance,
    /// Vignette overlay alpha.
    pub vignette: f64,
    /// Vertical crop offset in pixels (seamless-loop themes only).
    pub lift: Option<Signal>,
}

impl MotionPlan {
    /// Resolve the named signals of a configuration.
    pub fn for_config(config: &RoomConfig) -> Self {
        let (_, height) = config.dimensions();
        match &config.theme {
            Theme::Breathing(p) => Self {
                scale: breathing_scale(p.breath_duration, p.breath_intensity),
                brightness: brightness_pulse(p.breath_duration, p.brightness_pulse),
                drift_x: Signal::constant(0.0),
                drift_y: Signal::constant(0.0),
                zoom: Signal::constant(1.0),
                warmth: warmth_balance(p.warmth_shift),
                vignette: 0.0,
                lift: None,
            },
            Theme::DarkAcademia(p) => Self {
                scale: Signal::constant(1.0),
                brightness: flicker(p.flicker_intensity),
                drift_x: drift_x(p.ambient_motion),
                drift_y: drift_y(p.ambient_motion),
                zoom: drift_zoom(p.ambient_motion),
                warmth: warmth_balance(p.warmth_shift),
                vignette: vignette_weight(p.vignette_strength),
                lift: None,
            },
            Theme::InfiniteLift(p) => Self {
                scale: Signal::constant(1.0),
                brightness: Signal::constant(1.0 + p.brightness_boost.max(-0.99)),
                drift_x: Signal::constant(0.0),
                drift_y: Signal::constant(0.0),
                zoom: Signal::constant(1.0),
                warmth: ColorBalance::neutral(),
                vignette: 0.0,
                lift: Some(lift_offset(
                    p.lift_speed.max(0.0) * height as f64,
                    2.0 * height as f64,
                )),
            },
        }
    }
}
