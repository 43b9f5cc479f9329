//! Brent's bounded minimizer.

use super::UnivariateObjective;
use crate::error::{AnnealError, Result};

/// `(3 - sqrt(5)) / 2`, the golden-section fraction.
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Relative resolution of a trial point.
const SQRT_EPSILON: f64 = 1.490_116_119_384_765_6e-8;

/// Absolute resolution floor so points near zero still move.
const ABS_TOLERANCE: f64 = 1e-15;

/// Search interval `[lower, upper]` with an interior guess and the
/// objective values already known at all three points.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    pub lower: f64,
    pub upper: f64,
    pub guess: f64,
    pub f_lower: f64,
    pub f_upper: f64,
    pub f_guess: f64,
}

/// The point evaluated by one [`Brent::iterate`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub x: f64,
    pub fx: f64,
}

/// Brent's method on a fixed interval.
///
/// Keeps the best point `x` seen so far together with the two previous best
/// points `w` and `v`; each iteration fits a parabola through them and falls
/// back to a golden-section step when the parabola is unreliable. The
/// interval `[lower, upper]` shrinks monotonically and always contains `x`.
///
/// Unlike a root finder, no sign change is needed. When the objective is
/// unimodal on the interval the minimizer converges to its minimum; otherwise
/// it converges to a local minimum.
#[derive(Debug, Clone)]
pub struct Brent {
    lower: f64,
    upper: f64,
    x: f64,
    fx: f64,
    w: f64,
    fw: f64,
    v: f64,
    fv: f64,
    d: f64,
    e: f64,
}

impl Brent {
    /// Primes the minimizer at the guess.
    ///
    /// The guess must lie inside the interval and be strictly better than
    /// both endpoints, so a minimum is enclosed. One extra evaluation is
    /// spent at the golden-section point to seed the parabola history; the
    /// guess stays the starting point whatever that value is.
    ///
    /// # Errors
    /// [`AnnealError::InvalidConfig`] if either bound is not finite,
    /// `lower > upper`, the guess lies outside the interval, or the guess
    /// does not beat both endpoints.
    pub fn new<O: UnivariateObjective + ?Sized>(
        objective: &mut O,
        bracket: Bracket,
    ) -> Result<Self> {
        let Bracket {
            lower,
            upper,
            guess,
            ..
        } = bracket;
        if !(lower.is_finite() && upper.is_finite()) {
            return Err(AnnealError::config(format!(
                "bracket bounds must be finite, got [{lower}, {upper}]"
            )));
        }
        if lower > upper {
            return Err(AnnealError::config(format!(
                "bracket lower bound {lower} exceeds upper bound {upper}"
            )));
        }
        if !(lower..=upper).contains(&guess) {
            return Err(AnnealError::config(format!(
                "guess {guess} lies outside [{lower}, {upper}]"
            )));
        }

        let fx = nan_to_inf(bracket.f_guess);
        if !(fx < nan_to_inf(bracket.f_lower) && fx < nan_to_inf(bracket.f_upper)) {
            return Err(AnnealError::config(format!(
                "endpoints do not enclose a minimum: f({guess}) = {fx} is not below \
                 f({lower}) = {} and f({upper}) = {}",
                bracket.f_lower, bracket.f_upper
            )));
        }

        let v = lower + GOLDEN * (upper - lower);
        let fv = nan_to_inf(objective.evaluate(v));

        Ok(Self {
            lower,
            upper,
            x: guess,
            fx,
            w: v,
            fw: fv,
            v,
            fv,
            d: 0.0,
            e: 0.0,
        })
    }

    /// Current estimate of the minimizer.
    pub fn x_minimum(&self) -> f64 {
        self.x
    }

    /// Objective value at [`x_minimum`](Self::x_minimum).
    pub fn f_minimum(&self) -> f64 {
        self.fx
    }

    pub fn x_lower(&self) -> f64 {
        self.lower
    }

    pub fn x_upper(&self) -> f64 {
        self.upper
    }

    /// Whether the interval has shrunk below the resolution of a trial step.
    pub fn is_collapsed(&self) -> bool {
        self.upper - self.lower <= 4.0 * tolerance_at(self.x)
    }

    /// Performs one iteration and returns the newly evaluated point.
    pub fn iterate<O: UnivariateObjective + ?Sized>(&mut self, objective: &mut O) -> Step {
        let (a, b, z) = (self.lower, self.upper, self.x);
        let tol = tolerance_at(z);
        let midpoint = 0.5 * (a + b);
        let room_below = z - a;
        let room_above = b - z;

        let (mut p, mut q, mut r) = (0.0, 0.0, 0.0);
        if self.e.abs() > tol {
            // Parabola through (x, fx), (w, fw), (v, fv).
            r = (z - self.w) * (self.fx - self.fv);
            q = (z - self.v) * (self.fx - self.fw);
            p = (z - self.v) * q - (z - self.w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            r = self.e;
            self.e = self.d;
        }

        let mut d;
        if p.abs() < (0.5 * q * r).abs() && p < q * room_below && p < q * room_above {
            d = p / q;
            let u = z + d;
            if (u - a) < 2.0 * tol || (b - u) < 2.0 * tol {
                d = if z < midpoint { tol } else { -tol };
            }
        } else {
            self.e = if z < midpoint { b - z } else { -(z - a) };
            d = GOLDEN * self.e;
        }
        self.d = d;

        let u = if d.abs() >= tol {
            z + d
        } else if d > 0.0 {
            z + tol
        } else {
            z - tol
        };
        let u = u.clamp(a, b);
        let fu = nan_to_inf(objective.evaluate(u));

        if fu <= self.fx {
            if u < z {
                self.upper = z;
            } else {
                self.lower = z;
            }
            self.v = self.w;
            self.fv = self.fw;
            self.w = z;
            self.fw = self.fx;
            self.x = u;
            self.fx = fu;
        } else {
            if u < z {
                self.lower = u;
            } else {
                self.upper = u;
            }
            if fu <= self.fw || self.w == z {
                self.v = self.w;
                self.fv = self.fw;
                self.w = u;
                self.fw = fu;
            } else if fu <= self.fv || self.v == z || self.v == self.w {
                self.v = u;
                self.fv = fu;
            }
        }

        Step { x: u, fx: fu }
    }
}

fn tolerance_at(x: f64) -> f64 {
    SQRT_EPSILON * x.abs() + ABS_TOLERANCE
}

fn nan_to_inf(f: f64) -> f64 {
    if f.is_nan() {
        f64::INFINITY
    } else {
        f
    }
}
