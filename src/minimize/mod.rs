//! Derivative-free bounded minimization of scalar functions.
//!
//! - [`UnivariateObjective`]: anything that maps `x ↦ f(x)`, including
//!   closures and stateful objective objects
//! - [`Bracket`]: search interval plus an interior guess, with known values
//! - [`Brent`]: Brent's parabolic-interpolation / golden-section minimizer
//!
//! # References
//!
//! - Brent (1973), *Algorithms for Minimization without Derivatives*, ch. 5
//! - Forsythe, Malcolm & Moler (1977), `fmin`

mod brent;

pub use brent::{Bracket, Brent, Step};

/// A scalar objective to be minimized.
///
/// Takes `&mut self` so that objective objects can cache intermediate
/// results (e.g. the buffers computed for the last evaluated point).
pub trait UnivariateObjective {
    /// Evaluates the objective at `x`.
    fn evaluate(&mut self, x: f64) -> f64;
}

impl<F: FnMut(f64) -> f64> UnivariateObjective for F {
    fn evaluate(&mut self, x: f64) -> f64 {
        self(x)
    }
}
