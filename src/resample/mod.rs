//! Resampling.
//!
//! Turns a weighted population back into an equally weighted one by drawing
//! `N` particles with replacement, proportionally to weight. Each particle
//! is replicated as many times as it was drawn; replicas are laid out in
//! blocks, most-replicated particle first.
//!
//! # Key Types
//!
//! - [`ResamplingScheme`]: multinomial (default) or systematic draws
//! - [`Resampler`]: replica counts and population rebuild
//!
//! # References
//!
//! - Douc, Cappé & Moulines (2005), "Comparison of Resampling Schemes for
//!   Particle Filtering"

mod resampler;
mod scheme;

pub use resampler::{replicate, Resampler};
pub use scheme::ResamplingScheme;
