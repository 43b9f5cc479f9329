//! Resampling schemes.

/// How uniform draws are turned into replica counts.
///
/// Both schemes bucket points of `[0, 1)` into the cumulative weight
/// boundaries `0 = t₀ ≤ t₁ ≤ … ≤ t_N = 1`, where `t_k` is the total
/// normalized weight of the first `k` particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResamplingScheme {
    /// `N` independent uniform draws.
    ///
    /// Consumes exactly `N` values from the random source, in order.
    #[default]
    Multinomial,

    /// One uniform offset `u ∈ [0, 1/N)` and the `N` points `u + i/N`.
    ///
    /// Lower variance than multinomial; consumes a single draw.
    Systematic,
}
