//! Diagnostics for the temperature search.

/// One row of the search trace.
///
/// Iteration 0 describes the primed state before the minimizer runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchTrace {
    pub iteration: usize,
    /// Current bracket `[lower, upper]` on δ.
    pub lower: f64,
    pub upper: f64,
    /// δ evaluated in this iteration.
    pub dbeta: f64,
    pub cov: f64,
    /// `cov - target`.
    pub residual: f64,
    /// Objective value `(cov - target)²` or the degenerate sentinel.
    pub metric: f64,
    pub converged: bool,
}

/// Receives search diagnostics. Purely observational.
pub trait SearchObserver {
    fn on_iteration(&mut self, trace: &SearchTrace);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_iteration(&mut self, _trace: &SearchTrace) {}
}

/// Keeps every trace record in memory.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    pub records: Vec<SearchTrace>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchObserver for TraceRecorder {
    fn on_iteration(&mut self, trace: &SearchTrace) {
        self.records.push(*trace);
    }
}
