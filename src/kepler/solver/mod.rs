//! Newton–Raphson solver for Kepler's equation.
//!
//! Finds the eccentric anomaly `E` (radians) such that
//! `f(E) = E − e·sin(E) − M = 0`, with `f'(E) = 1 − e·cos(E)`.
//!
//! Since `|e·sin(E)| ≤ |e|`, the root always lies in `[M − |e|, M + |e|]`.
//! The solver keeps a bracket inside that interval and falls back to
//! bisection whenever a Newton step would leave it, so steep orbits
//! (`e → 1`, small `M`) cannot run away.
//!
//! The iteration count is bounded: an input that does not converge within
//! [`SolverConfig::max_iterations`] yields the best estimate seen, flagged
//! [`SolveStatus::IterationLimit`], instead of stalling the caller.

/// Residual tolerance on `|f(E)|`, a few ULPs above machine precision.
pub const TOLERANCE: f64 = 10.0 * f64::EPSILON;
/// Default Newton iteration bound.
pub const MAX_ITERATIONS: u32 = 100;

//==================================================================================CONFIG
/// Solver tuning. Immutable once handed to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Convergence threshold on `|f(E)|`.
    pub tolerance: f64,
    /// Maximum number of Newton steps before giving up.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

//==================================================================================SOLUTION
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SolveStatus {
    /// `|f(E)| ≤ tolerance`.
    Converged,
    /// The iteration bound was reached first.
    IterationLimit,
    /// The residual is not finite (NaN or infinite input).
    Diverged,
}

/// Outcome of a solve: the best estimate and how it was reached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solution {
    /// Eccentric anomaly in radians (not normalized).
    pub eccentric_anomaly: f64,
    /// `|f(E)|` at `eccentric_anomaly`, the smallest seen during the solve.
    pub residual: f64,
    /// Newton steps taken.
    pub iterations: u32,
    pub status: SolveStatus,
}

impl Solution {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

//==================================================================================SOLVE
/// Kepler residual `f(E) = E − e·sin(E) − M`.
#[inline]
pub fn kepler_residual(eccentric_anomaly: f64, eccentricity: f64, mean_anomaly: f64) -> f64 {
    eccentric_anomaly - eccentricity * libm::sin(eccentric_anomaly) - mean_anomaly
}

/// Derivative `f'(E) = 1 − e·cos(E)`.
#[inline]
pub fn kepler_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - eccentricity * libm::cos(eccentric_anomaly)
}

/// Solve with the default [`SolverConfig`].
pub fn solve(mean_anomaly: f64, eccentricity: f64, initial_guess: f64) -> Solution {
    solve_with(&SolverConfig::default(), mean_anomaly, eccentricity, initial_guess)
}

/// Iterate `E ← E − f(E)/f'(E)` from `initial_guess` until `|f(E)|` drops
/// below the tolerance or the iteration bound is hit. Angles in radians.
///
/// A Newton step that leaves the current root bracket (or a vanishing
/// derivative) is replaced by a bisection step. The returned estimate is
/// the evaluated point with the smallest `|f(E)|`, initial guess included.
pub fn solve_with(
    config: &SolverConfig,
    mean_anomaly: f64,
    eccentricity: f64,
    initial_guess: f64,
) -> Solution {
    log_debug!(
        "Solving Kepler's equation: e={} M={} rad, guess={} rad",
        eccentricity,
        mean_anomaly,
        initial_guess
    );

    // f(low) ≤ 0 ≤ f(high) holds for the whole solve.
    let spread = libm::fabs(eccentricity);
    let mut low = mean_anomaly - spread;
    let mut high = mean_anomaly + spread;

    let mut estimate = initial_guess;
    let mut residual = kepler_residual(estimate, eccentricity, mean_anomaly);
    let mut best = (estimate, residual);
    let mut iterations = 0;

    let status = loop {
        if !residual.is_finite() {
            break SolveStatus::Diverged;
        }
        if libm::fabs(residual) <= config.tolerance {
            break SolveStatus::Converged;
        }
        if iterations >= config.max_iterations {
            break SolveStatus::IterationLimit;
        }

        if (low..=high).contains(&estimate) {
            if residual < 0.0 {
                low = estimate;
            } else {
                high = estimate;
            }
        }

        let derivative = kepler_derivative(estimate, eccentricity);
        let newton = estimate - residual / derivative;
        estimate = if newton.is_finite() && low < newton && newton < high {
            newton
        } else {
            log_trace!("Newton step left [{}, {}], bisecting", low, high);
            0.5 * (low + high)
        };

        residual = kepler_residual(estimate, eccentricity, mean_anomaly);
        iterations += 1;
        log_trace!("Newton step {}: E={} residual={}", iterations, estimate, residual);

        if libm::fabs(residual) < libm::fabs(best.1) {
            best = (estimate, residual);
        }
    };

    let (eccentric_anomaly, residual) = match status {
        SolveStatus::Diverged => (estimate, residual),
        _ => best,
    };

    match status {
        SolveStatus::Converged => log_debug!(
            "Converged to {} rad after {} iterations (residual {})",
            eccentric_anomaly,
            iterations,
            residual
        ),
        _ => log_warn!(
            "No convergence after {} iterations: best E={} residual={} ({:?})",
            iterations,
            eccentric_anomaly,
            residual,
            status
        ),
    }

    Solution {
        eccentric_anomaly,
        residual: libm::fabs(residual),
        iterations,
        status,
    }
}
