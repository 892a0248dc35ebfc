//! # Random-Walk Metropolis Sampler for Bayesian Logistic Regression
//!
//! This crate estimates the posterior distribution of the coefficients in a Bayesian
//! logistic regression model via random-walk Metropolis MCMC, and uses the sampled
//! posterior to generate predictive draws for new observations.
//!
//! ## Features
//!
//! - **Log-posterior evaluation:**
//!   - Numerically stable logistic log-likelihood ([`log_sigmoid`]) plus independent
//!     normal priors on the coefficients — finite for linear predictors far beyond the
//!     overflow point of a naive `exp(η)/(1+exp(η))` implementation.
//!
//! - **Sampling:**
//!   - A single parameterized chain engine ([`MetropolisChain`]) driven by a symmetric
//!     [`Proposal`]: isotropic, per-coordinate, or covariance-scaled random walk.
//!   - Multi-chain orchestration ([`ChainEnsemble`]) with per-chain seeded RNG streams
//!     and optional parallel execution under the `rayon` feature.
//!   - Acceptance-rate tuning ([`ScaleTuner`]) toward a configurable target band.
//!
//! - **Diagnostics and prediction:**
//!   - Burn-in-trimmed posterior summaries with credible intervals ([`summary`]).
//!   - Posterior predictive Bernoulli draws for a held-out covariate vector
//!     ([`PosteriorPredictor`]).
//!
//! ## Model
//!
//! - Likelihood: \( y_i \mid \beta \sim \mathrm{Bernoulli}(\sigma(x_i^\top \beta)) \),
//!   where \( \sigma \) is the logistic function
//! - Prior: \( \beta_j \sim \mathcal{N}(0, \sigma_0^2) \), independent per coefficient
//!
//! The proposal distributions are symmetric in the current and candidate states, so the
//! Metropolis acceptance ratio reduces to a pure posterior-density ratio evaluated in
//! log space; no Hastings correction term is needed.
//!
//! ## References
//!
//! - Metropolis, N., Rosenbluth, A.W., Rosenbluth, M.N., Teller, A.H., & Teller, E.
//!   (1953). Equation of State Calculations by Fast Computing Machines.
//!   *J. Chem. Phys.*, 21(6): 1087–1092.
//! - Gelman, A., Roberts, G.O., & Gilks, W.R. (1996). Efficient Metropolis jumping
//!   rules. *Bayesian Statistics*, 5: 599–607.
//!
//! ## Usage Example
//!
//! ```rust
//! use logit_mh::{IsotropicWalk, LogitPosterior, MetropolisChain};
//! use ndarray::array;
//!
//! let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
//! let y = array![0.0, 0.0, 1.0, 1.0];
//! let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
//!
//! let chain =
//!     MetropolisChain::new(&posterior, IsotropicWalk::new(0.1, 2), vec![0.0, 0.0], 42).unwrap();
//! let trajectory = chain.run(500);
//! assert!(trajectory.acceptance_rate() <= 1.0);
//! ```
//!
//! ## License
//! This crate is dual-licensed under the MIT OR Apache-2.0 licenses.

use ndarray::{Array1, Array2, ArrayView1};
use statrs::distribution::{Continuous, Normal};

/// Numerically stable `log σ(η)`, the log of the logistic function.
///
/// Branches on the sign of `η` so that the exponential argument is never positive:
/// for `η ≥ 0` this is `−ln(1 + e^{−η})`, otherwise `η − ln(1 + e^{η})`. Finite for
/// all finite `η`, including magnitudes in the hundreds where `e^η` itself overflows.
#[inline]
pub fn log_sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        -(-eta).exp().ln_1p()
    } else {
        eta - eta.exp().ln_1p()
    }
}

/// Numerically stable logistic function `σ(η) = 1 / (1 + e^{−η})`.
#[inline]
pub fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// Log-posterior evaluator for Bayesian logistic regression.
///
/// Holds the design matrix, the binary response vector, and the shared zero-mean
/// normal prior on the coefficients. The data are immutable for the duration of a
/// sampling run and safely shared read-only across concurrently running chains.
///
/// # Example
/// ```rust
/// use logit_mh::LogitPosterior;
/// use ndarray::array;
///
/// let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
/// let y = array![0.0, 0.0, 1.0];
/// let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
/// let lp = posterior.log_posterior(&[0.0, 0.0]);
/// assert!(lp.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct LogitPosterior {
    x: Array2<f64>,
    y: Array1<f64>,
    prior: Normal,
    prior_sd: f64,
}

impl LogitPosterior {
    /// Create a new log-posterior evaluator.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape `(n_observations, n_predictors)`. For models
    ///   with an intercept, include a column of ones.
    /// * `y` - Response vector of shape `(n_observations,)` with entries in {0, 1}.
    /// * `prior_sd` - Standard deviation of the N(0, prior_sd²) prior on each
    ///   coefficient. A common diffuse choice is 100 for unscaled predictors.
    ///
    /// # Errors
    /// * [`McmcError::DimensionMismatch`] if `x` and `y` have incompatible shapes
    /// * [`McmcError::InvalidResponse`] if any response entry is not 0 or 1
    /// * [`McmcError::InvalidPrior`] if `prior_sd` is not a positive finite number
    pub fn new(x: Array2<f64>, y: Array1<f64>, prior_sd: f64) -> Result<Self, McmcError> {
        if x.nrows() != y.len() {
            return Err(McmcError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
                what: "response length vs. design matrix rows",
            });
        }
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(McmcError::InvalidResponse(*bad));
        }
        if !(prior_sd.is_finite() && prior_sd > 0.0) {
            return Err(McmcError::InvalidPrior(prior_sd));
        }
        let prior = Normal::new(0.0, prior_sd).expect("prior sd validated above");
        Ok(Self {
            x,
            y,
            prior,
            prior_sd,
        })
    }

    /// Evaluate the log-posterior density at `beta`.
    ///
    /// Returns log-likelihood + log-prior. Pure and deterministic: identical inputs
    /// yield bit-identical output. A non-finite `beta` yields a non-finite value,
    /// which the chain's acceptance rule treats as never-accept.
    pub fn log_posterior(&self, beta: &[f64]) -> f64 {
        debug_assert_eq!(beta.len(), self.x.ncols());
        let eta = self.x.dot(&ArrayView1::from(beta));
        let log_lik: f64 = eta
            .iter()
            .zip(self.y.iter())
            .map(|(&e, &yi)| if yi == 1.0 { log_sigmoid(e) } else { log_sigmoid(-e) })
            .sum();
        let log_prior: f64 = beta.iter().map(|&b| self.prior.ln_pdf(b)).sum();
        log_lik + log_prior
    }

    /// Number of observations (rows of the design matrix).
    pub fn n_obs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of coefficients (columns of the design matrix, intercept included).
    pub fn n_coef(&self) -> usize {
        self.x.ncols()
    }

    /// The configured prior standard deviation.
    pub fn prior_sd(&self) -> f64 {
        self.prior_sd
    }

    /// Read-only view of the design matrix, e.g. for building a covariance-scaled
    /// proposal from `(XᵀX)⁻¹`.
    pub fn design(&self) -> &Array2<f64> {
        &self.x
    }
}

mod chain;
mod ensemble;
mod error;
mod predict;
mod proposal;
pub mod summary;
mod tune;

pub use chain::{ChainTrajectory, MetropolisChain};
pub use ensemble::{ChainEnsemble, MleBaseline};
pub use error::McmcError;
pub use predict::{PosteriorPredictor, PredictiveDistribution, PredictiveDraws};
pub use proposal::{CovarianceWalk, IsotropicWalk, PerCoordinateWalk, Proposal};
pub use summary::{ChainSummary, CoefficientSummary, Mixing, PosteriorSummary, summarize};
pub use tune::{ScaleTuner, TuningResult};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn small_posterior() -> LogitPosterior {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        LogitPosterior::new(x, y, 100.0).unwrap()
    }

    #[test]
    fn log_sigmoid_is_finite_far_into_the_tails() {
        for eta in [-750.0, -700.0, -100.0, 0.0, 100.0, 700.0, 750.0] {
            assert!(log_sigmoid(eta).is_finite(), "log_sigmoid({eta}) not finite");
            assert!(log_sigmoid(-eta).is_finite());
        }
        // σ(0) = 1/2
        assert_relative_eq!(log_sigmoid(0.0), 0.5f64.ln(), max_relative = 1e-15);
    }

    #[test]
    fn log_sigmoid_matches_the_naive_formula_in_the_stable_range() {
        for eta in [-30.0f64, -4.2, -0.5, 0.0, 0.5, 4.2, 30.0] {
            let naive = -(1.0 + (-eta).exp()).ln();
            assert_relative_eq!(log_sigmoid(eta), naive, max_relative = 1e-12);
        }
    }

    #[test]
    fn log_posterior_is_pure() {
        let posterior = small_posterior();
        let beta = [0.3, -1.7];
        let a = posterior.log_posterior(&beta);
        let b = posterior.log_posterior(&beta);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn log_posterior_finite_for_extreme_linear_predictors() {
        let posterior = small_posterior();
        // η reaches ±700 and beyond at the largest covariate value.
        for b in [-300.0, -100.0, 0.0, 100.0, 300.0] {
            let lp = posterior.log_posterior(&[100.0, b]);
            assert!(lp.is_finite(), "log-posterior not finite at slope {b}");
        }
    }

    #[test]
    fn zero_variance_column_still_finite() {
        // Second column is constant: rank-deficient design, but only X·β is used.
        let x = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        let y = array![0.0, 1.0, 1.0];
        let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
        assert!(posterior.log_posterior(&[0.5, -0.5]).is_finite());
    }

    #[test]
    fn rejects_non_binary_response() {
        let x = array![[1.0], [1.0]];
        let y = array![0.0, 2.0];
        assert!(matches!(
            LogitPosterior::new(x, y, 100.0),
            Err(McmcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn rejects_mismatched_response_length() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![0.0, 1.0];
        assert!(matches!(
            LogitPosterior::new(x, y, 100.0),
            Err(McmcError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn rejects_bad_prior_sd() {
        let x = array![[1.0]];
        let y = array![1.0];
        assert!(matches!(
            LogitPosterior::new(x.clone(), y.clone(), 0.0),
            Err(McmcError::InvalidPrior(_))
        ));
        assert!(matches!(
            LogitPosterior::new(x, y, f64::NAN),
            Err(McmcError::InvalidPrior(_))
        ));
    }

    #[test]
    fn non_finite_beta_yields_non_finite_log_posterior() {
        let posterior = small_posterior();
        assert!(!posterior.log_posterior(&[f64::NAN, 0.0]).is_finite());
        assert!(!posterior.log_posterior(&[f64::INFINITY, 0.0]).is_finite());
    }
}
