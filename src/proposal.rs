//! Symmetric random-walk proposal generators.
//!
//! Each generator draws a candidate coefficient vector centered at the current state.
//! All three variants are symmetric in (current, candidate), i.e. the proposal density
//! satisfies q(candidate | current) = q(current | candidate), so the Metropolis
//! acceptance ratio reduces to a posterior-density ratio with no Hastings correction.
//!
//! The variants differ in how the step is shaped:
//! - [`IsotropicWalk`]: one shared step size for every coordinate
//! - [`PerCoordinateWalk`]: an independent step size per coordinate, for parameters
//!   with very different natural magnitudes (an intercept vs. a small-range covariate)
//! - [`CovarianceWalk`]: a full multivariate normal step, typically shaped by
//!   `scale × (XᵀX)⁻¹`

use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::Array2;
use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::Normal;

use crate::error::McmcError;

/// A symmetric random-walk proposal over coefficient vectors.
///
/// Implementations must be symmetric in (current, candidate); the chain relies on
/// this to skip the Hastings correction term.
pub trait Proposal {
    /// Dimensionality of the proposed vectors.
    fn dim(&self) -> usize;

    /// Draw a candidate centered at `current`.
    fn propose<R: Rng + ?Sized>(&self, rng: &mut R, current: &[f64]) -> Vec<f64>;

    /// Multiply the step size(s) by `factor`. This is the [`ScaleTuner`] hook: a
    /// factor below 1 shrinks the walk, above 1 widens it.
    ///
    /// [`ScaleTuner`]: crate::ScaleTuner
    fn rescale(&mut self, factor: f64);
}

/// Isotropic random walk: every coordinate moves by `step · z`, `z ~ N(0,1)`.
///
/// A step size of exactly 0 reproduces the current state bit-for-bit, which makes
/// every proposal accept (the log-posterior ratio is 0).
#[derive(Debug, Clone)]
pub struct IsotropicWalk {
    step: f64,
    dim: usize,
    std_norm: Normal,
}

impl IsotropicWalk {
    /// Create an isotropic walk with a shared `step` size over `dim` coordinates.
    ///
    /// # Panics
    /// Panics if `step` is negative or non-finite, or if `dim` is zero.
    pub fn new(step: f64, dim: usize) -> Self {
        assert!(step.is_finite() && step >= 0.0, "step size must be finite and non-negative");
        assert!(dim > 0, "proposal dimension must be positive");
        Self {
            step,
            dim,
            std_norm: Normal::standard(),
        }
    }

    /// The current step size.
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl Proposal for IsotropicWalk {
    fn dim(&self) -> usize {
        self.dim
    }

    fn propose<R: Rng + ?Sized>(&self, rng: &mut R, current: &[f64]) -> Vec<f64> {
        debug_assert_eq!(current.len(), self.dim);
        current
            .iter()
            .map(|&c| c + self.step * self.std_norm.sample(rng))
            .collect()
    }

    fn rescale(&mut self, factor: f64) {
        self.step *= factor;
    }
}

/// Random walk with an independent step size per coordinate.
#[derive(Debug, Clone)]
pub struct PerCoordinateWalk {
    steps: Vec<f64>,
    std_norm: Normal,
}

impl PerCoordinateWalk {
    /// Create a walk with one step size per coordinate.
    ///
    /// # Panics
    /// Panics if `steps` is empty or contains a negative or non-finite entry.
    pub fn new(steps: Vec<f64>) -> Self {
        assert!(!steps.is_empty(), "need at least one step size");
        assert!(
            steps.iter().all(|s| s.is_finite() && *s >= 0.0),
            "step sizes must be finite and non-negative"
        );
        Self {
            steps,
            std_norm: Normal::standard(),
        }
    }

    /// The current step sizes.
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }
}

impl Proposal for PerCoordinateWalk {
    fn dim(&self) -> usize {
        self.steps.len()
    }

    fn propose<R: Rng + ?Sized>(&self, rng: &mut R, current: &[f64]) -> Vec<f64> {
        debug_assert_eq!(current.len(), self.steps.len());
        current
            .iter()
            .zip(&self.steps)
            .map(|(&c, &s)| c + s * self.std_norm.sample(rng))
            .collect()
    }

    fn rescale(&mut self, factor: f64) {
        for s in &mut self.steps {
            *s *= factor;
        }
    }
}

/// Multivariate random walk: `candidate = current + L·z` where `L` is the Cholesky
/// factor of the proposal covariance and `z` is a vector of independent N(0,1) draws.
///
/// The customary covariance is a tuning constant times `(XᵀX)⁻¹`, which shapes the
/// walk to the geometry of the design; see [`CovarianceWalk::from_design`].
#[derive(Debug, Clone)]
pub struct CovarianceWalk {
    chol: DMatrix<f64>,
    std_norm: Normal,
}

impl CovarianceWalk {
    /// Create a walk from an explicit `k × k` covariance matrix, pre-scaled by
    /// `scale` (a variance multiplier, e.g. 1.5).
    ///
    /// # Errors
    /// [`McmcError::SingularCovariance`] if `scale × cov` has no Cholesky factor.
    ///
    /// # Panics
    /// Panics if `cov` is not square or `scale` is not a positive finite number.
    pub fn new(scale: f64, cov: DMatrix<f64>) -> Result<Self, McmcError> {
        assert!(cov.is_square(), "covariance matrix must be square");
        assert!(scale.is_finite() && scale > 0.0, "scale must be finite and positive");
        let chol = Cholesky::new(cov * scale)
            .ok_or(McmcError::SingularCovariance)?
            .l();
        Ok(Self {
            chol,
            std_norm: Normal::standard(),
        })
    }

    /// Create a walk with covariance `scale × (XᵀX)⁻¹` for a design matrix `x`.
    ///
    /// # Errors
    /// [`McmcError::SingularCovariance`] if `XᵀX` is not invertible (e.g. a
    /// rank-deficient design) or the inverse has no Cholesky factor.
    pub fn from_design(scale: f64, x: &Array2<f64>) -> Result<Self, McmcError> {
        let (n, k) = (x.nrows(), x.ncols());
        let xm = DMatrix::from_row_iterator(n, k, x.iter().copied());
        let xtx = xm.transpose() * &xm;
        let base = xtx.try_inverse().ok_or(McmcError::SingularCovariance)?;
        Self::new(scale, base)
    }
}

impl Proposal for CovarianceWalk {
    fn dim(&self) -> usize {
        self.chol.nrows()
    }

    fn propose<R: Rng + ?Sized>(&self, rng: &mut R, current: &[f64]) -> Vec<f64> {
        debug_assert_eq!(current.len(), self.chol.nrows());
        let z = DVector::from_fn(self.chol.nrows(), |_, _| self.std_norm.sample(rng));
        let jump = &self.chol * z;
        current.iter().zip(jump.iter()).map(|(&c, &j)| c + j).collect()
    }

    fn rescale(&mut self, factor: f64) {
        // L scales linearly in the standard deviation, so the covariance picks
        // up a factor².
        self.chol *= factor;
    }
}
