//! Multi-chain orchestration.
//!
//! A [`ChainEnsemble`] runs several independent Metropolis chains over the same
//! posterior, each from its own starting point and with its own pre-assigned random
//! seed (`seed + chain_index`). Chains share the posterior data read-only and nothing
//! else, so with the `rayon` feature they run in parallel with results identical to
//! the serial path.
//!
//! The customary setup seeds one chain at the externally fitted maximum-likelihood
//! coefficients and the rest at random draws, to diagnose sensitivity to the starting
//! point; see [`ChainEnsemble::initial_states`].

use rand::Rng;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::chain::{ChainTrajectory, MetropolisChain};
use crate::error::McmcError;
use crate::proposal::Proposal;
use crate::LogitPosterior;

/// Externally fitted maximum-likelihood coefficients, used as a chain starting
/// point and as the comparison baseline in summary tables.
///
/// This crate treats the fit itself as an opaque external collaborator; only the
/// resulting coefficient vector enters the sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct MleBaseline {
    coefficients: Vec<f64>,
}

impl MleBaseline {
    /// Wrap an externally fitted coefficient vector.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// The fitted coefficients, in design-matrix column order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

/// Orchestrates N independent Metropolis chains for convergence comparison.
///
/// # Example
/// ```rust
/// use logit_mh::{ChainEnsemble, IsotropicWalk, LogitPosterior};
/// use ndarray::array;
///
/// let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
/// let y = array![0.0, 0.0, 1.0, 1.0];
/// let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
///
/// let ensemble = ChainEnsemble::new(&posterior, IsotropicWalk::new(0.2, 2), 42);
/// let inits = vec![vec![0.0, 0.0], vec![1.0, -1.0]];
/// let trajectories = ensemble.run(&inits, 500).unwrap();
/// assert_eq!(trajectories.len(), 2);
/// ```
pub struct ChainEnsemble<'a, P> {
    posterior: &'a LogitPosterior,
    proposal: P,
    seed: u64,
}

impl<'a, P> ChainEnsemble<'a, P>
where
    P: Proposal + Clone + Send + Sync,
{
    /// Create an ensemble; chain `i` of any subsequent run uses `seed + i`.
    pub fn new(posterior: &'a LogitPosterior, proposal: P, seed: u64) -> Self {
        Self {
            posterior,
            proposal,
            seed,
        }
    }

    /// Build starting points: the MLE coefficients first, then `n_chains − 1`
    /// vectors drawn coordinate-wise from `Uniform(−spread, spread)`.
    ///
    /// # Errors
    /// [`McmcError::DimensionMismatch`] if the baseline's coefficient count does
    /// not match the design matrix.
    pub fn initial_states<R: Rng + ?Sized>(
        &self,
        mle: &MleBaseline,
        n_chains: usize,
        spread: f64,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>, McmcError> {
        let k = self.posterior.n_coef();
        if mle.coefficients().len() != k {
            return Err(McmcError::DimensionMismatch {
                expected: k,
                got: mle.coefficients().len(),
                what: "MLE baseline length vs. design matrix columns",
            });
        }
        let mut states = Vec::with_capacity(n_chains);
        states.push(mle.coefficients().to_vec());
        for _ in 1..n_chains {
            states.push((0..k).map(|_| rng.gen_range(-spread..=spread)).collect());
        }
        Ok(states)
    }

    /// Run one chain per initial state for `steps` states each.
    ///
    /// Every initial state is validated before any chain advances, so a bad
    /// configuration never produces a partial result. Chains are independent;
    /// with the `rayon` feature they execute in parallel, and because each chain
    /// carries its own pre-assigned seed the output matches the serial path.
    ///
    /// # Errors
    /// * [`McmcError::DimensionMismatch`] on any length mismatch
    /// * [`McmcError::DegenerateInitialState`] (tagged with the chain index) if
    ///   any starting point has a non-finite log-posterior
    pub fn run(
        &self,
        initial_states: &[Vec<f64>],
        steps: usize,
    ) -> Result<Vec<ChainTrajectory>, McmcError> {
        for (i, beta0) in initial_states.iter().enumerate() {
            self.validate(i, beta0)?;
        }

        #[cfg(feature = "rayon")]
        return initial_states
            .par_iter()
            .enumerate()
            .map(|(i, beta0)| self.run_single(i, beta0, steps))
            .collect();

        #[cfg(not(feature = "rayon"))]
        initial_states
            .iter()
            .enumerate()
            .map(|(i, beta0)| self.run_single(i, beta0, steps))
            .collect()
    }

    fn validate(&self, chain: usize, beta0: &[f64]) -> Result<(), McmcError> {
        let k = self.posterior.n_coef();
        if beta0.len() != k {
            return Err(McmcError::DimensionMismatch {
                expected: k,
                got: beta0.len(),
                what: "initial state length vs. design matrix columns",
            });
        }
        let lp = self.posterior.log_posterior(beta0);
        if !lp.is_finite() {
            return Err(McmcError::DegenerateInitialState {
                chain,
                log_posterior: lp,
            });
        }
        Ok(())
    }

    fn run_single(
        &self,
        chain: usize,
        beta0: &[f64],
        steps: usize,
    ) -> Result<ChainTrajectory, McmcError> {
        let seed = self.seed.wrapping_add(chain as u64);
        let mh = MetropolisChain::new(self.posterior, self.proposal.clone(), beta0.to_vec(), seed)
            .map_err(|e| match e {
                McmcError::DegenerateInitialState { log_posterior, .. } => {
                    McmcError::DegenerateInitialState {
                        chain,
                        log_posterior,
                    }
                }
                other => other,
            })?;
        Ok(mh.run(steps))
    }
}
