//! Single-chain random-walk Metropolis sampler.
//!
//! A [`MetropolisChain`] is created with an initial coefficient vector and advanced one
//! Metropolis step at a time: draw a candidate from the proposal, evaluate the
//! log-posterior at both states, and accept with probability `min(1, exp(Δ))` where
//! `Δ` is the log-posterior difference. The accept test runs entirely in log space
//! (`ln u < Δ`), so a large positive `Δ` always accepts without ever exponentiating,
//! and a non-finite candidate log-posterior never accepts.
//!
//! Running the chain consumes it and yields an immutable [`ChainTrajectory`] for
//! diagnostics and prediction.

use ndarray::{Array2, ArrayView1, ArrayView2, s};
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Uniform;

use crate::error::McmcError;
use crate::proposal::Proposal;
use crate::LogitPosterior;

/// A single Markov chain for the Metropolis algorithm.
///
/// Each chain owns its current state, its history, its acceptance counter, and its
/// own seeded random-number generator; the posterior data are shared read-only.
///
/// # Type Parameters
/// * `P` - The proposal generator type (implements [`Proposal`])
/// * `R` - The random number generator type (defaults to `ChaCha8Rng`)
pub struct MetropolisChain<'a, P, R = ChaCha8Rng> {
    posterior: &'a LogitPosterior,
    proposal: P,
    states: Vec<Vec<f64>>,
    current_lp: f64,
    accepted: usize,
    unif: Uniform,
    rng: R,
}

impl<'a, P: Proposal> MetropolisChain<'a, P, ChaCha8Rng> {
    /// Create a chain at `beta0` with a default `ChaCha8Rng` seeded from `seed`.
    ///
    /// All structural checks run here, before any stochastic step: the initial
    /// state and the proposal must match the design matrix's coefficient count,
    /// and the initial log-posterior must be finite (sampling from a degenerate
    /// starting point would yield an all-rejection trajectory).
    ///
    /// # Errors
    /// * [`McmcError::DimensionMismatch`] on a length mismatch
    /// * [`McmcError::DegenerateInitialState`] if `log_posterior(beta0)` is not finite
    pub fn new(
        posterior: &'a LogitPosterior,
        proposal: P,
        beta0: Vec<f64>,
        seed: u64,
    ) -> Result<Self, McmcError> {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed), posterior, proposal, beta0)
    }
}

impl<'a, P: Proposal, R: Rng> MetropolisChain<'a, P, R> {
    /// Create a chain at `beta0` with a caller-supplied RNG.
    ///
    /// Same structural checks as [`MetropolisChain::new`]; use this when each
    /// chain must carry an independently constructed random-number stream.
    pub fn from_rng(
        rng: R,
        posterior: &'a LogitPosterior,
        proposal: P,
        beta0: Vec<f64>,
    ) -> Result<Self, McmcError> {
        let k = posterior.n_coef();
        if beta0.len() != k {
            return Err(McmcError::DimensionMismatch {
                expected: k,
                got: beta0.len(),
                what: "initial state length vs. design matrix columns",
            });
        }
        if proposal.dim() != k {
            return Err(McmcError::DimensionMismatch {
                expected: k,
                got: proposal.dim(),
                what: "proposal dimension vs. design matrix columns",
            });
        }
        let current_lp = posterior.log_posterior(&beta0);
        if !current_lp.is_finite() {
            return Err(McmcError::DegenerateInitialState {
                chain: 0,
                log_posterior: current_lp,
            });
        }
        Ok(Self {
            posterior,
            proposal,
            states: vec![beta0],
            current_lp,
            accepted: 0,
            unif: Uniform::standard(),
            rng,
        })
    }

    /// Perform one Metropolis transition and record the resulting state.
    ///
    /// Returns `true` if the candidate was accepted. A candidate whose
    /// log-posterior is NaN or −∞ is always rejected: the comparison
    /// `ln u < Δ` is false for both (NaN compares false, and `ln u` is never
    /// less than −∞), so numerical degeneracy is absorbed as a rejection.
    pub fn step(&mut self) -> bool {
        let current = self.states.last().expect("chain always holds its initial state");
        let candidate = self.proposal.propose(&mut self.rng, current);
        let candidate_lp = self.posterior.log_posterior(&candidate);
        let delta = candidate_lp - self.current_lp;
        let u: f64 = self.unif.sample(&mut self.rng);
        let accept = u.ln() < delta;
        if accept {
            self.states.push(candidate);
            self.current_lp = candidate_lp;
            self.accepted += 1;
        } else {
            let repeat = current.clone();
            self.states.push(repeat);
        }
        accept
    }

    /// Advance the chain to a total length of `steps` states (the initial state
    /// plus `steps − 1` transitions) and freeze it into a [`ChainTrajectory`].
    ///
    /// # Panics
    /// Panics if `steps` is zero.
    pub fn run(mut self, steps: usize) -> ChainTrajectory {
        assert!(steps > 0, "chain length must be at least 1");
        while self.states.len() < steps {
            self.step();
        }
        let k = self.posterior.n_coef();
        let recorded = self.states.len();
        let flat: Vec<f64> = self.states.into_iter().flatten().collect();
        let samples = Array2::from_shape_vec((recorded, k), flat)
            .expect("row-major trajectory has consistent shape");
        ChainTrajectory {
            samples,
            accepted: self.accepted,
        }
    }
}

/// The immutable history of a completed chain: an `S × k` array of states plus the
/// acceptance counter.
///
/// Entry 0 is the initial state; every later entry equals either its predecessor
/// (rejected proposal) or the candidate drawn at that step (accepted proposal).
#[derive(Debug, Clone)]
pub struct ChainTrajectory {
    samples: Array2<f64>,
    accepted: usize,
}

impl ChainTrajectory {
    /// Number of recorded states, including the initial one.
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    /// True if the trajectory holds no states. Cannot occur for a trajectory
    /// produced by [`MetropolisChain::run`].
    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    /// Number of coefficients per state.
    pub fn dim(&self) -> usize {
        self.samples.ncols()
    }

    /// Number of accepted proposals.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Fraction of proposals accepted, `accepted / (S − 1)`.
    ///
    /// A single-state trajectory made no proposals; its rate is reported as 1.0
    /// (vacuously, nothing was rejected).
    pub fn acceptance_rate(&self) -> f64 {
        let transitions = self.len().saturating_sub(1);
        if transitions == 0 {
            1.0
        } else {
            self.accepted as f64 / transitions as f64
        }
    }

    /// The state at step `t`.
    pub fn sample(&self, t: usize) -> ArrayView1<'_, f64> {
        self.samples.row(t)
    }

    /// The full `S × k` trajectory.
    pub fn samples(&self) -> &Array2<f64> {
        &self.samples
    }

    /// The post-burn-in segment, rows `burn_in..S`.
    ///
    /// # Errors
    /// [`McmcError::BurnInTooLong`] if `burn_in` leaves no retained samples.
    pub fn retained(&self, burn_in: usize) -> Result<ArrayView2<'_, f64>, McmcError> {
        if burn_in >= self.len() {
            return Err(McmcError::BurnInTooLong {
                burn_in,
                steps: self.len(),
            });
        }
        Ok(self.samples.slice(s![burn_in.., ..]))
    }
}
