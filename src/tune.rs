//! Proposal-scale tuning toward a target acceptance-rate band.
//!
//! Random-walk Metropolis mixes poorly at both extremes: a tiny step accepts nearly
//! everything but explores slowly, a huge step is almost always rejected. The tuner
//! runs short pilot chains and halves the proposal scale when the observed acceptance
//! rate falls below the target band, doubles it when above, until the rate lands in
//! the band or the round limit is exhausted.
//!
//! Because [`Proposal::rescale`] is a trait method, the same loop tunes scalar,
//! per-coordinate, and covariance-scaled walks alike.

use std::ops::RangeInclusive;

use crate::chain::MetropolisChain;
use crate::error::McmcError;
use crate::proposal::Proposal;
use crate::LogitPosterior;

/// Outcome of a tuning run.
#[derive(Debug, Clone)]
pub struct TuningResult<P> {
    /// The proposal with its final scale.
    pub proposal: P,
    /// Acceptance rate observed in the last pilot run.
    pub acceptance_rate: f64,
    /// Pilot rounds consumed.
    pub rounds: usize,
}

impl<P> TuningResult<P> {
    /// True if the last observed rate landed inside `target`.
    pub fn in_band(&self, target: &RangeInclusive<f64>) -> bool {
        target.contains(&self.acceptance_rate)
    }
}

/// Adjusts a proposal's step size(s) between pilot runs to hit a target
/// acceptance rate (a band around ~20% is customary for random-walk Metropolis).
#[derive(Debug, Clone)]
pub struct ScaleTuner {
    target: RangeInclusive<f64>,
    pilot_steps: usize,
    max_rounds: usize,
}

impl Default for ScaleTuner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleTuner {
    /// A tuner targeting the 15–25% acceptance band with 500-step pilots and at
    /// most 40 rounds (enough to walk a scale across many orders of magnitude).
    pub fn new() -> Self {
        Self {
            target: 0.15..=0.25,
            pilot_steps: 500,
            max_rounds: 40,
        }
    }

    /// Set the target acceptance-rate band.
    ///
    /// # Panics
    /// Panics if the band does not lie within (0, 1).
    pub fn with_target(mut self, target: RangeInclusive<f64>) -> Self {
        assert!(
            *target.start() > 0.0 && *target.end() < 1.0 && target.start() <= target.end(),
            "target band must lie within (0, 1)"
        );
        self.target = target;
        self
    }

    /// Set the number of steps per pilot chain.
    pub fn with_pilot_steps(mut self, pilot_steps: usize) -> Self {
        assert!(pilot_steps > 1, "pilot chains need at least one transition");
        self.pilot_steps = pilot_steps;
        self
    }

    /// Set the maximum number of rescale rounds.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// The configured target band.
    pub fn target(&self) -> &RangeInclusive<f64> {
        &self.target
    }

    /// Tune `proposal` against `posterior`, piloting from `beta0`.
    ///
    /// Each round runs a fresh pilot chain (seeded `seed + round`, so no single
    /// noise realization dominates), halves the scale when the rate is below the
    /// band and doubles it when above. Returns after the first in-band pilot or
    /// after `max_rounds`; the caller can check [`TuningResult::in_band`].
    ///
    /// # Errors
    /// Propagates chain-construction errors (dimension mismatch, degenerate
    /// starting point).
    pub fn tune<P>(
        &self,
        posterior: &LogitPosterior,
        mut proposal: P,
        beta0: &[f64],
        seed: u64,
    ) -> Result<TuningResult<P>, McmcError>
    where
        P: Proposal + Clone,
    {
        let mut rate = f64::NAN;
        for round in 0..self.max_rounds {
            let chain = MetropolisChain::new(
                posterior,
                proposal.clone(),
                beta0.to_vec(),
                seed.wrapping_add(round as u64),
            )?;
            rate = chain.run(self.pilot_steps).acceptance_rate();
            if rate < *self.target.start() {
                proposal.rescale(0.5);
            } else if rate > *self.target.end() {
                proposal.rescale(2.0);
            } else {
                return Ok(TuningResult {
                    proposal,
                    acceptance_rate: rate,
                    rounds: round + 1,
                });
            }
        }
        Ok(TuningResult {
            proposal,
            acceptance_rate: rate,
            rounds: self.max_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{IsotropicWalk, PerCoordinateWalk};
    use ndarray::array;

    fn posterior() -> LogitPosterior {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        LogitPosterior::new(x, y, 100.0).unwrap()
    }

    #[test]
    fn shrinks_an_absurdly_large_step_into_a_wide_band() {
        let posterior = posterior();
        let tuner = ScaleTuner::new().with_target(0.05..=0.5);
        let result = tuner
            .tune(&posterior, IsotropicWalk::new(1e6, 2), &[0.0, 0.0], 42)
            .unwrap();
        assert!(result.proposal.step() < 1e6);
        assert!(result.in_band(tuner.target()), "rate {} out of band", result.acceptance_rate);
    }

    #[test]
    fn widens_a_vanishing_step() {
        let posterior = posterior();
        let tuner = ScaleTuner::new().with_target(0.05..=0.5);
        let result = tuner
            .tune(&posterior, IsotropicWalk::new(1e-6, 2), &[0.0, 0.0], 42)
            .unwrap();
        assert!(result.proposal.step() > 1e-6);
        assert!(result.in_band(tuner.target()), "rate {} out of band", result.acceptance_rate);
    }

    #[test]
    fn tunes_per_coordinate_walks_too() {
        let posterior = posterior();
        let tuner = ScaleTuner::new().with_target(0.05..=0.5);
        let result = tuner
            .tune(
                &posterior,
                PerCoordinateWalk::new(vec![1e4, 1e3]),
                &[0.0, 0.0],
                7,
            )
            .unwrap();
        // Both coordinates shrink by the same shared factor.
        let steps = result.proposal.steps().to_vec();
        assert!(steps[0] < 1e4 && steps[1] < 1e3);
        assert!((0.0..=1.0).contains(&result.acceptance_rate));
    }

    #[test]
    fn propagates_degenerate_pilot_start() {
        let posterior = posterior();
        let tuner = ScaleTuner::new();
        let err = tuner
            .tune(&posterior, IsotropicWalk::new(0.1, 2), &[f64::NAN, 0.0], 0)
            .unwrap_err();
        assert!(matches!(err, McmcError::DegenerateInitialState { .. }));
    }
}
