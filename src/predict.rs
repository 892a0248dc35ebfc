//! Posterior predictive draws for a new observation.
//!
//! For each retained post-burn-in state `β_t` of a finished chain, the predictor
//! computes the success probability `p_t = σ(x_new · β_t)` and draws one Bernoulli
//! outcome. The empirical distribution of those draws approximates the posterior
//! predictive distribution of the binary outcome at `x_new`.

use ndarray::ArrayView2;
use rand::Rng;

use crate::chain::ChainTrajectory;
use crate::error::McmcError;
use crate::sigmoid;

/// Posterior predictive sampler for a fixed new covariate vector.
///
/// # Example
/// ```rust
/// use logit_mh::{IsotropicWalk, LogitPosterior, MetropolisChain, PosteriorPredictor};
/// use ndarray::array;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
/// let y = array![0.0, 0.0, 1.0, 1.0];
/// let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
/// let trajectory =
///     MetropolisChain::new(&posterior, IsotropicWalk::new(0.5, 2), vec![0.0, 0.0], 42)
///         .unwrap()
///         .run(1000);
///
/// let predictor = PosteriorPredictor::new(vec![1.0, 1.5]);
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let draws: Vec<u8> = predictor.draws(&trajectory, 200, &mut rng).unwrap().collect();
/// assert_eq!(draws.len(), 800);
/// assert!(draws.iter().all(|d| *d <= 1));
/// ```
#[derive(Debug, Clone)]
pub struct PosteriorPredictor {
    x_new: Vec<f64>,
}

impl PosteriorPredictor {
    /// Create a predictor for the covariate vector `x_new` (intercept entry
    /// included, matching the design matrix's column order).
    pub fn new(x_new: Vec<f64>) -> Self {
        Self { x_new }
    }

    /// The covariate vector this predictor evaluates.
    pub fn x_new(&self) -> &[f64] {
        &self.x_new
    }

    /// Lazily draw one Bernoulli outcome per retained post-burn-in sample.
    ///
    /// The returned iterator is finite (one draw per retained state) and
    /// non-restartable: it borrows the RNG stream and yields each draw once.
    /// A chain that never moved collapses the predictive distribution to a
    /// single Bernoulli parameter, which is a valid result, not an error.
    ///
    /// # Errors
    /// * [`McmcError::DimensionMismatch`] if `x_new` does not match the
    ///   trajectory's coefficient count
    /// * [`McmcError::BurnInTooLong`] if `burn_in` leaves no retained samples
    pub fn draws<'a, R: Rng + ?Sized>(
        &'a self,
        trajectory: &'a ChainTrajectory,
        burn_in: usize,
        rng: &'a mut R,
    ) -> Result<PredictiveDraws<'a, R>, McmcError> {
        if self.x_new.len() != trajectory.dim() {
            return Err(McmcError::DimensionMismatch {
                expected: trajectory.dim(),
                got: self.x_new.len(),
                what: "new covariate vector length vs. design matrix columns",
            });
        }
        let retained = trajectory.retained(burn_in)?;
        Ok(PredictiveDraws {
            retained,
            x_new: &self.x_new,
            rng,
            index: 0,
        })
    }
}

/// Lazy sequence of posterior predictive Bernoulli draws, aligned one-to-one with
/// the post-burn-in portion of a chain's trajectory.
pub struct PredictiveDraws<'a, R: ?Sized> {
    retained: ArrayView2<'a, f64>,
    x_new: &'a [f64],
    rng: &'a mut R,
    index: usize,
}

impl<R: Rng + ?Sized> Iterator for PredictiveDraws<'_, R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.index >= self.retained.nrows() {
            return None;
        }
        let beta = self.retained.row(self.index);
        self.index += 1;
        let eta: f64 = beta.iter().zip(self.x_new).map(|(b, x)| b * x).sum();
        Some(u8::from(self.rng.gen_bool(sigmoid(eta))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.retained.nrows() - self.index;
        (remaining, Some(remaining))
    }
}

impl<R: Rng + ?Sized> ExactSizeIterator for PredictiveDraws<'_, R> {}

/// Empirical frequency table of a predictive draw sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictiveDistribution {
    zeros: usize,
    ones: usize,
}

impl PredictiveDistribution {
    /// Tally a draw sequence into {0, 1} counts.
    pub fn from_draws<I: IntoIterator<Item = u8>>(draws: I) -> Self {
        let mut zeros = 0;
        let mut ones = 0;
        for d in draws {
            if d == 0 {
                zeros += 1;
            } else {
                ones += 1;
            }
        }
        Self { zeros, ones }
    }

    /// Count of 0 draws.
    pub fn zeros(&self) -> usize {
        self.zeros
    }

    /// Count of 1 draws.
    pub fn ones(&self) -> usize {
        self.ones
    }

    /// Total number of draws.
    pub fn total(&self) -> usize {
        self.zeros + self.ones
    }

    /// Empirical success frequency, NaN for an empty sequence.
    pub fn success_rate(&self) -> f64 {
        self.ones as f64 / self.total() as f64
    }
}

impl std::fmt::Display for PredictiveDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.total().max(1) as f64;
        write!(
            f,
            "0: {} ({:.1}%)   1: {} ({:.1}%)",
            self.zeros,
            100.0 * self.zeros as f64 / total,
            self.ones,
            100.0 * self.ones as f64 / total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::IsotropicWalk;
    use crate::{LogitPosterior, MetropolisChain};
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn posterior() -> LogitPosterior {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        LogitPosterior::new(x, y, 100.0).unwrap()
    }

    fn trajectory(step: f64, beta0: Vec<f64>, steps: usize) -> ChainTrajectory {
        let posterior = posterior();
        MetropolisChain::new(&posterior, IsotropicWalk::new(step, 2), beta0, 11)
            .unwrap()
            .run(steps)
    }

    #[test]
    fn one_draw_per_retained_sample_each_in_zero_one() {
        let traj = trajectory(0.3, vec![0.0, 0.0], 500);
        let predictor = PosteriorPredictor::new(vec![1.0, 1.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let draws: Vec<u8> = predictor.draws(&traj, 100, &mut rng).unwrap().collect();
        assert_eq!(draws.len(), 400);
        assert!(draws.iter().all(|d| *d <= 1));
    }

    #[test]
    fn collapsed_chain_gives_a_degenerate_but_valid_distribution() {
        // Zero step: the chain never leaves β = (50, 0), so every retained sample
        // implies p = σ(50) ≈ 1 at x_new = (1, 0).
        let traj = trajectory(0.0, vec![50.0, 0.0], 200);
        let predictor = PosteriorPredictor::new(vec![1.0, 0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let dist =
            PredictiveDistribution::from_draws(predictor.draws(&traj, 50, &mut rng).unwrap());
        assert_eq!(dist.ones(), 150);
        assert_eq!(dist.zeros(), 0);
        assert_eq!(dist.success_rate(), 1.0);
    }

    #[test]
    fn mismatched_covariate_vector_is_rejected() {
        let traj = trajectory(0.3, vec![0.0, 0.0], 50);
        let predictor = PosteriorPredictor::new(vec![1.0, 0.5, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(
            predictor.draws(&traj, 0, &mut rng),
            Err(McmcError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn burn_in_past_the_end_is_rejected() {
        let traj = trajectory(0.3, vec![0.0, 0.0], 50);
        let predictor = PosteriorPredictor::new(vec![1.0, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(
            predictor.draws(&traj, 50, &mut rng),
            Err(McmcError::BurnInTooLong { .. })
        ));
    }
}
