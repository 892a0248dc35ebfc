//! Burn-in-trimmed posterior summaries and mixing diagnostics.
//!
//! Summaries are computed uniformly over the post-burn-in segment of a trajectory —
//! mean, sample standard deviation, and the central 95% credible interval per
//! coefficient — so runs with different proposal strategies are comparable by
//! construction. [`PosteriorSummary`] collects per-chain summaries into a printable
//! table next to an optional externally fitted baseline.

use crate::chain::ChainTrajectory;
use crate::ensemble::MleBaseline;
use crate::error::McmcError;

/// Per-coefficient posterior summary over the retained trajectory segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSummary {
    /// Posterior mean.
    pub mean: f64,
    /// Sample standard deviation; 0.0 when only a single sample is retained.
    pub sd: f64,
    /// 2.5% quantile (lower bound of the central 95% credible interval).
    pub lower: f64,
    /// 97.5% quantile (upper bound of the central 95% credible interval).
    pub upper: f64,
}

/// Summarize one trajectory, discarding the first `burn_in` states.
///
/// `burn_in = 0` keeps everything; `burn_in = S − 1` summarizes the single final
/// state (its standard deviation is reported as 0 and both interval bounds
/// collapse onto it).
///
/// # Errors
/// [`McmcError::BurnInTooLong`] if nothing is retained.
pub fn summarize(
    trajectory: &ChainTrajectory,
    burn_in: usize,
) -> Result<Vec<CoefficientSummary>, McmcError> {
    let retained = trajectory.retained(burn_in)?;
    let n = retained.nrows();
    let mut out = Vec::with_capacity(retained.ncols());
    for j in 0..retained.ncols() {
        let col = retained.column(j);
        let mean = col.sum() / n as f64;
        let sd = if n > 1 {
            (col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt()
        } else {
            0.0
        };
        let mut sorted: Vec<f64> = col.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        out.push(CoefficientSummary {
            mean,
            sd,
            lower: quantile(&sorted, 0.025),
            upper: quantile(&sorted, 0.975),
        });
    }
    Ok(out)
}

/// Quantile of a sorted sample by linear interpolation between order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Acceptance-rate health classification.
///
/// Poor mixing is a diagnosable condition, not an error: the sampler keeps its
/// output and the caller decides whether to invoke the [`ScaleTuner`].
///
/// [`ScaleTuner`]: crate::ScaleTuner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mixing {
    /// Acceptance rate below 5%: the walk barely moves.
    TooLow,
    /// Acceptance rate inside the healthy band.
    Healthy,
    /// Acceptance rate above 70%: the walk takes timid steps.
    TooHigh,
}

impl Mixing {
    /// Classify an observed acceptance rate.
    pub fn from_rate(rate: f64) -> Self {
        if rate < 0.05 {
            Mixing::TooLow
        } else if rate > 0.70 {
            Mixing::TooHigh
        } else {
            Mixing::Healthy
        }
    }
}

impl std::fmt::Display for Mixing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mixing::TooLow => "too low",
            Mixing::Healthy => "healthy",
            Mixing::TooHigh => "too high",
        };
        f.write_str(s)
    }
}

/// A per-chain summary row.
#[derive(Debug, Clone)]
pub struct ChainSummary {
    /// Caller-supplied chain label (e.g. "mle-start" or "chain 2").
    pub label: String,
    /// The chain's acceptance rate.
    pub acceptance_rate: f64,
    /// Per-coefficient summaries for this chain.
    pub coefficients: Vec<CoefficientSummary>,
}

/// Collects per-chain summaries for side-by-side comparison, optionally against an
/// externally fitted MLE baseline.
#[derive(Debug, Clone)]
pub struct PosteriorSummary {
    baseline: Option<MleBaseline>,
    chains: Vec<ChainSummary>,
}

impl PosteriorSummary {
    /// Start a summary table, optionally carrying the MLE comparison column.
    pub fn new(baseline: Option<MleBaseline>) -> Self {
        Self {
            baseline,
            chains: Vec::new(),
        }
    }

    /// Summarize `trajectory` under `burn_in` and add it as a labeled row group.
    pub fn push_chain(
        &mut self,
        label: impl Into<String>,
        trajectory: &ChainTrajectory,
        burn_in: usize,
    ) -> Result<(), McmcError> {
        self.chains.push(ChainSummary {
            label: label.into(),
            acceptance_rate: trajectory.acceptance_rate(),
            coefficients: summarize(trajectory, burn_in)?,
        });
        Ok(())
    }

    /// The collected per-chain summaries.
    pub fn chains(&self) -> &[ChainSummary] {
        &self.chains
    }
}

impl std::fmt::Display for PosteriorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<12} {:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Chain", "Param", "Mean", "Std.Dev.", "2.5%", "97.5%", "MLE"
        )?;
        writeln!(f, "{}", "-".repeat(78))?;
        for chain in &self.chains {
            for (j, c) in chain.coefficients.iter().enumerate() {
                let mle = self
                    .baseline
                    .as_ref()
                    .and_then(|b| b.coefficients().get(j))
                    .map_or("N/A".to_string(), |v| format!("{v:.4}"));
                writeln!(
                    f,
                    "{:<12} {:<10} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                    chain.label,
                    format!("β{j}"),
                    c.mean,
                    c.sd,
                    c.lower,
                    c.upper,
                    mle
                )?;
            }
            writeln!(
                f,
                "{:<12} acceptance rate {:.3} ({})",
                chain.label,
                chain.acceptance_rate,
                Mixing::from_rate(chain.acceptance_rate)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::IsotropicWalk;
    use crate::{LogitPosterior, MetropolisChain};
    use ndarray::array;

    fn trajectory(step: f64, steps: usize) -> ChainTrajectory {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let posterior = LogitPosterior::new(x, y, 100.0).unwrap();
        MetropolisChain::new(&posterior, IsotropicWalk::new(step, 2), vec![0.0, 0.0], 21)
            .unwrap()
            .run(steps)
    }

    #[test]
    fn zero_burn_in_and_maximal_burn_in_are_both_valid() {
        let traj = trajectory(0.3, 50);
        let full = summarize(&traj, 0).unwrap();
        assert_eq!(full.len(), 2);

        let last_only = summarize(&traj, 49).unwrap();
        let final_state = traj.sample(49);
        for (j, c) in last_only.iter().enumerate() {
            assert_eq!(c.mean, final_state[j]);
            assert_eq!(c.sd, 0.0);
            assert_eq!(c.lower, c.mean);
            assert_eq!(c.upper, c.mean);
        }

        assert!(matches!(
            summarize(&traj, 50),
            Err(McmcError::BurnInTooLong { .. })
        ));
    }

    #[test]
    fn frozen_chain_summarizes_to_its_initial_state() {
        let traj = trajectory(0.0, 40);
        for c in summarize(&traj, 10).unwrap() {
            assert_eq!(c.mean, 0.0);
            assert_eq!(c.sd, 0.0);
            assert_eq!(c.lower, 0.0);
            assert_eq!(c.upper, 0.0);
        }
    }

    #[test]
    fn credible_interval_is_ordered() {
        let traj = trajectory(0.5, 400);
        for c in summarize(&traj, 100).unwrap() {
            assert!(c.lower <= c.upper);
            assert!(c.sd >= 0.0);
        }
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let sorted = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(quantile(&sorted, 0.0), 0.0);
        assert_eq!(quantile(&sorted, 1.0), 3.0);
        assert_eq!(quantile(&sorted, 0.5), 1.5);
    }

    #[test]
    fn mixing_bands() {
        assert_eq!(Mixing::from_rate(0.01), Mixing::TooLow);
        assert_eq!(Mixing::from_rate(0.05), Mixing::Healthy);
        assert_eq!(Mixing::from_rate(0.20), Mixing::Healthy);
        assert_eq!(Mixing::from_rate(0.70), Mixing::Healthy);
        assert_eq!(Mixing::from_rate(0.85), Mixing::TooHigh);
    }

    #[test]
    fn summary_table_renders_against_a_baseline() {
        let traj = trajectory(0.3, 100);
        let mut table = PosteriorSummary::new(Some(MleBaseline::new(vec![-1.0, 0.7])));
        table.push_chain("mle-start", &traj, 20).unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains("mle-start"));
        assert!(rendered.contains("β0"));
        assert!(rendered.contains("-1.0000"));
        assert!(rendered.contains("acceptance rate"));
    }
}
