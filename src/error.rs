//! Error taxonomy for chain construction and result processing.
//!
//! Structural problems (dimension mismatches, invalid configuration, degenerate
//! initial states) are fatal and surface here before any stochastic step is taken.
//! Per-step numerical degeneracy is absorbed inside the chain as a rejection and
//! never reaches this type.

use std::error::Error;
use std::fmt;

/// Errors reported by constructors and post-run processing.
#[derive(Debug, Clone, PartialEq)]
pub enum McmcError {
    /// Two lengths that must agree do not; `what` names the pair.
    DimensionMismatch {
        expected: usize,
        got: usize,
        what: &'static str,
    },
    /// A response entry is neither 0 nor 1.
    InvalidResponse(f64),
    /// The prior standard deviation is not a positive finite number.
    InvalidPrior(f64),
    /// The initial coefficient vector has a non-finite log-posterior. Sampling
    /// from such a state would produce an all-rejection or all-NaN trajectory.
    DegenerateInitialState { chain: usize, log_posterior: f64 },
    /// Burn-in consumes the whole trajectory, leaving nothing to summarize.
    BurnInTooLong { burn_in: usize, steps: usize },
    /// The proposal covariance matrix is not positive definite.
    SingularCovariance,
}

impl fmt::Display for McmcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McmcError::DimensionMismatch {
                expected,
                got,
                what,
            } => write!(f, "dimension mismatch ({what}): expected {expected}, got {got}"),
            McmcError::InvalidResponse(v) => {
                write!(f, "response entries must be 0 or 1, got {v}")
            }
            McmcError::InvalidPrior(sd) => {
                write!(f, "prior standard deviation must be positive and finite, got {sd}")
            }
            McmcError::DegenerateInitialState {
                chain,
                log_posterior,
            } => write!(
                f,
                "initial state of chain {chain} has non-finite log-posterior ({log_posterior})"
            ),
            McmcError::BurnInTooLong { burn_in, steps } => write!(
                f,
                "burn-in of {burn_in} leaves no samples in a trajectory of {steps} steps"
            ),
            McmcError::SingularCovariance => {
                write!(f, "proposal covariance matrix is not positive definite")
            }
        }
    }
}

impl Error for McmcError {}
