//! Multistart minimization with warm-up exploration.
//!
//! Each round draws a uniform point in the box. During warm-up that point is
//! the start; afterwards the start is blended with the best point so far,
//! `chi * draw + (1 - chi) * best` with `chi = 1 / (1 + exp((k - warmup) / 100))`,
//! shifting weight from exploration to exploitation as rounds go on.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

use super::LocalMinimizer;

const CHI_DECAY: f64 = 100.0;

/// Box bounds shared by every coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultistartSettings {
    /// Stop as soon as the best value drops below this.
    pub tau: f64,
    /// Rounds that start from a pure random draw.
    pub warmup: usize,
    pub rounds: usize,
}

impl MultistartSettings {
    pub fn validate(&self, bounds: Bounds) -> Result<(), OptimizeError> {
        if !(self.tau > 0.0) {
            return Err(OptimizeError::NonPositiveTolerance(self.tau));
        }
        if self.warmup > self.rounds {
            return Err(OptimizeError::WarmupExceedsRounds {
                warmup: self.warmup,
                rounds: self.rounds,
            });
        }
        let finite = bounds.lower.is_finite()
            && bounds.upper.is_finite()
            && (bounds.upper - bounds.lower).is_finite();
        if !(finite && bounds.lower < bounds.upper) {
            return Err(OptimizeError::InvalidBounds {
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultistartResult<const N: usize> {
    pub best: [f64; N],
    pub best_value: f64,
    /// Starting points of every completed round. The start of the round that
    /// hit the tolerance is not included.
    pub starts: Vec<[f64; N]>,
    pub rounds_run: usize,
    pub converged: bool,
    /// Best value after each round.
    pub best_history: Vec<f64>,
}

/// Exploration weight for round `k`.
pub fn chi(k: usize, warmup: usize) -> f64 {
    let offset = (k as f64 - warmup as f64) / CHI_DECAY;
    1.0 / (1.0 + offset.exp())
}

pub fn multistart<const N: usize, F, M, R>(
    objective: F,
    bounds: Bounds,
    settings: MultistartSettings,
    minimizer: &M,
    rng: &mut R,
) -> Result<MultistartResult<N>, OptimizeError>
where
    F: Fn(&[f64; N]) -> f64,
    M: LocalMinimizer,
    R: Rng,
{
    settings.validate(bounds)?;

    let mut best: Option<([f64; N], f64)> = None;
    let mut starts = Vec::with_capacity(settings.rounds);
    let mut best_history = Vec::with_capacity(settings.rounds);

    for k in 0..settings.rounds {
        let draw: [f64; N] = std::array::from_fn(|_| rng.random_range(bounds.lower..bounds.upper));

        let start = match best {
            Some((best_x, _)) if k >= settings.warmup => {
                let weight = chi(k, settings.warmup);
                std::array::from_fn(|i| weight * draw[i] + (1.0 - weight) * best_x[i])
            }
            _ => draw,
        };

        let local = minimizer.minimize(&objective, start);
        let local_value = objective(&local.x);

        let (best_x, best_value) = match best {
            Some((x, value)) if value <= local_value => (x, value),
            _ => (local.x, local_value),
        };
        best = Some((best_x, best_value));
        best_history.push(best_value);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "multistart",
            round = k as u64,
            warmup = (k < settings.warmup),
            local_value = local_value,
            best_value = best_value,
            local_iterations = local.iterations as u64,
        );

        if best_value < settings.tau {
            tracing::debug!(round = k, best_value, "multistart reached tolerance");
            return Ok(MultistartResult {
                best: best_x,
                best_value,
                starts,
                rounds_run: k + 1,
                converged: true,
                best_history,
            });
        }

        starts.push(start);
    }

    let (best, best_value) = best.unwrap_or(([0.0; N], f64::INFINITY));
    Ok(MultistartResult {
        best,
        best_value,
        starts,
        rounds_run: settings.rounds,
        converged: false,
        best_history,
    })
}
