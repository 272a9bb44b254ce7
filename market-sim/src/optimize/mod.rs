// Multistart global minimization over a box

pub mod bfgs;
pub mod multistart;

pub use bfgs::*;
pub use multistart::*;

/// Result of one local minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMinimum<const N: usize> {
    pub x: [f64; N],
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Any local minimizer that can be started from an arbitrary point.
pub trait LocalMinimizer {
    fn minimize<const N: usize, F>(&self, objective: &F, x0: [f64; N]) -> LocalMinimum<N>
    where
        F: Fn(&[f64; N]) -> f64;
}
