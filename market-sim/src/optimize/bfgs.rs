//! Dense BFGS with finite-difference gradients and Armijo backtracking.

use serde::{Deserialize, Serialize};

use super::{LocalMinimizer, LocalMinimum};

const ARMIJO_C1: f64 = 1e-4;
const MIN_STEP: f64 = 1e-16;
const MIN_CURVATURE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bfgs {
    pub max_iterations: usize,
    /// Stop once the infinity norm of the gradient drops below this.
    pub gradient_tolerance: f64,
    /// Stop once an accepted step is shorter than this.
    pub step_tolerance: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            gradient_tolerance: 1e-8,
            step_tolerance: 1e-12,
        }
    }
}

impl LocalMinimizer for Bfgs {
    fn minimize<const N: usize, F>(&self, objective: &F, x0: [f64; N]) -> LocalMinimum<N>
    where
        F: Fn(&[f64; N]) -> f64,
    {
        let mut x = x0;
        let mut fx = objective(&x);
        let mut grad = gradient(objective, &x);
        let mut inv_hessian = identity::<N>();
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            if !fx.is_finite() {
                break;
            }
            if norm_inf(&grad) < self.gradient_tolerance {
                converged = true;
                break;
            }
            iterations += 1;

            let mut direction = mat_vec(&inv_hessian, &grad).map(|v| -v);
            let mut slope = dot(&direction, &grad);
            if slope >= 0.0 {
                // Lost positive definiteness; restart from steepest descent.
                inv_hessian = identity::<N>();
                direction = grad.map(|g| -g);
                slope = dot(&direction, &grad);
            }

            let Some((x_next, f_next)) = backtrack(objective, &x, fx, &direction, slope) else {
                break;
            };

            let grad_next = gradient(objective, &x_next);
            let s: [f64; N] = std::array::from_fn(|i| x_next[i] - x[i]);
            let y: [f64; N] = std::array::from_fn(|i| grad_next[i] - grad[i]);

            x = x_next;
            fx = f_next;
            grad = grad_next;

            if norm_inf(&s) < self.step_tolerance {
                converged = true;
                break;
            }

            let sy = dot(&s, &y);
            if sy > MIN_CURVATURE {
                update_inverse_hessian(&mut inv_hessian, &s, &y, sy);
            }
        }

        LocalMinimum {
            x,
            value: fx,
            iterations,
            converged,
        }
    }
}

fn backtrack<const N: usize, F>(
    objective: &F,
    x: &[f64; N],
    fx: f64,
    direction: &[f64; N],
    slope: f64,
) -> Option<([f64; N], f64)>
where
    F: Fn(&[f64; N]) -> f64,
{
    let mut alpha = 1.0;
    while alpha > MIN_STEP {
        let candidate: [f64; N] = std::array::from_fn(|i| x[i] + alpha * direction[i]);
        let value = objective(&candidate);
        if value.is_finite() && value <= fx + ARMIJO_C1 * alpha * slope {
            return Some((candidate, value));
        }
        alpha *= 0.5;
    }
    None
}

/// Central differences with a step scaled to each coordinate.
fn gradient<const N: usize, F>(objective: &F, x: &[f64; N]) -> [f64; N]
where
    F: Fn(&[f64; N]) -> f64,
{
    let base_step = f64::EPSILON.cbrt();
    std::array::from_fn(|i| {
        let h = base_step * x[i].abs().max(1.0);
        let mut forward = *x;
        let mut backward = *x;
        forward[i] += h;
        backward[i] -= h;
        (objective(&forward) - objective(&backward)) / (2.0 * h)
    })
}

/// H <- (I - rho s y^T) H (I - rho y s^T) + rho s s^T, expanded.
fn update_inverse_hessian<const N: usize>(
    h: &mut [[f64; N]; N],
    s: &[f64; N],
    y: &[f64; N],
    sy: f64,
) {
    let rho = 1.0 / sy;
    let hy = mat_vec(h, y);
    let yhy = dot(y, &hy);
    let scale = (1.0 + rho * yhy) * rho;

    for i in 0..N {
        for j in 0..N {
            h[i][j] += scale * s[i] * s[j] - rho * (hy[i] * s[j] + s[i] * hy[j]);
        }
    }
}

fn identity<const N: usize>() -> [[f64; N]; N] {
    std::array::from_fn(|i| std::array::from_fn(|j| if i == j { 1.0 } else { 0.0 }))
}

fn mat_vec<const N: usize>(m: &[[f64; N]; N], v: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| dot(&m[i], v))
}

fn dot<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm_inf<const N: usize>(v: &[f64; N]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}
