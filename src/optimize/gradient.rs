//! Numerical gradients used when no analytic gradient function is supplied.

use rayon::prelude::*;

use crate::error::{NetworkError, Result};

/// Step of the central finite difference.
pub const FINITE_DIFF_STEP: f64 = 1e-6;

/// A scalar function of the settings vector, to be minimized.
pub type CostFn = dyn Fn(&[f64]) -> Result<f64> + Send + Sync;

/// The gradient of a [`CostFn`] with respect to the settings vector.
pub type GradFn = dyn Fn(&[f64]) -> Result<Vec<f64>> + Send + Sync;

/// Central finite-difference gradient `(f(x + h e_i) - f(x - h e_i)) / 2h`.
pub fn numerical_gradient<F>(f: F, settings: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> Result<f64>,
{
    let mut shifted = settings.to_vec();
    let mut grad = Vec::with_capacity(settings.len());
    for i in 0..settings.len() {
        shifted[i] = settings[i] + FINITE_DIFF_STEP;
        let forward = f(&shifted)?;
        shifted[i] = settings[i] - FINITE_DIFF_STEP;
        let backward = f(&shifted)?;
        shifted[i] = settings[i];
        grad.push((forward - backward) / (2.0 * FINITE_DIFF_STEP));
    }
    Ok(grad)
}

/// [`numerical_gradient`] with one rayon task per setting.
pub fn par_numerical_gradient<F>(f: F, settings: &[f64]) -> Result<Vec<f64>>
where
    F: Fn(&[f64]) -> Result<f64> + Sync,
{
    (0..settings.len())
        .into_par_iter()
        .map(|i| -> Result<f64> {
            let mut shifted = settings.to_vec();
            shifted[i] = settings[i] + FINITE_DIFF_STEP;
            let forward = f(&shifted)?;
            shifted[i] = settings[i] - FINITE_DIFF_STEP;
            let backward = f(&shifted)?;
            Ok((forward - backward) / (2.0 * FINITE_DIFF_STEP))
        })
        .collect()
}

/// Gradient of `cost` at `settings`, from `grad_fn` when given.
pub fn gradient(cost: &CostFn, settings: &[f64], grad_fn: Option<&GradFn>) -> Result<Vec<f64>> {
    let grad = match grad_fn {
        Some(grad_fn) => grad_fn(settings)?,
        None => numerical_gradient(cost, settings)?,
    };
    if grad.len() != settings.len() {
        return Err(NetworkError::DimensionMismatch(format!(
            "gradient has {} entries for {} settings",
            grad.len(),
            settings.len()
        )));
    }
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cost(x: &[f64]) -> Result<f64> {
        Ok(x[0].powi(2) + x[0] * x[1].sin())
    }

    #[test]
    fn finite_differences_match_analytic_gradient() {
        let x: [f64; 2] = [0.7, -1.2];
        let expected = [2.0 * x[0] + x[1].sin(), x[0] * x[1].cos()];

        let grad = numerical_gradient(cost, &x).unwrap();
        let par_grad = par_numerical_gradient(cost, &x).unwrap();
        for i in 0..2 {
            assert_abs_diff_eq!(grad[i], expected[i], epsilon = 1e-7);
            assert_abs_diff_eq!(par_grad[i], expected[i], epsilon = 1e-7);
        }
    }

    #[test]
    fn custom_gradient_length_is_checked() {
        let short: Box<GradFn> = Box::new(|_: &[f64]| Ok(vec![0.0]));
        assert!(gradient(&cost, &[0.0, 0.0], Some(short.as_ref())).is_err());
    }
}
