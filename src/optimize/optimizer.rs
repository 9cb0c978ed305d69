//! Optimizer strategies driven by [`gradient_descent`](super::gradient_descent).
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::gradient::{gradient, CostFn, GradFn};
use super::settings::Settings;
use crate::error::{NetworkError, Result};

/// Trait for optimization algorithms
pub trait Optimizer: Send {
    /// Take one step downhill on `cost` and return the updated settings.
    ///
    /// The gradient comes from `grad_fn` when given, otherwise from finite differences
    /// of `cost`. Entries of `settings` not requiring gradients are left unchanged.
    fn step(
        &mut self,
        cost: &CostFn,
        settings: Settings,
        grad_fn: Option<&GradFn>,
    ) -> Result<Settings>;

    fn step_size(&self) -> f64;

    /// Reset the optimizer's internal state
    fn reset(&mut self);
}

/// Plain gradient descent, `θ ← θ - η ∇f(θ)`.
#[derive(Debug, Clone)]
pub struct GradientDescentOptimizer {
    step_size: f64,
}

impl GradientDescentOptimizer {
    pub fn new(step_size: f64) -> Self {
        GradientDescentOptimizer { step_size }
    }
}

impl Optimizer for GradientDescentOptimizer {
    fn step(
        &mut self,
        cost: &CostFn,
        settings: Settings,
        grad_fn: Option<&GradFn>,
    ) -> Result<Settings> {
        let grad = gradient(cost, &settings, grad_fn)?;
        let mut next = settings;
        let requires_grad = next.requires_grad().to_vec();
        for ((param, g), trainable) in next.values_mut().iter_mut().zip(&grad).zip(requires_grad) {
            if trainable {
                *param -= self.step_size * g;
            }
        }
        Ok(next)
    }

    fn step_size(&self) -> f64 {
        self.step_size
    }

    fn reset(&mut self) {
        // Gradient descent has no state to reset
    }
}

/// Stochastic gradient descent with momentum, updating settings in place.
///
/// `v ← μ v - η ∇f(θ)`, `θ ← θ + v`. With zero momentum this is plain gradient descent.
#[derive(Debug, Clone)]
pub struct SgdOptimizer {
    learning_rate: f64,
    momentum: f64,
    velocity: Vec<f64>,
}

impl SgdOptimizer {
    pub fn new(learning_rate: f64) -> Self {
        Self::with_momentum(learning_rate, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Self {
        SgdOptimizer {
            learning_rate,
            momentum,
            velocity: Vec::new(),
        }
    }

    /// Update `settings` in place to decrease `cost`.
    pub fn minimize(
        &mut self,
        cost: &CostFn,
        settings: &mut Settings,
        grad_fn: Option<&GradFn>,
    ) -> Result<()> {
        let grad = gradient(cost, settings, grad_fn)?;

        if self.velocity.len() != grad.len() {
            self.velocity = vec![0.0; grad.len()];
        }

        let requires_grad = settings.requires_grad().to_vec();
        for (i, param) in settings.values_mut().iter_mut().enumerate() {
            if !requires_grad[i] {
                continue;
            }
            self.velocity[i] = self.momentum * self.velocity[i] - self.learning_rate * grad[i];
            *param += self.velocity[i];
        }
        Ok(())
    }
}

impl Optimizer for SgdOptimizer {
    fn step(
        &mut self,
        cost: &CostFn,
        mut settings: Settings,
        grad_fn: Option<&GradFn>,
    ) -> Result<Settings> {
        self.minimize(cost, &mut settings, grad_fn)?;
        Ok(settings)
    }

    fn step_size(&self) -> f64 {
        self.learning_rate
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }
}

/// Names the optimizer strategy, as accepted on the command line or in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    /// [`GradientDescentOptimizer`]
    #[default]
    Autograd,
    /// [`SgdOptimizer`] without momentum
    Tf,
}

impl Interface {
    pub fn optimizer(&self, step_size: f64) -> Box<dyn Optimizer> {
        match self {
            Interface::Autograd => Box::new(GradientDescentOptimizer::new(step_size)),
            Interface::Tf => Box::new(SgdOptimizer::new(step_size)),
        }
    }
}

impl FromStr for Interface {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "autograd" => Ok(Interface::Autograd),
            "tf" => Ok(Interface::Tf),
            other => Err(NetworkError::UnsupportedInterface(other.to_string())),
        }
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interface::Autograd => write!(f, "autograd"),
            Interface::Tf => write!(f, "tf"),
        }
    }
}
