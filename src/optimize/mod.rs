//! Settings, gradients, optimizer strategies and the gradient descent driver.

pub mod gradient;
pub mod gradient_descent;
pub mod optimizer;
pub mod settings;

pub use gradient::{numerical_gradient, par_numerical_gradient, CostFn, GradFn};
pub use gradient_descent::{
    gradient_descent, gradient_descent_with, GradientDescentConfig, OptimizationTrace,
};
pub use optimizer::{GradientDescentOptimizer, Interface, Optimizer, SgdOptimizer};
pub use settings::Settings;
