//! Cost functions over network settings.
//!
//! Every cost is the negated score so that gradient descent maximizes the score.

pub mod chsh;
pub mod linear_inequalities;

pub use chsh::{chsh_inequality_cost, parallel_chsh_grad};
pub use linear_inequalities::linear_probs_cost_fn;
