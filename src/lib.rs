//! Variational optimization of quantum networks
//!
//! This crate compiles layered quantum networks of preparation, processing,
//! classical-communication and measurement nodes into a single executable circuit
//! function over a flat settings vector, and optimizes those settings against Bell
//! inequalities and other linear scores with gradient descent. Circuits are executed
//! on a built-in statevector simulator.

pub mod ansatz_library;
pub mod cost;
pub mod error;
pub mod information;
pub mod network;
pub mod optimize;
pub mod qnodes;
pub mod quantum;
pub mod simulators;
pub mod utilities;

pub use error::{NetworkError, Result};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::ansatz_library::*;
    pub use crate::cost::{chsh_inequality_cost, linear_probs_cost_fn, parallel_chsh_grad};
    pub use crate::error::{NetworkError, Result};
    pub use crate::information::{behavior_fn, shannon_entropy};
    pub use crate::network::{AnsatzFn, NetworkAnsatz, NetworkNode, NodeKind};
    pub use crate::optimize::{
        gradient_descent, CostFn, GradFn, GradientDescentConfig, Interface, OptimizationTrace,
        Settings,
    };
    pub use crate::qnodes::*;
    pub use crate::quantum::{MeasurementValue, QuantumCircuit};
    pub use crate::utilities::{
        mixed_base_num, ragged_reshape, read_optimization_json, write_optimization_json,
    };
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
