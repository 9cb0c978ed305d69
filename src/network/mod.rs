//! Quantum network topologies: nodes and the compiled network ansatz.

pub mod ansatz;
pub mod node;

pub use ansatz::{NetworkAnsatz, ParameterPartitions};
pub use node::{AnsatzFn, NetworkNode, NodeKind};
