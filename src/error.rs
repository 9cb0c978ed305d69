//! Error type shared by the network compiler, simulator and optimizers.

use thiserror::Error;

/// Errors raised while building, simulating or optimizing a quantum network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Two nodes of one layer act on the same quantum wire, or two nodes
    /// anywhere in the network write the same classical-communication wire.
    #[error("One or more wires are not unique. Each node must contain unique wires ({0}).")]
    WiresNotUnique(String),

    /// A layer consumes a classical-communication wire that no earlier layer produces.
    #[error("Causality violated: layer {layer} reads cc wires {missing:?} before they are written")]
    CausalityViolated { layer: usize, missing: Vec<usize> },

    /// A node was declared with an inconsistent shape.
    #[error("Invalid network node: {0}")]
    InvalidNode(String),

    /// Settings, inputs, games or post-processing maps have the wrong size.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Interface \"{0}\" is not supported.")]
    UnsupportedInterface(String),

    #[error("Device \"{0}\" is not supported.")]
    UnsupportedDevice(String),

    #[error("`sum(list_dims)` ({expected}) must equal `len(input_list)` ({actual})")]
    RaggedReshape { expected: usize, actual: usize },

    /// Failure while recording or simulating a circuit.
    #[error("Circuit error: {0}")]
    Circuit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
