//! Quantum circuit primitives: gates, statevectors and recorded circuits.

pub mod circuit;
pub mod gate;
pub mod state;

pub use circuit::{MeasurementValue, Operation, QuantumCircuit};
pub use gate::{MatrixGate, ParametrizedGate, QuantumGate, StandardGate};
pub use state::StateVector;
