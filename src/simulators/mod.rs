//! Quantum circuit simulators
//!
//! This module provides the simulator used to evaluate network circuits on
//! classical hardware.

pub mod statevector;

pub use statevector::{parity_from_probs, StatevectorSimulator};
