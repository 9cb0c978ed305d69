//! Statevector simulator
//!
//! Executes recorded [`QuantumCircuit`]s and extracts the measurement statistics the
//! network cost functions consume: marginal probabilities, Pauli-Z parities, reduced
//! density matrices, and shot-sampled estimates.

use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{NetworkError, Result};
use crate::quantum::circuit::QuantumCircuit;
use crate::quantum::gate::QuantumGate;
use crate::quantum::state::StateVector;

/// A statevector simulator for quantum circuits
#[derive(Clone, Debug)]
pub struct StatevectorSimulator {
    /// The current state of the simulator
    state: StateVector,
    /// Random number generator for sampled measurements
    rng: StdRng,
}

impl StatevectorSimulator {
    /// Create a new statevector simulator with the specified number of qubits
    pub fn new(qubit_count: usize) -> Self {
        StatevectorSimulator {
            state: StateVector::zero_state(qubit_count),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a simulator whose sampling is reproducible
    pub fn with_seed(qubit_count: usize, seed: u64) -> Self {
        StatevectorSimulator {
            state: StateVector::zero_state(qubit_count),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Get the current state vector
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Reset the simulator to the |0...0⟩ state
    pub fn reset(&mut self) {
        self.state = StateVector::zero_state(self.state.qubit_count);
    }

    /// Get the number of qubits in the simulator
    pub fn qubit_count(&self) -> usize {
        self.state.qubit_count
    }

    /// Apply a quantum gate to the specified qubits
    pub fn apply_gate(&mut self, gate: &dyn QuantumGate, qubits: &[usize]) -> Result<()> {
        gate.apply_to_qubits(&mut self.state, qubits, &[])
    }

    /// Apply a quantum circuit to the current state
    pub fn run_circuit(&mut self, circuit: &QuantumCircuit) -> Result<()> {
        if circuit.qubit_count() > self.qubit_count() {
            return Err(NetworkError::Circuit(format!(
                "Circuit has {} qubits, but simulator has only {} qubits",
                circuit.qubit_count(),
                self.qubit_count()
            )));
        }
        circuit.apply(&mut self.state)
    }

    /// Exact probabilities of every computational basis state of `wires`
    pub fn probabilities(&self, wires: &[usize]) -> Result<Vec<f64>> {
        self.state.probabilities(wires)
    }

    /// Expectation of the tensor product of Pauli-Z on `wires`.
    pub fn parity_expectation(&self, wires: &[usize]) -> Result<f64> {
        let probs = self.probabilities(wires)?;
        Ok(parity_from_probs(&probs))
    }

    /// Reduced density matrix of `wires`
    pub fn density_matrix(&self, wires: &[usize]) -> Result<Array2<Complex64>> {
        self.state.reduced_density_matrix(wires)
    }

    /// Sample `shots` measurements of `wires`, returning counts per basis state index
    pub fn sample_measurements(&mut self, wires: &[usize], shots: usize) -> Result<Vec<usize>> {
        let probs = self.probabilities(wires)?;
        let mut counts = vec![0; probs.len()];

        for _ in 0..shots {
            let r: f64 = self.rng.gen();
            let mut cumulative = 0.0;
            // falls back to the last outcome when rounding leaves the total below r
            let mut outcome = probs.len() - 1;
            for (i, p) in probs.iter().enumerate() {
                cumulative += p;
                if r < cumulative {
                    outcome = i;
                    break;
                }
            }
            counts[outcome] += 1;
        }

        Ok(counts)
    }

    /// Relative frequencies from `shots` samples of `wires`
    pub fn estimate_probabilities(&mut self, wires: &[usize], shots: usize) -> Result<Vec<f64>> {
        if shots == 0 {
            return Err(NetworkError::Circuit("shot count must be positive".to_string()));
        }
        let counts = self.sample_measurements(wires, shots)?;
        Ok(counts.iter().map(|&n| n as f64 / shots as f64).collect())
    }
}

/// `Σ_i p_i (-1)^{popcount(i)}`: the Z-parity expectation of a probability vector.
pub fn parity_from_probs(probs: &[f64]) -> f64 {
    probs
        .iter()
        .enumerate()
        .map(|(i, p)| if i.count_ones() % 2 == 0 { *p } else { -*p })
        .sum()
}
