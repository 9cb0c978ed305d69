//! Circuit evaluators ("qnodes") over a network ansatz.
//!
//! Each constructor captures its own copy of the ansatz and of its [`DeviceConfig`],
//! so evaluators built from one ansatz never observe later configuration changes.
//! Evaluators take wire labels; a label outside the network fails on evaluation.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};
use crate::network::NetworkAnsatz;
use crate::quantum::state::StateVector;
use crate::simulators::{parity_from_probs, StatevectorSimulator};

/// A circuit evaluator mapping qnode settings to a measurement result.
pub type QNode<T> = Box<dyn Fn(&[f64]) -> Result<T> + Send + Sync>;

/// Name of the exact statevector device.
pub const DEFAULT_DEVICE: &str = "default.qubit";

/// Simulator configuration attached to a network ansatz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Backend name; only [`DEFAULT_DEVICE`] is available.
    pub name: String,
    /// Estimate probabilities from this many samples instead of computing them exactly.
    pub shots: Option<usize>,
    /// Seed for shot sampling; every evaluation reseeds, so sampled costs are repeatable.
    pub seed: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            name: DEFAULT_DEVICE.to_string(),
            shots: None,
            seed: None,
        }
    }
}

impl DeviceConfig {
    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = Some(shots);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A fresh simulator for this device; fails for an unknown device name.
    pub fn simulator(&self, qubit_count: usize) -> Result<StatevectorSimulator> {
        if self.name != DEFAULT_DEVICE {
            return Err(NetworkError::UnsupportedDevice(self.name.clone()));
        }
        Ok(match self.seed {
            Some(seed) => StatevectorSimulator::with_seed(qubit_count, seed),
            None => StatevectorSimulator::new(qubit_count),
        })
    }

    fn probabilities(&self, sim: &mut StatevectorSimulator, wires: &[usize]) -> Result<Vec<f64>> {
        match self.shots {
            Some(shots) => sim.estimate_probabilities(wires, shots),
            None => sim.probabilities(wires),
        }
    }
}

/// Run the network circuit for `settings` on a fresh simulator.
pub fn run_network(
    ansatz: &NetworkAnsatz,
    device: &DeviceConfig,
    settings: &[f64],
) -> Result<StatevectorSimulator> {
    let circuit = ansatz.circuit(settings)?;
    let mut sim = device.simulator(circuit.qubit_count())?;
    sim.run_circuit(&circuit)?;
    Ok(sim)
}

/// Probabilities of every joint outcome on `wires`.
pub fn probs_qnode(ansatz: &NetworkAnsatz, wires: Vec<usize>) -> QNode<Vec<f64>> {
    let ansatz = ansatz.clone();
    let device = ansatz.device().clone();
    Box::new(move |settings: &[f64]| {
        let qubits = ansatz.qubit_indices(&wires)?;
        let mut sim = run_network(&ansatz, &device, settings)?;
        device.probabilities(&mut sim, &qubits)
    })
}

/// Probabilities of every joint outcome of the final layer's wires.
pub fn joint_probs_qnode(ansatz: &NetworkAnsatz) -> QNode<Vec<f64>> {
    probs_qnode(ansatz, ansatz.measured_wires().to_vec())
}

/// `⟨Z ⊗ ... ⊗ Z⟩` over the final layer's wires.
pub fn global_parity_expval_qnode(ansatz: &NetworkAnsatz) -> QNode<f64> {
    let probs = joint_probs_qnode(ansatz);
    Box::new(move |settings: &[f64]| Ok(parity_from_probs(&probs(settings)?)))
}

/// One Z-parity expectation per node of the final layer.
pub fn local_parity_expval_qnode(ansatz: &NetworkAnsatz) -> QNode<Vec<f64>> {
    let node_wires: Vec<Vec<usize>> = ansatz
        .layers()
        .last()
        .map(|layer| layer.iter().map(|node| node.wires().to_vec()).collect())
        .unwrap_or_default();
    let ansatz = ansatz.clone();
    let device = ansatz.device().clone();
    Box::new(move |settings: &[f64]| {
        let mut sim = run_network(&ansatz, &device, settings)?;
        node_wires
            .iter()
            .map(|wires| -> Result<f64> {
                let qubits = ansatz.qubit_indices(wires)?;
                Ok(parity_from_probs(&device.probabilities(&mut sim, &qubits)?))
            })
            .collect()
    })
}

/// Reduced density matrix of `wires`.
pub fn density_matrix_qnode(
    ansatz: &NetworkAnsatz,
    wires: Vec<usize>,
) -> QNode<Array2<Complex64>> {
    let ansatz = ansatz.clone();
    let device = ansatz.device().clone();
    Box::new(move |settings: &[f64]| {
        let qubits = ansatz.qubit_indices(&wires)?;
        run_network(&ansatz, &device, settings)?.density_matrix(&qubits)
    })
}

/// Final statevector, measurement ancillas included.
///
/// Qubit `i` carries `ansatz.network_wires()[i]`; ancillas follow in measurement order.
pub fn state_qnode(ansatz: &NetworkAnsatz) -> QNode<StateVector> {
    let ansatz = ansatz.clone();
    let device = ansatz.device().clone();
    Box::new(move |settings: &[f64]| Ok(run_network(&ansatz, &device, settings)?.state().clone()))
}
