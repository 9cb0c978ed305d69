//! Quantum circuits recorded as a tape of (optionally controlled) gate operations.
//!
//! Mid-circuit measurements follow the deferred measurement principle: measuring a
//! wire copies it onto a fresh ancilla qubit with a CNOT, and operations conditioned on
//! the outcome become gates controlled by that ancilla. The resulting statistics on the
//! network wires are identical to measuring and feeding the classical bit forward, while
//! evaluation stays a single deterministic statevector pass.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{NetworkError, Result};
use crate::quantum::gate::{MatrixGate, ParametrizedGate, QuantumGate, StandardGate};
use crate::quantum::state::StateVector;

/// Handle to the outcome of a mid-circuit measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementValue {
    wire: usize,
    ancilla: usize,
}

impl MeasurementValue {
    /// The wire that was measured.
    pub fn wire(&self) -> usize {
        self.wire
    }

    /// The ancilla qubit holding the measurement record.
    pub fn ancilla(&self) -> usize {
        self.ancilla
    }
}

/// One recorded gate application.
#[derive(Debug, Clone)]
pub struct Operation {
    pub gate: Box<dyn QuantumGate>,
    pub targets: Vec<usize>,
    pub controls: Vec<usize>,
}

/// A quantum circuit consisting of a sequence of gates
#[derive(Debug, Clone)]
pub struct QuantumCircuit {
    operations: Vec<Operation>,
    wire_count: usize,
    measured_wires: Vec<usize>,
}

impl QuantumCircuit {
    /// Create a new empty circuit acting on wires `0..wire_count`
    pub fn new(wire_count: usize) -> Self {
        QuantumCircuit {
            operations: Vec::new(),
            wire_count,
            measured_wires: Vec::new(),
        }
    }

    /// Number of addressable wires, excluding measurement ancillas.
    pub fn wire_count(&self) -> usize {
        self.wire_count
    }

    /// Total number of simulated qubits, measurement ancillas included.
    pub fn qubit_count(&self) -> usize {
        self.wire_count + self.measured_wires.len()
    }

    /// Get the number of gates in the circuit
    pub fn gate_count(&self) -> usize {
        self.operations.len()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Wires measured mid-circuit, in measurement order.
    pub fn measured_wires(&self) -> &[usize] {
        &self.measured_wires
    }

    fn check_wires(&self, wires: &[usize]) -> Result<()> {
        for (i, &q) in wires.iter().enumerate() {
            if q >= self.wire_count {
                return Err(NetworkError::Circuit(format!("Qubit index {} out of range", q)));
            }
            if wires[..i].contains(&q) {
                return Err(NetworkError::Circuit(format!(
                    "Qubit index {} appears more than once in one operation",
                    q
                )));
            }
        }
        Ok(())
    }

    fn push(
        &mut self,
        gate: Box<dyn QuantumGate>,
        targets: &[usize],
        controls: Vec<usize>,
    ) -> Result<()> {
        if gate.qubit_count() != targets.len() {
            return Err(NetworkError::Circuit(format!(
                "Gate {} acts on {} qubits, but {} qubits were specified",
                gate.name(),
                gate.qubit_count(),
                targets.len()
            )));
        }
        self.operations.push(Operation {
            gate,
            targets: targets.to_vec(),
            controls,
        });
        Ok(())
    }

    /// Append a gate acting on `wires`.
    pub fn add_gate(&mut self, gate: impl QuantumGate, wires: &[usize]) -> Result<()> {
        self.check_wires(wires)?;
        self.push(Box::new(gate), wires, Vec::new())
    }

    /// Append a gate acting on `wires`, controlled on every wire in `controls`.
    pub fn add_controlled(
        &mut self,
        gate: impl QuantumGate,
        controls: &[usize],
        wires: &[usize],
    ) -> Result<()> {
        let all: Vec<usize> = wires.iter().chain(controls).copied().collect();
        self.check_wires(&all)?;
        self.push(Box::new(gate), wires, controls.to_vec())
    }

    /// Measure `wire` in the computational basis.
    ///
    /// The returned handle conditions later gates through [`cond`](Self::cond).
    pub fn measure(&mut self, wire: usize) -> Result<MeasurementValue> {
        self.check_wires(&[wire])?;
        let ancilla = self.qubit_count();
        self.measured_wires.push(wire);
        self.push(Box::new(StandardGate::CNOT), &[wire, ancilla], Vec::new())?;
        Ok(MeasurementValue { wire, ancilla })
    }

    /// Apply `gate` on `wires` only when the measurement `value` was 1.
    pub fn cond(
        &mut self,
        value: MeasurementValue,
        gate: impl QuantumGate,
        wires: &[usize],
    ) -> Result<()> {
        if value.ancilla >= self.qubit_count() || value.ancilla < self.wire_count {
            return Err(NetworkError::Circuit(format!(
                "measurement of wire {} does not belong to this circuit",
                value.wire
            )));
        }
        self.check_wires(wires)?;
        self.push(Box::new(gate), wires, vec![value.ancilla])
    }

    /// Record the operations emitted by `body` and append their adjoint.
    pub fn adjoint_of<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut QuantumCircuit) -> Result<()>,
    {
        let mut sub = QuantumCircuit::new(self.wire_count);
        body(&mut sub)?;
        self.compose(&sub.adjoint()?)
    }

    /// The inverse circuit: gates reversed, each replaced by its adjoint.
    pub fn adjoint(&self) -> Result<QuantumCircuit> {
        if !self.measured_wires.is_empty() {
            return Err(NetworkError::Circuit(
                "cannot take the adjoint of a circuit containing measurements".to_string(),
            ));
        }
        let operations = self
            .operations
            .iter()
            .rev()
            .map(|op| Operation {
                gate: op.gate.adjoint(),
                targets: op.targets.clone(),
                controls: op.controls.clone(),
            })
            .collect();
        Ok(QuantumCircuit {
            operations,
            wire_count: self.wire_count,
            measured_wires: Vec::new(),
        })
    }

    /// Append every operation of `other`, which must be measurement free.
    pub fn compose(&mut self, other: &QuantumCircuit) -> Result<()> {
        if other.wire_count > self.wire_count {
            return Err(NetworkError::Circuit(format!(
                "cannot compose a {}-wire circuit into a {}-wire circuit",
                other.wire_count, self.wire_count
            )));
        }
        if !other.measured_wires.is_empty() {
            return Err(NetworkError::Circuit(
                "cannot compose a circuit containing measurements".to_string(),
            ));
        }
        self.operations.extend(other.operations.iter().cloned());
        Ok(())
    }

    /// Apply the circuit in place to a quantum state
    pub fn apply(&self, state: &mut StateVector) -> Result<()> {
        if state.qubit_count < self.qubit_count() {
            return Err(NetworkError::Circuit(format!(
                "State has {} qubits, but circuit requires at least {} qubits",
                state.qubit_count,
                self.qubit_count()
            )));
        }
        for op in &self.operations {
            op.gate.apply_to_qubits(state, &op.targets, &op.controls)?;
        }
        Ok(())
    }

    // Gate shorthands

    pub fn h(&mut self, wire: usize) -> Result<()> {
        self.add_gate(StandardGate::H, &[wire])
    }

    pub fn x(&mut self, wire: usize) -> Result<()> {
        self.add_gate(StandardGate::X, &[wire])
    }

    pub fn y(&mut self, wire: usize) -> Result<()> {
        self.add_gate(StandardGate::Y, &[wire])
    }

    pub fn z(&mut self, wire: usize) -> Result<()> {
        self.add_gate(StandardGate::Z, &[wire])
    }

    pub fn cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.add_gate(StandardGate::CNOT, &[control, target])
    }

    pub fn cz(&mut self, control: usize, target: usize) -> Result<()> {
        self.add_gate(StandardGate::CZ, &[control, target])
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.add_gate(StandardGate::SWAP, &[a, b])
    }

    pub fn rx(&mut self, theta: f64, wire: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::Rx(theta), &[wire])
    }

    pub fn ry(&mut self, theta: f64, wire: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::Ry(theta), &[wire])
    }

    pub fn rz(&mut self, theta: f64, wire: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::Rz(theta), &[wire])
    }

    pub fn rot(&mut self, phi: f64, theta: f64, omega: f64, wire: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::Rot(phi, theta, omega), &[wire])
    }

    pub fn phase(&mut self, theta: f64, wire: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::Phase(theta), &[wire])
    }

    pub fn cry(&mut self, theta: f64, control: usize, target: usize) -> Result<()> {
        self.add_gate(ParametrizedGate::CRy(theta), &[control, target])
    }

    /// Arbitrary unitary on `wires`.
    pub fn unitary(&mut self, matrix: Array2<Complex64>, wires: &[usize]) -> Result<()> {
        self.add_gate(MatrixGate::new("U", matrix)?, wires)
    }
}
