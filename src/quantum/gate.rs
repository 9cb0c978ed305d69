//! Quantum gates
//!
//! Gates are unitary matrices acting on an ordered list of target wires. The first
//! target is the most significant bit of the gate matrix index.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt::Debug;

use ndarray::{array, Array2};
use num_complex::Complex64;

use super::state::StateVector;
use crate::error::{NetworkError, Result};

/// The imaginary unit
const I: Complex64 = Complex64::new(0.0, 1.0);

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Trait for quantum gates
pub trait QuantumGate: Debug + Send + Sync + 'static {
    /// Returns the number of qubits this gate acts on
    fn qubit_count(&self) -> usize;

    /// Returns the matrix representation of this gate
    fn matrix(&self) -> Array2<Complex64>;

    /// Returns a display name for this gate
    fn name(&self) -> String;

    /// Create a clone of this gate
    fn clone_box(&self) -> Box<dyn QuantumGate>;

    /// Returns the adjoint (Hermitian conjugate) of this gate
    fn adjoint(&self) -> Box<dyn QuantumGate> {
        let matrix = self.matrix().t().mapv(|z| z.conj());
        Box::new(MatrixGate {
            matrix,
            name: format!("{}†", self.name()),
            qubits: self.qubit_count(),
        })
    }

    /// Apply this gate in place to `targets`, conditioned on every wire in `controls` being |1⟩.
    fn apply_to_qubits(
        &self,
        state: &mut StateVector,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<()> {
        if targets.len() != self.qubit_count() {
            return Err(NetworkError::Circuit(format!(
                "Gate {} acts on {} qubits, but {} target qubits were specified",
                self.name(),
                self.qubit_count(),
                targets.len()
            )));
        }
        state.apply_gate(&self.matrix(), targets, controls)
    }
}

impl Clone for Box<dyn QuantumGate> {
    fn clone(&self) -> Box<dyn QuantumGate> {
        self.clone_box()
    }
}

/// A gate given directly by its unitary matrix
#[derive(Debug, Clone)]
pub struct MatrixGate {
    pub matrix: Array2<Complex64>,
    pub name: String,
    pub qubits: usize,
}

impl MatrixGate {
    /// Wraps a `2^n x 2^n` matrix as an `n`-qubit gate.
    pub fn new(name: impl Into<String>, matrix: Array2<Complex64>) -> Result<Self> {
        let dim = matrix.shape()[0];
        if matrix.shape()[1] != dim || !dim.is_power_of_two() || dim == 0 {
            return Err(NetworkError::DimensionMismatch(format!(
                "gate matrix must be square with a power of two dimension, got {}x{}",
                matrix.shape()[0],
                matrix.shape()[1]
            )));
        }
        Ok(MatrixGate {
            matrix,
            name: name.into(),
            qubits: dim.trailing_zeros() as usize,
        })
    }
}

impl QuantumGate for MatrixGate {
    fn qubit_count(&self) -> usize {
        self.qubits
    }

    fn matrix(&self) -> Array2<Complex64> {
        self.matrix.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }
}

/// Fixed (non-parametrized) gates
#[derive(Clone, Debug, PartialEq)]
pub enum StandardGate {
    /// Pauli-X gate (NOT gate)
    X,
    /// Pauli-Y gate
    Y,
    /// Pauli-Z gate
    Z,
    /// Hadamard gate
    H,
    /// Phase gate (S gate)
    S,
    /// π/8 gate (T gate)
    T,
    CNOT,
    CZ,
    SWAP,
}

impl QuantumGate for StandardGate {
    fn qubit_count(&self) -> usize {
        match self {
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::T => 1,
            StandardGate::CNOT | StandardGate::CZ | StandardGate::SWAP => 2,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        let o = c(0.0, 0.0);
        let l = c(1.0, 0.0);
        match self {
            StandardGate::X => array![[o, l], [l, o]],
            StandardGate::Y => array![[o, -I], [I, o]],
            StandardGate::Z => array![[l, o], [o, -l]],
            StandardGate::H => {
                let h = c(FRAC_1_SQRT_2, 0.0);
                array![[h, h], [h, -h]]
            }
            StandardGate::S => array![[l, o], [o, I]],
            StandardGate::T => array![[l, o], [o, c(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]],
            StandardGate::CNOT => controlled(&StandardGate::X.matrix()),
            StandardGate::CZ => controlled(&StandardGate::Z.matrix()),
            StandardGate::SWAP => array![
                [l, o, o, o],
                [o, o, l, o],
                [o, l, o, o],
                [o, o, o, l]
            ],
        }
    }

    fn name(&self) -> String {
        format!("{:?}", self)
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }

    fn adjoint(&self) -> Box<dyn QuantumGate> {
        match self {
            StandardGate::S => Box::new(ParametrizedGate::Phase(-std::f64::consts::FRAC_PI_2)),
            StandardGate::T => Box::new(ParametrizedGate::Phase(-std::f64::consts::FRAC_PI_4)),
            // the rest are Hermitian
            _ => self.clone_box(),
        }
    }
}

/// Gates parametrized by rotation angles
#[derive(Clone, Debug, PartialEq)]
pub enum ParametrizedGate {
    /// Rotation around X-axis
    Rx(f64),
    /// Rotation around Y-axis
    Ry(f64),
    /// Rotation around Z-axis
    Rz(f64),
    /// Arbitrary single-qubit rotation `Rz(omega) Ry(theta) Rz(phi)`
    Rot(f64, f64, f64),
    /// Phase gate with arbitrary angle
    Phase(f64),
    /// Controlled Y rotation, control first
    CRy(f64),
}

impl QuantumGate for ParametrizedGate {
    fn qubit_count(&self) -> usize {
        match self {
            ParametrizedGate::Rx(_)
            | ParametrizedGate::Ry(_)
            | ParametrizedGate::Rz(_)
            | ParametrizedGate::Rot(..)
            | ParametrizedGate::Phase(_) => 1,
            ParametrizedGate::CRy(_) => 2,
        }
    }

    fn matrix(&self) -> Array2<Complex64> {
        let o = c(0.0, 0.0);
        match *self {
            ParametrizedGate::Rx(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(0.0, -sin)], [c(0.0, -sin), c(cos, 0.0)]]
            }
            ParametrizedGate::Ry(theta) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![[c(cos, 0.0), c(-sin, 0.0)], [c(sin, 0.0), c(cos, 0.0)]]
            }
            ParametrizedGate::Rz(theta) => {
                array![
                    [Complex64::from_polar(1.0, -theta / 2.0), o],
                    [o, Complex64::from_polar(1.0, theta / 2.0)]
                ]
            }
            ParametrizedGate::Rot(phi, theta, omega) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                array![
                    [
                        Complex64::from_polar(cos, -(phi + omega) / 2.0),
                        -Complex64::from_polar(sin, (phi - omega) / 2.0)
                    ],
                    [
                        Complex64::from_polar(sin, -(phi - omega) / 2.0),
                        Complex64::from_polar(cos, (phi + omega) / 2.0)
                    ]
                ]
            }
            ParametrizedGate::Phase(theta) => {
                array![[c(1.0, 0.0), o], [o, Complex64::from_polar(1.0, theta)]]
            }
            ParametrizedGate::CRy(theta) => controlled(&ParametrizedGate::Ry(theta).matrix()),
        }
    }

    fn name(&self) -> String {
        match self {
            ParametrizedGate::Rot(phi, theta, omega) => {
                format!("Rot({:.2}, {:.2}, {:.2})", phi, theta, omega)
            }
            ParametrizedGate::Rx(t) => format!("Rx({:.2})", t),
            ParametrizedGate::Ry(t) => format!("Ry({:.2})", t),
            ParametrizedGate::Rz(t) => format!("Rz({:.2})", t),
            ParametrizedGate::Phase(t) => format!("P({:.2})", t),
            ParametrizedGate::CRy(t) => format!("CRy({:.2})", t),
        }
    }

    fn clone_box(&self) -> Box<dyn QuantumGate> {
        Box::new(self.clone())
    }

    fn adjoint(&self) -> Box<dyn QuantumGate> {
        Box::new(match *self {
            ParametrizedGate::Rx(t) => ParametrizedGate::Rx(-t),
            ParametrizedGate::Ry(t) => ParametrizedGate::Ry(-t),
            ParametrizedGate::Rz(t) => ParametrizedGate::Rz(-t),
            ParametrizedGate::Rot(phi, theta, omega) => ParametrizedGate::Rot(-omega, -theta, -phi),
            ParametrizedGate::Phase(t) => ParametrizedGate::Phase(-t),
            ParametrizedGate::CRy(t) => ParametrizedGate::CRy(-t),
        })
    }
}

/// Block-diagonal `|0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ U` with the control as the leading qubit.
pub fn controlled(unitary: &Array2<Complex64>) -> Array2<Complex64> {
    let dim = unitary.shape()[0];
    let mut matrix = Array2::zeros((2 * dim, 2 * dim));
    for i in 0..dim {
        matrix[[i, i]] = c(1.0, 0.0);
        for j in 0..dim {
            matrix[[dim + i, dim + j]] = unitary[[i, j]];
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_identity(m: &Array2<Complex64>) -> bool {
        m.indexed_iter()
            .all(|((i, j), z)| (z - if i == j { c(1.0, 0.0) } else { c(0.0, 0.0) }).norm() < 1e-12)
    }

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        is_identity(&m.t().mapv(|z| z.conj()).dot(m))
    }

    #[test]
    fn rot_matches_euler_decomposition() {
        let (phi, theta, omega) = (0.3, -1.1, 2.4);
        let expected = ParametrizedGate::Rz(omega)
            .matrix()
            .dot(&ParametrizedGate::Ry(theta).matrix())
            .dot(&ParametrizedGate::Rz(phi).matrix());
        let rot = ParametrizedGate::Rot(phi, theta, omega).matrix();
        for (a, b) in rot.iter().zip(expected.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn adjoints_invert() {
        let gates: Vec<Box<dyn QuantumGate>> = vec![
            Box::new(StandardGate::S),
            Box::new(StandardGate::T),
            Box::new(ParametrizedGate::Rot(0.1, 0.2, 0.3)),
            Box::new(ParametrizedGate::CRy(0.7)),
        ];
        for gate in gates {
            assert!(is_unitary(&gate.matrix()));
            let product = gate.matrix().dot(&gate.adjoint().matrix());
            assert!(is_identity(&product), "{}", gate.name());
        }
    }
}
