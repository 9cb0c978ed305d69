//! Quantum state representations
//!
//! Amplitudes are stored big-endian: qubit 0 is the most significant bit of the
//! basis-state index.

use std::fmt::{self, Display};

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{NetworkError, Result};

/// State vector representation of a pure quantum state
#[derive(Clone, Debug)]
pub struct StateVector {
    /// Number of qubits
    pub qubit_count: usize,

    /// The state vector as an array of complex amplitudes
    amplitudes: Array1<Complex64>,
}

impl StateVector {
    /// Create a new state vector with the given amplitudes
    pub fn new(qubit_count: usize, amplitudes: Array1<Complex64>) -> Result<Self> {
        let expected_dim = 1 << qubit_count;

        if amplitudes.len() != expected_dim {
            return Err(NetworkError::DimensionMismatch(format!(
                "state vector dimension: expected {}, got {}",
                expected_dim,
                amplitudes.len()
            )));
        }

        let state = StateVector { qubit_count, amplitudes };

        if !state.is_valid() {
            return Err(NetworkError::Circuit("State vector is not normalized".to_string()));
        }

        Ok(state)
    }

    /// Create the zero state |00...0⟩
    pub fn zero_state(qubit_count: usize) -> Self {
        let mut amplitudes = Array1::zeros(1 << qubit_count);
        amplitudes[0] = Complex64::new(1.0, 0.0);
        StateVector { qubit_count, amplitudes }
    }

    /// Returns the dimension of the Hilbert space (2^n for n qubits)
    pub fn dimension(&self) -> usize {
        1 << self.qubit_count
    }

    /// Check that the state is normalized
    pub fn is_valid(&self) -> bool {
        let norm_sqr: f64 = self.amplitudes.iter().map(|amp| amp.norm_sqr()).sum();
        (norm_sqr - 1.0).abs() < 1e-10
    }

    /// Calculate the probability of measuring the given bit string
    pub fn probability(&self, bit_string: usize) -> f64 {
        if bit_string >= self.dimension() {
            return 0.0;
        }
        self.amplitudes[bit_string].norm_sqr()
    }

    /// Get a reference to the amplitudes
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    fn check_wires(&self, wires: &[usize]) -> Result<()> {
        for (i, &q) in wires.iter().enumerate() {
            if q >= self.qubit_count {
                return Err(NetworkError::Circuit(format!("Qubit index {} out of range", q)));
            }
            if wires[..i].contains(&q) {
                return Err(NetworkError::Circuit(format!("Qubit index {} used twice", q)));
            }
        }
        Ok(())
    }

    /// Index offsets of every basis state of the subsystem `wires`, `wires[0]` most significant.
    fn subsystem_offsets(&self, wires: &[usize]) -> Vec<usize> {
        let n = self.qubit_count;
        let k = wires.len();
        (0..1usize << k)
            .map(|s| {
                wires
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| (s >> (k - 1 - j)) & 1 == 1)
                    .fold(0, |offset, (_, &q)| offset | 1 << (n - 1 - q))
            })
            .collect()
    }

    fn mask(&self, wires: &[usize]) -> usize {
        wires
            .iter()
            .fold(0, |mask, &q| mask | 1 << (self.qubit_count - 1 - q))
    }

    /// Applies `matrix` in place to `targets` on the branch where all `controls` are |1⟩.
    ///
    /// `O(2^n · 2^k)` for a `k`-qubit gate on `n` qubits.
    pub fn apply_gate(
        &mut self,
        matrix: &Array2<Complex64>,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<()> {
        let all_wires: Vec<usize> = targets.iter().chain(controls).copied().collect();
        self.check_wires(&all_wires)?;

        let sub_dim = 1 << targets.len();
        if matrix.shape() != [sub_dim, sub_dim] {
            return Err(NetworkError::DimensionMismatch(format!(
                "gate matrix: expected {}x{}, got {}x{}",
                sub_dim,
                sub_dim,
                matrix.shape()[0],
                matrix.shape()[1]
            )));
        }

        let offsets = self.subsystem_offsets(targets);
        let target_mask = self.mask(targets);
        let control_mask = self.mask(controls);
        let mut buffer = vec![Complex64::new(0.0, 0.0); sub_dim];

        for base in 0..self.dimension() {
            if base & target_mask != 0 || base & control_mask != control_mask {
                continue;
            }
            for (slot, &offset) in buffer.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                self.amplitudes[base | offset] = buffer
                    .iter()
                    .enumerate()
                    .map(|(col, amp)| matrix[[row, col]] * amp)
                    .sum();
            }
        }

        Ok(())
    }

    /// Marginal probabilities of the computational basis states of `wires`.
    pub fn probabilities(&self, wires: &[usize]) -> Result<Vec<f64>> {
        self.check_wires(wires)?;
        let n = self.qubit_count;
        let mut probs = vec![0.0; 1 << wires.len()];

        for (i, amp) in self.amplitudes.iter().enumerate() {
            let sub_index = wires
                .iter()
                .fold(0, |acc, &q| (acc << 1) | ((i >> (n - 1 - q)) & 1));
            probs[sub_index] += amp.norm_sqr();
        }

        Ok(probs)
    }

    /// Reduced density matrix of `wires`, tracing out every other qubit.
    pub fn reduced_density_matrix(&self, wires: &[usize]) -> Result<Array2<Complex64>> {
        self.check_wires(wires)?;
        let offsets = self.subsystem_offsets(wires);
        let wire_mask = self.mask(wires);
        let dim = offsets.len();
        let mut rho = Array2::zeros((dim, dim));

        for base in (0..self.dimension()).filter(|b| b & wire_mask == 0) {
            for (a, &off_a) in offsets.iter().enumerate() {
                let amp_a = self.amplitudes[base | off_a];
                if amp_a.norm_sqr() == 0.0 {
                    continue;
                }
                for (b, &off_b) in offsets.iter().enumerate() {
                    rho[[a, b]] += amp_a * self.amplitudes[base | off_b].conj();
                }
            }
        }

        Ok(rho)
    }
}

impl Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.qubit_count;
        let mut first = true;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            if amp.norm_sqr() < 1e-12 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(f, "({:.4}{:+.4}i)|{:0width$b}⟩", amp.re, amp.im, i, width = width)?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}
