//! Numeral helpers, reshaping, circuit unitaries and trace persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{NetworkError, Result};
use crate::optimize::OptimizationTrace;
use crate::quantum::{QuantumCircuit, StateVector};

/// Digits of `n` in the mixed radix `base_digits`, most significant first.
///
/// Digit `i` has place value `base_digits[i+1] * ... * base_digits[last]`. Callers
/// guarantee `n < base_digits.iter().product()`.
pub fn mixed_base_num(n: usize, base_digits: &[usize]) -> Vec<usize> {
    let mut remainder = n;
    (0..base_digits.len())
        .map(|i| {
            let place: usize = base_digits[i + 1..].iter().product();
            let digit = remainder / place;
            remainder %= place;
            digit
        })
        .collect()
}

/// Split `input_list` into consecutive chunks of lengths `list_dims`.
pub fn ragged_reshape<T: Clone>(input_list: &[T], list_dims: &[usize]) -> Result<Vec<Vec<T>>> {
    let expected: usize = list_dims.iter().sum();
    if expected != input_list.len() {
        return Err(NetworkError::RaggedReshape {
            expected,
            actual: input_list.len(),
        });
    }

    let mut start = 0;
    Ok(list_dims
        .iter()
        .map(|&dim| {
            let chunk = input_list[start..start + dim].to_vec();
            start += dim;
            chunk
        })
        .collect())
}

/// The unitary matrix implemented by `circuit_fn` on `num_wires` wires.
///
/// Column `j` is the output state for basis input `|j⟩`.
pub fn unitary_matrix<F>(circuit_fn: F, num_wires: usize) -> Result<Array2<Complex64>>
where
    F: FnOnce(&mut QuantumCircuit) -> Result<()>,
{
    let mut circuit = QuantumCircuit::new(num_wires);
    circuit_fn(&mut circuit)?;
    if !circuit.measured_wires().is_empty() {
        return Err(NetworkError::Circuit(
            "circuits with mid-circuit measurements are not unitary".to_string(),
        ));
    }

    let dim = 1 << num_wires;
    let mut unitary = Array2::zeros((dim, dim));
    for j in 0..dim {
        let mut basis = Array1::zeros(dim);
        basis[j] = Complex64::new(1.0, 0.0);
        let mut state = StateVector::new(num_wires, basis)?;
        circuit.apply(&mut state)?;
        unitary.column_mut(j).assign(state.amplitudes());
    }
    Ok(unitary)
}

/// Write `trace` as pretty JSON to `filename` with `.json` appended.
pub fn write_optimization_json(
    trace: &OptimizationTrace,
    filename: impl AsRef<Path>,
) -> Result<PathBuf> {
    let mut path = filename.as_ref().as_os_str().to_owned();
    path.push(".json");
    let path = PathBuf::from(path);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, trace)?;
    writer.flush()?;
    Ok(path)
}

/// Read a trace written by [`write_optimization_json`]; `filepath` includes the extension.
pub fn read_optimization_json(filepath: impl AsRef<Path>) -> Result<OptimizationTrace> {
    let reader = BufReader::new(File::open(filepath)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cnot_unitary() {
        let u = unitary_matrix(|c| c.cnot(0, 1), 2).unwrap();
        let expected = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
        ];
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(u[[i, j]].re, expected[i][j], epsilon = 1e-12);
                assert_abs_diff_eq!(u[[i, j]].im, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn measured_circuits_have_no_unitary() {
        let result = unitary_matrix(
            |c| {
                c.measure(0)?;
                Ok(())
            },
            1,
        );
        assert!(result.is_err());
    }
}
