use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use std::f64::consts::PI;

use qnetvo::quantum::{ParametrizedGate, QuantumCircuit, StandardGate};
use qnetvo::simulators::{parity_from_probs, StatevectorSimulator};

/// Helper function for comparing complex numbers with tolerance
fn complex_approx_eq(a: Complex64, b: Complex64, epsilon: f64) -> bool {
    (a - b).norm() < epsilon
}

#[test]
fn test_simulator_bell_state() {
    // Create a Bell state circuit
    let mut circuit = QuantumCircuit::new(2);
    circuit.h(0).unwrap();
    circuit.cnot(0, 1).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&circuit).unwrap();

    let amplitudes = simulator.state().amplitudes();
    let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
    assert!(complex_approx_eq(amplitudes[0], Complex64::new(sqrt2_inv, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[1], Complex64::new(0.0, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[2], Complex64::new(0.0, 0.0), 1e-10));
    assert!(complex_approx_eq(amplitudes[3], Complex64::new(sqrt2_inv, 0.0), 1e-10));

    let probs = simulator.probabilities(&[0, 1]).unwrap();
    assert_abs_diff_eq!(probs[0], 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(probs[3], 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(simulator.parity_expectation(&[0, 1]).unwrap(), 1.0, epsilon = 1e-10);

    // Each half of a Bell pair is maximally mixed
    let rho = simulator.density_matrix(&[1]).unwrap();
    assert_abs_diff_eq!(rho[[0, 0]].re, 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(rho[[0, 1]].norm(), 0.0, epsilon = 1e-10);
}

#[test]
fn test_simulator_wire_order_is_big_endian() {
    let mut simulator = StatevectorSimulator::new(3);
    simulator.apply_gate(&StandardGate::X, &[0]).unwrap();

    // qubit 0 is the most significant bit
    assert_abs_diff_eq!(simulator.state().probability(0b100), 1.0, epsilon = 1e-12);
    assert_eq!(simulator.probabilities(&[2, 0]).unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_simulator_deutsch_jozsa() {
    // Constant oracle f(x) = 0 leaves the query qubit in |0⟩
    let mut circuit = QuantumCircuit::new(2);
    circuit.x(1).unwrap();
    circuit.h(0).unwrap();
    circuit.h(1).unwrap();
    circuit.h(0).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&circuit).unwrap();
    let probs = simulator.probabilities(&[0]).unwrap();
    assert_abs_diff_eq!(probs[0], 1.0, epsilon = 1e-10);

    // Balanced oracle f(x) = x
    let mut circuit = QuantumCircuit::new(2);
    circuit.x(1).unwrap();
    circuit.h(0).unwrap();
    circuit.h(1).unwrap();
    circuit.cnot(0, 1).unwrap();
    circuit.h(0).unwrap();

    let mut simulator = StatevectorSimulator::new(2);
    simulator.run_circuit(&circuit).unwrap();
    let probs = simulator.probabilities(&[0]).unwrap();
    assert_abs_diff_eq!(probs[1], 1.0, epsilon = 1e-10);
}

#[test]
fn test_simulator_grover_2qubit() {
    let mut simulator = StatevectorSimulator::new(2);
    simulator.apply_gate(&StandardGate::H, &[0]).unwrap();
    simulator.apply_gate(&StandardGate::H, &[1]).unwrap();

    // Oracle marks |11⟩
    simulator.apply_gate(&StandardGate::CZ, &[0, 1]).unwrap();

    // Diffusion
    for gate in [StandardGate::H, StandardGate::X] {
        simulator.apply_gate(&gate, &[0]).unwrap();
        simulator.apply_gate(&gate, &[1]).unwrap();
    }
    simulator.apply_gate(&StandardGate::CZ, &[0, 1]).unwrap();
    for gate in [StandardGate::X, StandardGate::H] {
        simulator.apply_gate(&gate, &[0]).unwrap();
        simulator.apply_gate(&gate, &[1]).unwrap();
    }

    let probs = simulator.probabilities(&[0, 1]).unwrap();
    assert_abs_diff_eq!(probs[0b11], 1.0, epsilon = 1e-10);
}

#[test]
fn test_simulator_deferred_measurement() {
    // Measure |+⟩ and copy the outcome onto wire 1
    let mut circuit = QuantumCircuit::new(2);
    circuit.h(0).unwrap();
    let m = circuit.measure(0).unwrap();
    circuit.cond(m, StandardGate::X, &[1]).unwrap();
    assert_eq!(circuit.qubit_count(), 3);
    assert_eq!(m.ancilla(), 2);

    let mut simulator = StatevectorSimulator::new(circuit.qubit_count());
    simulator.run_circuit(&circuit).unwrap();

    let probs = simulator.probabilities(&[0, 1]).unwrap();
    assert_abs_diff_eq!(probs[0b00], 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(probs[0b11], 0.5, epsilon = 1e-10);

    // The measurement decoheres wire 0
    let rho = simulator.density_matrix(&[0]).unwrap();
    assert_abs_diff_eq!(rho[[0, 1]].norm(), 0.0, epsilon = 1e-10);
}

#[test]
fn test_simulator_multishot_statistics() {
    // 0.8 probability for |0⟩ and 0.2 probability for |1⟩
    let mut simulator = StatevectorSimulator::with_seed(1, 1234);
    let theta = 2.0 * (0.2_f64.sqrt()).asin();
    simulator.apply_gate(&ParametrizedGate::Ry(theta), &[0]).unwrap();

    let probs = simulator.probabilities(&[0]).unwrap();
    assert_abs_diff_eq!(probs[0], 0.8, epsilon = 1e-10);

    let shots = 1000;
    let counts = simulator.sample_measurements(&[0], shots).unwrap();
    assert_eq!(counts.iter().sum::<usize>(), shots);

    let freq_0 = counts[0] as f64 / shots as f64;
    assert_abs_diff_eq!(freq_0, 0.8, epsilon = 0.05);

    let estimated = simulator.estimate_probabilities(&[0], shots).unwrap();
    assert_abs_diff_eq!(estimated[1], 0.2, epsilon = 0.05);
    assert!(simulator.estimate_probabilities(&[0], 0).is_err());
}

#[test]
fn test_simulator_parity_values() {
    let mut simulator = StatevectorSimulator::new(2);
    simulator.apply_gate(&ParametrizedGate::Ry(PI / 3.0), &[0]).unwrap();
    simulator.apply_gate(&StandardGate::X, &[1]).unwrap();

    // ⟨Z⟩ = cos θ on wire 0, -1 on wire 1
    assert_abs_diff_eq!(simulator.parity_expectation(&[0]).unwrap(), 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(simulator.parity_expectation(&[1]).unwrap(), -1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(simulator.parity_expectation(&[0, 1]).unwrap(), -0.5, epsilon = 1e-10);

    assert_abs_diff_eq!(parity_from_probs(&[0.25, 0.25, 0.25, 0.25]), 0.0);
    assert_abs_diff_eq!(parity_from_probs(&[0.0, 1.0]), -1.0);

    simulator.reset();
    assert_abs_diff_eq!(simulator.state().probability(0), 1.0);
}
