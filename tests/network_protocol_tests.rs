use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use ndarray::array;
use qnetvo::ansatz_library::{bell_state_copies, local_ry};
use qnetvo::information::{behavior_fn, network_input_ids};
use qnetvo::network::{AnsatzFn, NetworkAnsatz, NetworkNode, NodeKind};
use qnetvo::qnodes::{
    density_matrix_qnode, joint_probs_qnode, local_parity_expval_qnode, probs_qnode, state_qnode,
    DeviceConfig,
};
use qnetvo::quantum::StandardGate;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_shared_randomness_through_cc_wires() {
    init_logger();
    let coin = NetworkNode::cc_sender(
        1,
        vec![0],
        vec![0],
        AnsatzFn::sender(|c, _, w| {
            c.h(w[0])?;
            Ok(vec![c.measure(w[0])?])
        }),
        0,
    )
    .unwrap();
    let copy = NetworkNode::cc_receiver(
        1,
        vec![1, 2],
        vec![0],
        AnsatzFn::receiver(|c, _, w, cc| {
            c.cond(cc[0], StandardGate::X, &[w[0]])?;
            c.cond(cc[0], StandardGate::X, &[w[1]])
        }),
        0,
    )
    .unwrap();
    let ansatz = NetworkAnsatz::new(vec![vec![coin], vec![copy]]).unwrap();

    let rho = density_matrix_qnode(&ansatz, vec![1, 2])(&[]).unwrap();
    let expected = [0.5, 0.0, 0.0, 0.5];
    for i in 0..4 {
        for j in 0..4 {
            let diag = if i == j { expected[i] } else { 0.0 };
            assert_abs_diff_eq!(rho[[i, j]].re, diag, epsilon = 1e-12);
            assert_abs_diff_eq!(rho[[i, j]].im, 0.0, epsilon = 1e-12);
        }
    }

    // One ancilla per measurement.
    let state = state_qnode(&ansatz)(&[]).unwrap();
    assert_eq!(state.qubit_count, 4);
}

fn teleportation_ansatz() -> NetworkAnsatz {
    let message = NetworkNode::prepare(1, vec![0], local_ry(), 1).unwrap();
    let bell_pair = NetworkNode::prepare(1, vec![1, 2], bell_state_copies(), 0).unwrap();
    let bell_measurement = NetworkNode::cc_sender(
        1,
        vec![0, 1],
        vec![0, 1],
        AnsatzFn::sender(|c, _, w| {
            c.cnot(w[0], w[1])?;
            c.h(w[0])?;
            Ok(vec![c.measure(w[0])?, c.measure(w[1])?])
        }),
        0,
    )
    .unwrap();
    let correction = NetworkNode::cc_receiver(
        1,
        vec![2],
        vec![0, 1],
        AnsatzFn::receiver(|c, _, w, cc| {
            c.cond(cc[1], StandardGate::X, w)?;
            c.cond(cc[0], StandardGate::Z, w)
        }),
        0,
    )
    .unwrap();

    NetworkAnsatz::new(vec![vec![message, bell_pair], vec![bell_measurement], vec![correction]])
        .unwrap()
}

#[test]
fn test_teleportation() {
    init_logger();
    let ansatz = teleportation_ansatz();
    assert_eq!(ansatz.num_settings(), 1);
    assert_eq!(ansatz.measured_wires(), &[2]);

    let rho_qnode = density_matrix_qnode(&ansatz, vec![2]);
    for theta in [0.0, 0.4, PI / 2.0, 2.1, PI] {
        let rho = rho_qnode(&[theta]).unwrap();
        let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
        assert_abs_diff_eq!(rho[[0, 0]].re, c * c, epsilon = 1e-10);
        assert_abs_diff_eq!(rho[[1, 1]].re, s * s, epsilon = 1e-10);
        assert_abs_diff_eq!(rho[[0, 1]].re, c * s, epsilon = 1e-10);
        assert_abs_diff_eq!(rho[[0, 1]].im, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_teleportation_into_conditioned_measurement() {
    let mut layers = teleportation_ansatz().layers().to_vec();
    let receiver = NetworkNode::new(
        NodeKind::Measure { num_out: 2 },
        1,
        vec![2],
        vec![0, 1],
        vec![],
        AnsatzFn::receiver(|c, _, w, cc| {
            c.cond(cc[1], StandardGate::X, w)?;
            c.cond(cc[0], StandardGate::Z, w)
        }),
        0,
    )
    .unwrap();
    layers[2] = vec![receiver];
    let ansatz = NetworkAnsatz::new(layers).unwrap();
    assert_eq!(ansatz.layers()[2][0].num_out(), 2);

    let probs = joint_probs_qnode(&ansatz)(&[1.1]).unwrap();
    assert_abs_diff_eq!(probs[0], (0.55f64).cos().powi(2), epsilon = 1e-10);
    assert_abs_diff_eq!(probs[1], (0.55f64).sin().powi(2), epsilon = 1e-10);
}

#[test]
fn test_cc_relay_forwards_measurements() {
    let coin = NetworkNode::cc_sender(
        1,
        vec![0],
        vec![0],
        AnsatzFn::sender(|c, _, w| {
            c.h(w[0])?;
            Ok(vec![c.measure(w[0])?])
        }),
        0,
    )
    .unwrap();
    let relay = NetworkNode::new(
        NodeKind::Processing,
        1,
        vec![],
        vec![0],
        vec![1],
        AnsatzFn::relay(|_, _, _, cc| Ok(cc.to_vec())),
        0,
    )
    .unwrap();
    let copy = NetworkNode::cc_receiver(
        1,
        vec![1],
        vec![1],
        AnsatzFn::receiver(|c, _, w, cc| c.cond(cc[0], StandardGate::X, w)),
        0,
    )
    .unwrap();
    let ansatz = NetworkAnsatz::new(vec![vec![coin], vec![relay], vec![copy]]).unwrap();
    assert_eq!(ansatz.network_cc_wires(), &[0, 1]);

    let probs = probs_qnode(&ansatz, vec![0, 1])(&[]).unwrap();
    assert_abs_diff_eq!(probs[0b00], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b11], 0.5, epsilon = 1e-12);
}

#[test]
fn test_sparse_wire_labels() {
    let ansatz = NetworkAnsatz::new(vec![vec![
        NetworkNode::measure(1, 2, vec![0], local_ry(), 1).unwrap(),
        NetworkNode::measure(1, 2, vec![70], local_ry(), 1).unwrap(),
    ]])
    .unwrap();
    assert_eq!(ansatz.network_wires(), &[0, 70]);
    assert_eq!(ansatz.wire_count(), 2);

    let probs = joint_probs_qnode(&ansatz)(&[0.0, PI]).unwrap();
    assert_eq!(probs.len(), 4);
    assert_abs_diff_eq!(probs[0b01], 1.0, epsilon = 1e-12);
    assert_eq!(state_qnode(&ansatz)(&[0.0, PI]).unwrap().qubit_count, 2);

    let rho = density_matrix_qnode(&ansatz, vec![70])(&[0.0, PI]).unwrap();
    assert_abs_diff_eq!(rho[[1, 1]].re, 1.0, epsilon = 1e-12);

    let parities = local_parity_expval_qnode(&ansatz)(&[0.0, PI]).unwrap();
    assert_abs_diff_eq!(parities[1], -1.0, epsilon = 1e-12);

    assert!(probs_qnode(&ansatz, vec![1])(&[0.0, PI]).is_err());
}

#[test]
fn test_receivers_cannot_address_ancillas() {
    let sender = NetworkNode::cc_sender(
        1,
        vec![0],
        vec![0],
        AnsatzFn::sender(|c, _, w| Ok(vec![c.measure(w[0])?])),
        0,
    )
    .unwrap();
    // wire 1 is the ancilla holding the measurement of wire 0
    let receiver = NetworkNode::cc_receiver(
        1,
        vec![0],
        vec![0],
        AnsatzFn::receiver(|c, _, _, cc| c.x(cc[0].ancilla())),
        0,
    )
    .unwrap();
    let ansatz = NetworkAnsatz::new(vec![vec![sender], vec![receiver]]).unwrap();
    assert!(state_qnode(&ansatz)(&[]).is_err());
}

/// One qubit prepared in `RY(θ_x)|0⟩` for input `x` and measured in the computational basis.
fn prepare_and_measure() -> NetworkAnsatz {
    NetworkAnsatz::new(vec![
        vec![NetworkNode::prepare(2, vec![0], local_ry(), 1).unwrap()],
        vec![NetworkNode::measure(1, 2, vec![0], AnsatzFn::identity(), 0).unwrap()],
    ])
    .unwrap()
}

#[test]
fn test_behavior_matrix_is_column_stochastic() {
    init_logger();
    let ansatz = prepare_and_measure();
    assert_eq!(
        network_input_ids(&ansatz).unwrap(),
        vec![vec![vec![0], vec![0]], vec![vec![1], vec![0]]]
    );

    let behavior = behavior_fn(&ansatz, None).unwrap();
    let settings = [0.7, -2.3];
    let p_net = behavior(&settings).unwrap();
    assert_eq!(p_net.dim(), (2, 2));
    for column in p_net.columns() {
        assert_abs_diff_eq!(column.sum(), 1.0, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(p_net[[0, 0]], (0.35f64).cos().powi(2), epsilon = 1e-12);

    let deterministic = behavior(&[0.0, PI]).unwrap();
    assert_abs_diff_eq!(deterministic[[0, 0]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(deterministic[[1, 1]], 1.0, epsilon = 1e-12);

    // Coarse-graining every outcome onto one.
    let merged = behavior_fn(&ansatz, Some(array![[1.0, 1.0]])).unwrap()(&settings).unwrap();
    assert_eq!(merged.dim(), (1, 2));
    assert_abs_diff_eq!(merged[[0, 1]], 1.0, epsilon = 1e-12);

    assert!(behavior_fn(&ansatz, Some(array![[1.0, 0.0, 0.0]])).is_err());
}

#[test]
fn test_local_parities_and_shot_estimates() {
    let ansatz = NetworkAnsatz::new(vec![vec![
        NetworkNode::measure(1, 2, vec![0], local_ry(), 1).unwrap(),
        NetworkNode::measure(1, 2, vec![1], local_ry(), 1).unwrap(),
    ]])
    .unwrap();

    let parities = local_parity_expval_qnode(&ansatz)(&[0.0, PI]).unwrap();
    assert_abs_diff_eq!(parities[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(parities[1], -1.0, epsilon = 1e-12);

    let device = DeviceConfig::default().with_shots(4000).with_seed(11);
    let sampled = ansatz.clone().with_device(device);
    let qnode = probs_qnode(&sampled, vec![0]);
    let first = qnode(&[PI / 2.0, 0.0]).unwrap();
    assert_abs_diff_eq!(first[0], 0.5, epsilon = 0.05);
    assert_eq!(qnode(&[PI / 2.0, 0.0]).unwrap(), first);

    // The unsampled ansatz keeps exact evaluation.
    let exact = probs_qnode(&ansatz, vec![0])(&[PI / 2.0, 0.0]).unwrap();
    assert_abs_diff_eq!(exact[0], 0.5, epsilon = 1e-12);
}
