//! The network ansatz compiler.
//!
//! A [`NetworkAnsatz`] is built from an ordered list of layers of [`NetworkNode`]s. On
//! construction it checks that
//!
//! 1. nodes within a layer act on disjoint quantum wires,
//! 2. every classical-communication (cc) wire has exactly one writer in the network, and
//! 3. every cc wire is written by a strictly earlier layer than any layer reading it,
//!
//! and then lays out the flat settings vector. Each node owns `num_settings`
//! consecutive entries per classical input, assigned left to right over
//! layers, then nodes, then inputs.
//!
//! Quantum wires are labels. The simulated circuit numbers them densely in order of
//! first appearance in [`network_wires`](NetworkAnsatz::network_wires), so its size is the
//! number of distinct wires whatever the labels are.

use log::debug;
use rand::Rng;

use crate::error::{NetworkError, Result};
use crate::network::node::NetworkNode;
use crate::optimize::settings::Settings;
use crate::qnodes::DeviceConfig;
use crate::quantum::circuit::{MeasurementValue, QuantumCircuit};

/// `parameter_partitions[layer][node][input] = (start, stop)`
pub type ParameterPartitions = Vec<Vec<Vec<(usize, usize)>>>;

/// A validated, compiled quantum network.
#[derive(Clone, Debug)]
pub struct NetworkAnsatz {
    layers: Vec<Vec<NetworkNode>>,
    layers_wires: Vec<Vec<usize>>,
    layers_cc_wires_in: Vec<Vec<usize>>,
    layers_cc_wires_out: Vec<Vec<usize>>,
    layers_num_settings: Vec<usize>,
    layers_total_num_in: Vec<usize>,
    layers_node_num_in: Vec<Vec<usize>>,
    layers_num_nodes: Vec<usize>,
    network_wires: Vec<usize>,
    /// `node_qubits[layer][node]`: circuit qubits of each node's wires.
    node_qubits: Vec<Vec<Vec<usize>>>,
    network_cc_wires: Vec<usize>,
    parameter_partitions: ParameterPartitions,
    device: DeviceConfig,
}

/// Appends each of `items` not yet present, keeping first-appearance order.
fn extend_unique(all: &mut Vec<usize>, items: &[usize]) {
    for item in items {
        if !all.contains(item) {
            all.push(*item);
        }
    }
}

/// Position of every label of `wires` within `network_wires`.
fn dense_indices(network_wires: &[usize], wires: &[usize]) -> Result<Vec<usize>> {
    wires
        .iter()
        .map(|wire| {
            network_wires.iter().position(|w| w == wire).ok_or_else(|| {
                NetworkError::Circuit(format!("wire {} is not part of the network", wire))
            })
        })
        .collect()
}

fn duplicates(items: &[usize]) -> Vec<usize> {
    let mut dups = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) && !dups.contains(item) {
            dups.push(*item);
        }
    }
    dups
}

impl NetworkAnsatz {
    /// Validate and compile `layers` into a network ansatz.
    pub fn new(layers: Vec<Vec<NetworkNode>>) -> Result<Self> {
        let mut layers_wires = Vec::with_capacity(layers.len());
        let mut layers_cc_wires_in = Vec::with_capacity(layers.len());
        let mut layers_cc_wires_out = Vec::with_capacity(layers.len());

        for (layer_id, layer) in layers.iter().enumerate() {
            let wires: Vec<usize> = layer.iter().flat_map(|n| n.wires().iter().copied()).collect();
            let shared = duplicates(&wires);
            if !shared.is_empty() {
                return Err(NetworkError::WiresNotUnique(format!(
                    "layer {} uses wires {:?} in more than one node",
                    layer_id, shared
                )));
            }
            layers_wires.push(wires);

            let mut cc_in = Vec::new();
            for node in layer {
                extend_unique(&mut cc_in, node.cc_wires_in());
            }
            layers_cc_wires_in.push(cc_in);
            layers_cc_wires_out.push(
                layer
                    .iter()
                    .flat_map(|n| n.cc_wires_out().iter().copied())
                    .collect::<Vec<_>>(),
            );
        }

        let all_cc_out: Vec<usize> = layers_cc_wires_out.iter().flatten().copied().collect();
        let shared = duplicates(&all_cc_out);
        if !shared.is_empty() {
            return Err(NetworkError::WiresNotUnique(format!(
                "cc wires {:?} are written by more than one node",
                shared
            )));
        }

        Self::check_causality(&layers_cc_wires_in, &layers_cc_wires_out)?;

        let mut network_wires = Vec::new();
        for wires in &layers_wires {
            extend_unique(&mut network_wires, wires);
        }

        let node_qubits = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|node| dense_indices(&network_wires, node.wires()))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let layers_node_num_in: Vec<Vec<usize>> = layers
            .iter()
            .map(|layer| layer.iter().map(NetworkNode::num_in).collect())
            .collect();

        let ansatz = NetworkAnsatz {
            layers_num_settings: layers
                .iter()
                .map(|layer| layer.iter().map(NetworkNode::num_settings).sum::<usize>())
                .collect(),
            layers_total_num_in: layers_node_num_in
                .iter()
                .map(|n| n.iter().product::<usize>())
                .collect(),
            layers_num_nodes: layers.iter().map(Vec::len).collect(),
            parameter_partitions: Self::network_parameter_partitions(&layers),
            network_cc_wires: all_cc_out,
            layers,
            layers_wires,
            layers_cc_wires_in,
            layers_cc_wires_out,
            layers_node_num_in,
            network_wires,
            node_qubits,
            device: DeviceConfig::default(),
        };

        debug!(
            "compiled network ansatz: {} layers, wires {:?}, cc wires {:?}, {} settings",
            ansatz.layers.len(),
            ansatz.network_wires,
            ansatz.network_cc_wires,
            ansatz.num_settings()
        );

        Ok(ansatz)
    }

    fn check_causality(cc_in: &[Vec<usize>], cc_out: &[Vec<usize>]) -> Result<()> {
        let mut written: Vec<usize> = Vec::new();
        for (layer_id, (reads, writes)) in cc_in.iter().zip(cc_out).enumerate() {
            let missing: Vec<usize> =
                reads.iter().filter(|w| !written.contains(*w)).copied().collect();
            if !missing.is_empty() {
                return Err(NetworkError::CausalityViolated {
                    layer: layer_id,
                    missing,
                });
            }
            written.extend(writes);
        }
        Ok(())
    }

    /// Greedy left-to-right layout of the settings vector.
    pub fn network_parameter_partitions(layers: &[Vec<NetworkNode>]) -> ParameterPartitions {
        let mut cursor = 0;
        layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|node| {
                        (0..node.num_in())
                            .map(|_| {
                                let partition = (cursor, cursor + node.num_settings());
                                cursor = partition.1;
                                partition
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Replace the evaluator configuration used by qnodes built from this ansatz.
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    pub fn device(&self) -> &DeviceConfig {
        &self.device
    }

    pub fn layers(&self) -> &[Vec<NetworkNode>] {
        &self.layers
    }

    pub fn layers_wires(&self) -> &[Vec<usize>] {
        &self.layers_wires
    }

    pub fn layers_cc_wires_in(&self) -> &[Vec<usize>] {
        &self.layers_cc_wires_in
    }

    pub fn layers_cc_wires_out(&self) -> &[Vec<usize>] {
        &self.layers_cc_wires_out
    }

    pub fn layers_num_settings(&self) -> &[usize] {
        &self.layers_num_settings
    }

    /// Number of joint input combinations per layer.
    pub fn layers_total_num_in(&self) -> &[usize] {
        &self.layers_total_num_in
    }

    pub fn layers_node_num_in(&self) -> &[Vec<usize>] {
        &self.layers_node_num_in
    }

    pub fn layers_num_nodes(&self) -> &[usize] {
        &self.layers_num_nodes
    }

    /// All quantum wires in order of first appearance.
    pub fn network_wires(&self) -> &[usize] {
        &self.network_wires
    }

    pub fn network_cc_wires(&self) -> &[usize] {
        &self.network_cc_wires
    }

    pub fn num_cc_wires(&self) -> usize {
        self.network_cc_wires.len()
    }

    pub fn parameter_partitions(&self) -> &ParameterPartitions {
        &self.parameter_partitions
    }

    /// Length of the network settings vector.
    pub fn num_settings(&self) -> usize {
        self.parameter_partitions
            .iter()
            .flatten()
            .flatten()
            .last()
            .map_or(0, |&(_, stop)| stop)
    }

    /// Number of settings consumed by one circuit execution.
    pub fn num_qnode_settings(&self) -> usize {
        self.layers_num_settings.iter().sum()
    }

    /// Wires of the final layer, on which measurements are taken.
    pub fn measured_wires(&self) -> &[usize] {
        self.layers_wires.last().map_or(&[][..], Vec::as_slice)
    }

    /// Number of distinct quantum wires, the circuit width before measurement ancillas.
    pub fn wire_count(&self) -> usize {
        self.network_wires.len()
    }

    /// Circuit qubits standing in for the wire labels `wires`.
    pub fn qubit_indices(&self, wires: &[usize]) -> Result<Vec<usize>> {
        dense_indices(&self.network_wires, wires)
    }

    fn check_layer_inputs(&self, layer_id: usize, layer_inputs: &[usize]) -> Result<()> {
        let node_num_in = self.layers_node_num_in.get(layer_id).ok_or_else(|| {
            NetworkError::DimensionMismatch(format!(
                "layer {} does not exist in a {}-layer network",
                layer_id,
                self.layers.len()
            ))
        })?;
        if layer_inputs.len() != node_num_in.len() {
            return Err(NetworkError::DimensionMismatch(format!(
                "layer {} has {} nodes, got {} inputs",
                layer_id,
                node_num_in.len(),
                layer_inputs.len()
            )));
        }
        for (node_id, (&x, &num_in)) in layer_inputs.iter().zip(node_num_in).enumerate() {
            if x >= num_in {
                return Err(NetworkError::DimensionMismatch(format!(
                    "input {} for node {} of layer {} must be less than {}",
                    x, node_id, layer_id, num_in
                )));
            }
        }
        Ok(())
    }

    fn check_network_inputs(&self, network_inputs: &[Vec<usize>]) -> Result<()> {
        if network_inputs.len() != self.layers.len() {
            return Err(NetworkError::DimensionMismatch(format!(
                "expected inputs for {} layers, got {}",
                self.layers.len(),
                network_inputs.len()
            )));
        }
        for (layer_id, layer_inputs) in network_inputs.iter().enumerate() {
            self.check_layer_inputs(layer_id, layer_inputs)?;
        }
        Ok(())
    }

    fn check_network_settings(&self, network_settings: &[f64]) -> Result<()> {
        if network_settings.len() != self.num_settings() {
            return Err(NetworkError::DimensionMismatch(format!(
                "expected {} network settings, got {}",
                self.num_settings(),
                network_settings.len()
            )));
        }
        Ok(())
    }

    /// Settings of one layer for the given per-node classical inputs.
    pub fn layer_settings(
        &self,
        network_settings: &[f64],
        layer_id: usize,
        layer_inputs: &[usize],
    ) -> Result<Vec<f64>> {
        self.check_network_settings(network_settings)?;
        self.check_layer_inputs(layer_id, layer_inputs)?;

        Ok(layer_inputs
            .iter()
            .enumerate()
            .flat_map(|(node_id, &x)| {
                let (start, stop) = self.parameter_partitions[layer_id][node_id][x];
                network_settings[start..stop].iter().copied()
            })
            .collect())
    }

    /// The settings consumed by one circuit execution with the given inputs at every node.
    pub fn qnode_settings(
        &self,
        network_settings: &[f64],
        network_inputs: &[Vec<usize>],
    ) -> Result<Vec<f64>> {
        self.check_network_inputs(network_inputs)?;

        let mut settings = Vec::with_capacity(self.num_qnode_settings());
        for (layer_id, layer_inputs) in network_inputs.iter().enumerate() {
            settings.extend(self.layer_settings(network_settings, layer_id, layer_inputs)?);
        }
        Ok(settings)
    }

    /// Scatter qnode-sized `qnode_settings` back into a zero network-sized vector.
    ///
    /// Inverse of [`qnode_settings`](Self::qnode_settings) on the touched offsets.
    pub fn expand_qnode_settings(
        &self,
        qnode_settings: &[f64],
        network_inputs: &[Vec<usize>],
    ) -> Result<Vec<f64>> {
        self.check_network_inputs(network_inputs)?;
        if qnode_settings.len() != self.num_qnode_settings() {
            return Err(NetworkError::DimensionMismatch(format!(
                "expected {} qnode settings, got {}",
                self.num_qnode_settings(),
                qnode_settings.len()
            )));
        }

        let mut expanded = vec![0.0; self.num_settings()];
        let mut cursor = 0;
        for (layer_id, layer_inputs) in network_inputs.iter().enumerate() {
            for (node_id, &x) in layer_inputs.iter().enumerate() {
                let (start, stop) = self.parameter_partitions[layer_id][node_id][x];
                let len = stop - start;
                expanded[start..stop].copy_from_slice(&qnode_settings[cursor..cursor + len]);
                cursor += len;
            }
        }
        Ok(expanded)
    }

    /// Uniformly random settings in `[-π, π]`.
    ///
    /// Entries at `fixed_setting_ids` are set to `fixed_settings` and frozen.
    pub fn rand_network_settings(
        &self,
        fixed_setting_ids: &[usize],
        fixed_settings: &[f64],
    ) -> Result<Settings> {
        self.rand_network_settings_with(&mut rand::thread_rng(), fixed_setting_ids, fixed_settings)
    }

    /// Like [`rand_network_settings`](Self::rand_network_settings), drawing from `rng`.
    pub fn rand_network_settings_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        fixed_setting_ids: &[usize],
        fixed_settings: &[f64],
    ) -> Result<Settings> {
        let pi = std::f64::consts::PI;
        let values = (0..self.num_settings())
            .map(|_| rng.gen_range(-pi..=pi))
            .collect();
        Settings::new(values).fix(fixed_setting_ids, fixed_settings)
    }

    pub fn zero_network_settings(&self) -> Settings {
        Settings::new(vec![0.0; self.num_settings()])
    }

    /// Record the network circuit for qnode `settings`.
    ///
    /// See [`qnode_settings`](Self::qnode_settings) for how they are resolved.
    pub fn circuit(&self, settings: &[f64]) -> Result<QuantumCircuit> {
        let mut circuit = QuantumCircuit::new(self.wire_count());
        self.apply(&mut circuit, settings)?;
        Ok(circuit)
    }

    /// Apply every layer in order onto `circuit`, whose qubit `i` carries `network_wires()[i]`.
    ///
    /// The cc register lives for exactly this call: senders fill their slots and
    /// receivers in later layers read them.
    pub fn apply(&self, circuit: &mut QuantumCircuit, settings: &[f64]) -> Result<()> {
        if settings.len() != self.num_qnode_settings() {
            return Err(NetworkError::DimensionMismatch(format!(
                "expected {} qnode settings, got {}",
                self.num_qnode_settings(),
                settings.len()
            )));
        }

        let mut cc_register: Vec<Option<MeasurementValue>> = vec![None; self.num_cc_wires()];
        let mut cursor = 0;

        for (layer, layer_qubits) in self.layers.iter().zip(&self.node_qubits) {
            for (node, qubits) in layer.iter().zip(layer_qubits) {
                let node_settings = &settings[cursor..cursor + node.num_settings()];
                cursor += node.num_settings();

                let cc_values = node
                    .cc_wires_in()
                    .iter()
                    .map(|cc_wire| {
                        self.cc_slot(*cc_wire)
                            .and_then(|slot| cc_register[slot])
                            .ok_or_else(|| {
                                NetworkError::Circuit(format!(
                                    "cc wire {} was never written",
                                    cc_wire
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;

                let sent = node.apply(circuit, node_settings, qubits, &cc_values)?;
                for (cc_wire, value) in node.cc_wires_out().iter().zip(sent) {
                    if let Some(slot) = self.cc_slot(*cc_wire) {
                        cc_register[slot] = Some(value);
                    }
                }
            }
        }

        Ok(())
    }

    fn cc_slot(&self, cc_wire: usize) -> Option<usize> {
        self.network_cc_wires.iter().position(|&w| w == cc_wire)
    }
}
