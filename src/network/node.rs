//! Network nodes: the atomic, wire-scoped operations a network is built from.

use std::fmt;
use std::sync::Arc;

use crate::error::{NetworkError, Result};
use crate::quantum::circuit::{MeasurementValue, QuantumCircuit};

/// `fn(circuit, settings, wires)`
pub type LocalFn = dyn Fn(&mut QuantumCircuit, &[f64], &[usize]) -> Result<()> + Send + Sync;

/// `fn(circuit, settings, wires) -> measurement results sent downstream`
pub type SenderFn =
    dyn Fn(&mut QuantumCircuit, &[f64], &[usize]) -> Result<Vec<MeasurementValue>> + Send + Sync;

/// `fn(circuit, settings, wires, received measurement results)`
pub type ReceiverFn =
    dyn Fn(&mut QuantumCircuit, &[f64], &[usize], &[MeasurementValue]) -> Result<()> + Send + Sync;

/// `fn(circuit, settings, wires, received measurement results) -> results sent downstream`
pub type RelayFn = dyn Fn(
        &mut QuantumCircuit,
        &[f64],
        &[usize],
        &[MeasurementValue],
    ) -> Result<Vec<MeasurementValue>>
    + Send
    + Sync;

/// The circuit function of a node, in one of four fixed call shapes.
///
/// The shape follows the node's cc wires: nodes with `cc_wires_in` are handed the
/// upstream results and nodes with `cc_wires_out` return the results they send.
#[derive(Clone)]
pub enum AnsatzFn {
    Local(Arc<LocalFn>),
    Sender(Arc<SenderFn>),
    Receiver(Arc<ReceiverFn>),
    Relay(Arc<RelayFn>),
}

impl AnsatzFn {
    pub fn local<F>(f: F) -> Self
    where
        F: Fn(&mut QuantumCircuit, &[f64], &[usize]) -> Result<()> + Send + Sync + 'static,
    {
        AnsatzFn::Local(Arc::new(f))
    }

    pub fn sender<F>(f: F) -> Self
    where
        F: Fn(&mut QuantumCircuit, &[f64], &[usize]) -> Result<Vec<MeasurementValue>>
            + Send
            + Sync
            + 'static,
    {
        AnsatzFn::Sender(Arc::new(f))
    }

    pub fn receiver<F>(f: F) -> Self
    where
        F: Fn(&mut QuantumCircuit, &[f64], &[usize], &[MeasurementValue]) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        AnsatzFn::Receiver(Arc::new(f))
    }

    pub fn relay<F>(f: F) -> Self
    where
        F: Fn(
                &mut QuantumCircuit,
                &[f64],
                &[usize],
                &[MeasurementValue],
            ) -> Result<Vec<MeasurementValue>>
            + Send
            + Sync
            + 'static,
    {
        AnsatzFn::Relay(Arc::new(f))
    }

    /// A circuit function that applies nothing.
    pub fn identity() -> Self {
        AnsatzFn::local(|_, _, _| Ok(()))
    }

    fn shape(&self) -> &'static str {
        match self {
            AnsatzFn::Local(_) => "local",
            AnsatzFn::Sender(_) => "sender",
            AnsatzFn::Receiver(_) => "receiver",
            AnsatzFn::Relay(_) => "relay",
        }
    }

    /// The call shape required by a node with the given cc wires.
    fn expected_shape(cc_wires_in: &[usize], cc_wires_out: &[usize]) -> &'static str {
        match (!cc_wires_in.is_empty(), !cc_wires_out.is_empty()) {
            (false, false) => "local",
            (false, true) => "sender",
            (true, false) => "receiver",
            (true, true) => "relay",
        }
    }
}

impl fmt::Debug for AnsatzFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnsatzFn::{}", self.shape())
    }
}

/// The closed set of node variants.
///
/// The kind names the node's role; its cc wires are independent of it, so a
/// measurement may be conditioned on upstream results and a processing node may
/// both receive and send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Static noise, independent of inputs and settings.
    Noise,
    Prepare,
    Processing,
    Measure { num_out: usize },
    /// Measures local qubits and writes the results to its cc wires.
    CcSender,
    /// Applies operations conditioned on the results carried by its cc wires.
    CcReceiver,
}

/// One operation placed on a fixed set of quantum wires.
///
/// A node holds `num_settings` parameters for each of its `num_in` classical inputs.
#[derive(Clone, Debug)]
pub struct NetworkNode {
    kind: NodeKind,
    num_in: usize,
    wires: Vec<usize>,
    cc_wires_in: Vec<usize>,
    cc_wires_out: Vec<usize>,
    num_settings: usize,
    ansatz_fn: AnsatzFn,
}

fn check_unique(what: &str, items: &[usize]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(NetworkError::InvalidNode(format!(
                "{} {} is listed twice in {:?}",
                what, item, items
            )));
        }
    }
    Ok(())
}

impl NetworkNode {
    /// Build a node of any kind with explicit cc wires.
    ///
    /// `ansatz_fn` must have the call shape implied by which cc wire lists are non-empty.
    pub fn new(
        kind: NodeKind,
        num_in: usize,
        wires: Vec<usize>,
        cc_wires_in: Vec<usize>,
        cc_wires_out: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        if num_in == 0 {
            return Err(NetworkError::InvalidNode(
                "a node must accept at least one classical input".to_string(),
            ));
        }
        if kind == NodeKind::Noise && (num_in != 1 || num_settings != 0) {
            return Err(NetworkError::InvalidNode(
                "noise takes exactly one input and no settings".to_string(),
            ));
        }
        if let NodeKind::Measure { num_out: 0 } = kind {
            return Err(NetworkError::InvalidNode(
                "a measurement must have at least one outcome".to_string(),
            ));
        }

        check_unique("wire", &wires)?;
        check_unique("cc wire", &cc_wires_in)?;
        check_unique("cc wire", &cc_wires_out)?;

        let expected = AnsatzFn::expected_shape(&cc_wires_in, &cc_wires_out);
        if ansatz_fn.shape() != expected {
            return Err(NetworkError::InvalidNode(format!(
                "{:?} node reading {:?} and writing {:?} needs a {} circuit function, got {:?}",
                kind, cc_wires_in, cc_wires_out, expected, ansatz_fn
            )));
        }

        Ok(NetworkNode {
            kind,
            num_in,
            wires,
            cc_wires_in,
            cc_wires_out,
            num_settings,
            ansatz_fn,
        })
    }

    /// Noise acting on `wires`: one input, no settings.
    pub fn noise(wires: Vec<usize>, ansatz_fn: AnsatzFn) -> Result<Self> {
        Self::new(NodeKind::Noise, 1, wires, Vec::new(), Vec::new(), ansatz_fn, 0)
    }

    pub fn prepare(
        num_in: usize,
        wires: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        Self::new(NodeKind::Prepare, num_in, wires, Vec::new(), Vec::new(), ansatz_fn, num_settings)
    }

    pub fn processing(
        num_in: usize,
        wires: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        Self::new(
            NodeKind::Processing,
            num_in,
            wires,
            Vec::new(),
            Vec::new(),
            ansatz_fn,
            num_settings,
        )
    }

    /// A measurement basis rotation; the measurement itself is chosen by the evaluator.
    pub fn measure(
        num_in: usize,
        num_out: usize,
        wires: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        Self::new(
            NodeKind::Measure { num_out },
            num_in,
            wires,
            Vec::new(),
            Vec::new(),
            ansatz_fn,
            num_settings,
        )
    }

    pub fn cc_sender(
        num_in: usize,
        wires: Vec<usize>,
        cc_wires_out: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        Self::new(
            NodeKind::CcSender,
            num_in,
            wires,
            Vec::new(),
            cc_wires_out,
            ansatz_fn,
            num_settings,
        )
    }

    pub fn cc_receiver(
        num_in: usize,
        wires: Vec<usize>,
        cc_wires_in: Vec<usize>,
        ansatz_fn: AnsatzFn,
        num_settings: usize,
    ) -> Result<Self> {
        Self::new(
            NodeKind::CcReceiver,
            num_in,
            wires,
            cc_wires_in,
            Vec::new(),
            ansatz_fn,
            num_settings,
        )
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn num_in(&self) -> usize {
        self.num_in
    }

    /// Number of classical outcomes; only measurement nodes declare more than one.
    pub fn num_out(&self) -> usize {
        match self.kind {
            NodeKind::Measure { num_out } => num_out,
            _ => 1,
        }
    }

    pub fn wires(&self) -> &[usize] {
        &self.wires
    }

    pub fn cc_wires_in(&self) -> &[usize] {
        &self.cc_wires_in
    }

    pub fn cc_wires_out(&self) -> &[usize] {
        &self.cc_wires_out
    }

    pub fn num_settings(&self) -> usize {
        self.num_settings
    }

    /// Apply the node's circuit function on `wires`, returning the results it sends downstream.
    ///
    /// `wires` are the circuit qubits standing in for [`wires`](Self::wires), in the same order.
    pub fn apply(
        &self,
        circuit: &mut QuantumCircuit,
        settings: &[f64],
        wires: &[usize],
        cc_values: &[MeasurementValue],
    ) -> Result<Vec<MeasurementValue>> {
        if settings.len() != self.num_settings {
            return Err(NetworkError::DimensionMismatch(format!(
                "node on wires {:?} expects {} settings, got {}",
                self.wires,
                self.num_settings,
                settings.len()
            )));
        }
        if wires.len() != self.wires.len() {
            return Err(NetworkError::DimensionMismatch(format!(
                "node on wires {:?} applied to {} qubits",
                self.wires,
                wires.len()
            )));
        }
        if cc_values.len() != self.cc_wires_in.len() {
            return Err(NetworkError::Circuit(format!(
                "node on wires {:?} reads cc wires {:?}, got {} results",
                self.wires,
                self.cc_wires_in,
                cc_values.len()
            )));
        }

        let sent = match &self.ansatz_fn {
            AnsatzFn::Local(f) => {
                f(circuit, settings, wires)?;
                Vec::new()
            }
            AnsatzFn::Sender(f) => f(circuit, settings, wires)?,
            AnsatzFn::Receiver(f) => {
                f(circuit, settings, wires, cc_values)?;
                Vec::new()
            }
            AnsatzFn::Relay(f) => f(circuit, settings, wires, cc_values)?,
        };

        if sent.len() != self.cc_wires_out.len() {
            return Err(NetworkError::Circuit(format!(
                "node on wires {:?} returned {} measurement results for cc wires {:?}",
                self.wires,
                sent.len(),
                self.cc_wires_out
            )));
        }
        Ok(sent)
    }
}
