//! Ready-made node circuit functions.
//!
//! Noise channels are realised as unitary dilations onto an ancilla wire so they can
//! be simulated on a statevector.

use crate::error::{NetworkError, Result};
use crate::network::AnsatzFn;

fn setting(settings: &[f64], i: usize) -> Result<f64> {
    settings.get(i).copied().ok_or_else(|| {
        NetworkError::DimensionMismatch(format!(
            "ansatz needs at least {} settings, got {}",
            i + 1,
            settings.len()
        ))
    })
}

fn wire(wires: &[usize], i: usize) -> Result<usize> {
    wires.get(i).copied().ok_or_else(|| {
        NetworkError::InvalidNode(format!(
            "ansatz needs at least {} wires, got {:?}",
            i + 1,
            wires
        ))
    })
}

/// Bell state on `wires[0..2]` followed by `Rot(settings)` on `wires[0]`: every
/// maximally entangled two-qubit state. Takes 3 settings.
pub fn max_entangled_state() -> AnsatzFn {
    AnsatzFn::local(|circuit, settings, wires| {
        let (a, b) = (wire(wires, 0)?, wire(wires, 1)?);
        circuit.h(a)?;
        circuit.cnot(a, b)?;
        circuit.rot(setting(settings, 0)?, setting(settings, 1)?, setting(settings, 2)?, a)
    })
}

/// `n` Bell pairs on `2n` wires, pairing `wires[i]` with `wires[i + n]`.
pub fn bell_state_copies() -> AnsatzFn {
    AnsatzFn::local(|circuit, _settings, wires| {
        let half = wires.len() / 2;
        for i in 0..half {
            circuit.h(wires[i])?;
            circuit.cnot(wires[i], wires[i + half])?;
        }
        Ok(())
    })
}

pub fn ghz_state() -> AnsatzFn {
    AnsatzFn::local(|circuit, _settings, wires| {
        let first = wire(wires, 0)?;
        circuit.h(first)?;
        for &w in &wires[1..] {
            circuit.cnot(first, w)?;
        }
        Ok(())
    })
}

/// `RY(settings[i])` on `wires[i]`.
pub fn local_ry() -> AnsatzFn {
    AnsatzFn::local(|circuit, settings, wires| {
        for (i, &w) in wires.iter().enumerate() {
            circuit.ry(setting(settings, i)?, w)?;
        }
        Ok(())
    })
}

/// `RX(settings[2i])` then `RY(settings[2i + 1])` on `wires[i]`.
pub fn local_rxry() -> AnsatzFn {
    AnsatzFn::local(|circuit, settings, wires| {
        for (i, &w) in wires.iter().enumerate() {
            circuit.rx(setting(settings, 2 * i)?, w)?;
            circuit.ry(setting(settings, 2 * i + 1)?, w)?;
        }
        Ok(())
    })
}

fn damping_angle(gamma: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&gamma) {
        return Err(NetworkError::InvalidNode(format!(
            "gamma must be in the interval [0,1], got {}",
            gamma
        )));
    }
    Ok(2.0 * gamma.sqrt().asin())
}

/// Amplitude damping of `wires[0]` with decay probability `gamma`, using `wires[1]` as
/// the environment.
pub fn pure_amplitude_damping(gamma: f64) -> Result<AnsatzFn> {
    let theta = damping_angle(gamma)?;
    Ok(AnsatzFn::local(move |circuit, _settings, wires| {
        let (system, env) = (wire(wires, 0)?, wire(wires, 1)?);
        circuit.cry(theta, system, env)?;
        circuit.cnot(env, system)
    }))
}

/// Phase damping of `wires[0]` with strength `gamma`, using `wires[1]` as the environment.
pub fn pure_phase_damping(gamma: f64) -> Result<AnsatzFn> {
    let theta = damping_angle(gamma)?;
    Ok(AnsatzFn::local(move |circuit, _settings, wires| {
        circuit.cry(theta, wire(wires, 0)?, wire(wires, 1)?)
    }))
}
