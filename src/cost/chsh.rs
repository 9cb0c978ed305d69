//! The CHSH Bell inequality, `I = Σ_{x,y} (-1)^{x·y} ⟨A_x B_y⟩ ≤ 2`.

use rayon::prelude::*;

use crate::error::{NetworkError, Result};
use crate::network::NetworkAnsatz;
use crate::optimize::{numerical_gradient, CostFn, GradFn};
use crate::qnodes::global_parity_expval_qnode;

const XY_VALS: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

fn xy_sign(x: usize, y: usize) -> f64 {
    if x * y == 1 {
        -1.0
    } else {
        1.0
    }
}

/// Per-layer inputs selecting `(x, y)` on the two final-layer nodes and input 0 elsewhere.
fn xy_inputs(ansatz: &NetworkAnsatz) -> Result<Vec<Vec<Vec<usize>>>> {
    let node_num_in = ansatz.layers_node_num_in();
    match node_num_in.last() {
        Some(last) if last.len() == 2 && last.iter().all(|&n| n == 2) => {}
        _ => {
            return Err(NetworkError::InvalidNode(
                "the CHSH scenario needs a final layer of two measurement nodes with 2 inputs each"
                    .to_string(),
            ))
        }
    }

    let head: Vec<Vec<usize>> = node_num_in[..node_num_in.len() - 1]
        .iter()
        .map(|layer| vec![0; layer.len()])
        .collect();

    Ok(XY_VALS
        .iter()
        .map(|&(x, y)| {
            let mut inputs = head.clone();
            inputs.push(vec![x, y]);
            inputs
        })
        .collect())
}

/// The negated CHSH score of the final layer's parity measurements.
///
/// Earlier layers are evaluated with input 0 at every node.
pub fn chsh_inequality_cost(ansatz: &NetworkAnsatz) -> Result<Box<CostFn>> {
    let inputs = xy_inputs(ansatz)?;
    let qnode = global_parity_expval_qnode(ansatz);
    let ansatz = ansatz.clone();

    Ok(Box::new(move |network_settings: &[f64]| {
        let mut score = 0.0;
        for (&(x, y), xy) in XY_VALS.iter().zip(&inputs) {
            score += xy_sign(x, y) * qnode(&ansatz.qnode_settings(network_settings, xy)?)?;
        }
        Ok(-score)
    }))
}

/// Gradient of [`chsh_inequality_cost`], differentiating the four correlators in parallel.
///
/// Each correlator gradient is taken with respect to its own qnode settings and scattered
/// back onto the network settings before summing.
pub fn parallel_chsh_grad(ansatz: &NetworkAnsatz) -> Result<Box<GradFn>> {
    let inputs = xy_inputs(ansatz)?;
    let qnode = global_parity_expval_qnode(ansatz);
    let ansatz = ansatz.clone();

    Ok(Box::new(move |network_settings: &[f64]| {
        let partial_grads = XY_VALS[..]
            .par_iter()
            .zip(inputs.par_iter())
            .map(|(&(x, y), xy)| -> Result<Vec<f64>> {
                let settings = ansatz.qnode_settings(network_settings, xy)?;
                let qnode_grad = numerical_gradient(&qnode, &settings)?;
                let scaled: Vec<f64> = qnode_grad.iter().map(|g| -xy_sign(x, y) * g).collect();
                ansatz.expand_qnode_settings(&scaled, xy)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut grad = vec![0.0; network_settings.len()];
        for partial in partial_grads {
            for (g, p) in grad.iter_mut().zip(partial) {
                *g += p;
            }
        }
        Ok(grad)
    }))
}
