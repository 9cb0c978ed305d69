//! Behavior matrices and classical information measures.

use ndarray::{Array1, Array2};

use crate::error::{NetworkError, Result};
use crate::network::NetworkAnsatz;
use crate::qnodes::{joint_probs_qnode, QNode};
use crate::utilities::{mixed_base_num, ragged_reshape};

/// Every combination of per-node classical inputs, as `[layer][node]` input ids.
///
/// Combination `i` enumerates the flattened node inputs in mixed radix, so the last
/// node of the last layer varies fastest.
pub fn network_input_ids(ansatz: &NetworkAnsatz) -> Result<Vec<Vec<Vec<usize>>>> {
    let num_inputs: Vec<usize> = ansatz.layers_node_num_in().iter().flatten().copied().collect();
    let net_num_in: usize = ansatz.layers_total_num_in().iter().product();

    (0..net_num_in)
        .map(|i| ragged_reshape(&mixed_base_num(i, &num_inputs), ansatz.layers_num_nodes()))
        .collect()
}

/// Number of raw outcomes of the final layer's wires.
pub(crate) fn raw_num_out(ansatz: &NetworkAnsatz) -> usize {
    1 << ansatz.measured_wires().len()
}

/// Build `P_Net(network_settings)`, the column-stochastic matrix of `P(y | inputs)`.
///
/// Columns follow [`network_input_ids`]; rows are the `2^N` outcomes of the final layer's
/// `N` wires, or the rows of `postmap` when a post-processing map is given.
pub fn behavior_fn(
    ansatz: &NetworkAnsatz,
    postmap: Option<Array2<f64>>,
) -> Result<QNode<Array2<f64>>> {
    let raw_net_num_out = raw_num_out(ansatz);
    if let Some(postmap) = &postmap {
        if postmap.ncols() != raw_net_num_out {
            return Err(NetworkError::DimensionMismatch(format!(
                "the postmap must have {} columns, got {}",
                raw_net_num_out,
                postmap.ncols()
            )));
        }
    }

    let input_ids = network_input_ids(ansatz)?;
    let probs_qnode = joint_probs_qnode(ansatz);
    let ansatz = ansatz.clone();

    Ok(Box::new(move |network_settings: &[f64]| {
        let mut raw_behavior = Array2::zeros((raw_net_num_out, input_ids.len()));
        for (i, inputs) in input_ids.iter().enumerate() {
            let settings = ansatz.qnode_settings(network_settings, inputs)?;
            raw_behavior
                .column_mut(i)
                .assign(&Array1::from(probs_qnode(&settings)?));
        }

        Ok(match &postmap {
            Some(postmap) => postmap.dot(&raw_behavior),
            None => raw_behavior,
        })
    }))
}

/// `H(X) = -Σ p log2 p`, treating near-zero probabilities as contributing nothing.
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    -probs
        .iter()
        .filter(|&&p| p > 1e-12)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn entropy_of_common_distributions() {
        assert_abs_diff_eq!(shannon_entropy(&[1.0, 0.0]), 0.0);
        assert_abs_diff_eq!(shannon_entropy(&[0.5, 0.5]), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(shannon_entropy(&[0.25; 4]), 2.0, epsilon = 1e-12);
    }
}
