//! Costs that are linear in the network's conditional probabilities.

use ndarray::{Array1, Array2};

use crate::error::{NetworkError, Result};
use crate::information::{network_input_ids, raw_num_out};
use crate::network::NetworkAnsatz;
use crate::optimize::CostFn;
use crate::qnodes::joint_probs_qnode;

/// The negated score `⟨G, L P_Net⟩ = Σ_{i,b} G[b, i] (L P(·|i))[b]`.
///
/// `game` has one column per input combination (ordered as
/// [`network_input_ids`](crate::information::network_input_ids)) and one row per output.
/// Without a `postmap` the outputs are the `2^N` raw bitstrings of the final layer;
/// with one, `postmap` maps those bitstrings onto the game's rows.
pub fn linear_probs_cost_fn(
    ansatz: &NetworkAnsatz,
    game: Array2<f64>,
    postmap: Option<Array2<f64>>,
) -> Result<Box<CostFn>> {
    let net_num_in: usize = ansatz.layers_total_num_in().iter().product();
    let raw_net_num_out = raw_num_out(ansatz);
    let (game_outputs, game_inputs) = game.dim();

    if game_inputs != net_num_in {
        return Err(NetworkError::DimensionMismatch(format!(
            "the game matrix must have {} columns, got {}",
            net_num_in, game_inputs
        )));
    }
    match &postmap {
        None if game_outputs != raw_net_num_out => {
            return Err(NetworkError::DimensionMismatch(format!(
                "the game matrix must either have {} rows, or a postmap is needed",
                raw_net_num_out
            )));
        }
        Some(postmap) if postmap.nrows() != game_outputs => {
            return Err(NetworkError::DimensionMismatch(format!(
                "the postmap must have {} rows, got {}",
                game_outputs,
                postmap.nrows()
            )));
        }
        Some(postmap) if postmap.ncols() != raw_net_num_out => {
            return Err(NetworkError::DimensionMismatch(format!(
                "the postmap must have {} columns, got {}",
                raw_net_num_out,
                postmap.ncols()
            )));
        }
        _ => {}
    }

    let input_ids = network_input_ids(ansatz)?;
    let probs_qnode = joint_probs_qnode(ansatz);
    let ansatz = ansatz.clone();

    Ok(Box::new(move |network_settings: &[f64]| {
        let mut score = 0.0;
        for (i, inputs) in input_ids.iter().enumerate() {
            let qnode_settings = ansatz.qnode_settings(network_settings, inputs)?;
            let raw_probs = Array1::from(probs_qnode(&qnode_settings)?);
            let probs = match &postmap {
                Some(postmap) => postmap.dot(&raw_probs),
                None => raw_probs,
            };
            score += game.column(i).dot(&probs);
        }
        Ok(-score)
    }))
}
