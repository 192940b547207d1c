use rand::seq::SliceRandom;

use peelnet_core::NodeInfo;

use crate::user::EndpointError;

/// Every circuit has exactly three hops.
pub const CIRCUIT_LEN: usize = 3;

/// Choose three distinct nodes uniformly at random, in hop order.
///
/// An unbiased shuffle then take-first-three; node ids in the directory
/// are unique, so distinctness follows. The thread RNG is not required
/// to be cryptographically strong by the circuit contract.
pub fn select_circuit(nodes: &[NodeInfo]) -> Result<Vec<NodeInfo>, EndpointError> {
    if nodes.len() < CIRCUIT_LEN {
        return Err(EndpointError::InsufficientNodes {
            available: nodes.len(),
        });
    }

    let mut pool = nodes.to_vec();
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(CIRCUIT_LEN);
    Ok(pool)
}
