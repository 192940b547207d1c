//! PeelNet Endpoint
//!
//! Sender/receiver role: picks a three-hop circuit from the directory
//! snapshot, applies layered encryption, and hands the packet to the
//! entry relay. Reception stores the delivered plaintext verbatim; all
//! layers were already peeled by the circuit.

mod circuit;
mod http;
mod user;

pub use circuit::{select_circuit, CIRCUIT_LEN};
pub use http::{router, serve};
pub use user::{EndpointError, LastObserved, UserNode};
