//! PeelNet Relay
//!
//! One onion router: owns a keypair generated at startup, registers with
//! the directory, and serves a single ingress that peels one encryption
//! layer and forwards the remainder. Routing is stateless; a relay cannot
//! correlate hops of the same message.

mod http;
mod node;

pub use http::{router, serve};
pub use node::{LastObserved, RelayError, RelayNode};
