//! PeelNet Directory Service
//!
//! In-memory node registry: relays register their public keys at startup,
//! senders read the full snapshot when building circuits. Registration is
//! insert-or-ignore keyed by node id; there is no deletion and no
//! persistence across restarts.

mod client;
mod http;
mod registry;

pub use client::{DirectoryClient, DirectoryError};
pub use http::{router, serve};
pub use registry::NodeTable;
