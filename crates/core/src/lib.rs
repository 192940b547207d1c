//! PeelNet Core Types
//!
//! Shared data structures for the onion overlay: node identities, the
//! layered wire packet model, API bodies, and network addressing.

mod api;
mod config;
mod packet;
mod types;

pub use api::*;
pub use config::*;
pub use packet::*;
pub use types::*;
