//! PeelNet Crypto Provider
//!
//! Key generation, asymmetric seal/open, symmetric encryption, and the
//! onion layer operations built on top of them. Asymmetric encryption is
//! X25519 ephemeral ECDH + ChaCha20-Poly1305; symmetric layers use
//! ChaCha20-Poly1305 with a fresh IV per layer. All wire encodings are
//! base64, which never emits the `:` packet delimiter.

mod encrypt;
mod keys;
mod onion;

pub use encrypt::{open, seal, sym_decrypt, sym_encrypt, EncryptError};
pub use keys::{public_key_from_b64, EncryptionKeypair, KeyError, SymmetricKey};
pub use onion::{build_packet, peel_layer, Hop, PeelError};
