//! Onion layer construction and peeling.
//!
//! A sender wraps a plaintext in one layer per hop, innermost first, so
//! the outermost layer is keyed to the entry relay. Each relay peels
//! exactly one layer to learn the next destination port and the opaque
//! remainder.

use thiserror::Error;

use peelnet_core::{encode_destination, LayeredPacket, PacketError};

use crate::encrypt::{open, seal, sym_decrypt, sym_encrypt, EncryptError};
use crate::keys::SymmetricKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeelError {
    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error("layer decryption failed: {0}")]
    Decrypt(#[from] EncryptError),
}

/// One hop of a circuit as seen by the packet builder: the hop's transport
/// port and its public key bytes.
pub type Hop = (u32, [u8; 32]);

/// Build a fully layered packet for a circuit of `hops`, addressed to
/// `exit_port` (the final receiver's transport port).
///
/// Layers are applied from the last hop outward. Each layer prepends the
/// next destination (the following hop's port, or `exit_port` for the last
/// hop), encrypts under a fresh single-use symmetric key, and seals that
/// key for the owning hop. The caller sends the result to `hops[0]`'s port.
pub fn build_packet(hops: &[Hop], exit_port: u32, plaintext: &str) -> Result<String, EncryptError> {
    let mut payload = plaintext.to_string();

    for i in (0..hops.len()).rev() {
        let next_port = if i == hops.len() - 1 {
            exit_port
        } else {
            hops[i + 1].0
        };
        let layered = format!("{}{}", encode_destination(next_port), payload);

        let key = SymmetricKey::generate();
        let sym_payload = sym_encrypt(&key, &layered)?;
        let sealed_key = seal(&hops[i].1, key.export_b64().as_bytes())?;

        payload = format!("{sealed_key}:{sym_payload}");
    }

    Ok(payload)
}

/// Peel one layer with this hop's secret key, returning the decrypted
/// layer string (destination field + inner payload, still unparsed).
pub fn peel_layer(our_secret: &[u8; 32], raw: &str) -> Result<String, PeelError> {
    let packet = LayeredPacket::parse(raw)?;

    let exported = open(our_secret, &packet.sealed_key)?;
    let exported = std::str::from_utf8(&exported).map_err(|_| EncryptError::InvalidKey)?;
    let key = SymmetricKey::import_b64(exported).map_err(|_| EncryptError::InvalidKey)?;

    Ok(sym_decrypt(&key, &packet.sym_payload)?)
}
