//! Layered packet wire model.
//!
//! A packet with `k` remaining hops is the string
//! `sealed_key ":" sym_payload`, where `sym_payload` decrypts to a
//! 10-digit destination port followed by the packet for `k - 1` hops
//! (or the final plaintext). Raw strings are parsed into structured
//! values at the boundary; nothing downstream touches raw packets.

use thiserror::Error;

/// Width of the zero-padded decimal destination field.
pub const DEST_WIDTH: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet has no key/payload delimiter")]
    MissingDelimiter,

    #[error("layer does not start with a {DEST_WIDTH}-digit destination")]
    BadDestination,
}

/// Encode a transport port as a fixed-width destination field.
///
/// `u32` ports never exceed 10 decimal digits, so the field width holds.
pub fn encode_destination(port: u32) -> String {
    format!("{port:0DEST_WIDTH$}")
}

/// One encryption layer as it appears on the wire: a sealed symmetric key
/// and the symmetrically encrypted remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredPacket {
    pub sealed_key: String,
    pub sym_payload: String,
}

impl LayeredPacket {
    /// Split a raw message at the first `:`. The sealed key is base64 and
    /// never contains a colon, so the first delimiter is unambiguous even
    /// though the payload carries its own `iv:ciphertext` colon.
    pub fn parse(raw: &str) -> Result<Self, PacketError> {
        let (sealed_key, sym_payload) =
            raw.split_once(':').ok_or(PacketError::MissingDelimiter)?;
        Ok(Self {
            sealed_key: sealed_key.to_string(),
            sym_payload: sym_payload.to_string(),
        })
    }
}

/// A decrypted layer: where to forward next, and what to forward.
///
/// The inner payload may be another layered packet or the final plaintext;
/// a relay never needs to know which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeeledLayer {
    pub destination: u32,
    pub inner: String,
}

impl PeeledLayer {
    pub fn parse(layer: &str) -> Result<Self, PacketError> {
        let bytes = layer.as_bytes();
        if bytes.len() < DEST_WIDTH || !bytes[..DEST_WIDTH].iter().all(u8::is_ascii_digit) {
            return Err(PacketError::BadDestination);
        }
        let destination = layer[..DEST_WIDTH]
            .parse()
            .map_err(|_| PacketError::BadDestination)?;
        Ok(Self {
            destination,
            inner: layer[DEST_WIDTH..].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_zero_padded_to_width() {
        assert_eq!(encode_destination(4001), "0000004001");
        assert_eq!(encode_destination(0), "0000000000");
        assert_eq!(encode_destination(u32::MAX), "4294967295");
        assert_eq!(encode_destination(4001).len(), DEST_WIDTH);
    }

    #[test]
    fn packet_splits_at_first_delimiter_only() {
        let packet = LayeredPacket::parse("sealedKey:iv64:cipher64").unwrap();
        assert_eq!(packet.sealed_key, "sealedKey");
        assert_eq!(packet.sym_payload, "iv64:cipher64");
    }

    #[test]
    fn packet_without_delimiter_is_malformed() {
        assert_eq!(
            LayeredPacket::parse("nodelimiter"),
            Err(PacketError::MissingDelimiter)
        );
    }

    #[test]
    fn peeled_layer_roundtrip() {
        let layer = format!("{}hello", encode_destination(3042));
        let peeled = PeeledLayer::parse(&layer).unwrap();
        assert_eq!(peeled.destination, 3042);
        assert_eq!(peeled.inner, "hello");
    }

    #[test]
    fn peeled_layer_empty_inner_is_valid() {
        let peeled = PeeledLayer::parse("0000003000").unwrap();
        assert_eq!(peeled.destination, 3000);
        assert_eq!(peeled.inner, "");
    }

    #[test]
    fn short_layer_is_rejected() {
        assert_eq!(
            PeeledLayer::parse("123"),
            Err(PacketError::BadDestination)
        );
    }

    #[test]
    fn non_digit_destination_is_rejected() {
        assert_eq!(
            PeeledLayer::parse("00000x3000hello"),
            Err(PacketError::BadDestination)
        );
    }

    #[test]
    fn overflowing_destination_is_rejected() {
        // 10 digits but larger than u32::MAX
        assert_eq!(
            PeeledLayer::parse("9999999999hello"),
            Err(PacketError::BadDestination)
        );
    }

    #[test]
    fn multibyte_prefix_does_not_panic() {
        assert_eq!(
            PeeledLayer::parse("héllo world"),
            Err(PacketError::BadDestination)
        );
    }
}
