use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key encoding")]
    InvalidEncoding,
    #[error("invalid key length")]
    InvalidLength,
}

/// Asymmetric keypair owned by a relay (X25519).
///
/// Generated once at startup and never rotated. The public key travels
/// to the directory as base64; the secret key leaves the process only
/// through the diagnostic introspection route.
pub struct EncryptionKeypair {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl Clone for EncryptionKeypair {
    fn clone(&self) -> Self {
        let secret = StaticSecret::from(*self.secret.as_bytes());
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }
}

impl EncryptionKeypair {
    /// Generate a new random keypair from the OS entropy source.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    pub fn secret_key_bytes(&self) -> [u8; 32] {
        *self.secret.as_bytes()
    }

    /// Export the public key as transportable base64.
    pub fn public_key_b64(&self) -> String {
        BASE64.encode(self.public_key_bytes())
    }

    /// Export the secret key as base64 (diagnostic use only).
    pub fn secret_key_b64(&self) -> String {
        BASE64.encode(self.secret_key_bytes())
    }

    pub fn from_secret_b64(encoded: &str) -> Result<Self, KeyError> {
        let secret = StaticSecret::from(decode_key_bytes(encoded)?);
        let public = X25519PublicKey::from(&secret);
        Ok(Self { secret, public })
    }
}

/// Decode a base64 public key as exported by `public_key_b64`.
pub fn public_key_from_b64(encoded: &str) -> Result<[u8; 32], KeyError> {
    decode_key_bytes(encoded)
}

fn decode_key_bytes(encoded: &str) -> Result<[u8; 32], KeyError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|_| KeyError::InvalidEncoding)?;
    bytes.try_into().map_err(|_| KeyError::InvalidLength)
}

/// Single-use symmetric key for one onion layer.
///
/// Freshly generated per layer from the OS entropy source; exported as
/// base64 only to be sealed under the owning hop's public key.
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn export_b64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn import_b64(encoded: &str) -> Result<Self, KeyError> {
        Ok(Self(decode_key_bytes(encoded)?))
    }
}
