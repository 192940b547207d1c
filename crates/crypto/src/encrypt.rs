use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::keys::SymmetricKey;

const PUBKEY_LEN: usize = 32;
const IV_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptError {
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid IV")]
    InvalidIv,
    #[error("ciphertext too short")]
    CiphertextTooShort,
}

/// Encrypt a short byte string under a recipient's public key.
///
/// 1. Generate an ephemeral X25519 keypair
/// 2. ECDH with the recipient, SHA-256 the shared secret into a cipher key
/// 3. Encrypt with ChaCha20-Poly1305 under a fresh nonce
///
/// Output is `base64(ephemeral_pubkey || nonce || ciphertext)`, one opaque
/// token the recipient can open with only its secret key.
pub fn seal(recipient_pubkey: &[u8; 32], plaintext: &[u8]) -> Result<String, EncryptError> {
    let ephemeral = StaticSecret::random_from_rng(OsRng);
    let ephemeral_pub = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&PublicKey::from(*recipient_pubkey));
    let cipher_key = hash(shared.as_bytes());

    let mut nonce_bytes = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher =
        ChaCha20Poly1305::new_from_slice(&cipher_key).map_err(|_| EncryptError::InvalidKey)?;
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(PUBKEY_LEN + IV_LEN + ciphertext.len());
    blob.extend_from_slice(ephemeral_pub.as_bytes());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(blob))
}

/// Open a token produced by [`seal`] with the recipient's secret key.
pub fn open(our_secret: &[u8; 32], sealed_b64: &str) -> Result<Vec<u8>, EncryptError> {
    let blob = BASE64
        .decode(sealed_b64)
        .map_err(|_| EncryptError::DecryptionFailed)?;
    if blob.len() < PUBKEY_LEN + IV_LEN {
        return Err(EncryptError::CiphertextTooShort);
    }

    let ephemeral_pub: [u8; 32] = blob[..PUBKEY_LEN]
        .try_into()
        .map_err(|_| EncryptError::InvalidKey)?;
    let nonce = Nonce::from_slice(&blob[PUBKEY_LEN..PUBKEY_LEN + IV_LEN]);
    let ciphertext = &blob[PUBKEY_LEN + IV_LEN..];

    let secret = StaticSecret::from(*our_secret);
    let shared = secret.diffie_hellman(&PublicKey::from(ephemeral_pub));
    let cipher_key = hash(shared.as_bytes());

    let cipher =
        ChaCha20Poly1305::new_from_slice(&cipher_key).map_err(|_| EncryptError::InvalidKey)?;
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptError::DecryptionFailed)
}

/// Encrypt a string layer with a single-use symmetric key.
///
/// Returns `base64(iv) ++ ":" ++ base64(ciphertext)`.
pub fn sym_encrypt(key: &SymmetricKey, plaintext: &str) -> Result<String, EncryptError> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let cipher =
        ChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| EncryptError::InvalidKey)?;
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| EncryptError::EncryptionFailed)?;

    Ok(format!("{}:{}", BASE64.encode(iv), BASE64.encode(ciphertext)))
}

/// Decrypt an `iv:ciphertext` string produced by [`sym_encrypt`].
pub fn sym_decrypt(key: &SymmetricKey, data: &str) -> Result<String, EncryptError> {
    let (iv_b64, cipher_b64) = data.split_once(':').ok_or(EncryptError::InvalidIv)?;

    let iv = BASE64.decode(iv_b64).map_err(|_| EncryptError::InvalidIv)?;
    if iv.len() != IV_LEN {
        return Err(EncryptError::InvalidIv);
    }
    let ciphertext = BASE64
        .decode(cipher_b64)
        .map_err(|_| EncryptError::DecryptionFailed)?;

    let cipher =
        ChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| EncryptError::InvalidKey)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| EncryptError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| EncryptError::DecryptionFailed)
}

fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
