//! AES-CBC codec for protocol envelopes.
//!
//! An envelope is a 16-byte initialisation vector followed by the CBC
//! ciphertext of a PKCS#7 padded UTF-8 payload. The key length selects
//! AES-128, AES-192 or AES-256.
//!
//! CBC gives confidentiality only. There is no authentication tag, so a
//! modified envelope either fails to unpad or decrypts to different text;
//! nothing here can tell a tampered message from a genuine one.

use std::fmt;

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of the initialisation vector prefix.
pub const IV_LEN: usize = 16;

const BLOCK_LEN: usize = 16;
const AES_128_KEY_LEN: usize = 16;
const AES_192_KEY_LEN: usize = 24;
const AES_256_KEY_LEN: usize = 32;

/// Errors raised by the envelope codec.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key material is not a valid AES key size.
    #[error("shared key must be 16, 24 or 32 bytes, got {len}")]
    InvalidKeyLength {
        /// Length of the rejected key.
        len: usize,
    },
    /// Envelope is too short to hold an initialisation vector.
    #[error("envelope of {len} bytes is shorter than the {IV_LEN}-byte IV")]
    Truncated {
        /// Envelope length.
        len: usize,
    },
    /// Ciphertext is empty or not a whole number of blocks.
    #[error("ciphertext of {len} bytes is not a whole number of {BLOCK_LEN}-byte blocks")]
    Misaligned {
        /// Ciphertext length, excluding the IV.
        len: usize,
    },
    /// Padding check failed after decryption.
    #[error("invalid padding (wrong key or corrupted ciphertext)")]
    Padding,
    /// Decrypted bytes are not UTF-8.
    #[error("decrypted payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Symmetric key shared out of band between the daemon and its clients.
///
/// Key bytes are wiped on drop and never printed.
#[derive(Clone)]
pub struct SharedKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl SharedKey {
    /// Wraps raw key material.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] unless the key is 16, 24 or
    /// 32 bytes long.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CipherError> {
        let bytes = Zeroizing::new(bytes.into());
        match bytes.len() {
            AES_128_KEY_LEN | AES_192_KEY_LEN | AES_256_KEY_LEN => Ok(Self { bytes }),
            len => Err(CipherError::InvalidKeyLength { len }),
        }
    }

    /// Uses the UTF-8 bytes of a configured secret as the key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] when the encoded secret is
    /// not a valid AES key size.
    pub fn from_passphrase(secret: &str) -> Result<Self, CipherError> {
        Self::new(secret.as_bytes().to_vec())
    }

    /// Key size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }

    fn material(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SharedKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Encrypts `plaintext` under a fresh random IV and returns the envelope.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if the cipher rejects the key.
pub fn encrypt(plaintext: &[u8], key: &SharedKey) -> Result<Vec<u8>, CipherError> {
    let mut iv = [0_u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    encrypt_with_iv(plaintext, key, &iv)
}

fn encrypt_with_iv(
    plaintext: &[u8],
    key: &SharedKey,
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>, CipherError> {
    let ciphertext = match key.material().len() {
        AES_128_KEY_LEN => cbc_encrypt::<cbc::Encryptor<aes::Aes128>>(key, iv, plaintext)?,
        AES_192_KEY_LEN => cbc_encrypt::<cbc::Encryptor<aes::Aes192>>(key, iv, plaintext)?,
        _ => cbc_encrypt::<cbc::Encryptor<aes::Aes256>>(key, iv, plaintext)?,
    };
    let mut envelope = Vec::with_capacity(IV_LEN + ciphertext.len());
    envelope.extend_from_slice(iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypts an envelope and returns its payload with surrounding whitespace
/// trimmed.
///
/// # Errors
///
/// Returns a [`CipherError`] when the envelope is too short or misaligned,
/// the padding is invalid, or the payload is not UTF-8.
pub fn decrypt(envelope: &[u8], key: &SharedKey) -> Result<String, CipherError> {
    if envelope.len() < IV_LEN {
        return Err(CipherError::Truncated {
            len: envelope.len(),
        });
    }
    let (iv, ciphertext) = envelope.split_at(IV_LEN);
    if ciphertext.is_empty() || !ciphertext.len().is_multiple_of(BLOCK_LEN) {
        return Err(CipherError::Misaligned {
            len: ciphertext.len(),
        });
    }

    let plaintext = match key.material().len() {
        AES_128_KEY_LEN => cbc_decrypt::<cbc::Decryptor<aes::Aes128>>(key, iv, ciphertext)?,
        AES_192_KEY_LEN => cbc_decrypt::<cbc::Decryptor<aes::Aes192>>(key, iv, ciphertext)?,
        _ => cbc_decrypt::<cbc::Decryptor<aes::Aes256>>(key, iv, ciphertext)?,
    };
    let text = String::from_utf8(plaintext)?;
    Ok(text.trim().to_owned())
}

fn cbc_encrypt<C>(key: &SharedKey, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockEncryptMut + KeyIvInit,
{
    let cipher = C::new_from_slices(key.material(), iv).map_err(|_| {
        CipherError::InvalidKeyLength {
            len: key.material().len(),
        }
    })?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<C>(key: &SharedKey, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>
where
    C: BlockDecryptMut + KeyIvInit,
{
    let cipher = C::new_from_slices(key.material(), iv).map_err(|_| {
        CipherError::InvalidKeyLength {
            len: key.material().len(),
        }
    })?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Padding)
}
