//! Decryption of the face-swap service's webhook payload.
//!
//! `dataEncrypt` is base64 of AES-CBC ciphertext with PKCS#7 padding.
//! The key is the client secret's bytes (16, 24 or 32 of them, selecting
//! AES-128/192/256); the IV is the client id's bytes, truncated or
//! zero-padded to one block.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// AES block size in bytes; also the IV length.
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("client secret must be 16, 24 or 32 bytes, got {0}")]
    KeyLength(usize),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("ciphertext is not block aligned or has invalid padding")]
    Padding,

    #[error("decrypted payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decrypts webhook payloads with the configured client credentials.
#[derive(Clone)]
pub struct WebhookCipher {
    key: Vec<u8>,
    iv: [u8; BLOCK_SIZE],
}

impl WebhookCipher {
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self, CryptoError> {
        let key = client_secret.as_bytes().to_vec();
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(CryptoError::KeyLength(key.len()));
        }
        Ok(Self {
            key,
            iv: derive_iv(client_id),
        })
    }

    /// Decode and decrypt a `dataEncrypt` value into its plaintext.
    pub fn decrypt(&self, data_encrypt: &str) -> Result<String, CryptoError> {
        let ciphertext = STANDARD.decode(data_encrypt.trim())?;
        let key_len = self.key.len();
        let bad_key = |_| CryptoError::KeyLength(key_len);

        let plain = match key_len {
            16 => Aes128CbcDec::new_from_slices(&self.key, &self.iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
            24 => Aes192CbcDec::new_from_slices(&self.key, &self.iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
            _ => Aes256CbcDec::new_from_slices(&self.key, &self.iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
        }
        .map_err(|_| CryptoError::Padding)?;

        Ok(String::from_utf8(plain)?)
    }
}

impl std::fmt::Debug for WebhookCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookCipher")
            .field("key_bits", &(self.key.len() * 8))
            .finish_non_exhaustive()
    }
}

/// Client id bytes, truncated or zero-padded to one block.
pub fn derive_iv(client_id: &str) -> [u8; BLOCK_SIZE] {
    let mut iv = [0u8; BLOCK_SIZE];
    let bytes = client_id.as_bytes();
    let n = bytes.len().min(BLOCK_SIZE);
    iv[..n].copy_from_slice(&bytes[..n]);
    iv
}
