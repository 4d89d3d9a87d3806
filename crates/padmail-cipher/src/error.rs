//! Error type for the pad transform.

use thiserror::Error;

/// Errors that can occur while encrypting or decrypting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// An empty key was supplied for non-empty data.
    ///
    /// Cyclic extension has no bytes to repeat, so there is no meaningful
    /// normalization of an empty key against a non-empty message.
    #[error("key must not be empty")]
    EmptyKey,

    /// Ciphertext was not valid base64.
    #[error("malformed base64 ciphertext: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decrypted bytes were not valid UTF-8.
    ///
    /// Almost always means the wrong key was used: XOR with an unrelated key
    /// produces byte soup that rarely happens to be UTF-8.
    #[error("decrypted bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
