//! Error type for the key-reference protocol.
//!
//! One enum spans the whole exchange: its own protocol failures plus
//! transparent wrappers for the cipher, key-store, and transport layers, so
//! callers match on a single type while each layer keeps its own error
//! vocabulary.

use padmail_cipher::CipherError;
use thiserror::Error;

use crate::{keystore::KeyStoreError, transport::TransportError};

/// Errors from [`Exchange`](crate::exchange::Exchange) operations.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// A message selected for decryption carries no key-reference header.
    ///
    /// Such messages are filtered out of listings; this fires only when one
    /// is explicitly opened by id anyway.
    #[error("message {id} has no key reference header")]
    MissingKeyReference {
        /// Transport id of the offending message.
        id: String,
    },

    /// A key reference resolved to nothing.
    ///
    /// On the receive side there is no fallback: without the sender's key
    /// bytes the ciphertext cannot be reconstructed.
    #[error("no key file found for reference {reference:?}")]
    KeyNotFound {
        /// The reference that failed to resolve.
        reference: String,
    },

    /// No unread message with the requested id.
    #[error("no unread message with id {id}")]
    MessageNotFound {
        /// The id that was requested.
        id: String,
    },

    /// Pad transform failure (malformed base64, empty key, non-UTF-8 output).
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Key file I/O failure.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    /// Transport failure, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
