//! The key-reference protocol.
//!
//! [`Exchange`] binds the cipher, the key store, and a transport into the
//! send and receive paths. The protocol convention is one reserved header,
//! [`KEY_REFERENCE_HEADER`], whose value is the bare file name of the key
//! that decrypts the message body.

use std::path::Path;

use padmail_cipher as cipher;
use tracing::{debug, info, warn};

use crate::{
    config::ExchangeConfig,
    error::ExchangeError,
    keystore::{KeyStore, StoredKey},
    message::{FetchedMail, HeaderMap, OutgoingMail},
    transport::MailTransport,
};

/// Reserved header carrying the key reference.
///
/// Sent with this exact case; matched case-insensitively on receipt.
pub const KEY_REFERENCE_HEADER: &str = "X-Pad-Key";

/// Most unread messages considered per poll.
///
/// Bounds the work done per fetch; older unread mail waits for the next
/// round.
pub const UNREAD_FETCH_CAP: usize = 3;

/// Subject line used for outgoing encrypted mail.
pub const DEFAULT_SUBJECT: &str = "Encrypted message";

/// Result of sealing a plaintext: ciphertext plus the outgoing reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Base64 ciphertext, ready to be a message body.
    pub ciphertext: String,
    /// Bare key-file name to transmit as the key reference.
    pub key_reference: String,
    /// Whether sealing generated and persisted a fresh key.
    pub key_created: bool,
}

/// Receipt for a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// The key reference that went out on the wire.
    pub key_reference: String,
    /// Whether a fresh key was created for this message.
    pub key_created: bool,
}

/// Sender/receiver of pad-encrypted mail over a [`MailTransport`].
///
/// Cipher and key-store work is synchronous; only the transport calls
/// suspend. The exchange holds no mutable state, so one instance serves
/// concurrent calls.
pub struct Exchange<T> {
    transport: T,
    keys: KeyStore,
    from_name: String,
    from_address: Option<String>,
}

impl<T: MailTransport> Exchange<T> {
    /// Exchange over `transport`, with the key store at the configured
    /// directory.
    pub fn new(transport: T, config: &ExchangeConfig) -> Self {
        Self::with_key_store(transport, KeyStore::new(&config.key_dir), config)
    }

    /// Exchange with an explicitly constructed key store (tests inject a
    /// deterministic name source this way).
    pub fn with_key_store(transport: T, keys: KeyStore, config: &ExchangeConfig) -> Self {
        Self {
            transport,
            keys,
            from_name: config.from_name.clone(),
            from_address: config.from_address.clone(),
        }
    }

    /// The key store in use.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// The transport in use.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encrypt `plaintext`, resolving `key_ref` or minting a fresh key.
    ///
    /// A reference that resolves to an existing key file loads it and reuses
    /// its bare name as the outgoing reference. Anything else (no reference,
    /// or one that resolves to nothing) generates a random key of the
    /// plaintext's byte length and persists it under a generated name — the
    /// permissive fallback belongs to the send side only.
    pub fn seal(
        &self,
        plaintext: &str,
        key_ref: Option<&str>,
    ) -> Result<SealedMessage, ExchangeError> {
        if let Some(path) = key_ref.and_then(|r| self.keys.resolve(r.trim())) {
            let key = self.keys.load(&path)?;
            let key_reference = bare_file_name(&path);
            debug!(key = %key_reference, "sealing with existing key");

            let ciphertext = cipher::encrypt(plaintext, &key)?;
            return Ok(SealedMessage { ciphertext, key_reference, key_created: false });
        }

        let key = cipher::generate_key(plaintext.len());
        let ciphertext = cipher::encrypt(plaintext, &key)?;
        let StoredKey { file_name, path } = self.keys.store_new_key(&key)?;
        info!(key = %file_name, path = %path.display(), "generated and stored fresh key");

        Ok(SealedMessage { ciphertext, key_reference: file_name, key_created: true })
    }

    /// Encrypt and send `plaintext` to `to`, transmitting only the key
    /// reference alongside the ciphertext.
    pub async fn send(
        &self,
        to: &[String],
        subject: &str,
        plaintext: &str,
        key_ref: Option<&str>,
    ) -> Result<SentMessage, ExchangeError> {
        let sealed = self.seal(plaintext, key_ref)?;

        let mut headers = HeaderMap::new();
        headers.insert(KEY_REFERENCE_HEADER, sealed.key_reference.clone());

        let mail = OutgoingMail {
            from_name: self.from_name.clone(),
            from_address: self.from_address.clone(),
            to: to.to_vec(),
            subject: subject.to_string(),
            text_body: Some(sealed.ciphertext),
            html_body: None,
            headers,
        };
        mail.validate()?;

        self.transport.send(mail).await?;
        debug!(key = %sealed.key_reference, recipients = to.len(), "encrypted mail sent");

        Ok(SentMessage { key_reference: sealed.key_reference, key_created: sealed.key_created })
    }

    /// Unread messages that carry a key reference, newest first, capped at
    /// [`UNREAD_FETCH_CAP`].
    ///
    /// Read-only: nothing is decrypted and nothing is marked read. Used to
    /// pick an id to [`open`](Self::open).
    pub async fn list_unread(&self) -> Result<Vec<FetchedMail>, ExchangeError> {
        let fetched = self.transport.fetch_unread(false).await?;
        let total = fetched.len();

        let listed: Vec<FetchedMail> = fetched
            .into_iter()
            .filter(|m| m.headers.contains(KEY_REFERENCE_HEADER))
            .take(UNREAD_FETCH_CAP)
            .collect();

        if listed.len() < total {
            warn!(skipped = total - listed.len(), "unread messages without key reference or over cap");
        }

        Ok(listed)
    }

    /// Decrypt the unread message with transport id `id` and mark it read.
    ///
    /// Marking happens only after successful decryption; any earlier failure
    /// leaves the message unread for another attempt.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::MessageNotFound`] when `id` is not among unread
    /// - [`ExchangeError::MissingKeyReference`] when the message lacks the
    ///   reserved header
    /// - [`ExchangeError::KeyNotFound`] when the reference resolves to
    ///   nothing (no fallback generation on receive)
    pub async fn open(&self, id: &str) -> Result<String, ExchangeError> {
        let fetched = self.transport.fetch_unread(false).await?;
        let message = fetched
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ExchangeError::MessageNotFound { id: id.to_string() })?;

        let reference = message
            .headers
            .get(KEY_REFERENCE_HEADER)
            .ok_or_else(|| ExchangeError::MissingKeyReference { id: id.to_string() })?;

        let path = self
            .keys
            .resolve(reference)
            .ok_or_else(|| ExchangeError::KeyNotFound { reference: reference.to_string() })?;
        let key = self.keys.load(&path)?;

        let plaintext = cipher::decrypt(&message.text_body, &key)?;
        debug!(id, key = %bare_file_name(&path), "message decrypted");

        self.transport.mark_read(id).await?;
        Ok(plaintext)
    }

    /// Generate a random key of `len` bytes and persist it under a generated
    /// name, independent of any message.
    pub fn generate_key(&self, len: usize) -> Result<StoredKey, ExchangeError> {
        let key = cipher::generate_key(len);
        let stored = self.keys.store_new_key(&key)?;
        info!(key = %stored.file_name, bytes = len, "standalone key generated");
        Ok(stored)
    }

    /// Decrypt base64 ciphertext offline against a resolved key reference.
    pub fn decrypt_with_reference(
        &self,
        ciphertext_b64: &str,
        key_ref: &str,
    ) -> Result<String, ExchangeError> {
        let path = self
            .keys
            .resolve(key_ref)
            .ok_or_else(|| ExchangeError::KeyNotFound { reference: key_ref.to_string() })?;
        let key = self.keys.load(&path)?;

        Ok(cipher::decrypt(ciphertext_b64, &key)?)
    }
}

/// Final path segment as an owned string.
fn bare_file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
