//! Padmail Protocol Core
//!
//! Everything between the pure pad transform (`padmail-cipher`) and a real
//! mail account: the key store, the key-reference protocol, and the transport
//! boundary.
//!
//! # Key-Reference Protocol
//!
//! A sender encrypts a message with a pad key, persists the key as a file in
//! a shared key directory, and transmits only the key's *file name* as a
//! custom header (`X-Pad-Key`) on the outgoing mail. The receiver reads the
//! header, resolves the name through their own key store, and decrypts. Key
//! material itself never travels in the message; both parties are assumed to
//! share the key directory contents out of band.
//!
//! ```text
//! plaintext ──► Exchange::seal ──► ciphertext (base64 body)
//!                   │                    │
//!                   ▼                    ▼
//!              KeyStore            MailTransport::send
//!          (persist/resolve)      (X-Pad-Key: <file name>)
//! ```
//!
//! # Transport Boundary
//!
//! The core never opens network connections. [`MailTransport`] is the narrow
//! seam to whatever moves mail: it sends an [`OutgoingMail`] and fetches
//! unread [`FetchedMail`]. All suspension happens at that seam; cipher and
//! key-store calls are synchronous and fast. Transport failures propagate
//! unchanged, with no retry policy in the core.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod keystore;
pub mod message;
pub mod transport;

pub use config::{ConfigError, ExchangeConfig};
pub use error::ExchangeError;
pub use exchange::{
    DEFAULT_SUBJECT, Exchange, KEY_REFERENCE_HEADER, SealedMessage, SentMessage, UNREAD_FETCH_CAP,
};
pub use keystore::{DEFAULT_KEY_DIR, KeyStore, KeyStoreError, StoredKey};
pub use message::{FetchedMail, HeaderMap, OutgoingMail};
pub use transport::{MailTransport, TransportError};
