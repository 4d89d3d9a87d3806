//! The transport collaborator boundary.
//!
//! [`MailTransport`] is the only seam where the core suspends: everything on
//! the cipher and key-store side is synchronous. Implementations do the
//! actual mail plumbing (the in-memory harness for tests, SMTP/IMAP in a real
//! deployment); the core calls them and propagates their failures unchanged.
//! Cancellation is cooperative: dropping the returned future aborts the
//! in-flight boundary call. The core applies no retry policy.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{FetchedMail, OutgoingMail};

/// Errors from the transport collaborator, opaque to the core.
///
/// The stage variants carry the underlying transport's own message; the core
/// never inspects it beyond surfacing it to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connecting to the mail backend failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Authentication with the mail backend failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Sending a message failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Fetching or flagging messages failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// An outgoing message had an empty recipient list.
    #[error("at least one recipient required")]
    NoRecipients,

    /// No sender address was supplied and the transport has no configured
    /// default account.
    #[error("sender address required and no default account configured")]
    NoSenderAddress,

    /// The transport does not implement an optional operation.
    #[error("transport does not support {0}")]
    Unsupported(&'static str),
}

/// Narrow interface to whatever moves mail.
///
/// Required operations are the three the protocol needs; the rest are
/// optional conveniences a backend may support (a transport that cannot
/// answers [`TransportError::Unsupported`]).
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message.
    ///
    /// Implementations must honor [`OutgoingMail::validate`] and resolve a
    /// missing `from_address` from their configured account, failing with
    /// [`TransportError::NoSenderAddress`] when neither exists. Custom
    /// headers go out with authored case.
    async fn send(&self, mail: OutgoingMail) -> Result<(), TransportError>;

    /// Fetch unread messages, newest first.
    ///
    /// `mark_read` controls whether fetching flags the returned messages as
    /// read. Implementations may cap the batch; the protocol layer applies
    /// its own cap regardless.
    async fn fetch_unread(&self, mark_read: bool) -> Result<Vec<FetchedMail>, TransportError>;

    /// Flag one message as read.
    async fn mark_read(&self, id: &str) -> Result<(), TransportError>;

    /// Number of unread messages. Optional.
    async fn unread_count(&self) -> Result<usize, TransportError> {
        Err(TransportError::Unsupported("unread_count"))
    }

    /// Delete one message. Optional.
    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        let _ = id;
        Err(TransportError::Unsupported("delete"))
    }
}
