//! In-memory mailbox transport.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use padmail_core::{FetchedMail, MailTransport, OutgoingMail, TransportError};

/// Default account the mailbox resolves a missing sender address to.
const DEFAULT_ACCOUNT: &str = "harness@example.org";

#[derive(Debug)]
struct StoredMail {
    mail: FetchedMail,
    read: bool,
}

#[derive(Debug, Default)]
struct Inner {
    /// Newest first, matching the fetch contract.
    messages: Vec<StoredMail>,
    next_id: u64,
    fail_next_send: bool,
    fail_next_fetch: bool,
}

/// Shared in-memory mailbox implementing [`MailTransport`].
///
/// Clones share state, so a sender exchange and a receiver exchange built
/// over clones of one mailbox see the same messages. Ids are assigned
/// monotonically from 1 in delivery order.
#[derive(Debug, Clone)]
pub struct MemoryMailbox {
    inner: Arc<Mutex<Inner>>,
    account: Option<String>,
}

impl Default for MemoryMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMailbox {
    /// Mailbox with the default configured account.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            account: Some(DEFAULT_ACCOUNT.to_string()),
        }
    }

    /// Mailbox with no configured account: sending without an explicit
    /// sender address fails with [`TransportError::NoSenderAddress`].
    pub fn without_account() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::default())), account: None }
    }

    /// Make the next `send` fail with a transport error.
    pub fn fail_next_send(&self) {
        self.lock().fail_next_send = true;
    }

    /// Make the next `fetch_unread` fail with a transport error.
    pub fn fail_next_fetch(&self) {
        self.lock().fail_next_fetch = true;
    }

    /// Total messages delivered, read or not.
    pub fn delivered(&self) -> usize {
        self.lock().messages.len()
    }

    /// Read flag of message `id`; `None` when the id is unknown.
    pub fn is_read(&self, id: &str) -> Option<bool> {
        self.lock().messages.iter().find(|m| m.mail.id == id).map(|m| m.read)
    }

    /// The message with id `id`, if delivered.
    pub fn message(&self, id: &str) -> Option<FetchedMail> {
        self.lock().messages.iter().find(|m| m.mail.id == id).map(|m| m.mail.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MailTransport for MemoryMailbox {
    async fn send(&self, mail: OutgoingMail) -> Result<(), TransportError> {
        mail.validate()?;

        let from = mail
            .from_address
            .or_else(|| self.account.clone())
            .ok_or(TransportError::NoSenderAddress)?;

        let mut inner = self.lock();
        if inner.fail_next_send {
            inner.fail_next_send = false;
            return Err(TransportError::Send("injected send failure".to_string()));
        }

        inner.next_id += 1;
        let fetched = FetchedMail {
            id: inner.next_id.to_string(),
            subject: mail.subject,
            from,
            headers: mail.headers,
            text_body: mail.text_body.unwrap_or_default(),
        };
        inner.messages.insert(0, StoredMail { mail: fetched, read: false });
        Ok(())
    }

    async fn fetch_unread(&self, mark_read: bool) -> Result<Vec<FetchedMail>, TransportError> {
        let mut inner = self.lock();
        if inner.fail_next_fetch {
            inner.fail_next_fetch = false;
            return Err(TransportError::Fetch("injected fetch failure".to_string()));
        }

        let mut unread = Vec::new();
        for stored in &mut inner.messages {
            if stored.read {
                continue;
            }
            unread.push(stored.mail.clone());
            if mark_read {
                stored.read = true;
            }
        }
        Ok(unread)
    }

    async fn mark_read(&self, id: &str) -> Result<(), TransportError> {
        let mut inner = self.lock();
        let stored = inner
            .messages
            .iter_mut()
            .find(|m| m.mail.id == id)
            .ok_or_else(|| TransportError::Fetch(format!("unknown message id {id}")))?;
        stored.read = true;
        Ok(())
    }

    async fn unread_count(&self) -> Result<usize, TransportError> {
        Ok(self.lock().messages.iter().filter(|m| !m.read).count())
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        let mut inner = self.lock();
        let before = inner.messages.len();
        inner.messages.retain(|m| m.mail.id != id);
        if inner.messages.len() == before {
            return Err(TransportError::Fetch(format!("unknown message id {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use padmail_core::HeaderMap;

    use super::*;

    fn plain_mail(to: &str, body: &str) -> OutgoingMail {
        OutgoingMail {
            from_name: "Tester".to_string(),
            from_address: None,
            to: vec![to.to_string()],
            subject: "s".to_string(),
            text_body: Some(body.to_string()),
            html_body: None,
            headers: HeaderMap::new(),
        }
    }

    #[tokio::test]
    async fn delivers_newest_first_with_monotonic_ids() {
        let mailbox = MemoryMailbox::new();
        mailbox.send(plain_mail("a@x", "first")).await.unwrap();
        mailbox.send(plain_mail("a@x", "second")).await.unwrap();

        let unread = mailbox.fetch_unread(false).await.unwrap();
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].id, "2");
        assert_eq!(unread[0].text_body, "second");
        assert_eq!(unread[1].id, "1");
    }

    #[tokio::test]
    async fn fetch_with_mark_read_drains() {
        let mailbox = MemoryMailbox::new();
        mailbox.send(plain_mail("a@x", "once")).await.unwrap();

        assert_eq!(mailbox.fetch_unread(true).await.unwrap().len(), 1);
        assert_eq!(mailbox.fetch_unread(false).await.unwrap().len(), 0);
        assert_eq!(mailbox.unread_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_sender_needs_configured_account() {
        let strict = MemoryMailbox::without_account();
        let err = strict.send(plain_mail("a@x", "hi")).await.unwrap_err();
        assert_eq!(err, TransportError::NoSenderAddress);

        let mut mail = plain_mail("a@x", "hi");
        mail.from_address = Some("me@example.org".to_string());
        strict.send(mail).await.unwrap();
    }

    #[tokio::test]
    async fn injected_failures_fire_once() {
        let mailbox = MemoryMailbox::new();

        mailbox.fail_next_send();
        assert!(matches!(
            mailbox.send(plain_mail("a@x", "boom")).await,
            Err(TransportError::Send(_))
        ));
        mailbox.send(plain_mail("a@x", "ok")).await.unwrap();

        mailbox.fail_next_fetch();
        assert!(matches!(mailbox.fetch_unread(false).await, Err(TransportError::Fetch(_))));
        assert_eq!(mailbox.fetch_unread(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_message() {
        let mailbox = MemoryMailbox::new();
        mailbox.send(plain_mail("a@x", "gone")).await.unwrap();

        mailbox.delete("1").await.unwrap();
        assert_eq!(mailbox.delivered(), 0);
        assert!(mailbox.delete("1").await.is_err());
    }
}
