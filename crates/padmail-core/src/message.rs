//! Mail message data model shared across the transport boundary.

use crate::transport::TransportError;

/// An ordered collection of mail headers.
///
/// Lookup is ASCII case-insensitive (headers arrive with arbitrary casing),
/// while iteration preserves insertion order and authored case for the send
/// side. Insert replaces any existing header of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing a case-insensitive match in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if let Some(entry) =
            self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            *entry = (name, value);
        } else {
            self.entries.push((name, value));
        }
    }

    /// Value of `name`, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a header named `name` (any case) is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Headers in insertion order, authored case intact.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// A message handed to the transport for sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Display name for the From line.
    pub from_name: String,
    /// Sender address; `None` lets the transport fall back to its configured
    /// account, and sending fails when neither exists.
    pub from_address: Option<String>,
    /// Recipient addresses; must be non-empty.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: Option<String>,
    /// HTML body.
    pub html_body: Option<String>,
    /// Custom headers, sent with authored case.
    pub headers: HeaderMap,
}

impl OutgoingMail {
    /// Check invariants every transport shares.
    ///
    /// # Errors
    ///
    /// [`TransportError::NoRecipients`] when the recipient list is empty.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.to.is_empty() {
            return Err(TransportError::NoRecipients);
        }
        Ok(())
    }
}

/// A message fetched from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMail {
    /// Transport-unique identifier, used for follow-up operations
    /// (open-by-id, mark-read).
    pub id: String,
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub from: String,
    /// Headers with case-insensitive lookup.
    pub headers: HeaderMap,
    /// Plain-text body.
    pub text_body: String,
}
