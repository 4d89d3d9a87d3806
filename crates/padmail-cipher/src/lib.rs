//! Padmail Cipher Primitives
//!
//! The pad transform used by Padmail: whole-message XOR between plaintext
//! bytes and a key normalized to the plaintext's byte length, carried on the
//! wire as unwrapped standard base64. Pure functions with no I/O; key
//! persistence and resolution live in `padmail-core`.
//!
//! # Key Normalization
//!
//! A key is never rejected for having the wrong length. It is *normalized*:
//! truncated when too long, repeated cyclically when too short. Both behaviors
//! weaken the pad (truncation reuses pad material across offsets, repetition
//! reuses it within one message) and are preserved byte-for-byte for
//! compatibility with existing key files. The whole policy lives in
//! [`normalize_key`] so a strict equal-length variant could replace it without
//! touching any caller.
//!
//! # Security
//!
//! This is not a rigorous one-time pad. Nothing prevents a key file from
//! being used for more than one message, and normalization silently stretches
//! or trims key material. Treat the transform as an obfuscation layer with
//! pad-like mechanics, not as provably secure encryption.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod pad;

pub use error::CipherError;
pub use pad::{decrypt, encrypt, generate_key, normalize_key};
