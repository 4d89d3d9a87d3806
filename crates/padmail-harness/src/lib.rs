//! Test harness for the Padmail protocol.
//!
//! An in-memory [`MemoryMailbox`] stands in for the real mail transport so
//! the key-reference protocol can be exercised end to end without a network:
//! sender and receiver exchanges share one mailbox, and tests inspect read
//! flags and delivered messages directly. Failure injection covers the
//! transport-error propagation paths.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod mailbox;

pub use mailbox::MemoryMailbox;

/// Name source that always yields `name`, for deterministic key files.
pub fn fixed_name_source(name: &str) -> impl Fn() -> String + Send + Sync + 'static {
    let name = name.to_string();
    move || name.clone()
}

/// Name source yielding `prefix_0.bin`, `prefix_1.bin`, ... in call order.
pub fn sequential_name_source(prefix: &str) -> impl Fn() -> String + Send + Sync + 'static {
    use std::sync::atomic::{AtomicU64, Ordering};

    let prefix = prefix.to_string();
    let counter = AtomicU64::new(0);
    move || format!("{prefix}_{}.bin", counter.fetch_add(1, Ordering::Relaxed))
}
