//! Ports the engine is constructed with
//!
//! Storage and the color randomness are injected rather than reached as
//! globals, so a shell can pick a real backend and tests can pin both.

use serde_json::Value;

use crate::error::StoreResult;

/// Scoped key/value store holding JSON-serializable values
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` when nothing was stored yet
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: Value) -> StoreResult<()>;

    /// Human readable name for logs
    fn store_name(&self) -> &str {
        "store"
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn store_name(&self) -> &str {
        (**self).store_name()
    }
}

/// Source of palette indices for first-sight tag color assignment
pub trait ColorSource {
    /// Pick an index in `0..palette_len` for `tag`.
    ///
    /// `palette_len` is never zero.
    fn pick(&mut self, tag: &str, palette_len: usize) -> usize;
}

impl<C: ColorSource + ?Sized> ColorSource for Box<C> {
    fn pick(&mut self, tag: &str, palette_len: usize) -> usize {
        (**self).pick(tag, palette_len)
    }
}
