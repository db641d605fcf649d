//! Typed JSON cells over a string key-value backend.
//!
//! Reads and writes never fail from the caller's point of view: a missing or
//! unreadable value yields the supplied default, and a failed write is logged
//! and dropped.

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
#[cfg(test)]
use std::collections::HashMap;
use tracing::{error, warn};

pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub struct PersistentStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> PersistentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(key, error = %error, "failed to parse stored value. using default");
                default
            }),
            Ok(None) => default,
            Err(error) => {
                warn!(key, error = %error, "failed to read stored value. using default");
                default
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let written = serde_json::to_string(value)
            .map_err(anyhow::Error::from)
            .and_then(|raw| self.backend.set(key, &raw));

        if let Err(error) = written {
            error!(key, error = %error, "failed to save value");
        }
    }

    /// The stored text under `key`, unparsed. Read failures count as missing.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        self.backend.get(key).unwrap_or_else(|error| {
            warn!(key, error = %error, "failed to read stored value");
            None
        })
    }

    pub fn save_raw(&mut self, key: &str, raw: &str) {
        if let Err(error) = self.backend.set(key, raw) {
            error!(key, error = %error, "failed to save value");
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::bail;

    /// Fails every operation, to exercise the fallback paths.
    pub(crate) struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            bail!("disk unavailable")
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            bail!("disk unavailable")
        }
    }

    #[test]
    fn missing_key_returns_default() {
        let store = PersistentStore::new(MemoryBackend::default());
        assert_eq!(store.load("missing", vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = PersistentStore::new(MemoryBackend::default());
        store.save("numbers", &vec![3, 5, 8]);

        assert_eq!(store.load::<Vec<i32>>("numbers", Vec::new()), vec![3, 5, 8]);
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let mut backend = MemoryBackend::default();
        backend.set("numbers", "{not json").expect("memory write");
        let store = PersistentStore::new(backend);

        assert_eq!(store.load("numbers", vec![0]), vec![0]);
    }

    #[test]
    fn raw_text_is_kept_byte_for_byte() {
        let mut store = PersistentStore::new(MemoryBackend::default());
        store.save_raw("notes", "{not json");

        assert_eq!(store.load_raw("notes").as_deref(), Some("{not json"));
        assert_eq!(store.load_raw("missing"), None);
    }

    #[test]
    fn backend_failures_are_swallowed() {
        let mut store = PersistentStore::new(BrokenBackend);
        store.save("numbers", &vec![1]);

        assert_eq!(store.load("numbers", vec![42]), vec![42]);
        assert_eq!(store.load_raw("numbers"), None);
    }
}
