//! Storage trait definitions.

use crate::StorageResult;

/// Trait for string key-value storage backends.
pub trait KeyValueStore: Send + Sync {
    /// Store a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value, returning whether it existed
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Store every entry or none of them.
    ///
    /// The default goes key by key and puts earlier keys back when a later
    /// write fails. Backends that can write a batch at once override it.
    fn set_all(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let mut previous = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push((*key, self.get(key)?));
        }

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.set(key, value) {
                for (key, old) in previous[..written].iter().rev() {
                    let restored = match old {
                        Some(old) => self.set(key, old),
                        None => self.delete(key).map(|_| ()),
                    };
                    if let Err(restore_err) = restored {
                        tracing::warn!(key = %key, error = %restore_err, "Failed to roll back entry");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
