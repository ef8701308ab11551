//! The persisted session record.

use crate::{KeyValueStore, StorageKeys, StorageResult, TokenPair};

/// Three-entry session record on top of a [`KeyValueStore`].
///
/// The record is written as one batch with the logged-in marker last and
/// removed marker first, so a crash between entries leaves a record that
/// [`TokenStore::load`] treats as absent.
pub struct TokenStore {
    storage: Box<dyn KeyValueStore>,
}

impl TokenStore {
    /// Create a token store over the given backend
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the stored pair, if a complete and consistent record exists.
    ///
    /// Backend failures are logged and reported as "no session".
    pub fn load(&self) -> Option<TokenPair> {
        match self.read_record() {
            Ok(Some(pair)) => {
                tracing::debug!("Found stored session record");
                Some(pair)
            }
            Ok(None) => {
                tracing::debug!("No stored session record");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session record, treating as absent");
                None
            }
        }
    }

    /// Persist a pair. Returns `false` when the pair is invalid or the
    /// backend failed.
    ///
    /// An invalid pair invalidates the record. A failed write leaves the
    /// previous record in place when it is still intact, and invalidates
    /// whatever is left otherwise; a mix of old and new entries is never
    /// loadable.
    pub fn save(&self, tokens: &TokenPair) -> bool {
        if !tokens.is_valid() {
            tracing::warn!("Refusing to persist a token pair with an empty field");
            self.invalidate();
            return false;
        }

        let previous = self.read_record().ok().flatten();
        match self.write_record(tokens) {
            Ok(()) => {
                tracing::debug!("Session record persisted");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist session record");
                let current = self.read_record().ok().flatten();
                if previous.is_some() && current == previous {
                    tracing::info!("Previous session record kept");
                } else {
                    self.invalidate();
                }
                false
            }
        }
    }

    /// Remove the record. Failures are logged only.
    pub fn clear(&self) {
        for key in StorageKeys::RECORD.iter().rev() {
            if let Err(e) = self.storage.delete(key) {
                tracing::warn!(key = %key, error = %e, "Failed to clear session entry");
            }
        }
        tracing::debug!("Session record cleared");
    }

    fn read_record(&self) -> StorageResult<Option<TokenPair>> {
        let marker = self.storage.get(StorageKeys::IS_LOGGED_IN)?;
        if marker.as_deref() != Some(StorageKeys::LOGGED_IN_SENTINEL) {
            return Ok(None);
        }

        let access = self.storage.get(StorageKeys::ACCESS_TOKEN)?;
        let refresh = self.storage.get(StorageKeys::REFRESH_TOKEN)?;

        let pair = match (access, refresh) {
            (Some(access), Some(refresh)) => TokenPair::new(access, refresh),
            _ => return Ok(None),
        };

        Ok(pair.is_valid().then_some(pair))
    }

    fn write_record(&self, tokens: &TokenPair) -> StorageResult<()> {
        self.storage.set_all(&[
            (StorageKeys::ACCESS_TOKEN, tokens.access_token.as_str()),
            (StorageKeys::REFRESH_TOKEN, tokens.refresh_token.as_str()),
            (StorageKeys::IS_LOGGED_IN, StorageKeys::LOGGED_IN_SENTINEL),
        ])
    }

    fn invalidate(&self) {
        if let Err(e) = self.storage.delete(StorageKeys::IS_LOGGED_IN) {
            tracing::warn!(error = %e, "Failed to invalidate session record");
        }
    }
}
