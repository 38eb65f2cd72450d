use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure reported by a [`TokenStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStoreError {
    /// No usable token: never set, empty, or expired
    #[error("token not set")]
    NotSet,

    /// The backing storage failed
    #[error("{0}")]
    Backend(String),
}

/// Persistence capability for the client's bearer token.
///
/// `get` must fail rather than hand back a token that is known to be expired,
/// so callers always mint a fresh one instead of sending it.
pub trait TokenStore: Send + Sync {
    /// Store `token`, valid for `ttl` from now
    fn set(&self, token: &str, ttl: Duration) -> Result<(), TokenStoreError>;

    /// Return the stored token if it is still valid
    fn get(&self) -> Result<String, TokenStoreError>;
}

/// A bearer token with its expiry instant
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: Instant,
}

impl CachedToken {
    pub fn new(value: String, ttl: Duration) -> Self {
        let now = Instant::now();
        CachedToken {
            value,
            expires_at: now.checked_add(ttl).unwrap_or(now),
        }
    }

    /// A token is usable while it is non-empty and not yet expired
    pub fn is_usable(&self) -> bool {
        !self.value.is_empty() && Instant::now() < self.expires_at
    }
}

/// Process-local token store; the default for every client.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<CachedToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn set(&self, token: &str, ttl: Duration) -> Result<(), TokenStoreError> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| TokenStoreError::Backend("token lock poisoned".to_string()))?;
        *slot = Some(CachedToken::new(token.to_string(), ttl));
        Ok(())
    }

    fn get(&self) -> Result<String, TokenStoreError> {
        let slot = self
            .token
            .lock()
            .map_err(|_| TokenStoreError::Backend("token lock poisoned".to_string()))?;
        match slot.as_ref() {
            Some(cached) if cached.is_usable() => Ok(cached.value.clone()),
            _ => Err(TokenStoreError::NotSet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_before_set() {
        let store = InMemoryTokenStore::new();
        assert_eq!(store.get(), Err(TokenStoreError::NotSet));
    }

    #[test]
    fn test_set_then_get() {
        let store = InMemoryTokenStore::new();
        store.set("tok", Duration::from_secs(3600)).unwrap();
        assert_eq!(store.get().unwrap(), "tok");
    }

    #[test]
    fn test_expired_token_is_not_returned() {
        let store = InMemoryTokenStore::new();
        store.set("tok", Duration::from_millis(250)).unwrap();
        thread::sleep(Duration::from_millis(500));
        assert_eq!(store.get(), Err(TokenStoreError::NotSet));
    }

    #[test]
    fn test_empty_token_is_not_usable() {
        let store = InMemoryTokenStore::new();
        store.set("", Duration::from_secs(3600)).unwrap();
        assert_eq!(store.get(), Err(TokenStoreError::NotSet));
    }

    #[test]
    fn test_zero_ttl() {
        let store = InMemoryTokenStore::new();
        store.set("tok", Duration::ZERO).unwrap();
        assert!(store.get().is_err());
    }

    #[test]
    fn test_overwrite() {
        let store = InMemoryTokenStore::new();
        store.set("old", Duration::from_secs(60)).unwrap();
        store.set("new", Duration::from_secs(60)).unwrap();
        assert_eq!(store.get().unwrap(), "new");
    }

    #[test]
    fn test_concurrent_access() {
        let store = Arc::new(InMemoryTokenStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let value = format!("tok-{}", i);
                    store.set(&value, Duration::from_secs(60)).unwrap();
                    let got = store.get().unwrap();
                    assert!(got.starts_with("tok-"));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
