//! Purpose: Storage seam for the user access token.
//! Exports: `TokenStore`, `MemoryTokenStore`.
//! Role: The client reads the token per request and refreshes it from responses.
//! Invariants: An empty token is treated the same as no token.
use std::sync::RwLock;

pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        let guard = self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().filter(|token| !token.is_empty())
    }

    fn save(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(token.to_string());
    }

    fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}
