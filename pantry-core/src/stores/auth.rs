use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{Storage, StorageExt, AUTH_KEY};
use crate::types::{AuthSession, UserProfile};

/// Bearer token and user of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStore {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl AuthStore {
    pub fn load(storage: &dyn Storage) -> Self {
        storage.load(AUTH_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        if self.token.is_none() {
            return storage.remove(AUTH_KEY);
        }
        storage.save(AUTH_KEY, self)
    }

    pub fn set_session(&mut self, session: AuthSession) {
        tracing::info!(user_id = session.user.id, "signed in");
        self.token = Some(session.token);
        self.user = Some(session.user);
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn session() -> AuthSession {
        AuthSession {
            token: "abc123".to_string(),
            user: UserProfile {
                id: 7,
                email: "cook@example.com".to_string(),
                display_name: None,
            },
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let storage = MemoryStorage::new();
        let mut auth = AuthStore::load(&storage);
        assert!(!auth.is_authenticated());

        auth.set_session(session());
        assert_eq!(auth.bearer().as_deref(), Some("Bearer abc123"));
        auth.save(&storage).unwrap();
        assert_eq!(AuthStore::load(&storage).user().map(|u| u.id), Some(7));

        auth.clear();
        auth.save(&storage).unwrap();
        assert!(storage.keys().is_empty());
    }
}
