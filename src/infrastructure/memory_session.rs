// In-memory session store
use crate::application::session::SessionProvider;
use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::HashMap;
use std::sync::RwLock;

const TOKEN_LENGTH: usize = 32;

/// Token-keyed session store living in process memory. Registration
/// currently behaves like login; there is no persisted user database.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_session(&self, email: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        self.sessions
            .write()
            .unwrap()
            .insert(token.clone(), email.to_string());
        token
    }
}

#[async_trait]
impl SessionProvider for MemorySessionStore {
    async fn login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        anyhow::ensure!(!email.is_empty(), "email must not be empty");
        anyhow::ensure!(!password.is_empty(), "password must not be empty");
        Ok(self.open_session(email))
    }

    async fn signup(&self, email: &str, password: &str) -> anyhow::Result<String> {
        self.login(email, password).await
    }

    async fn logout(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }

    async fn current_user(&self, token: &str) -> Option<String> {
        self.sessions.read().unwrap().get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_then_resolve_user() {
        let store = MemorySessionStore::new();
        let token = store.login("ops@example.com", "hunter2").await.unwrap();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert_eq!(
            store.current_user(&token).await.as_deref(),
            Some("ops@example.com")
        );
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let store = MemorySessionStore::new();
        let token = store.login("ops@example.com", "hunter2").await.unwrap();

        store.logout(&token).await;
        assert!(store.current_user(&token).await.is_none());

        // Unknown tokens are ignored
        store.logout("nope").await;
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected() {
        let store = MemorySessionStore::new();
        assert!(store.login("", "hunter2").await.is_err());
        assert!(store.signup("ops@example.com", "").await.is_err());
    }
}
