// Port for the session/credential provider
use async_trait::async_trait;

/// Opaque login/logout/current-user provider. The dashboard consumes only
/// `current_user` for display and gating; credentials are not interpreted
/// here.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Authenticate and return a session token.
    async fn login(&self, email: &str, password: &str) -> anyhow::Result<String>;

    /// Register and return a session token.
    async fn signup(&self, email: &str, password: &str) -> anyhow::Result<String>;

    /// Invalidate a session token. Unknown tokens are ignored.
    async fn logout(&self, token: &str);

    /// Resolve the user behind a token, if the session is live.
    async fn current_user(&self, token: &str) -> Option<String>;
}
