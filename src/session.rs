//! Session credential storage.
//!
//! The bearer token is supplied by the caller (whatever performed the OAuth
//! flow) and kept for the lifetime of the session. Refresh and expiry are
//! the supplier's problem.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{DriveError, Result};
use crate::ids::validate_token;

/// Single guarded slot holding the session's access token.
///
/// Clones share the same slot, so a token set through one handle is seen by
/// every in-flight request made through another.
#[derive(Clone, Default)]
pub struct Session {
    access_token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store `token`, replacing any previous one.
    pub async fn set_token(&self, token: &str) -> Result<()> {
        validate_token(token)?;

        let mut slot = self.access_token.write().await;
        *slot = Some(token.to_string());
        Ok(())
    }

    /// Current token, or `NotInitialized` if none has been set.
    pub async fn access_token(&self) -> Result<String> {
        let slot = self.access_token.read().await;
        slot.clone().ok_or(DriveError::NotInitialized)
    }

    pub async fn is_initialized(&self) -> bool {
        self.access_token.read().await.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the token
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "ya29.a0AfH6SMBx-test-token-0001";

    #[tokio::test]
    async fn test_empty_session_is_not_initialized() {
        let session = Session::new();
        assert!(!session.is_initialized().await);
        assert!(matches!(
            session.access_token().await,
            Err(DriveError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_set_token_overwrites() {
        let session = Session::new();
        session.set_token(TOKEN).await.unwrap();
        session.set_token("ya29.a0AfH6SMBx-test-token-0002").await.unwrap();

        assert_eq!(
            session.access_token().await.unwrap(),
            "ya29.a0AfH6SMBx-test-token-0002"
        );
    }

    #[tokio::test]
    async fn test_rejected_token_keeps_previous() {
        let session = Session::new();
        session.set_token(TOKEN).await.unwrap();

        assert!(matches!(session.set_token("").await, Err(DriveError::MissingToken)));
        assert!(matches!(
            session.set_token("short").await,
            Err(DriveError::InvalidToken)
        ));
        assert_eq!(session.access_token().await.unwrap(), TOKEN);
    }

    #[tokio::test]
    async fn test_clones_share_slot() {
        let session = Session::new();
        let other = session.clone();
        other.set_token(TOKEN).await.unwrap();

        assert_eq!(session.access_token().await.unwrap(), TOKEN);
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new();
        let debug = format!("{:?}", session);
        assert!(debug.starts_with("Session"));
    }
}
