//! Authentication hook: turning a client token into a character identity.
//!
//! Hearth doesn't verify identities itself; that's the identity
//! provider's job. It defines the [`Authenticator`] trait instead: one
//! async method that takes the token a client sent and returns the
//! [`CharacterId`] it proves, or an error.

use hearth_protocol::CharacterId;

use crate::SessionError;

/// Verifies a client's identity token.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use hearth_protocol::CharacterId;
/// use hearth_session::{Authenticator, SessionError};
///
/// /// Accepts tokens of the form `user:<id>`.
/// struct PrefixAuthenticator;
///
/// impl Authenticator for PrefixAuthenticator {
///     async fn verify(
///         &self,
///         token: &str,
///     ) -> Result<CharacterId, SessionError> {
///         token
///             .strip_prefix("user:")
///             .map(CharacterId::new)
///             .ok_or_else(|| SessionError::AuthFailed("bad prefix".into()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates `token` and returns the identity it belongs to.
    ///
    /// # Returns
    /// - `Ok(CharacterId)` — the token proves this identity
    /// - `Err(SessionError::InvalidToken)` — the token is unusable
    /// - `Err(SessionError::AuthFailed)` — the provider rejected it
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<CharacterId, SessionError>>
    + Send;
}

/// Accepts any non-empty token and uses it, trimmed, as the identity.
///
/// For development and tests only: anyone can claim any character.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevAuthenticator;

impl Authenticator for DevAuthenticator {
    async fn verify(&self, token: &str) -> Result<CharacterId, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::InvalidToken);
        }
        Ok(CharacterId::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_dev_token_returns_identity() {
        let id = DevAuthenticator.verify("  u-42 ").await.unwrap();
        assert_eq!(id, CharacterId::new("u-42"));
    }

    #[tokio::test]
    async fn test_verify_blank_token_returns_invalid_token() {
        let result = DevAuthenticator.verify("   ").await;
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }
}
