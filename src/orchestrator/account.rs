//! The signed-in account kept in persisted storage.

use crate::auth::AuthService;
use crate::storage::{KeyValueStorage, AUTH_TOKEN_KEY, USER_EMAIL_KEY, USER_NAME_KEY};

/// Session keys (`auth_token`, `user_email`, `user_name`) in storage.
#[derive(Debug, Clone)]
pub struct AccountSession<S> {
    storage: S,
}

impl<S: KeyValueStorage> AccountSession<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Records a successful login. The token is only stored if issued.
    pub fn store_login(&mut self, email: &str, name: &str, token: Option<&str>) {
        if let Some(token) = token {
            self.storage.set(AUTH_TOKEN_KEY, token);
        }
        self.storage.set(USER_EMAIL_KEY, email);
        self.storage.set(USER_NAME_KEY, name);
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY)
    }

    pub fn user_email(&self) -> Option<String> {
        self.storage.get(USER_EMAIL_KEY)
    }

    pub fn user_name(&self) -> Option<String> {
        self.storage.get(USER_NAME_KEY)
    }

    /// True when both a token and an email are stored.
    pub fn is_signed_in(&self) -> bool {
        self.token().is_some() && self.user_email().is_some()
    }

    /// Asks the auth service whether the stored token is still valid.
    /// Missing keys or a failed request count as signed out.
    pub async fn validate<A: AuthService + ?Sized>(&self, auth: &A) -> bool {
        let (Some(token), Some(_)) = (self.token(), self.user_email()) else {
            return false;
        };
        match auth.validate_session(&token).await {
            Ok(status) => status.success,
            Err(e) => {
                tracing::warn!(error = %e, "Session validation failed");
                false
            }
        }
    }

    /// Notifies the auth service (best effort) and removes the session keys.
    pub async fn logout<A: AuthService + ?Sized>(&mut self, auth: &A) {
        if let Some(token) = self.token() {
            if let Err(e) = auth.logout(&token).await {
                tracing::warn!(error = %e, "Logout request failed; clearing local session anyway");
            }
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.storage.remove(AUTH_TOKEN_KEY);
        self.storage.remove(USER_EMAIL_KEY);
        self.storage.remove(USER_NAME_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LoginRequest, LoginResponse, NetworkError, ScriptedAuthService};
    use crate::storage::MemoryStorage;

    async fn signed_in_auth(token: &str) -> ScriptedAuthService {
        let auth = ScriptedAuthService::new().then_login(LoginResponse::accepted(token));
        let request = LoginRequest {
            name: "Ada".into(),
            email: "a@x.com".into(),
            password: "pw".into(),
            latitude: None,
            longitude: None,
            ip_address: None,
            face_image: None,
        };
        auth.login(&request).await.unwrap();
        auth
    }

    #[tokio::test]
    async fn test_not_signed_in_without_keys() {
        let account = AccountSession::new(MemoryStorage::new());
        assert!(!account.is_signed_in());
        assert!(!account.validate(&ScriptedAuthService::new()).await);
    }

    #[tokio::test]
    async fn test_validate_and_logout() {
        let auth = signed_in_auth("tok").await;
        let mut account = AccountSession::new(MemoryStorage::new());
        account.store_login("a@x.com", "Ada", Some("tok"));

        assert!(account.is_signed_in());
        assert!(account.validate(&auth).await);

        account.logout(&auth).await;
        assert!(account.token().is_none());
        assert!(account.user_name().is_none());
        assert_eq!(auth.logged_out(), vec!["tok".to_string()]);
        assert!(!auth.validate_session("tok").await.unwrap().success);
    }

    #[tokio::test]
    async fn test_login_without_token_keeps_user_keys() {
        let mut account = AccountSession::new(MemoryStorage::new());
        account.store_login("a@x.com", "Ada", None);

        assert!(account.token().is_none());
        assert_eq!(account.user_email().as_deref(), Some("a@x.com"));
        assert!(!account.is_signed_in());
    }

    #[test]
    fn test_network_error_display() {
        assert_eq!(NetworkError::ServerError(502).to_string(), "server error (HTTP 502)");
    }
}
