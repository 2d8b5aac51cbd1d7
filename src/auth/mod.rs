//! Auth service collaborator.
//!
//! The remote service checks credentials, verifies faces and manages
//! sessions. This module defines its contract, a scripted implementation
//! for tests and demos, and an HTTP client behind the `network` feature.

#[cfg(feature = "network")]
mod http;
mod mock;
mod types;

#[cfg(feature = "network")]
pub use http::HttpAuthService;
pub use mock::ScriptedAuthService;
pub use types::{
    LoginRequest, LoginResponse, SessionStatus, VerifyFaceRequest, VerifyFaceResponse,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors talking to the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("request timed out")]
    Timeout,
    #[error("server unreachable: {0}")]
    Unreachable(String),
    #[error("server error (HTTP {0})")]
    ServerError(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Contract of the remote auth service.
#[async_trait(?Send)]
pub trait AuthService {
    /// `POST /login`. Refused credentials are an `Ok` response with
    /// `success == false`, not an error.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, NetworkError>;

    /// `POST /verify-face`.
    async fn verify_face(
        &self,
        request: &VerifyFaceRequest,
    ) -> Result<VerifyFaceResponse, NetworkError>;

    /// `GET /validate-session` with the bearer token.
    async fn validate_session(&self, token: &str) -> Result<SessionStatus, NetworkError>;

    /// `POST /logout` with the bearer token.
    async fn logout(&self, token: &str) -> Result<(), NetworkError>;
}
