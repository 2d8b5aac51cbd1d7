//! HTTP client for the auth service.
//!
//! The service answers refused logins with 4xx statuses and a JSON body
//! (400 for missing fields, 403 when locked), so bodies are parsed for
//! every non-5xx status.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, warn};

use super::{
    AuthService, LoginRequest, LoginResponse, NetworkError, SessionStatus, VerifyFaceRequest,
    VerifyFaceResponse,
};
use crate::config::AuthConfig;

pub struct HttpAuthService {
    client: Client,
    base_url: String,
}

impl HttpAuthService {
    pub fn new(config: &AuthConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NetworkError::Unreachable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, NetworkError> {
        let status = response.status();
        if status.is_server_error() {
            warn!(status = %status, "Auth service returned a server error");
            return Err(NetworkError::ServerError(status.as_u16()));
        }
        response.json::<T>().await.map_err(|e| {
            warn!(status = %status, error = %e, "Failed to parse auth service response");
            NetworkError::InvalidResponse(e.to_string())
        })
    }
}

/// Maps a transport error onto the client's taxonomy.
fn classify(error: reqwest::Error) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout
    } else if error.is_decode() {
        NetworkError::InvalidResponse(error.to_string())
    } else if let Some(status) = error.status() {
        NetworkError::ServerError(status.as_u16())
    } else {
        NetworkError::Unreachable(error.to_string())
    }
}

#[async_trait(?Send)]
impl AuthService for HttpAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, NetworkError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.url("/login"))
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        debug!(
            status = %response.status(),
            latency_ms = start.elapsed().as_millis() as u64,
            with_face = request.face_image.is_some(),
            "Login response received"
        );
        Self::parse(response).await
    }

    async fn verify_face(
        &self,
        request: &VerifyFaceRequest,
    ) -> Result<VerifyFaceResponse, NetworkError> {
        let response = self
            .client
            .post(self.url("/verify-face"))
            .json(request)
            .send()
            .await
            .map_err(classify)?;
        Self::parse(response).await
    }

    async fn validate_session(&self, token: &str) -> Result<SessionStatus, NetworkError> {
        let response = self
            .client
            .get(self.url("/validate-session"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(SessionStatus { success: false });
        }
        Self::parse(response).await
    }

    async fn logout(&self, token: &str) -> Result<(), NetworkError> {
        let response = self
            .client
            .post(self.url("/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(NetworkError::ServerError(status.as_u16()));
        }
        Ok(())
    }
}
