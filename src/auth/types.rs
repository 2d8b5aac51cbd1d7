//! Wire types of the auth service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    /// Data URI of the challenge capture, sent only when one was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_image: Option<String>,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("ip_address", &self.ip_address)
            .field("face_image", &self.face_image.as_ref().map(|i| i.len()))
            .finish()
    }
}

/// Body returned by `POST /login`, for both accepted and refused attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub require_face: bool,
    /// Server-side failure count, when reported.
    #[serde(default)]
    pub attempts: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl LoginResponse {
    /// An accepted login carrying `token`.
    pub fn accepted(token: impl Into<String>) -> Self {
        Self {
            success: true,
            token: Some(token.into()),
            message: Some("Login successful".to_string()),
            ..Default::default()
        }
    }

    /// A refused login with the server's message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A refusal because the account is locked.
    pub fn locked() -> Self {
        Self {
            success: false,
            locked: true,
            ..Default::default()
        }
    }

    /// A refusal telling the client the next attempt needs a capture.
    pub fn face_required() -> Self {
        Self {
            success: false,
            require_face: true,
            ..Default::default()
        }
    }
}

/// Body of `POST /verify-face`.
#[derive(Clone, PartialEq, Serialize)]
pub struct VerifyFaceRequest {
    pub email: String,
    pub face_image: String,
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Debug for VerifyFaceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyFaceRequest")
            .field("email", &self.email)
            .field("face_image_len", &self.face_image.len())
            .field("attempt_number", &self.attempt_number)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyFaceResponse {
    pub success: bool,
    #[serde(default)]
    pub authorized: Option<bool>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by `GET /validate-session`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(face_image: Option<String>) -> LoginRequest {
        LoginRequest {
            name: "Ada".into(),
            email: "a@x.com".into(),
            password: "hunter2".into(),
            latitude: None,
            longitude: None,
            ip_address: None,
            face_image,
        }
    }

    #[test]
    fn test_face_image_omitted_when_absent() {
        let json = serde_json::to_value(request(None)).unwrap();
        assert!(json.get("face_image").is_none());
        assert!(json.get("latitude").unwrap().is_null());

        let json = serde_json::to_value(request(Some("data:image/jpeg;base64,AA".into()))).unwrap();
        assert_eq!(json["face_image"], "data:image/jpeg;base64,AA");
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", request(None));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_parse_refusal_with_extras() {
        let body = r#"{
            "success": false,
            "message": "Invalid credentials. Attempt 3/3 before face capture.",
            "attempts": 3,
            "max_attempts": 3,
            "require_face": true
        }"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();

        assert!(!response.success);
        assert!(response.require_face);
        assert!(!response.locked);
        assert_eq!(response.attempts, Some(3));
    }

    #[test]
    fn test_parse_minimal_success() {
        let response: LoginResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.token.is_none());
    }

    #[test]
    fn test_verify_request_timestamp_is_rfc3339() {
        let request = VerifyFaceRequest {
            email: "a@x.com".into(),
            face_image: "data:image/jpeg;base64,AA".into(),
            attempt_number: 3,
            timestamp: DateTime::parse_from_rfc3339("2026-10-14T08:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["timestamp"], "2026-10-14T08:30:00Z");
        assert_eq!(json["attempt_number"], 3);
    }
}
