//! Login form input and its validation.

use thiserror::Error;

use crate::attempts::Identity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Raw login form values as typed by the user.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trims the name and email, derives the attempt key and checks every
    /// field is set.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let identity = Identity::parse(&self.email).ok_or(ValidationError::MissingField("email"))?;
        if self.password.trim().is_empty() {
            return Err(ValidationError::MissingField("password"));
        }

        Ok(Credentials {
            name: name.to_string(),
            email: self.email.trim().to_string(),
            identity,
            password: self.password.clone(),
        })
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A validated form.
#[derive(Clone)]
pub struct Credentials {
    pub name: String,
    /// The email as typed, minus surrounding whitespace. This is what the
    /// auth service and the session keys see.
    pub email: String,
    /// Lower-cased key for the attempt counters only.
    pub identity: Identity,
    pub password: String,
}
