//! Session flow.
//!
//! Login and signup forms, and the session they flip to authenticated. The
//! backend decides whether credentials are valid; the client only checks
//! that required fields are filled in before calling it. No token or
//! credential is kept after a call returns.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::MessageResponse;
use crate::error::{ChroniclesError, Result};

/// Body of `POST /login`.
#[derive(Clone, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /signup`.
#[derive(Clone, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub phone: String,
    pub name: String,
    pub password: String,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        phone: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            phone: phone.into(),
            name: name.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("phone", &self.phone)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ChroniclesError::missing_field(field))
    } else {
        Ok(())
    }
}

/// Which form produced an outcome; selects the fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Signup,
}

impl AuthAction {
    pub fn success_fallback(self) -> &'static str {
        match self {
            Self::Login => "Login successful!",
            Self::Signup => "Signup successful!",
        }
    }

    pub fn failure_fallback(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Signup => "Signup failed",
        }
    }
}

/// Authentication state plus the messages the last attempt surfaced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    authenticated: bool,
    email: Option<String>,
    signed_in_at: Option<DateTime<Utc>>,
    message: Option<String>,
    error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Email of the signed-in user.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn signed_in_at(&self) -> Option<DateTime<Utc>> {
        self.signed_in_at
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records the outcome of a login or signup call for `email`.
    ///
    /// Success authenticates the session and surfaces the backend's message.
    /// Failure surfaces the error and leaves the authenticated flag as it was.
    /// Returns whether the attempt succeeded.
    pub fn apply(
        &mut self,
        action: AuthAction,
        email: &str,
        outcome: &Result<MessageResponse>,
    ) -> bool {
        match outcome {
            Ok(response) => {
                self.authenticated = true;
                self.email = Some(email.to_string());
                self.signed_in_at = Some(Utc::now());
                self.message = Some(
                    response
                        .message
                        .clone()
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| action.success_fallback().to_string()),
                );
                self.error = None;
                true
            }
            Err(err) => {
                self.reject(action, err);
                false
            }
        }
    }

    /// Surfaces an error for `action` without touching the authenticated flag.
    pub fn reject(&mut self, action: AuthAction, err: &ChroniclesError) {
        self.message = None;
        self.error = Some(err.user_message(action.failure_fallback()));
    }

    /// Marks the session authenticated for a user the backend already knows,
    /// without a login round trip.
    pub fn assume(&mut self, email: impl Into<String>) {
        self.authenticated = true;
        self.email = Some(email.into());
        self.signed_in_at = Some(Utc::now());
        self.message = None;
        self.error = None;
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }
}
