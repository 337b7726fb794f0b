use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Worker,
    Lender,
    Company,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Lender => "lender",
            Self::Company => "company",
        }
    }
}

/// Identity attached to a session; also the shape of the stored `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

/// Signed-in state, valid from `created_at` until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user: SessionUser,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Login/sign-up form payload. Any email/password pair is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Form fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl LoginForm {
    const DEFAULT_NAME: &'static str = "User";

    pub fn validate(&self) -> Result<Credentials, SessionError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(SessionError::Validation(
                "Email and password required".to_string(),
            ));
        }

        let name = self.name.trim();
        if self.mode == AuthMode::Signup && name.is_empty() {
            return Err(SessionError::Validation(
                "Name required for signup".to_string(),
            ));
        }

        Ok(Credentials {
            email: email.to_string(),
            name: if name.is_empty() {
                Self::DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            role: self.role.unwrap_or_default(),
        })
    }
}

/// Raw values a browser client kept under `isAuthenticated` and `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientStorageSnapshot {
    #[serde(default, rename = "isAuthenticated")]
    pub is_authenticated: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl ClientStorageSnapshot {
    pub const AUTH_FLAG_KEY: &'static str = "isAuthenticated";
    pub const USER_KEY: &'static str = "user";

    pub fn signed_in(user: &SessionUser) -> Result<Self, SessionError> {
        let encoded =
            serde_json::to_string(user).map_err(|err| SessionError::Storage(err.to_string()))?;
        Ok(Self {
            is_authenticated: Some("true".to_string()),
            user: Some(encoded),
        })
    }

    /// `Ok(None)` means signed out. A set flag with an unreadable `user`
    /// value is an error rather than a silent sign-out.
    pub fn decode(&self) -> Result<Option<SessionUser>, SessionError> {
        if self.is_authenticated.as_deref() != Some("true") {
            return Ok(None);
        }

        let Some(raw) = self.user.as_deref() else {
            return Ok(None);
        };

        serde_json::from_str(raw)
            .map(Some)
            .map_err(|err| SessionError::CorruptStoredUser(err.to_string()))
    }
}
