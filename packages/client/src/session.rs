//! Operator session: bearer token and signed-in user.
//!
//! The session is an explicit object owned by the application and handed to
//! the query pipeline. Loading and saving happen only at the application
//! boundary; nothing in this crate reads ambient storage on its own.

use std::fmt;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::Result;

/// Bearer token issued by the offers API.
///
/// `Debug` is implemented manually so the secret never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
}

/// Source of the token attached to outgoing requests.
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn current_token(&self) -> Option<AccessToken>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    token: Option<AccessToken>,
    user: Option<SessionUser>,
}

#[derive(Debug, Default)]
pub struct Session {
    data: RwLock<SessionData>,
}

impl Session {
    /// An empty, signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(token: AccessToken, user: SessionUser) -> Self {
        let session = Self::new();
        session.sign_in(token, user);
        session
    }

    pub fn sign_in(&self, token: AccessToken, user: SessionUser) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(email = %user.email, "signed in");
        data.token = Some(token);
        data.user = Some(user);
    }

    pub fn sign_out(&self) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(user) = data.user.take() {
            tracing::info!(email = %user.email, "signed out");
        }
        data.token = None;
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Restore a session saved by [`Session::save`].
    ///
    /// A missing file yields a signed-out session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no saved session");
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let data: SessionData = serde_json::from_str(&contents)?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    /// Persist the session as JSON. A signed-out session removes the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if data.token.is_none() {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&data)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// [`Session::load`] from the configured session path.
    pub fn restore(config: &ClientConfig) -> Result<Self> {
        Self::load(&config.session_path)
    }

    /// [`Session::save`] to the configured session path.
    pub fn persist(&self, config: &ClientConfig) -> Result<()> {
        self.save(&config.session_path)
    }
}

impl AuthProvider for Session {
    fn is_authenticated(&self) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    fn current_token(&self) -> Option<AccessToken> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }
}
