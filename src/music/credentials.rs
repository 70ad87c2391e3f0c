// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Music-service credentials and their on-disk store.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Whether usable credentials are on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialState {
    /// No credentials file; the interactive authorization flow must run.
    Absent,
    /// Credentials are present and still valid.
    Stored,
    /// Credentials are present but the access token has expired.
    Expired,
}

impl CredentialState {
    /// Classifies optionally loaded credentials as of `now`.
    #[must_use]
    pub fn classify(credentials: Option<&Credentials>, now: DateTime<Utc>) -> Self {
        match credentials {
            None => Self::Absent,
            Some(c) if c.is_expired_at(now) => Self::Expired,
            Some(_) => Self::Stored,
        }
    }
}

/// Token blob issued by the music service.
///
/// Only the fields the engine needs are typed. Everything else the service
/// returned is kept in [`extra`](Self::extra) and written back unchanged.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Long-lived token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: u64,
    /// When the access token was issued.
    #[serde(default = "Utc::now", alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    /// Any other fields of the token response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Credentials {
    /// Creates credentials issued now.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_in,
            created_at: Utc::now(),
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the issue time.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns when the access token expires, or `None` if the lifetime is
    /// too large to represent.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(i64::try_from(self.expires_in).ok()?)?;
        self.created_at.checked_add_signed(lifetime)
    }

    /// Returns `true` if the access token has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Returns `true` if the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// JSON file holding the current [`Credentials`].
///
/// # Examples
///
/// ```no_run
/// use lightgrid::music::{CredentialStore, Credentials};
///
/// # async fn example() -> lightgrid::Result<()> {
/// let store = CredentialStore::new("spotify_credentials.json");
/// store.save(&Credentials::new("token", Some("refresh".into()), 3600)).await?;
///
/// let loaded = store.load().await?;
/// assert!(loaded.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored credentials. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file exists but cannot be read, or
    /// `Error::Parse` if it is not a valid credentials document.
    pub async fn load(&self) -> Result<Option<Credentials>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credentials = serde_json::from_str(&json).map_err(ParseError::from)?;
        Ok(Some(credentials))
    }

    /// Writes `credentials`, replacing the previous file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file or its directory cannot be written.
    pub async fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(credentials).map_err(ParseError::from)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::debug!(path = %self.path.display(), "Saved music-service credentials");
        Ok(())
    }

    /// Deletes the stored credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if an existing file cannot be removed.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> CredentialStore {
        let name = format!("lightgrid-creds-{}.json", uuid::Uuid::new_v4());
        CredentialStore::new(std::env::temp_dir().join(name))
    }

    #[test]
    fn expiry() {
        let issued = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let creds = Credentials::new("a", None, 3600).with_created_at(issued);

        let before = issued + TimeDelta::try_minutes(59).unwrap();
        let after = issued + TimeDelta::try_minutes(61).unwrap();
        assert!(!creds.is_expired_at(before));
        assert!(creds.is_expired_at(after));

        assert_eq!(CredentialState::classify(None, after), CredentialState::Absent);
        assert_eq!(
            CredentialState::classify(Some(&creds), before),
            CredentialState::Stored
        );
        assert_eq!(
            CredentialState::classify(Some(&creds), after),
            CredentialState::Expired
        );
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let json = r#"{
            "access_token": "at",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-read-playback-state",
            "refresh_token": "rt",
            "CreatedAt": "2024-05-01T12:00:00Z"
        }"#;
        let creds: Credentials = serde_json::from_str(json).unwrap();

        assert_eq!(creds.refresh_token.as_deref(), Some("rt"));
        assert_eq!(creds.extra["token_type"], "Bearer");

        let back = serde_json::to_value(&creds).unwrap();
        assert_eq!(back["scope"], "user-read-playback-state");
        assert_eq!(back["created_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn debug_hides_tokens() {
        let creds = Credentials::new("secret-token", Some("secret-refresh".into()), 60);
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn store_round_trip() {
        let store = temp_store();
        assert!(store.load().await.unwrap().is_none());

        let creds = Credentials::new("at", Some("rt".into()), 3600);
        store.save(&creds).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(creds));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let store = temp_store();
        tokio::fs::write(store.path(), "not json").await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, crate::Error::Parse(_)));

        store.clear().await.unwrap();
    }
}
