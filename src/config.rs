// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration and persisted user settings.
//!
//! [`LightGridConfig`] holds the tuning knobs of the engine. Every field has
//! a default, so a configuration file only needs the values it changes:
//!
//! ```
//! use std::time::Duration;
//! use lightgrid::config::LightGridConfig;
//!
//! let config = LightGridConfig::from_json_str(r#"{ "poll_interval_ms": 5000 }"#).unwrap();
//! assert_eq!(config.poll_interval(), Duration::from_secs(5));
//! assert_eq!(config.smooth(), Duration::from_millis(250));
//! ```
//!
//! [`UserSettings`] is the small file the user edits through the UI:
//! favorite colors and the music-service client id and secret.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DiscoveryPolicy;
use crate::error::{AuthError, ParseError, Result};
use crate::music::{
    ClientCredentials, CredentialStore, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, SummaryPolicy,
};
use crate::types::RgbColor;

/// Tuning of the orchestration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightGridConfig {
    /// Music-mode poll interval in milliseconds. Values below 1000 are
    /// raised to 1000 when read.
    pub poll_interval_ms: u64,
    /// Duration of each step of palette and gradient flows, in milliseconds.
    pub flow_step_duration_ms: u64,
    /// White/black fuzz distance of the artwork summarizer, in percent.
    pub fuzz_percent: u8,
    /// Palette size of the artwork summarizer.
    pub quantize_colors: usize,
    /// Saturation boost of the artwork summarizer, in percent.
    pub saturation_boost_percent: u32,
    /// Transition time of direct color commands, in milliseconds.
    pub smooth_ms: u64,
    /// Discovery rounds before giving up.
    pub discovery_max_attempts: u32,
    /// Where music-service credentials are stored.
    pub credentials_path: PathBuf,
    /// Music-service application id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Music-service application secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl Default for LightGridConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: duration_ms(DEFAULT_POLL_INTERVAL),
            flow_step_duration_ms: 5000,
            fuzz_percent: 15,
            quantize_colors: 5,
            saturation_boost_percent: 1000,
            smooth_ms: 250,
            discovery_max_attempts: 2,
            credentials_path: PathBuf::from("spotify_credentials.json"),
            client_id: None,
            client_secret: None,
        }
    }
}

impl LightGridConfig {
    /// Parses a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if `json` is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json).map_err(ParseError::from)?)
    }

    /// Loads a JSON configuration file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file exists but cannot be read, or
    /// `Error::Parse` if it is not a valid configuration.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let config = Self::from_json_str(&json)?;
                tracing::info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sets the music-mode poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_ms(interval);
        self
    }

    /// Sets the per-step duration of palette and gradient flows.
    #[must_use]
    pub fn with_flow_step_duration(mut self, duration: Duration) -> Self {
        self.flow_step_duration_ms = duration_ms(duration);
        self
    }

    /// Sets the transition time of direct color commands.
    #[must_use]
    pub fn with_smooth(mut self, smooth: Duration) -> Self {
        self.smooth_ms = duration_ms(smooth);
        self
    }

    /// Sets the artwork summarizer tuning.
    #[must_use]
    pub fn with_summary_policy(mut self, policy: SummaryPolicy) -> Self {
        self.fuzz_percent = policy.fuzz_percent;
        self.quantize_colors = policy.colors;
        self.saturation_boost_percent = policy.saturation_boost_percent;
        self
    }

    /// Sets the number of discovery rounds.
    #[must_use]
    pub fn with_discovery_max_attempts(mut self, attempts: u32) -> Self {
        self.discovery_max_attempts = attempts;
        self
    }

    /// Sets the credentials file path.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Sets the music-service application id and secret.
    #[must_use]
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Takes the client id and secret from `settings` where they are set.
    #[must_use]
    pub fn with_user_settings(mut self, settings: &UserSettings) -> Self {
        if settings.client_id.is_some() {
            self.client_id.clone_from(&settings.client_id);
        }
        if settings.client_secret.is_some() {
            self.client_secret.clone_from(&settings.client_secret);
        }
        self
    }

    /// Returns the poll interval, raised to the 1000 ms floor if needed.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        let configured = Duration::from_millis(self.poll_interval_ms);
        if configured < MIN_POLL_INTERVAL {
            tracing::warn!(
                configured_ms = self.poll_interval_ms,
                "Poll interval below 1000 ms, using the minimum"
            );
            return MIN_POLL_INTERVAL;
        }
        configured
    }

    /// Returns the per-step flow duration.
    #[must_use]
    pub fn flow_step_duration(&self) -> Duration {
        Duration::from_millis(self.flow_step_duration_ms)
    }

    /// Returns the direct-command transition time.
    #[must_use]
    pub fn smooth(&self) -> Duration {
        Duration::from_millis(self.smooth_ms)
    }

    /// Returns the artwork summarizer tuning.
    #[must_use]
    pub fn summary_policy(&self) -> SummaryPolicy {
        SummaryPolicy::default()
            .with_fuzz_percent(self.fuzz_percent)
            .with_colors(self.quantize_colors)
            .with_saturation_boost_percent(self.saturation_boost_percent)
    }

    /// Returns the discovery retry budget.
    #[must_use]
    pub fn discovery_policy(&self) -> DiscoveryPolicy {
        DiscoveryPolicy::default().with_max_attempts(self.discovery_max_attempts)
    }

    /// Returns the credentials store.
    #[must_use]
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(self.credentials_path.clone())
    }

    /// Returns the music-service client credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingClientCredentials` if the id or the secret
    /// is not configured.
    pub fn client_credentials(&self) -> std::result::Result<ClientCredentials, AuthError> {
        ClientCredentials::from_parts(self.client_id.as_deref(), self.client_secret.as_deref())
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Settings the user edits: favorite colors and music-service credentials.
///
/// Field names are camel-case on disk. The `spotifyClientId` and
/// `spotifyClientSecret` names of older settings files are accepted.
///
/// # Examples
///
/// ```
/// use lightgrid::config::UserSettings;
/// use lightgrid::types::RgbColor;
///
/// let mut settings = UserSettings::default();
/// assert!(settings.add_favorite(RgbColor::new(255, 0, 0)));
/// assert!(!settings.add_favorite(RgbColor::new(255, 0, 0)));
/// assert_eq!(settings.favorite_colors.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    /// Colors pinned to the front of the palette grid.
    pub favorite_colors: Vec<RgbColor>,
    /// Music-service application id.
    #[serde(alias = "spotifyClientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Music-service application secret.
    #[serde(alias = "spotifyClientSecret", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl UserSettings {
    /// Conventional file name of the settings file.
    pub const FILE_NAME: &'static str = "UserSettings.json";

    /// Loads settings from `path`. A missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file exists but cannot be read, or
    /// `Error::Parse` if it is not a valid settings document.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(json) => {
                let settings = serde_json::from_str(&json).map_err(ParseError::from)?;
                tracing::debug!(path = %path.display(), "Loaded user settings");
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Saves settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self).map_err(ParseError::from)?;
        tokio::fs::write(path, json).await?;

        tracing::info!(path = %path.display(), "Saved user settings");
        Ok(())
    }

    /// Adds a favorite. Returns `false` if it was already present.
    pub fn add_favorite(&mut self, color: RgbColor) -> bool {
        if self.favorite_colors.contains(&color) {
            return false;
        }
        self.favorite_colors.push(color);
        true
    }

    /// Removes the favorite at `index`.
    pub fn remove_favorite(&mut self, index: usize) -> Option<RgbColor> {
        (index < self.favorite_colors.len()).then(|| self.favorite_colors.remove(index))
    }
}
