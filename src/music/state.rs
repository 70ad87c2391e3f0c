// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Music-mode lifecycle state and per-run session data.

use std::fmt;
use std::time::Duration;

use super::CredentialState;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Shortest poll interval accepted. Faster polling risks service rate limits.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Lifecycle of music mode.
///
/// ```text
/// Idle -> Authenticating -> Running -> Stopped
///  ^            |                        |
///  +------------+ (auth failed)          |
///  +-------------------------------------+ (start again)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MusicState {
    /// Not started, or returned here after a failed start.
    #[default]
    Idle,
    /// Waiting for the music service to hand out credentials.
    Authenticating,
    /// The polling loop is running.
    Running,
    /// Stopped by the user.
    Stopped,
}

impl MusicState {
    /// Returns `true` while a start is in progress or the loop runs.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Authenticating | Self::Running)
    }
}

impl fmt::Display for MusicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Authenticating => "authenticating",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// State owned by one run of the polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicSession {
    poll_interval: Duration,
    last_track_id: Option<String>,
    credentials: CredentialState,
}

impl MusicSession {
    /// Creates a session polling every `poll_interval`, raised to
    /// [`MIN_POLL_INTERVAL`] if shorter.
    #[must_use]
    pub fn new(poll_interval: Duration, credentials: CredentialState) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            last_track_id: None,
            credentials,
        }
    }

    /// Pause between two polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Track whose color was last pushed to the lights.
    #[must_use]
    pub fn last_track_id(&self) -> Option<&str> {
        self.last_track_id.as_deref()
    }

    /// Returns `true` if `track_id` differs from the last pushed track.
    #[must_use]
    pub fn is_new_track(&self, track_id: &str) -> bool {
        self.last_track_id.as_deref() != Some(track_id)
    }

    /// Records `track_id` as pushed.
    pub fn remember_track(&mut self, track_id: impl Into<String>) {
        self.last_track_id = Some(track_id.into());
    }

    /// Credential state the session was started with.
    #[must_use]
    pub fn credentials(&self) -> CredentialState {
        self.credentials
    }

    pub(crate) fn set_credentials(&mut self, credentials: CredentialState) {
        self.credentials = credentials;
    }
}

impl Default for MusicSession {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, CredentialState::Absent)
    }
}
