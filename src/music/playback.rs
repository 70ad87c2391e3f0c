// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Playback status as reported by the music service.

use std::future::Future;

use crate::error::Result;

/// Location of a cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkRef {
    /// Download URL.
    pub url: String,
    /// Width in pixels, if the service reports it.
    pub width: Option<u32>,
    /// Height in pixels, if the service reports it.
    pub height: Option<u32>,
}

impl ArtworkRef {
    /// Creates a reference with unknown dimensions.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }
}

/// The item currently loaded in the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Service-side track identifier.
    pub track_id: String,
    /// Whether playback is running (as opposed to paused).
    pub is_playing: bool,
    /// Cover images, preferred first.
    pub artwork: Vec<ArtworkRef>,
}

impl TrackInfo {
    /// Creates a playing track with one cover image.
    #[must_use]
    pub fn playing(track_id: impl Into<String>, artwork_url: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            is_playing: true,
            artwork: vec![ArtworkRef::new(artwork_url)],
        }
    }

    /// Returns the preferred cover image.
    #[must_use]
    pub fn primary_artwork(&self) -> Option<&ArtworkRef> {
        self.artwork.first()
    }
}

/// Result of one playback query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Playback {
    /// Nothing is loaded in the player.
    #[default]
    Nothing,
    /// A track is loaded, playing or paused.
    Playing(TrackInfo),
}

impl Playback {
    /// Returns the track if it is actually playing.
    #[must_use]
    pub fn active_track(&self) -> Option<&TrackInfo> {
        match self {
            Self::Playing(track) if track.is_playing => Some(track),
            _ => None,
        }
    }
}

/// An authenticated connection to the music service's player API.
pub trait PlaybackSource: Send + Sync {
    /// Queries what is currently playing.
    fn current_playback(&self) -> impl Future<Output = Result<Playback>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_track_is_not_active() {
        let mut track = TrackInfo::playing("t1", "https://img/1.jpg");
        assert!(Playback::Playing(track.clone()).active_track().is_some());

        track.is_playing = false;
        assert!(Playback::Playing(track).active_track().is_none());
        assert!(Playback::Nothing.active_track().is_none());
    }

    #[test]
    fn primary_artwork_is_first() {
        let track = TrackInfo {
            track_id: "t1".into(),
            is_playing: true,
            artwork: vec![ArtworkRef::new("large"), ArtworkRef::new("small")],
        };
        assert_eq!(track.primary_artwork().unwrap().url, "large");

        let bare = TrackInfo {
            artwork: Vec::new(),
            ..track
        };
        assert!(bare.primary_artwork().is_none());
    }
}
