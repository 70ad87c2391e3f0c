// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Music-reactive lighting.
//!
//! [`MusicMode`] watches what a streaming service is playing and sets the
//! lights to a color taken from the current track's cover art. It is built
//! from four collaborators:
//!
//! - an [`Authenticator`] that obtains [`Credentials`] and opens a
//!   [`PlaybackSource`],
//! - an [`ArtworkFetcher`] that downloads cover images
//!   ([`HttpArtworkFetcher`] with the `http` feature),
//! - a [`ColorSummarizer`] that reduces an image to one color
//!   ([`PixelSummarizer`] for JPEG, PNG and raw pixels),
//! - a [`FlowScheduler`](crate::flow::FlowScheduler) that applies the color.
//!
//! Credentials are kept in a JSON file by [`CredentialStore`] and written
//! again whenever the playback session refreshes them.

mod artwork;
mod auth;
mod control_loop;
mod credentials;
mod playback;
mod state;
mod summarize;

#[cfg(feature = "http")]
pub use artwork::HttpArtworkFetcher;
pub use artwork::{Artwork, ArtworkFetcher, ImageFormat};
pub use auth::{
    AuthorizationRequest, Authenticator, ClientCredentials, DEFAULT_AUTHORIZE_ENDPOINT,
    DEFAULT_REDIRECT_URI, DEFAULT_SCOPES,
};
pub use control_loop::{MusicMode, PollOutcome};
pub use credentials::{CredentialState, CredentialStore, Credentials};
pub use playback::{ArtworkRef, Playback, PlaybackSource, TrackInfo};
pub use state::{DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, MusicSession, MusicState};
pub use summarize::{ColorSummarizer, PixelSummarizer, SummaryPolicy};
