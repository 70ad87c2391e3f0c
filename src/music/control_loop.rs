// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The music-reactive polling loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};

use crate::config::LightGridConfig;
use crate::device::DeviceGroup;
use crate::error::{Error, Result};
use crate::event::{EventBus, LightEvent};
use crate::flow::FlowScheduler;
use crate::types::RgbColor;

use super::{
    ArtworkFetcher, Authenticator, AuthorizationRequest, ClientCredentials, ColorSummarizer,
    CredentialState, CredentialStore, Credentials, MusicSession, MusicState, PlaybackSource,
};

/// What one poll of the playback source did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing is playing, or playback is paused.
    NothingPlaying,
    /// The playback query failed.
    QueryFailed,
    /// The track has not changed since the last push.
    SameTrack,
    /// A new track's color was pushed to the lights.
    Pushed(RgbColor),
    /// A new track was seen but its color could not be derived or pushed.
    /// The track will be retried on the next poll.
    Skipped,
}

struct Inner<A, F, S, G> {
    authenticator: A,
    fetcher: F,
    summarizer: S,
    scheduler: FlowScheduler<G>,
    store: CredentialStore,
    client_id: Option<String>,
    client_secret: Option<String>,
    poll_interval: Duration,
    smooth: Duration,
    state: watch::Sender<MusicState>,
    /// Id of the loop allowed to run; zero when disabled.
    active_run: AtomicU64,
    next_run: AtomicU64,
    start_lock: Mutex<()>,
}

/// Keeps the lights in sync with the cover art of the playing track.
///
/// While [`Running`](MusicState::Running), a background task polls the
/// playback source every poll interval. When a new track starts, its
/// artwork is downloaded, reduced to one color, and pushed through the
/// [`FlowScheduler`] (cancelling any running flow). Every failure inside
/// the loop is logged and skipped; the loop itself never ends on an error.
///
/// The current state is observable with [`watch`](Self::watch) and is also
/// published as [`LightEvent::MusicStateChanged`].
///
/// # Examples
///
/// ```no_run
/// use lightgrid::config::LightGridConfig;
/// use lightgrid::device::DeviceGroup;
/// use lightgrid::flow::FlowScheduler;
/// use lightgrid::music::{ArtworkFetcher, Authenticator, MusicMode, PixelSummarizer};
///
/// # async fn example<A, F, G>(auth: A, fetcher: F, scheduler: FlowScheduler<G>) -> lightgrid::Result<()>
/// # where A: Authenticator, F: ArtworkFetcher + 'static, G: DeviceGroup + 'static {
/// let config = LightGridConfig::default()
///     .with_client_credentials("client-id", "client-secret");
///
/// let music = MusicMode::new(&config, scheduler, auth, fetcher, PixelSummarizer::default());
/// music.start().await?;
/// // ...
/// music.stop();
/// # Ok(())
/// # }
/// ```
pub struct MusicMode<A, F, S, G> {
    inner: Arc<Inner<A, F, S, G>>,
}

impl<A, F, S, G> Clone for MusicMode<A, F, S, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, F, S, G> MusicMode<A, F, S, G>
where
    A: Authenticator,
    F: ArtworkFetcher + 'static,
    S: ColorSummarizer + 'static,
    G: DeviceGroup + 'static,
{
    /// Creates music mode in the [`Idle`](MusicState::Idle) state.
    #[must_use]
    pub fn new(
        config: &LightGridConfig,
        scheduler: FlowScheduler<G>,
        authenticator: A,
        fetcher: F,
        summarizer: S,
    ) -> Self {
        let (state, _) = watch::channel(MusicState::Idle);
        Self {
            inner: Arc::new(Inner {
                authenticator,
                fetcher,
                summarizer,
                scheduler,
                store: config.credential_store(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                poll_interval: config.poll_interval(),
                smooth: config.smooth(),
                state,
                active_run: AtomicU64::new(0),
                next_run: AtomicU64::new(0),
                start_lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> MusicState {
        *self.inner.state.borrow()
    }

    /// Returns a receiver that observes state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<MusicState> {
        self.inner.state.subscribe()
    }

    /// Returns the scheduler colors are pushed through.
    #[must_use]
    pub fn scheduler(&self) -> &FlowScheduler<G> {
        &self.inner.scheduler
    }

    fn events(&self) -> &EventBus {
        self.inner.scheduler.events()
    }

    /// Authenticates and starts the polling loop.
    ///
    /// Does nothing if music mode is already authenticating or running. A
    /// stopped music mode goes back to idle first.
    ///
    /// Stored credentials are used when valid and refreshed when expired;
    /// both go straight to [`Running`](MusicState::Running). Without stored
    /// credentials, music mode enters
    /// [`Authenticating`](MusicState::Authenticating) while the interactive
    /// authorization flow runs, and its result is saved. If
    /// [`stop`](Self::stop) is called before the loop is started, it is not
    /// started.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingClientCredentials` if no client id and
    /// secret are configured, or the authenticator's or credential store's
    /// error. In every error case the state returns to
    /// [`Idle`](MusicState::Idle) and [`LightEvent::AuthenticationFailed`]
    /// is published.
    pub async fn start(&self) -> Result<()> {
        let _starting = self.inner.start_lock.lock().await;

        match self.state() {
            state if state.is_active() => {
                tracing::debug!(%state, "Music mode already started");
                return Ok(());
            }
            MusicState::Stopped => self.set_state(MusicState::Idle),
            _ => {}
        }

        let client = match ClientCredentials::from_parts(
            self.inner.client_id.as_deref(),
            self.inner.client_secret.as_deref(),
        ) {
            Ok(client) => client,
            Err(e) => return Err(self.fail(e.into())),
        };

        let run = self.inner.next_run.fetch_add(1, Ordering::SeqCst) + 1;

        let (source, refreshed, session) = match self.authenticate(&client).await {
            Ok(parts) => parts,
            Err(e) => return Err(self.fail(e)),
        };

        // Run id and state change together under the watch lock, as in stop().
        let mut previous = MusicState::Idle;
        let started = self.inner.state.send_if_modified(|state| {
            if matches!(*state, MusicState::Idle | MusicState::Authenticating) {
                previous = *state;
                self.inner.active_run.store(run, Ordering::SeqCst);
                *state = MusicState::Running;
                true
            } else {
                false
            }
        });

        if !started {
            tracing::info!("Music mode stopped during authentication");
            return Ok(());
        }
        self.state_changed(previous, MusicState::Running);

        let mode = self.clone();
        tokio::spawn(async move { mode.run(run, source, refreshed, session).await });

        Ok(())
    }

    /// Stops the polling loop.
    ///
    /// Safe to call in any state and from any thread. A poll already in
    /// progress finishes, but no new poll starts.
    pub fn stop(&self) {
        let mut previous = MusicState::Stopped;
        self.inner.state.send_modify(|state| {
            previous = *state;
            self.inner.active_run.store(0, Ordering::SeqCst);
            *state = MusicState::Stopped;
        });
        self.state_changed(previous, MusicState::Stopped);
    }

    /// Runs one iteration of the loop against `source`.
    ///
    /// The last pushed track in `session` is only updated when a color was
    /// actually pushed, so a track whose artwork failed is retried.
    pub async fn poll_once<P: PlaybackSource>(
        &self,
        source: &P,
        session: &mut MusicSession,
    ) -> PollOutcome {
        let playback = match source.current_playback().await {
            Ok(playback) => playback,
            Err(e) => {
                tracing::debug!(error = %e, "Playback query failed");
                return PollOutcome::QueryFailed;
            }
        };

        let Some(track) = playback.active_track() else {
            return PollOutcome::NothingPlaying;
        };

        if !session.is_new_track(&track.track_id) {
            return PollOutcome::SameTrack;
        }

        let Some(artwork) = track.primary_artwork() else {
            tracing::debug!(track_id = %track.track_id, "Track has no artwork");
            return PollOutcome::Skipped;
        };

        let image = match self.inner.fetcher.fetch(artwork).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(track_id = %track.track_id, error = %e, "Artwork download failed");
                return PollOutcome::Skipped;
            }
        };

        let color = match self.inner.summarizer.summarize(&image) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!(track_id = %track.track_id, error = %e, "Artwork summarization failed");
                return PollOutcome::Skipped;
            }
        };

        if let Err(e) = self
            .inner
            .scheduler
            .set_rgb_color(color, self.inner.smooth)
            .await
        {
            tracing::warn!(track_id = %track.track_id, error = %e, "Failed to push track color");
            return PollOutcome::Skipped;
        }

        session.remember_track(track.track_id.clone());
        tracing::info!(track_id = %track.track_id, %color, "Track changed");
        self.events().publish(LightEvent::TrackChanged {
            track_id: track.track_id.clone(),
            color,
        });

        PollOutcome::Pushed(color)
    }

    async fn authenticate(
        &self,
        client: &ClientCredentials,
    ) -> Result<(A::Session, mpsc::UnboundedReceiver<Credentials>, MusicSession)> {
        let store = &self.inner.store;
        let stored = match store.load().await {
            Ok(stored) => stored,
            Err(Error::Parse(e)) => {
                tracing::warn!(path = %store.path().display(), error = %e, "Ignoring unreadable credentials");
                None
            }
            Err(e) => return Err(e),
        };

        let credentials = match stored {
            Some(credentials)
                if CredentialState::classify(Some(&credentials), Utc::now())
                    == CredentialState::Stored =>
            {
                credentials
            }
            Some(expired) => {
                tracing::info!("Refreshing expired music-service credentials");
                let fresh = self.inner.authenticator.refresh(client, &expired).await?;
                store.save(&fresh).await?;
                fresh
            }
            None => {
                tracing::info!("No stored credentials, starting authorization");
                if self.inner.state.send_if_modified(|state| {
                    replace_if(state, MusicState::Idle, MusicState::Authenticating)
                }) {
                    self.state_changed(MusicState::Idle, MusicState::Authenticating);
                }
                let request = AuthorizationRequest::new(client.client_id());
                let fresh = self.inner.authenticator.authorize(client, &request).await?;
                store.save(&fresh).await?;
                fresh
            }
        };

        let (refreshed_tx, refreshed_rx) = mpsc::unbounded_channel();
        let source = self
            .inner
            .authenticator
            .log_in(client, credentials, refreshed_tx)
            .await?;

        let session = MusicSession::new(self.inner.poll_interval, CredentialState::Stored);
        Ok((source, refreshed_rx, session))
    }

    async fn run(
        self,
        run: u64,
        source: A::Session,
        mut refreshed: mpsc::UnboundedReceiver<Credentials>,
        mut session: MusicSession,
    ) {
        tracing::info!(
            poll_interval_ms = u64::try_from(session.poll_interval().as_millis()).unwrap_or(u64::MAX),
            "Music loop started"
        );

        while self.is_current(run) {
            self.persist_refreshed(&mut refreshed, &mut session).await;

            let outcome = self.poll_once(&source, &mut session).await;
            tracing::trace!(?outcome, "Music poll finished");

            if !self.is_current(run) {
                break;
            }
            tokio::time::sleep(session.poll_interval()).await;
        }

        tracing::info!("Music loop exited");
    }

    async fn persist_refreshed(
        &self,
        refreshed: &mut mpsc::UnboundedReceiver<Credentials>,
        session: &mut MusicSession,
    ) {
        while let Ok(credentials) = refreshed.try_recv() {
            match self.inner.store.save(&credentials).await {
                Ok(()) => session.set_credentials(CredentialState::Stored),
                Err(e) => tracing::warn!(error = %e, "Failed to save refreshed credentials"),
            }
        }
    }

    fn is_current(&self, run: u64) -> bool {
        self.inner.active_run.load(Ordering::SeqCst) == run
    }

    fn set_state(&self, state: MusicState) {
        let previous = self.inner.state.send_replace(state);
        self.state_changed(previous, state);
    }

    fn state_changed(&self, previous: MusicState, state: MusicState) {
        if previous != state {
            tracing::info!(from = %previous, to = %state, "Music mode state changed");
            self.events()
                .publish(LightEvent::MusicStateChanged { state });
        }
    }

    fn fail(&self, error: Error) -> Error {
        tracing::warn!(error = %error, "Music mode failed to start");
        self.set_state(MusicState::Idle);
        self.events().publish(LightEvent::AuthenticationFailed {
            message: error.to_string(),
        });
        error
    }
}

fn replace_if(state: &mut MusicState, from: MusicState, to: MusicState) -> bool {
    if *state == from {
        *state = to;
        true
    } else {
        false
    }
}
