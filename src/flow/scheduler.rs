// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-intent scheduler for color flows and direct color commands.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::convert::gradient_from_color;
use crate::device::DeviceGroup;
use crate::error::Result;
use crate::event::{EventBus, LightEvent};
use crate::types::{Brightness, ColorTemperature, RgbColor};

use super::ColorFlow;

/// Token identifying one started color flow.
///
/// Tokens are strictly increasing per scheduler. At most one is current at a
/// time; it stops being current as soon as a newer flow starts, a direct
/// color is set, the flow is stopped, or the flow runs to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowSession(u64);

impl FlowSession {
    /// Returns the generation number of this session.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
    }

    pub(crate) fn from_generation(generation: u64) -> Self {
        Self(generation)
    }
}

impl fmt::Display for FlowSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flow#{}", self.0)
    }
}

struct ActiveFlow {
    session: FlowSession,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct IntentState {
    next_generation: u64,
    active: Option<ActiveFlow>,
}

struct Inner<G> {
    group: G,
    intent: Arc<Mutex<IntentState>>,
    events: EventBus,
}

/// Owns the "current intent" of a [`DeviceGroup`].
///
/// Every command that changes what the lights are showing goes through one
/// async mutex, held for the duration of the device command. Commands from
/// two callers therefore never interleave on the devices, and a new intent
/// always cancels the previous flow before it is applied:
///
/// - [`start_flow`](Self::start_flow) and
///   [`start_random_flow`](Self::start_random_flow) supersede the running
///   flow and start a new one,
/// - [`set_rgb_color`](Self::set_rgb_color) and
///   [`set_color_temperature`](Self::set_color_temperature) supersede the
///   running flow and set a static color,
/// - [`toggle`](Self::toggle), [`turn_on`](Self::turn_on) and
///   [`set_brightness`](Self::set_brightness) are serialized with the above
///   but leave a running flow alone.
///
/// Each flow gets a completion timer. When it fires, the flow is marked
/// finished only if its session is still current; a superseded flow's timer
/// is aborted, and a timer that slips through anyway does nothing.
///
/// The scheduler is cheap to clone; clones share state.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use lightgrid::device::DeviceGroup;
/// use lightgrid::event::EventBus;
/// use lightgrid::flow::FlowScheduler;
/// use lightgrid::types::RgbColor;
///
/// # async fn example<G: DeviceGroup>(group: G) -> lightgrid::Result<()> {
/// let scheduler = FlowScheduler::new(group, EventBus::new());
///
/// let colors = [RgbColor::new(255, 0, 0), RgbColor::new(0, 0, 255)];
/// let session = scheduler
///     .start_random_flow(&colors, Duration::from_secs(5))
///     .await?;
/// assert_eq!(scheduler.active_flow().await, Some(session));
///
/// // A direct color cancels the flow first
/// scheduler
///     .set_rgb_color(RgbColor::new(0, 255, 0), Duration::from_millis(250))
///     .await?;
/// assert_eq!(scheduler.active_flow().await, None);
/// # Ok(())
/// # }
/// ```
pub struct FlowScheduler<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for FlowScheduler<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: DeviceGroup> FlowScheduler<G> {
    /// Creates a scheduler driving `group`.
    #[must_use]
    pub fn new(group: G, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                group,
                intent: Arc::new(Mutex::new(IntentState::default())),
                events,
            }),
        }
    }

    /// Returns the driven group.
    #[must_use]
    pub fn group(&self) -> &G {
        &self.inner.group
    }

    /// Returns the event bus flow events are published to.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Subscribes to engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LightEvent> {
        self.inner.events.subscribe()
    }

    /// Starts a flow through `colors` in random order, `per_color` each.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyFlow` for an empty list,
    /// `ValueError::ZeroDuration` for a zero `per_color`, or the group's
    /// error if the flow could not be sent.
    pub async fn start_random_flow(
        &self,
        colors: &[RgbColor],
        per_color: Duration,
    ) -> Result<FlowSession> {
        let flow = ColorFlow::randomized(colors, per_color, &mut rand::thread_rng())?;
        self.start_flow(flow).await
    }

    /// Starts a random flow through the five hue-shifted neighbours of
    /// `color`.
    ///
    /// # Errors
    ///
    /// See [`start_random_flow`](Self::start_random_flow).
    pub async fn start_gradient_flow(
        &self,
        color: RgbColor,
        per_color: Duration,
    ) -> Result<FlowSession> {
        self.start_random_flow(&gradient_from_color(color), per_color)
            .await
    }

    /// Starts `flow`, superseding any running flow.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the flow could not be sent. The previous
    /// flow is cancelled either way.
    pub async fn start_flow(&self, flow: ColorFlow) -> Result<FlowSession> {
        let mut state = self.inner.intent.lock().await;
        self.supersede(&mut state).await;

        state.next_generation += 1;
        let session = FlowSession(state.next_generation);

        self.inner.group.start_color_flow(&flow).await?;

        let total = flow.total_duration();
        let timer = tokio::spawn(complete_after(
            Arc::clone(&self.inner.intent),
            self.inner.events.clone(),
            session,
            total,
        ));
        state.active = Some(ActiveFlow { session, timer });

        #[allow(clippy::cast_possible_truncation)]
        let total_ms = total.as_millis() as u64;
        tracing::info!(%session, steps = flow.steps().len(), total_ms, "Color flow started");
        self.inner.events.publish(LightEvent::FlowStarted {
            session,
            steps: flow.steps().len(),
            total,
        });

        Ok(session)
    }

    /// Cancels any running flow and sets a static color.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the command could not be issued.
    pub async fn set_rgb_color(&self, color: RgbColor, smooth: Duration) -> Result<()> {
        let mut state = self.inner.intent.lock().await;
        self.supersede(&mut state).await;
        self.inner.group.set_rgb_color(color, smooth).await
    }

    /// Cancels any running flow and switches to white at `temperature`.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the command could not be issued.
    pub async fn set_color_temperature(
        &self,
        temperature: ColorTemperature,
        smooth: Duration,
    ) -> Result<()> {
        let mut state = self.inner.intent.lock().await;
        self.supersede(&mut state).await;
        self.inner
            .group
            .set_color_temperature(temperature, smooth)
            .await
    }

    /// Cancels the running flow, if any.
    ///
    /// Returns `true` if a flow was cancelled.
    pub async fn stop_flow(&self) -> bool {
        let mut state = self.inner.intent.lock().await;
        self.supersede(&mut state).await
    }

    /// Returns the session of the running flow.
    pub async fn active_flow(&self) -> Option<FlowSession> {
        self.inner
            .intent
            .lock()
            .await
            .active
            .as_ref()
            .map(|active| active.session)
    }

    /// Toggles the lights without touching a running flow.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the command could not be issued.
    pub async fn toggle(&self) -> Result<()> {
        let _state = self.inner.intent.lock().await;
        self.inner.group.toggle().await
    }

    /// Powers the lights on without touching a running flow.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the command could not be issued.
    pub async fn turn_on(&self) -> Result<()> {
        let _state = self.inner.intent.lock().await;
        self.inner.group.turn_on().await
    }

    /// Sets the brightness without touching a running flow.
    ///
    /// # Errors
    ///
    /// Returns the group's error if the command could not be issued.
    pub async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
        let _state = self.inner.intent.lock().await;
        self.inner.group.set_brightness(brightness).await
    }

    /// Cancels the active flow. Must be called with the intent lock held.
    async fn supersede(&self, state: &mut IntentState) -> bool {
        let Some(active) = state.active.take() else {
            return false;
        };

        active.timer.abort();
        if let Err(e) = self.inner.group.stop_color_flow().await {
            tracing::warn!(session = %active.session, error = %e, "Failed to stop color flow");
        }

        tracing::debug!(session = %active.session, "Color flow superseded");
        self.inner.events.publish(LightEvent::FlowSuperseded {
            session: active.session,
        });
        true
    }
}

async fn complete_after(
    intent: Arc<Mutex<IntentState>>,
    events: EventBus,
    session: FlowSession,
    total: Duration,
) {
    tokio::time::sleep(total).await;

    let mut state = intent.lock().await;
    if state.active.as_ref().is_some_and(|a| a.session == session) {
        state.active = None;
        tracing::debug!(%session, "Color flow completed");
        events.publish(LightEvent::FlowCompleted { session });
    } else {
        tracing::trace!(%session, "Ignoring stale flow timer");
    }
}
