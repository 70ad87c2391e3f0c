// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events emitted by the orchestration engine.

use std::time::Duration;

use crate::flow::FlowSession;
use crate::music::MusicState;
use crate::types::RgbColor;

use super::DeviceId;

/// Events published on the engine's [`EventBus`](super::EventBus).
///
/// Device failures, flow lifecycle, music-mode transitions and
/// authentication problems are all reported here instead of through
/// callbacks. Nothing in the engine waits for a subscriber: an event with no
/// listener is simply dropped.
///
/// # Examples
///
/// ```
/// use lightgrid::event::{DeviceId, LightEvent};
///
/// let event = LightEvent::device_error(DeviceId::new(), "desk", "turn_on", "timed out");
/// assert!(event.device_id().is_some());
/// assert!(!event.is_flow());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LightEvent {
    /// A light joined the group.
    DeviceAdded {
        /// Group member id.
        device_id: DeviceId,
        /// Human-readable label of the light.
        label: String,
    },

    /// A single light failed a command. The rest of the group is unaffected.
    DeviceError {
        /// Group member id.
        device_id: DeviceId,
        /// Human-readable label of the light.
        label: String,
        /// Name of the failed operation, e.g. `set_rgb_color`.
        operation: &'static str,
        /// Error description.
        message: String,
    },

    /// A color flow was sent to the group.
    FlowStarted {
        /// Session token of the new flow.
        session: FlowSession,
        /// Number of steps in the program.
        steps: usize,
        /// Time until the program finishes.
        total: Duration,
    },

    /// A running flow was cancelled by a newer intent.
    FlowSuperseded {
        /// Session token of the cancelled flow.
        session: FlowSession,
    },

    /// A flow ran to completion without being superseded.
    FlowCompleted {
        /// Session token of the finished flow.
        session: FlowSession,
    },

    /// Music mode moved to a new state.
    MusicStateChanged {
        /// The new state.
        state: MusicState,
    },

    /// A new track was detected and its artwork color pushed to the lights.
    TrackChanged {
        /// Service-side track identifier.
        track_id: String,
        /// Color derived from the artwork.
        color: RgbColor,
    },

    /// Music-service authentication failed; music mode is not running.
    AuthenticationFailed {
        /// Error description.
        message: String,
    },
}

impl LightEvent {
    /// Returns the device id for device-scoped events.
    #[must_use]
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Self::DeviceAdded { device_id, .. } | Self::DeviceError { device_id, .. } => {
                Some(*device_id)
            }
            _ => None,
        }
    }

    /// Returns the flow session for flow lifecycle events.
    #[must_use]
    pub fn session(&self) -> Option<FlowSession> {
        match self {
            Self::FlowStarted { session, .. }
            | Self::FlowSuperseded { session }
            | Self::FlowCompleted { session } => Some(*session),
            _ => None,
        }
    }

    /// Returns `true` for flow lifecycle events.
    #[must_use]
    pub fn is_flow(&self) -> bool {
        self.session().is_some()
    }

    /// Returns `true` for music-mode events.
    #[must_use]
    pub fn is_music(&self) -> bool {
        matches!(
            self,
            Self::MusicStateChanged { .. }
                | Self::TrackChanged { .. }
                | Self::AuthenticationFailed { .. }
        )
    }

    /// Creates a device error event.
    #[must_use]
    pub fn device_error(
        device_id: DeviceId,
        label: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::DeviceError {
            device_id,
            label: label.into(),
            operation,
            message: message.into(),
        }
    }
}
