// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `lightgrid` - adaptive lighting orchestration for networked smart lights.
//!
//! The library drives a group of bulbs as one logical light and decides what
//! that light shows: a static color, a timed color flow, or a color picked
//! from the cover art of whatever music is playing.
//!
//! # Features
//!
//! - **Color math**: RGB, HSL and HSB conversion, five-step gradients,
//!   saturation modulation ([`convert`])
//! - **Device groups**: parallel, best-effort commands over every
//!   discovered bulb ([`device`])
//! - **Color flows**: random, gradient and rainbow flows with a single
//!   owner of the current intent ([`flow`], [`palette`])
//! - **Music mode**: polling playback and pushing a color per track
//!   ([`music`])
//!
//! Light drivers, device discovery and the music service are supplied by the
//! caller through the [`Light`](device::Light), [`Locator`](device::Locator),
//! [`Authenticator`](music::Authenticator) and
//! [`PlaybackSource`](music::PlaybackSource) traits.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use lightgrid::device::{LightGroup, Locator};
//! use lightgrid::event::EventBus;
//! use lightgrid::flow::FlowScheduler;
//! use lightgrid::{LightGridConfig, RgbColor};
//!
//! # async fn example<Loc: Locator>(locator: Loc) -> lightgrid::Result<()> {
//! let config = LightGridConfig::load("lightgrid.json").await?;
//! let events = EventBus::new();
//!
//! let group = LightGroup::initialize(&locator, &config.discovery_policy(), events.clone()).await;
//! let scheduler = FlowScheduler::new(group, events);
//!
//! scheduler
//!     .start_gradient_flow(RgbColor::new(0, 128, 255), config.flow_step_duration())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod event;
pub mod flow;
pub mod music;
pub mod palette;
pub mod types;

pub use config::{LightGridConfig, UserSettings};
pub use device::{DeviceGroup, Light, LightGroup};
pub use error::{
    AuthError, DeviceError, Error, ParseError, ProtocolError, Result, SummarizeError, ValueError,
};
pub use event::{DeviceId, EventBus, LightEvent};
pub use flow::{ColorFlow, FlowScheduler, FlowSession};
pub use music::{MusicMode, MusicState};
pub use types::{Brightness, ColorTemperature, HsbColor, HslColor, RgbColor};
