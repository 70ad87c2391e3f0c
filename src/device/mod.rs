// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device group facade.
//!
//! The engine never talks to a bulb directly. Everything above this module
//! drives a [`DeviceGroup`]: one logical light made of every discovered bulb.
//! A group command is best effort: it is applied to all members in
//! parallel, and a failing member is reported without affecting the others.
//!
//! [`LightGroup`] is the stock implementation, built from any per-bulb
//! [`Light`] driver. Members are found through a [`Locator`] with a bounded
//! retry budget described by [`DiscoveryPolicy`].
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//! use lightgrid::device::{DeviceGroup, DiscoveryPolicy, Light, LightGroup, Locator};
//! use lightgrid::event::EventBus;
//! use lightgrid::types::RgbColor;
//!
//! # async fn example<Loc: Locator>(locator: Loc) -> lightgrid::Result<()> {
//! let events = EventBus::new();
//! let group = LightGroup::initialize(&locator, &DiscoveryPolicy::default(), events).await;
//!
//! group
//!     .set_rgb_color(RgbColor::new(255, 64, 0), Duration::from_millis(250))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod discovery;
mod group;

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::flow::ColorFlow;
use crate::types::{Brightness, ColorTemperature, RgbColor};

pub use discovery::{DiscoveryPolicy, Locator, discover_lights};
pub use group::LightGroup;

/// One logical light made of every bulb the engine controls.
///
/// Implementations must not fail a group command because a single member
/// failed; per-member problems are reported out of band (see
/// [`LightEvent::DeviceError`](crate::event::LightEvent::DeviceError)).
/// An `Err` means the command could not be issued at all.
pub trait DeviceGroup: Send + Sync {
    /// Transitions every member to `color` over `smooth`.
    fn set_rgb_color(
        &self,
        color: RgbColor,
        smooth: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Switches every member to white at `temperature` over `smooth`.
    fn set_color_temperature(
        &self,
        temperature: ColorTemperature,
        smooth: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Sets the output level of every member.
    fn set_brightness(&self, brightness: Brightness) -> impl Future<Output = Result<()>> + Send;

    /// Flips the power state of every member.
    fn toggle(&self) -> impl Future<Output = Result<()>> + Send;

    /// Powers every member on.
    fn turn_on(&self) -> impl Future<Output = Result<()>> + Send;

    /// Hands a timed color program to every member. The devices run it
    /// autonomously.
    fn start_color_flow(&self, flow: &ColorFlow) -> impl Future<Output = Result<()>> + Send;

    /// Stops any color program running on the members.
    fn stop_color_flow(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Driver for a single smart bulb.
///
/// Each method maps onto one native device command. Errors are returned as
/// is; [`LightGroup`] decides how to report them.
pub trait Light: Send + Sync + 'static {
    /// Human-readable name used in logs and events.
    fn label(&self) -> &str;

    /// Opens the control connection.
    fn connect(&self) -> impl Future<Output = Result<()>> + Send;

    /// Powers the bulb on.
    fn turn_on(&self) -> impl Future<Output = Result<()>> + Send;

    /// Flips the power state.
    fn toggle(&self) -> impl Future<Output = Result<()>> + Send;

    /// Sets the output level.
    fn set_brightness(&self, brightness: Brightness) -> impl Future<Output = Result<()>> + Send;

    /// Transitions to `color` over `smooth`.
    fn set_rgb_color(
        &self,
        color: RgbColor,
        smooth: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Switches to white at `temperature` over `smooth`.
    fn set_color_temperature(
        &self,
        temperature: ColorTemperature,
        smooth: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Starts a device-side color program.
    fn start_color_flow(&self, flow: &ColorFlow) -> impl Future<Output = Result<()>> + Send;

    /// Stops the device-side color program.
    fn stop_color_flow(&self) -> impl Future<Output = Result<()>> + Send;
}
