// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for the orchestration engine.
//!
//! Device failures, flow lifecycle changes and music-mode transitions are
//! published as [`LightEvent`]s on an [`EventBus`], a thin wrapper over a
//! tokio broadcast channel. Any number of observers can subscribe; none is
//! required.
//!
//! # Examples
//!
//! ```
//! use lightgrid::event::{DeviceId, EventBus, LightEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(LightEvent::DeviceAdded {
//!     device_id: DeviceId::new(),
//!     label: "living room".into(),
//! });
//! assert!(rx.try_recv().is_ok());
//! ```

mod device_id;
mod event_bus;
mod light_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use light_event::LightEvent;
