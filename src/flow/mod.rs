// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color flows and the scheduler that owns the lights' current intent.
//!
//! - [`ColorFlow`] - a validated, timed list of [`ColorFlowStep`]s
//! - [`FlowScheduler`] - serializes flows and direct color commands so
//!   that exactly one intent is ever in effect
//! - [`FlowSession`] - token identifying one started flow

mod program;
mod scheduler;

pub use program::{ColorFlow, ColorFlowBuilder, ColorFlowStep, FlowEndAction};
pub use scheduler::{FlowScheduler, FlowSession};
