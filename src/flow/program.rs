// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timed color programs.
//!
//! A [`ColorFlow`] is a list of [`ColorFlowStep`]s handed to the devices in
//! one command. The devices play it on their own; the engine only tracks
//! how long it should take.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use lightgrid::flow::{ColorFlow, FlowEndAction};
//! use lightgrid::types::{Brightness, RgbColor};
//!
//! let flow = ColorFlow::builder()
//!     .step(RgbColor::new(255, 0, 0), Brightness::FULL, Duration::from_secs(2))
//!     .step(RgbColor::new(0, 0, 255), Brightness::FULL, Duration::from_secs(3))
//!     .end_action(FlowEndAction::Recover)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(flow.steps().len(), 2);
//! assert_eq!(flow.total_duration(), Duration::from_secs(5));
//! ```

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ValueError;
use crate::types::{Brightness, RgbColor};

/// What the devices do after the last step of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowEndAction {
    /// Return to the state before the flow started.
    Recover,
    /// Hold the color of the last step.
    #[default]
    Keep,
    /// Switch off.
    TurnOff,
}

/// One transition of a color flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFlowStep {
    color: RgbColor,
    brightness: Brightness,
    duration: Duration,
}

impl ColorFlowStep {
    /// Creates a step that transitions to `color` at `brightness` over
    /// `duration`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ZeroDuration` if `duration` is zero.
    pub fn new(
        color: RgbColor,
        brightness: Brightness,
        duration: Duration,
    ) -> Result<Self, ValueError> {
        if duration.is_zero() {
            return Err(ValueError::ZeroDuration);
        }
        Ok(Self {
            color,
            brightness,
            duration,
        })
    }

    /// Target color.
    #[must_use]
    pub fn color(&self) -> RgbColor {
        self.color
    }

    /// Target brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Transition time.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// A validated, non-empty color program.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorFlow {
    steps: Vec<ColorFlowStep>,
    end_action: FlowEndAction,
}

impl ColorFlow {
    /// Creates a flow from prepared steps.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyFlow` if `steps` is empty.
    pub fn new(steps: Vec<ColorFlowStep>, end_action: FlowEndAction) -> Result<Self, ValueError> {
        if steps.is_empty() {
            return Err(ValueError::EmptyFlow);
        }
        Ok(Self { steps, end_action })
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ColorFlowBuilder {
        ColorFlowBuilder::new()
    }

    /// Builds a flow that visits `colors` in a random order, one step per
    /// color at full brightness, holding the last color when done.
    ///
    /// Every permutation of the input is equally likely.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyFlow` for an empty color list and
    /// `ValueError::ZeroDuration` for a zero `per_color`.
    pub fn randomized<R>(
        colors: &[RgbColor],
        per_color: Duration,
        rng: &mut R,
    ) -> Result<Self, ValueError>
    where
        R: Rng + ?Sized,
    {
        if colors.is_empty() {
            return Err(ValueError::EmptyFlow);
        }

        let mut order = colors.to_vec();
        order.shuffle(rng);

        let steps = order
            .into_iter()
            .map(|color| ColorFlowStep::new(color, Brightness::FULL, per_color))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(steps, FlowEndAction::Keep)
    }

    /// Returns the steps in play order.
    #[must_use]
    pub fn steps(&self) -> &[ColorFlowStep] {
        &self.steps
    }

    /// Returns the end action.
    #[must_use]
    pub fn end_action(&self) -> FlowEndAction {
        self.end_action
    }

    /// Returns the sum of all step durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(ColorFlowStep::duration).sum()
    }
}

/// Fluent builder for [`ColorFlow`].
///
/// Validation happens in [`build`](Self::build); the first invalid step is
/// reported.
#[derive(Debug, Clone, Default)]
pub struct ColorFlowBuilder {
    steps: Vec<(RgbColor, Brightness, Duration)>,
    end_action: FlowEndAction,
}

impl ColorFlowBuilder {
    /// Creates an empty builder ending with [`FlowEndAction::Keep`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, color: RgbColor, brightness: Brightness, duration: Duration) -> Self {
        self.steps.push((color, brightness, duration));
        self
    }

    /// Appends one full-brightness step per color, all with the same
    /// duration.
    #[must_use]
    pub fn colors(mut self, colors: impl IntoIterator<Item = RgbColor>, duration: Duration) -> Self {
        self.steps
            .extend(colors.into_iter().map(|c| (c, Brightness::FULL, duration)));
        self
    }

    /// Sets the end action.
    #[must_use]
    pub fn end_action(mut self, end_action: FlowEndAction) -> Self {
        self.end_action = end_action;
        self
    }

    /// Returns `true` if no step has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validates and builds the flow.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyFlow` with no steps, or
    /// `ValueError::ZeroDuration` if any step has a zero duration.
    pub fn build(self) -> Result<ColorFlow, ValueError> {
        let steps = self
            .steps
            .into_iter()
            .map(|(color, brightness, duration)| ColorFlowStep::new(color, brightness, duration))
            .collect::<Result<Vec<_>, _>>()?;
        ColorFlow::new(steps, self.end_action)
    }
}
