// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded-retry light discovery.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

use super::Light;

/// Finds bulbs on the local network.
pub trait Locator: Send + Sync {
    /// The driver type of discovered bulbs.
    type Light: Light;

    /// Runs one discovery round.
    ///
    /// An empty result is not an error; [`discover_lights`] retries it the
    /// same way as a failure.
    fn discover(&self) -> impl Future<Output = Result<Vec<Self::Light>>> + Send;
}

/// Retry budget for [`discover_lights`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lightgrid::device::DiscoveryPolicy;
///
/// let policy = DiscoveryPolicy::new()
///     .with_max_attempts(4)
///     .with_initial_delay(Duration::from_millis(200));
///
/// assert!(policy.should_retry(3));
/// assert!(!policy.should_retry(4));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryPolicy {
    /// Total discovery rounds, including the first one.
    pub max_attempts: u32,
    /// Pause after the first failed round.
    pub initial_delay: Duration,
    /// Upper bound for the pause between rounds.
    pub max_delay: Duration,
    /// Growth factor of the pause between consecutive rounds.
    pub backoff_multiplier: f32,
}

impl DiscoveryPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total number of discovery rounds.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the pause after the first failed round.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the upper bound for the pause between rounds.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Returns the pause before round `attempt + 1`, where `attempt` counts
    /// failed rounds from zero.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let multiplier = self
            .backoff_multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f32 * multiplier;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }

    /// Returns `true` if another round may run after `completed` rounds.
    #[must_use]
    pub fn should_retry(&self, completed: u32) -> bool {
        completed < self.max_attempts
    }
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// Discovers bulbs, retrying empty or failed rounds within the policy's
/// budget.
///
/// At least one round always runs. When every round comes back empty or
/// fails, the result is an empty list: running with no lights is a valid
/// state, not an error.
pub async fn discover_lights<Loc: Locator>(
    locator: &Loc,
    policy: &DiscoveryPolicy,
) -> Vec<Loc::Light> {
    let mut completed = 0u32;

    loop {
        completed += 1;

        match locator.discover().await {
            Ok(lights) if !lights.is_empty() => {
                tracing::info!(count = lights.len(), attempt = completed, "Discovered lights");
                return lights;
            }
            Ok(_) => {
                tracing::debug!(attempt = completed, "Discovery round found no lights");
            }
            Err(e) => {
                tracing::warn!(attempt = completed, error = %e, "Discovery round failed");
            }
        }

        if !policy.should_retry(completed) {
            tracing::info!(attempts = completed, "No lights found, giving up");
            return Vec::new();
        }

        tokio::time::sleep(policy.delay_for_attempt(completed - 1)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::{DeviceError, Error};
    use crate::flow::ColorFlow;
    use crate::types::{Brightness, ColorTemperature, RgbColor};

    struct NullLight;

    impl Light for NullLight {
        fn label(&self) -> &str {
            "null"
        }
        async fn connect(&self) -> Result<()> {
            Ok(())
        }
        async fn turn_on(&self) -> Result<()> {
            Ok(())
        }
        async fn toggle(&self) -> Result<()> {
            Ok(())
        }
        async fn set_brightness(&self, _: Brightness) -> Result<()> {
            Ok(())
        }
        async fn set_rgb_color(&self, _: RgbColor, _: Duration) -> Result<()> {
            Ok(())
        }
        async fn set_color_temperature(&self, _: ColorTemperature, _: Duration) -> Result<()> {
            Ok(())
        }
        async fn start_color_flow(&self, _: &ColorFlow) -> Result<()> {
            Ok(())
        }
        async fn stop_color_flow(&self) -> Result<()> {
            Ok(())
        }
    }

    /// Fails or finds nothing until round `succeed_on`.
    struct ScriptedLocator {
        rounds: Arc<AtomicU32>,
        succeed_on: u32,
    }

    impl Locator for ScriptedLocator {
        type Light = NullLight;

        async fn discover(&self) -> Result<Vec<NullLight>> {
            let round = self.rounds.fetch_add(1, Ordering::SeqCst) + 1;
            if round == self.succeed_on {
                Ok(vec![NullLight, NullLight])
            } else if round % 2 == 1 {
                Err(Error::Device(DeviceError::Unreachable("multicast".into())))
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn default_policy() {
        let policy = DiscoveryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let policy = DiscoveryPolicy::new()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(3));

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(3));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_non_empty_round() {
        let rounds = Arc::new(AtomicU32::new(0));
        let locator = ScriptedLocator {
            rounds: Arc::clone(&rounds),
            succeed_on: 2,
        };

        let lights = discover_lights(&locator, &DiscoveryPolicy::default()).await;

        assert_eq!(lights.len(), 2);
        assert_eq!(rounds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_returns_empty() {
        let rounds = Arc::new(AtomicU32::new(0));
        let locator = ScriptedLocator {
            rounds: Arc::clone(&rounds),
            succeed_on: u32::MAX,
        };
        let policy = DiscoveryPolicy::new().with_max_attempts(3);

        let lights = discover_lights(&locator, &policy).await;

        assert!(lights.is_empty());
        assert_eq!(rounds.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let rounds = Arc::new(AtomicU32::new(0));
        let locator = ScriptedLocator {
            rounds: Arc::clone(&rounds),
            succeed_on: 1,
        };
        let policy = DiscoveryPolicy::new().with_max_attempts(0);

        assert_eq!(discover_lights(&locator, &policy).await.len(), 2);
        assert_eq!(rounds.load(Ordering::SeqCst), 1);
    }
}
