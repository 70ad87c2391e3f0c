// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-effort fan-out over a set of bulbs.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinSet;

use crate::error::{Error, Result};
use crate::event::{DeviceId, EventBus, LightEvent};
use crate::flow::ColorFlow;
use crate::types::{Brightness, ColorTemperature, RgbColor};

use super::{DeviceGroup, DiscoveryPolicy, Light, Locator, discover_lights};

struct Member<L> {
    id: DeviceId,
    light: Arc<L>,
}

impl<L> Clone for Member<L> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            light: Arc::clone(&self.light),
        }
    }
}

/// A [`DeviceGroup`] that sends every command to all of its lights in
/// parallel.
///
/// A member that fails a command is logged and reported as
/// [`LightEvent::DeviceError`]; the group call itself still succeeds. There
/// is no cross-device rollback.
///
/// Membership can be replaced at runtime with [`reconnect`](Self::reconnect);
/// commands already in flight keep using the members they started with.
pub struct LightGroup<L> {
    members: RwLock<Vec<Member<L>>>,
    events: EventBus,
}

impl<L: Light> LightGroup<L> {
    /// Creates an empty group publishing to `events`.
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            members: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Creates a group from already connected lights.
    #[must_use]
    pub fn with_lights(lights: impl IntoIterator<Item = L>, events: EventBus) -> Self {
        let group = Self::new(events);
        for light in lights {
            group.add(light);
        }
        group
    }

    /// Discovers lights and prepares them for use.
    ///
    /// Each discovered light is connected, powered on and set to full
    /// brightness. Lights that cannot be connected are reported and left
    /// out. The group may end up empty.
    pub async fn initialize<Loc>(locator: &Loc, policy: &DiscoveryPolicy, events: EventBus) -> Self
    where
        Loc: Locator<Light = L>,
    {
        let group = Self::new(events);
        group.reconnect(locator, policy).await;
        group
    }

    /// Re-runs discovery and replaces the current members with the result.
    ///
    /// Returns the number of lights in the group afterwards.
    pub async fn reconnect<Loc>(&self, locator: &Loc, policy: &DiscoveryPolicy) -> usize
    where
        Loc: Locator<Light = L>,
    {
        let found = discover_lights(locator, policy).await;

        let mut tasks = JoinSet::new();
        for light in found {
            let member = Member {
                id: DeviceId::new(),
                light: Arc::new(light),
            };
            tasks.spawn(async move {
                let result = prepare(member.light.as_ref()).await;
                (member, result)
            });
        }

        let mut ready = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((member, Ok(()))) => ready.push(member),
                Ok((member, Err((operation, e)))) => {
                    self.report(&member, operation, &e);
                    if operation != "connect" {
                        ready.push(member);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Light setup task failed"),
            }
        }

        let count = ready.len();
        for member in &ready {
            self.announce(member);
        }
        *self.members.write() = ready;

        tracing::info!(count, "Light group ready");
        count
    }

    /// Adds a light to the group and returns its id.
    pub fn add(&self, light: L) -> DeviceId {
        let member = Member {
            id: DeviceId::new(),
            light: Arc::new(light),
        };
        let id = member.id;
        self.announce(&member);
        self.members.write().push(member);
        id
    }

    /// Returns the number of lights in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns `true` if the group has no lights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Returns the ids of all members.
    #[must_use]
    pub fn ids(&self) -> Vec<DeviceId> {
        self.members.read().iter().map(|m| m.id).collect()
    }

    /// Returns the label of a member.
    #[must_use]
    pub fn label(&self, id: DeviceId) -> Option<String> {
        self.members
            .read()
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.light.label().to_string())
    }

    /// Returns the event bus this group publishes to.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    async fn fan_out<F, Fut>(&self, operation: &'static str, command: F) -> Result<()>
    where
        F: Fn(Arc<L>) -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let members = self.members.read().clone();
        if members.is_empty() {
            tracing::debug!(operation, "Group has no lights");
            return Ok(());
        }

        let mut tasks = JoinSet::new();
        for member in members {
            let pending = command(Arc::clone(&member.light));
            tasks.spawn(async move { (member, pending.await) });
        }

        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((member, Err(e))) => {
                    failed += 1;
                    self.report(&member, operation, &e);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(operation, error = %e, "Light command task failed");
                }
            }
        }

        if failed > 0 {
            tracing::debug!(operation, failed, "Group command partially applied");
        }
        Ok(())
    }

    fn report(&self, member: &Member<L>, operation: &'static str, error: &Error) {
        let label = member.light.label();
        tracing::warn!(device = %label, device_id = %member.id, operation, error = %error, "Light command failed");
        self.events.publish(LightEvent::device_error(
            member.id,
            label,
            operation,
            error.to_string(),
        ));
    }

    fn announce(&self, member: &Member<L>) {
        tracing::debug!(device = %member.light.label(), device_id = %member.id, "Light added");
        self.events.publish(LightEvent::DeviceAdded {
            device_id: member.id,
            label: member.light.label().to_string(),
        });
    }
}

/// Connects a freshly discovered light and brings it to a known state.
async fn prepare<L: Light>(light: &L) -> std::result::Result<(), (&'static str, Error)> {
    light.connect().await.map_err(|e| ("connect", e))?;
    light.turn_on().await.map_err(|e| ("turn_on", e))?;
    light
        .set_brightness(Brightness::FULL)
        .await
        .map_err(|e| ("set_brightness", e))?;
    Ok(())
}

impl<L: Light> DeviceGroup for LightGroup<L> {
    async fn set_rgb_color(&self, color: RgbColor, smooth: Duration) -> Result<()> {
        self.fan_out("set_rgb_color", move |light| async move {
            light.set_rgb_color(color, smooth).await
        })
        .await
    }

    async fn set_color_temperature(
        &self,
        temperature: ColorTemperature,
        smooth: Duration,
    ) -> Result<()> {
        self.fan_out("set_color_temperature", move |light| async move {
            light.set_color_temperature(temperature, smooth).await
        })
        .await
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
        self.fan_out("set_brightness", move |light| async move {
            light.set_brightness(brightness).await
        })
        .await
    }

    async fn toggle(&self) -> Result<()> {
        self.fan_out("toggle", |light| async move { light.toggle().await })
            .await
    }

    async fn turn_on(&self) -> Result<()> {
        self.fan_out("turn_on", |light| async move { light.turn_on().await })
            .await
    }

    async fn start_color_flow(&self, flow: &ColorFlow) -> Result<()> {
        let flow = Arc::new(flow.clone());
        self.fan_out("start_color_flow", move |light| {
            let flow = Arc::clone(&flow);
            async move { light.start_color_flow(&flow).await }
        })
        .await
    }

    async fn stop_color_flow(&self) -> Result<()> {
        self.fan_out("stop_color_flow", |light| async move {
            light.stop_color_flow().await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::error::DeviceError;

    #[derive(Default)]
    struct FakeLight {
        name: String,
        fail_connect: bool,
        fail_commands: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl FakeLight {
        fn named(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                log: Arc::clone(log),
                ..Self::default()
            }
        }

        fn record(&self, what: &str) -> Result<()> {
            self.log.lock().push(format!("{}:{what}", self.name));
            if self.fail_commands {
                return Err(DeviceError::CommandRejected(what.to_string()).into());
            }
            Ok(())
        }
    }

    impl Light for FakeLight {
        fn label(&self) -> &str {
            &self.name
        }
        async fn connect(&self) -> Result<()> {
            if self.fail_connect {
                return Err(DeviceError::Unreachable(self.name.clone()).into());
            }
            self.record("connect")
        }
        async fn turn_on(&self) -> Result<()> {
            self.record("on")
        }
        async fn toggle(&self) -> Result<()> {
            self.record("toggle")
        }
        async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
            self.record(&format!("bright={}", brightness.value()))
        }
        async fn set_rgb_color(&self, color: RgbColor, _: Duration) -> Result<()> {
            self.record(&format!("rgb={}", color.to_hex()))
        }
        async fn set_color_temperature(&self, ct: ColorTemperature, _: Duration) -> Result<()> {
            self.record(&format!("ct={}", ct.kelvin()))
        }
        async fn start_color_flow(&self, flow: &ColorFlow) -> Result<()> {
            self.record(&format!("flow={}", flow.steps().len()))
        }
        async fn stop_color_flow(&self) -> Result<()> {
            self.record("stop")
        }
    }

    struct FixedLocator {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Locator for FixedLocator {
        type Light = FakeLight;

        async fn discover(&self) -> Result<Vec<FakeLight>> {
            Ok(vec![
                FakeLight::named("ok", &self.log),
                FakeLight {
                    fail_connect: true,
                    ..FakeLight::named("gone", &self.log)
                },
            ])
        }
    }

    #[tokio::test]
    async fn command_reaches_every_member() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let group = LightGroup::with_lights(
            [FakeLight::named("a", &log), FakeLight::named("b", &log)],
            EventBus::new(),
        );

        group
            .set_rgb_color(RgbColor::new(255, 0, 0), Duration::from_millis(250))
            .await
            .unwrap();

        let mut entries = log.lock().clone();
        entries.sort();
        assert_eq!(entries, vec!["a:rgb=FF0000", "b:rgb=FF0000"]);
    }

    #[tokio::test]
    async fn failing_member_is_reported_not_propagated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let events = EventBus::new();
        let mut rx = events.subscribe();

        let group = LightGroup::new(events);
        let _ok = group.add(FakeLight::named("ok", &log));
        let bad_id = group.add(FakeLight {
            fail_commands: true,
            ..FakeLight::named("bad", &log)
        });

        // two DeviceAdded events first
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        assert!(group.toggle().await.is_ok());
        assert!(log.lock().contains(&"ok:toggle".to_string()));

        match rx.recv().await.unwrap() {
            LightEvent::DeviceError {
                device_id,
                label,
                operation,
                ..
            } => {
                assert_eq!(device_id, bad_id);
                assert_eq!(label, "bad");
                assert_eq!(operation, "toggle");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_group_accepts_commands() {
        let group: LightGroup<FakeLight> = LightGroup::new(EventBus::new());
        assert!(group.is_empty());
        assert!(group.turn_on().await.is_ok());
        assert!(group.stop_color_flow().await.is_ok());
    }

    #[tokio::test]
    async fn initialize_prepares_reachable_lights() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let locator = FixedLocator {
            log: Arc::clone(&log),
        };

        let group =
            LightGroup::initialize(&locator, &DiscoveryPolicy::default(), EventBus::new()).await;

        assert_eq!(group.len(), 1);
        assert_eq!(group.label(group.ids()[0]).as_deref(), Some("ok"));
        assert_eq!(
            log.lock().clone(),
            vec!["ok:connect", "ok:on", "ok:bright=100"]
        );
    }

    #[tokio::test]
    async fn reconnect_replaces_members() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let group = LightGroup::with_lights(
            [FakeLight::named("old1", &log), FakeLight::named("old2", &log)],
            EventBus::new(),
        );
        assert_eq!(group.len(), 2);

        let locator = FixedLocator {
            log: Arc::clone(&log),
        };
        let count = group.reconnect(&locator, &DiscoveryPolicy::default()).await;

        assert_eq!(count, 1);
        assert_eq!(group.len(), 1);
    }
}
