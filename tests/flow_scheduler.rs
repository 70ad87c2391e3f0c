// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the flow scheduler against a recording group.

use std::sync::Arc;
use std::time::Duration;

use lightgrid::device::DeviceGroup;
use lightgrid::event::{EventBus, LightEvent};
use lightgrid::flow::{ColorFlow, FlowEndAction, FlowScheduler};
use lightgrid::palette::rainbow_flow;
use lightgrid::types::{Brightness, ColorTemperature, RgbColor};
use lightgrid::{DeviceError, Result};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Rgb(RgbColor),
    Temperature(u16),
    Brightness(u8),
    Toggle,
    TurnOn,
    StartFlow { steps: Vec<RgbColor>, end: FlowEndAction },
    StopFlow,
}

#[derive(Default, Clone)]
struct RecordingGroup {
    log: Arc<Mutex<Vec<Command>>>,
    fail_flows: bool,
}

impl RecordingGroup {
    fn failing_flows() -> Self {
        Self {
            fail_flows: true,
            ..Self::default()
        }
    }

    fn commands(&self) -> Vec<Command> {
        self.log.lock().clone()
    }

    fn record(&self, command: Command) {
        self.log.lock().push(command);
    }
}

impl DeviceGroup for RecordingGroup {
    async fn set_rgb_color(&self, color: RgbColor, _smooth: Duration) -> Result<()> {
        self.record(Command::Rgb(color));
        Ok(())
    }

    async fn set_color_temperature(
        &self,
        temperature: ColorTemperature,
        _smooth: Duration,
    ) -> Result<()> {
        self.record(Command::Temperature(temperature.kelvin()));
        Ok(())
    }

    async fn set_brightness(&self, brightness: Brightness) -> Result<()> {
        self.record(Command::Brightness(brightness.value()));
        Ok(())
    }

    async fn toggle(&self) -> Result<()> {
        self.record(Command::Toggle);
        Ok(())
    }

    async fn turn_on(&self) -> Result<()> {
        self.record(Command::TurnOn);
        Ok(())
    }

    async fn start_color_flow(&self, flow: &ColorFlow) -> Result<()> {
        if self.fail_flows {
            return Err(DeviceError::CommandRejected("flow".into()).into());
        }
        self.record(Command::StartFlow {
            steps: flow.steps().iter().map(|s| s.color()).collect(),
            end: flow.end_action(),
        });
        Ok(())
    }

    async fn stop_color_flow(&self) -> Result<()> {
        self.record(Command::StopFlow);
        Ok(())
    }
}

fn scheduler() -> (FlowScheduler<RecordingGroup>, RecordingGroup) {
    let group = RecordingGroup::default();
    (FlowScheduler::new(group.clone(), EventBus::new()), group)
}

const RED: RgbColor = RgbColor::new(255, 0, 0);
const GREEN: RgbColor = RgbColor::new(0, 255, 0);
const BLUE: RgbColor = RgbColor::new(0, 0, 255);

// ============================================================================
// Random flows
// ============================================================================

mod random_flow {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn one_step_per_color() {
        let (scheduler, group) = scheduler();
        let mut rx = scheduler.subscribe();

        scheduler
            .start_random_flow(&[RED, GREEN, BLUE], Duration::from_secs(5))
            .await
            .unwrap();

        let Command::StartFlow { steps, end } = &group.commands()[0] else {
            panic!("expected a flow, got {:?}", group.commands());
        };
        assert_eq!(steps.len(), 3);
        for color in [RED, GREEN, BLUE] {
            assert!(steps.contains(&color));
        }
        assert_eq!(*end, FlowEndAction::Keep);

        match rx.recv().await.unwrap() {
            LightEvent::FlowStarted { steps, total, .. } => {
                assert_eq!(steps, 3);
                assert_eq!(total, Duration::from_secs(15));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_palette_is_rejected_without_commands() {
        let (scheduler, group) = scheduler();
        assert!(
            scheduler
                .start_random_flow(&[], Duration::from_secs(5))
                .await
                .is_err()
        );
        assert!(
            scheduler
                .start_random_flow(&[RED], Duration::ZERO)
                .await
                .is_err()
        );
        assert!(group.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn gradient_flow_has_five_steps() {
        let (scheduler, group) = scheduler();
        scheduler
            .start_gradient_flow(RgbColor::new(0, 128, 255), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(matches!(
            &group.commands()[..],
            [Command::StartFlow { steps, .. }] if steps.len() == 5
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rainbow_runs_in_order() {
        let (scheduler, group) = scheduler();
        scheduler
            .start_flow(rainbow_flow(Duration::from_secs(5)).unwrap())
            .await
            .unwrap();

        let Command::StartFlow { steps, .. } = &group.commands()[0] else {
            panic!("expected a flow");
        };
        assert_eq!(steps[0], RED);
        assert_eq!(steps[4], RgbColor::new(255, 0, 255));
    }
}

// ============================================================================
// Supersession
// ============================================================================

mod supersession {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn direct_color_stops_flow_first() {
        let (scheduler, group) = scheduler();
        let mut rx = scheduler.subscribe();

        let session = scheduler
            .start_random_flow(&[RED, GREEN], Duration::from_secs(5))
            .await
            .unwrap();
        scheduler
            .set_rgb_color(BLUE, Duration::from_millis(250))
            .await
            .unwrap();

        let commands = group.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1], Command::StopFlow);
        assert_eq!(commands[2], Command::Rgb(BLUE));
        assert_eq!(scheduler.active_flow().await, None);

        assert!(matches!(rx.recv().await.unwrap(), LightEvent::FlowStarted { .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            LightEvent::FlowSuperseded { session }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn temperature_stops_flow_first() {
        let (scheduler, group) = scheduler();
        scheduler
            .start_random_flow(&[RED], Duration::from_secs(5))
            .await
            .unwrap();
        scheduler
            .set_color_temperature(ColorTemperature::WARM_WHITE, Duration::from_millis(250))
            .await
            .unwrap();

        assert_eq!(
            group.commands()[1..],
            [Command::StopFlow, Command::Temperature(2700)]
        );
    }

    #[tokio::test]
    async fn direct_color_without_flow_sends_no_stop() {
        let (scheduler, group) = scheduler();
        scheduler
            .set_rgb_color(RED, Duration::from_millis(250))
            .await
            .unwrap();
        assert_eq!(group.commands(), [Command::Rgb(RED)]);
    }

    #[tokio::test(start_paused = true)]
    async fn power_and_brightness_leave_flow_running() {
        let (scheduler, group) = scheduler();
        let session = scheduler
            .start_random_flow(&[RED], Duration::from_secs(5))
            .await
            .unwrap();

        scheduler.toggle().await.unwrap();
        scheduler.turn_on().await.unwrap();
        scheduler.set_brightness(Brightness::FULL).await.unwrap();

        assert_eq!(scheduler.active_flow().await, Some(session));
        assert!(!group.commands().contains(&Command::StopFlow));
        assert_eq!(
            group.commands()[1..],
            [Command::Toggle, Command::TurnOn, Command::Brightness(100)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_commands_never_interleave() {
        let (scheduler, group) = scheduler();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..10u8 {
            let scheduler = scheduler.clone();
            tasks.spawn(async move {
                if i % 2 == 0 {
                    scheduler
                        .start_random_flow(&[RED, GREEN], Duration::from_secs(5))
                        .await
                        .map(|_| ())
                } else {
                    scheduler
                        .set_rgb_color(RgbColor::new(i, i, i), Duration::from_millis(10))
                        .await
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        // Every flow except possibly the last one is stopped before the next
        // command touches the lights.
        let commands = group.commands();
        for pair in commands.windows(2) {
            if matches!(pair[0], Command::StartFlow { .. }) {
                assert_eq!(pair[1], Command::StopFlow, "{commands:?}");
            }
        }
    }
}

// ============================================================================
// Completion timers
// ============================================================================

mod completion {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_clear_newer_flow() {
        let (scheduler, _group) = scheduler();

        scheduler
            .start_random_flow(&[RED], Duration::from_secs(2))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let second = scheduler
            .start_random_flow(&[GREEN, BLUE], Duration::from_secs(2))
            .await
            .unwrap();

        // the first flow would have ended here
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(scheduler.active_flow().await, Some(second));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(scheduler.active_flow().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_flow_cancels_timer() {
        let (scheduler, group) = scheduler();
        let mut rx = scheduler.subscribe();

        let session = scheduler
            .start_random_flow(&[RED], Duration::from_secs(2))
            .await
            .unwrap();
        assert!(scheduler.stop_flow().await);
        assert!(!scheduler.stop_flow().await);

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(matches!(rx.recv().await.unwrap(), LightEvent::FlowStarted { .. }));
        assert_eq!(
            rx.recv().await.unwrap(),
            LightEvent::FlowSuperseded { session }
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(
            group.commands().iter().filter(|c| **c == Command::StopFlow).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_leaves_no_active_flow() {
        let group = RecordingGroup::failing_flows();
        let scheduler = FlowScheduler::new(group.clone(), EventBus::new());

        assert!(
            scheduler
                .start_random_flow(&[RED], Duration::from_secs(1))
                .await
                .is_err()
        );
        assert_eq!(scheduler.active_flow().await, None);
    }
}
