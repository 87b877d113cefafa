//! Maps one operator command to one dispatcher call.

use liveswitch_core::config::{Config, PauseTarget};
use liveswitch_core::{Dispatcher, FleetCommand, FleetReport, Result, ScheduleMode};
use tracing::info;

pub fn usage() -> String {
    format!(
        "Usage: liveswitch [--config <PATH>] [--json] [--exit-policy <strict|lenient>] {{{}}}",
        FleetCommand::usage()
    )
}

/// Run `command` against the configured topology.
///
/// Channel-level failures are inside the returned report. `Err` means the
/// command could not be aimed at anything (a pause target that does not
/// exist) and nothing was sent.
pub async fn route(
    command: FleetCommand,
    config: &Config,
    dispatcher: &Dispatcher,
) -> Result<FleetReport> {
    let topology = &config.topology;

    let mut report = match command {
        FleetCommand::Start => {
            info!("Event starting");
            dispatcher.start(topology).await
        }
        FleetCommand::Stop => {
            info!("Event stopping");
            dispatcher.stop(topology).await
        }
        FleetCommand::InputS3 => {
            info!("Event switching to slate");
            dispatcher
                .switch_input(topology, &config.primary_input, ScheduleMode::Immediate)
                .await
        }
        FleetCommand::InputLive => {
            info!("Event switching to live");
            let lead = dispatcher.builder().switch_lead();
            dispatcher
                .switch_input(
                    topology,
                    &config.secondary_input,
                    ScheduleMode::Scheduled(lead),
                )
                .await
        }
        FleetCommand::Ch1Pause => {
            info!("Pausing channel 1");
            pause(dispatcher, config, &config.pause_targets.ch1).await?
        }
        FleetCommand::Ch1Unpause => {
            info!("Unpausing channel 1");
            unpause(dispatcher, config, &config.pause_targets.ch1).await?
        }
        FleetCommand::Ch2Pause => {
            info!("Pausing channel 2");
            pause(dispatcher, config, &config.pause_targets.ch2).await?
        }
        FleetCommand::Ch2Unpause => {
            info!("Unpausing channel 2");
            unpause(dispatcher, config, &config.pause_targets.ch2).await?
        }
    };

    report.command = command.as_str().to_string();
    Ok(report)
}

async fn pause(
    dispatcher: &Dispatcher,
    config: &Config,
    target: &PauseTarget,
) -> Result<FleetReport> {
    dispatcher
        .pause_channel(&config.topology, &target.group, target.index)
        .await
}

async fn unpause(
    dispatcher: &Dispatcher,
    config: &Config,
    target: &PauseTarget,
) -> Result<FleetReport> {
    dispatcher
        .unpause_channel(&config.topology, &target.group, target.index)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use liveswitch_core::{ActionBuilder, DispatchOptions, FixedClock, LiveSwitchError};
    use medialive_api::{ActionKind, ActionSettings, InMemoryResolver, RecordedCall};
    use std::sync::Arc;

    const CONFIG: &str = r#"
topology:
  groups:
    - name: tokyo
      region: ap-northeast-1
      channel_ids: ["7528721"]
    - name: osaka
      region: ap-northeast-3
      channel_ids: ["3320982"]
primary_input: ch1-slate
secondary_input: ch1-prod
switch_lead_seconds: 30
"#;

    fn setup() -> (Config, Arc<InMemoryResolver>, Dispatcher) {
        let config = Config::from_yaml(CONFIG).unwrap();
        let resolver = Arc::new(InMemoryResolver::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let builder = ActionBuilder::new(Arc::new(clock), config.switch_lead());
        let dispatcher = Dispatcher::new(resolver.clone(), builder, DispatchOptions::default());
        (config, resolver, dispatcher)
    }

    fn only_update(resolver: &InMemoryResolver, region: &str) -> medialive_api::ScheduledAction {
        let calls = resolver.control(region).calls();
        assert_eq!(calls.len(), 1, "expected one call in {region}");
        match &calls[0] {
            RecordedCall::UpdateSchedule { update, .. } => update.actions()[0].clone(),
            other => panic!("expected UpdateSchedule, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_reaches_both_regions() {
        let (config, resolver, d) = setup();
        let report = route(FleetCommand::Start, &config, &d).await.unwrap();
        assert_eq!(report.command, "start");
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            resolver.control("ap-northeast-3").calls(),
            vec![RecordedCall::Start { channel_id: "3320982".into() }]
        );
    }

    #[tokio::test]
    async fn stop_reaches_both_regions() {
        let (config, resolver, d) = setup();
        route(FleetCommand::Stop, &config, &d).await.unwrap();
        assert_eq!(
            resolver.control("ap-northeast-1").calls(),
            vec![RecordedCall::Stop { channel_id: "7528721".into() }]
        );
    }

    #[tokio::test]
    async fn input_s3_switches_to_primary_immediately() {
        let (config, resolver, d) = setup();
        route(FleetCommand::InputS3, &config, &d).await.unwrap();
        let action = only_update(&resolver, "ap-northeast-1");
        let ActionSettings::InputSwitch(s) = &action.settings else {
            panic!("expected InputSwitch")
        };
        assert_eq!(s.input_attachment_name_reference, "ch1-slate");
        assert_eq!(action.action_name, "2024-05-01T12:00:00.000Z");
        assert_eq!(action.start.fixed_time(), None);
    }

    #[tokio::test]
    async fn input_live_switches_to_secondary_after_lead() {
        let (config, resolver, d) = setup();
        route(FleetCommand::InputLive, &config, &d).await.unwrap();
        let action = only_update(&resolver, "ap-northeast-3");
        let ActionSettings::InputSwitch(s) = &action.settings else {
            panic!("expected InputSwitch")
        };
        assert_eq!(s.input_attachment_name_reference, "ch1-prod");
        assert_eq!(action.start.fixed_time(), Some("2024-05-01T12:00:30.000Z"));
    }

    #[tokio::test]
    async fn ch1_and_ch2_address_their_own_groups() {
        let (config, resolver, d) = setup();
        let report = route(FleetCommand::Ch2Pause, &config, &d).await.unwrap();
        assert_eq!(report.command, "ch2_pause");
        assert_eq!(report.results[0].channel_id, "3320982");
        assert!(resolver.control("ap-northeast-1").calls().is_empty());
        assert_eq!(only_update(&resolver, "ap-northeast-3").kind(), ActionKind::Pause);

        route(FleetCommand::Ch1Unpause, &config, &d).await.unwrap();
        assert_eq!(only_update(&resolver, "ap-northeast-1").kind(), ActionKind::Unpause);
    }

    #[tokio::test]
    async fn dangling_pause_target_is_an_error_without_calls() {
        let (mut config, resolver, d) = setup();
        config.pause_targets.ch1.index = 4;
        let err = route(FleetCommand::Ch1Pause, &config, &d).await.unwrap_err();
        assert!(matches!(err, LiveSwitchError::IndexOutOfRange { index: 4, len: 1, .. }));
        assert_eq!(resolver.total_calls(), 0);
    }

    #[test]
    fn usage_mentions_every_command() {
        let text = usage();
        for cmd in FleetCommand::ALL {
            assert!(text.contains(cmd.as_str()));
        }
    }
}
