/// Wire-shape tests: serialised payloads must match what the schedule
/// endpoint accepts, byte for byte where the shape matters.
#[cfg(test)]
mod wire {
    use crate::types::*;
    use serde_json::json;

    fn input_switch(name: &str, target: &str, start: StartSettings) -> ScheduledAction {
        ScheduledAction {
            action_name: name.to_string(),
            settings: ActionSettings::InputSwitch(InputSwitchSettings {
                input_attachment_name_reference: target.to_string(),
                url_path: vec![],
            }),
            start,
        }
    }

    #[test]
    fn immediate_input_switch_shape() {
        let update = BatchScheduleUpdate::single(input_switch(
            "2024-05-01T12:00:00.000Z",
            "ch1-slate",
            StartSettings::immediate(),
        ));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            json!({
                "creates": {
                    "scheduleActions": [{
                        "actionName": "2024-05-01T12:00:00.000Z",
                        "scheduleActionSettings": {
                            "inputSwitchSettings": {
                                "inputAttachmentNameReference": "ch1-slate",
                                "urlPath": []
                            }
                        },
                        "scheduleActionStartSettings": {
                            "immediateModeScheduleActionStartSettings": {}
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn fixed_start_shape() {
        let action = input_switch(
            "2024-05-01T12:00:30.000Z",
            "ch1-prod",
            StartSettings::fixed_at("2024-05-01T12:00:30.000Z"),
        );
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value["scheduleActionStartSettings"],
            json!({
                "fixedModeScheduleActionStartSettings": {
                    "time": "2024-05-01T12:00:30.000Z"
                }
            })
        );
    }

    #[test]
    fn pause_lists_pipeline_zero() {
        let action = ScheduledAction {
            action_name: "t".to_string(),
            settings: ActionSettings::PauseState(PauseStateSettings {
                pipelines: vec![PipelineRef {
                    pipeline_id: PipelineId::Pipeline0,
                }],
            }),
            start: StartSettings::immediate(),
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value["scheduleActionSettings"],
            json!({ "pauseStateSettings": { "pipelines": [{ "pipelineId": "PIPELINE_0" }] } })
        );
        assert_eq!(action.kind(), ActionKind::Pause);
    }

    #[test]
    fn unpause_is_an_empty_pipeline_list() {
        let action = ScheduledAction {
            action_name: "t".to_string(),
            settings: ActionSettings::PauseState(PauseStateSettings { pipelines: vec![] }),
            start: StartSettings::immediate(),
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value["scheduleActionSettings"],
            json!({ "pauseStateSettings": { "pipelines": [] } })
        );
        assert_eq!(action.kind(), ActionKind::Unpause);
    }

    #[test]
    fn parses_envelope_from_api_json() {
        let raw = r#"{
            "creates": {
                "scheduleActions": [{
                    "actionName": "a1",
                    "scheduleActionSettings": {
                        "inputSwitchSettings": { "inputAttachmentNameReference": "ch1-prod" }
                    },
                    "scheduleActionStartSettings": {
                        "fixedModeScheduleActionStartSettings": { "time": "2024-05-01T12:00:30.000Z" }
                    }
                }]
            }
        }"#;
        let update: BatchScheduleUpdate = serde_json::from_str(raw).unwrap();
        let action = &update.actions()[0];
        assert_eq!(action.kind(), ActionKind::InputSwitch);
        assert_eq!(action.start.fixed_time(), Some("2024-05-01T12:00:30.000Z"));
        let ActionSettings::InputSwitch(settings) = &action.settings else {
            panic!("expected InputSwitch")
        };
        assert!(settings.url_path.is_empty());
    }
}
