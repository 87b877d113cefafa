//! Schedule payloads in the remote API's JSON shape.
//!
//! Every type here serialises to exactly what `PUT /prod/channels/{id}/schedule`
//! accepts, so the orchestrator never builds JSON by hand.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScheduledAction
// ---------------------------------------------------------------------------

/// One control instruction destined for one channel's schedule.
///
/// `action_name` doubles as the remote idempotency tag and must be unique
/// within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledAction {
    pub action_name: String,
    #[serde(rename = "scheduleActionSettings")]
    pub settings: ActionSettings,
    #[serde(rename = "scheduleActionStartSettings")]
    pub start: StartSettings,
}

impl ScheduledAction {
    pub fn kind(&self) -> ActionKind {
        match &self.settings {
            ActionSettings::InputSwitch(_) => ActionKind::InputSwitch,
            ActionSettings::PauseState(p) if p.pipelines.is_empty() => ActionKind::Unpause,
            ActionSettings::PauseState(_) => ActionKind::Pause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    InputSwitch,
    Pause,
    Unpause,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::InputSwitch => "input_switch",
            ActionKind::Pause => "pause",
            ActionKind::Unpause => "unpause",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSettings {
    #[serde(rename = "inputSwitchSettings")]
    InputSwitch(InputSwitchSettings),
    #[serde(rename = "pauseStateSettings")]
    PauseState(PauseStateSettings),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSwitchSettings {
    pub input_attachment_name_reference: String,
    #[serde(default)]
    pub url_path: Vec<String>,
}

/// Pipelines listed here are paused; an empty list resumes every pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseStateSettings {
    #[serde(default)]
    pub pipelines: Vec<PipelineRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRef {
    pub pipeline_id: PipelineId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineId {
    #[serde(rename = "PIPELINE_0")]
    Pipeline0,
    #[serde(rename = "PIPELINE_1")]
    Pipeline1,
}

// ---------------------------------------------------------------------------
// StartSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartSettings {
    #[serde(rename = "immediateModeScheduleActionStartSettings")]
    Immediate(ImmediateStart),
    #[serde(rename = "fixedModeScheduleActionStartSettings")]
    Fixed(FixedStart),
}

impl StartSettings {
    pub fn immediate() -> Self {
        StartSettings::Immediate(ImmediateStart {})
    }

    pub fn fixed_at(time: impl Into<String>) -> Self {
        StartSettings::Fixed(FixedStart { time: time.into() })
    }

    /// The fixed start time, if any.
    pub fn fixed_time(&self) -> Option<&str> {
        match self {
            StartSettings::Immediate(_) => None,
            StartSettings::Fixed(f) => Some(&f.time),
        }
    }
}

/// Serialises as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImmediateStart {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedStart {
    pub time: String,
}

// ---------------------------------------------------------------------------
// BatchScheduleUpdate
// ---------------------------------------------------------------------------

/// Request body for a schedule update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScheduleUpdate {
    pub creates: ScheduleActionBatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleActionBatch {
    pub schedule_actions: Vec<ScheduledAction>,
}

impl BatchScheduleUpdate {
    pub fn single(action: ScheduledAction) -> Self {
        Self {
            creates: ScheduleActionBatch {
                schedule_actions: vec![action],
            },
        }
    }

    pub fn actions(&self) -> &[ScheduledAction] {
        &self.creates.schedule_actions
    }
}
