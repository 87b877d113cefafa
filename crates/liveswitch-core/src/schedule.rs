//! Scheduled-action construction.
//!
//! Pure functions of a [`Clock`]: nothing here touches the network. Action
//! names are the formatted clock reading, so with a fixed clock every output
//! is deterministic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use medialive_api::{
    ActionSettings, BatchScheduleUpdate, InputSwitchSettings, PauseStateSettings, PipelineId,
    PipelineRef, ScheduledAction, StartSettings,
};

pub const DEFAULT_SWITCH_LEAD: Duration = Duration::from_secs(30);

const ACTION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `YYYY-MM-DDTHH:MM:SS.000Z`; sub-second digits are always zero.
pub fn format_action_time(t: DateTime<Utc>) -> String {
    t.format(ACTION_TIME_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// ScheduleMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Named after the current time, starts now.
    Immediate,
    /// Named after `now + delay`, starts at exactly that time.
    Scheduled(Duration),
}

// ---------------------------------------------------------------------------
// ActionBuilder
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ActionBuilder {
    clock: Arc<dyn Clock>,
    switch_lead: Duration,
}

impl std::fmt::Debug for ActionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBuilder")
            .field("switch_lead", &self.switch_lead)
            .finish_non_exhaustive()
    }
}

impl Default for ActionBuilder {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), DEFAULT_SWITCH_LEAD)
    }
}

impl ActionBuilder {
    pub fn new(clock: Arc<dyn Clock>, switch_lead: Duration) -> Self {
        Self { clock, switch_lead }
    }

    pub fn switch_lead(&self) -> Duration {
        self.switch_lead
    }

    pub fn build_input_switch(&self, target_input: &str, mode: ScheduleMode) -> ScheduledAction {
        let now = self.clock.now();
        let (action_name, start) = match mode {
            ScheduleMode::Immediate => (format_action_time(now), StartSettings::immediate()),
            ScheduleMode::Scheduled(delay) => {
                let at = format_action_time(offset(now, delay));
                (at.clone(), StartSettings::fixed_at(at))
            }
        };
        ScheduledAction {
            action_name,
            settings: ActionSettings::InputSwitch(InputSwitchSettings {
                input_attachment_name_reference: target_input.to_string(),
                url_path: Vec::new(),
            }),
            start,
        }
    }

    /// Input switch scheduled `switch_lead` into the future.
    pub fn build_live_switch(&self, target_input: &str) -> ScheduledAction {
        self.build_input_switch(target_input, ScheduleMode::Scheduled(self.switch_lead))
    }

    pub fn build_pause(&self) -> ScheduledAction {
        self.pause_state(vec![PipelineRef {
            pipeline_id: PipelineId::Pipeline0,
        }])
    }

    pub fn build_unpause(&self) -> ScheduledAction {
        self.pause_state(Vec::new())
    }

    pub fn envelope(&self, action: ScheduledAction) -> BatchScheduleUpdate {
        BatchScheduleUpdate::single(action)
    }

    fn pause_state(&self, pipelines: Vec<PipelineRef>) -> ScheduledAction {
        ScheduledAction {
            action_name: format_action_time(self.clock.now()),
            settings: ActionSettings::PauseState(PauseStateSettings { pipelines }),
            start: StartSettings::immediate(),
        }
    }
}

fn offset(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use medialive_api::ActionKind;

    fn builder() -> ActionBuilder {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ActionBuilder::new(Arc::new(FixedClock(t)), DEFAULT_SWITCH_LEAD)
    }

    #[test]
    fn time_format_has_literal_millis() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(789);
        assert_eq!(format_action_time(t), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn immediate_switch_is_named_now_and_starts_now() {
        let action = builder().build_input_switch("ch1-slate", ScheduleMode::Immediate);
        assert_eq!(action.action_name, "2024-05-01T12:00:00.000Z");
        assert_eq!(action.start, StartSettings::immediate());
        assert_eq!(action.kind(), ActionKind::InputSwitch);
    }

    #[test]
    fn scheduled_switch_uses_same_time_for_name_and_start() {
        let action = builder()
            .build_input_switch("ch1-prod", ScheduleMode::Scheduled(Duration::from_secs(30)));
        assert_eq!(action.action_name, "2024-05-01T12:00:30.000Z");
        assert_eq!(action.start.fixed_time(), Some(action.action_name.as_str()));
    }

    #[test]
    fn live_switch_uses_configured_lead() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let b = ActionBuilder::new(Arc::new(FixedClock(t)), Duration::from_secs(5));
        let action = b.build_live_switch("ch1-prod");
        assert_eq!(action.start.fixed_time(), Some("2024-05-01T12:00:05.000Z"));
    }

    #[test]
    fn switch_targets_named_input_with_empty_url_path() {
        let action = builder().build_input_switch("ch1-slate", ScheduleMode::Immediate);
        let ActionSettings::InputSwitch(s) = action.settings else {
            panic!("expected InputSwitch")
        };
        assert_eq!(s.input_attachment_name_reference, "ch1-slate");
        assert!(s.url_path.is_empty());
    }

    #[test]
    fn pause_and_unpause_are_structurally_distinct() {
        let b = builder();
        let pause = b.build_pause();
        let unpause = b.build_unpause();

        let ActionSettings::PauseState(p) = &pause.settings else {
            panic!("expected PauseState")
        };
        let ActionSettings::PauseState(u) = &unpause.settings else {
            panic!("expected PauseState")
        };
        assert_eq!(p.pipelines.len(), 1);
        assert_eq!(p.pipelines[0].pipeline_id, PipelineId::Pipeline0);
        assert!(u.pipelines.is_empty());
        assert_eq!(pause.kind(), ActionKind::Pause);
        assert_eq!(unpause.kind(), ActionKind::Unpause);
        assert_eq!(pause.start, StartSettings::immediate());
        assert_eq!(unpause.start, StartSettings::immediate());
    }

    #[test]
    fn envelope_wraps_exactly_one_action() {
        let b = builder();
        let update = b.envelope(b.build_pause());
        assert_eq!(update.actions().len(), 1);
    }
}
