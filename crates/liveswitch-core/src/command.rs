use std::str::FromStr;

use crate::error::LiveSwitchError;

/// Every operator command the tool accepts. One per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FleetCommand {
    Start,
    Stop,
    InputS3,
    InputLive,
    Ch1Pause,
    Ch1Unpause,
    Ch2Pause,
    Ch2Unpause,
}

impl FleetCommand {
    pub const ALL: [FleetCommand; 8] = [
        FleetCommand::Start,
        FleetCommand::Stop,
        FleetCommand::InputS3,
        FleetCommand::InputLive,
        FleetCommand::Ch1Pause,
        FleetCommand::Ch1Unpause,
        FleetCommand::Ch2Pause,
        FleetCommand::Ch2Unpause,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FleetCommand::Start => "start",
            FleetCommand::Stop => "stop",
            FleetCommand::InputS3 => "input_s3",
            FleetCommand::InputLive => "input_live",
            FleetCommand::Ch1Pause => "ch1_pause",
            FleetCommand::Ch1Unpause => "ch1_unpause",
            FleetCommand::Ch2Pause => "ch2_pause",
            FleetCommand::Ch2Unpause => "ch2_unpause",
        }
    }

    /// `start|stop|input_s3|...`
    pub fn usage() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl std::fmt::Display for FleetCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FleetCommand {
    type Err = LiveSwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LiveSwitchError::InvalidCommand(s.to_string()))
    }
}
