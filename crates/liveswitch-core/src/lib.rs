pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod paths;
pub mod report;
pub mod schedule;
pub mod topology;

pub use command::FleetCommand;
pub use dispatch::{DispatchOptions, Dispatcher};
pub use error::{LiveSwitchError, Result};
pub use report::{CommandResult, FailureKind, FleetReport, GroupError};
pub use schedule::{ActionBuilder, Clock, FixedClock, ScheduleMode, SystemClock};
pub use topology::{ChannelGroup, FleetTopology, GroupSelector};
