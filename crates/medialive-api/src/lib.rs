//! Regional control driver for managed live-video channels.
//!
//! # Architecture
//!
//! ```text
//! EndpointResolver        ← region id → Arc<dyn ChannelControl>
//!     │
//!     ▼
//! ChannelControl          ← start / stop / update_schedule
//!     │
//!     ├── HttpChannelControl   reqwest, one base URL per region
//!     └── InMemoryControl      recording fake for tests
//! ```
//!
//! Payloads (`types.rs`) are fully typed and serialise to the remote API's
//! schedule JSON.

pub mod control;
pub mod error;
pub mod http;
pub mod memory;
pub mod types;

#[cfg(test)]
mod tests;

pub use control::{ChannelControl, EndpointResolver};
pub use error::{ApiError, EndpointError};
pub use http::{EndpointSettings, HttpChannelControl, HttpEndpointResolver};
pub use memory::{InMemoryControl, InMemoryResolver, RecordedCall};
pub use types::{
    ActionKind, ActionSettings, BatchScheduleUpdate, FixedStart, ImmediateStart,
    InputSwitchSettings, PauseStateSettings, PipelineId, PipelineRef, ScheduleActionBatch,
    ScheduledAction, StartSettings,
};
