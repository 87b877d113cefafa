use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, EndpointError};
use crate::types::BatchScheduleUpdate;

/// Control surface of one regional endpoint.
///
/// Implementations hold no per-call state, so one handle may be shared by
/// every channel call in its region, including concurrent ones.
#[async_trait]
pub trait ChannelControl: Send + Sync {
    async fn start_channel(&self, channel_id: &str) -> Result<(), ApiError>;

    async fn stop_channel(&self, channel_id: &str) -> Result<(), ApiError>;

    async fn update_schedule(
        &self,
        channel_id: &str,
        update: &BatchScheduleUpdate,
    ) -> Result<(), ApiError>;
}

/// Maps a region identifier to a control handle.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self, region: &str) -> Result<Arc<dyn ChannelControl>, EndpointError>;
}
