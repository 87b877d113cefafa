//! In-memory control plane for tests.
//!
//! [`InMemoryControl`] records every call it receives, in arrival order, and
//! can be told to fail specific channels or to take a fixed amount of time
//! per call. [`InMemoryResolver`] hands out shared `InMemoryControl` handles
//! keyed by region.
//!
//! ## Limitations
//!
//! - No channel state is modelled; every call is accepted unless told otherwise
//! - Single-process only

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::control::{ChannelControl, EndpointResolver};
use crate::error::{ApiError, EndpointError};
use crate::types::BatchScheduleUpdate;

/// One call observed by [`InMemoryControl`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Start { channel_id: String },
    Stop { channel_id: String },
    UpdateSchedule {
        channel_id: String,
        update: BatchScheduleUpdate,
    },
}

impl RecordedCall {
    pub fn channel_id(&self) -> &str {
        match self {
            RecordedCall::Start { channel_id }
            | RecordedCall::Stop { channel_id }
            | RecordedCall::UpdateSchedule { channel_id, .. } => channel_id,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryControl {
    region: String,
    calls: Mutex<Vec<RecordedCall>>,
    failing: Mutex<HashSet<String>>,
    latency: Option<Duration>,
}

impl InMemoryControl {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call addressed to `channel_id` fail.
    pub fn fail_channel(&self, channel_id: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel_id.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn record(&self, call: RecordedCall) -> Result<(), ApiError> {
        let channel_id = call.channel_id().to_string();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&channel_id);
        if failing {
            return Err(ApiError::Rejected(format!(
                "channel {channel_id} rejected the request in {}",
                self.region
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelControl for InMemoryControl {
    async fn start_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::Start {
            channel_id: channel_id.to_string(),
        })
        .await
    }

    async fn stop_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        self.record(RecordedCall::Stop {
            channel_id: channel_id.to_string(),
        })
        .await
    }

    async fn update_schedule(
        &self,
        channel_id: &str,
        update: &BatchScheduleUpdate,
    ) -> Result<(), ApiError> {
        self.record(RecordedCall::UpdateSchedule {
            channel_id: channel_id.to_string(),
            update: update.clone(),
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// InMemoryResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryResolver {
    regions: Mutex<HashMap<String, Arc<InMemoryControl>>>,
    unavailable: Mutex<HashSet<String>>,
    resolve_count: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles created by this resolver answer after `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The handle for `region`, created on first use.
    pub fn control(&self, region: &str) -> Arc<InMemoryControl> {
        let mut regions = self.regions.lock().unwrap_or_else(PoisonError::into_inner);
        regions
            .entry(region.to_string())
            .or_insert_with(|| {
                let control = InMemoryControl::new(region);
                Arc::new(match self.latency {
                    Some(latency) => control.with_latency(latency),
                    None => control,
                })
            })
            .clone()
    }

    /// Make resolution of `region` fail.
    pub fn make_unavailable(&self, region: impl Into<String>) {
        self.unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region.into());
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_count.load(Ordering::SeqCst)
    }

    /// Total number of calls across every region.
    pub fn total_calls(&self) -> usize {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|c| c.calls().len())
            .sum()
    }
}

impl EndpointResolver for InMemoryResolver {
    fn resolve(&self, region: &str) -> Result<Arc<dyn ChannelControl>, EndpointError> {
        self.resolve_count.fetch_add(1, Ordering::SeqCst);
        let unavailable = self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(region);
        if unavailable {
            return Err(EndpointError::Unavailable(region.to_string()));
        }
        Ok(self.control(region))
    }
}
