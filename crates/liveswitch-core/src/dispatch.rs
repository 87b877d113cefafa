//! Fleet command dispatch.
//!
//! A fleet operation resolves one control handle per distinct region, then
//! issues one remote call per channel. Each call is guarded on its own: an
//! unreachable region, a rejected call or a timeout becomes a failed
//! [`CommandResult`] and the remaining channels are still attempted.
//!
//! Results always come back in topology order (group order, then
//! `channel_ids` order), whether the calls ran sequentially or on the
//! bounded pool.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use medialive_api::{
    ApiError, BatchScheduleUpdate, ChannelControl, EndpointResolver, ScheduledAction,
};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{info, warn, Instrument};

use crate::error::Result;
use crate::report::{CommandResult, FailureKind, FleetReport, GroupError};
use crate::schedule::{ActionBuilder, ScheduleMode};
use crate::topology::{ChannelGroup, FleetTopology, GroupSelector};

// ---------------------------------------------------------------------------
// DispatchOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Upper bound on a single remote call.
    pub call_timeout: Duration,
    /// Calls in flight at once; `1` is strictly sequential.
    pub max_concurrency: usize,
    /// Group `n` starts no earlier than `n * region_pacing` after the
    /// operation began.
    pub region_pacing: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            max_concurrency: 1,
            region_pacing: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelOp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ChannelOp {
    Start,
    Stop,
    UpdateSchedule(Arc<BatchScheduleUpdate>),
}

impl ChannelOp {
    fn verb(&self) -> &'static str {
        match self {
            ChannelOp::Start => "start_channel",
            ChannelOp::Stop => "stop_channel",
            ChannelOp::UpdateSchedule(_) => "update_schedule",
        }
    }

    async fn apply(
        &self,
        control: &dyn ChannelControl,
        channel_id: &str,
    ) -> std::result::Result<(), ApiError> {
        match self {
            ChannelOp::Start => control.start_channel(channel_id).await,
            ChannelOp::Stop => control.stop_channel(channel_id).await,
            ChannelOp::UpdateSchedule(update) => control.update_schedule(channel_id, update).await,
        }
    }
}

/// One planned channel call.
struct Job {
    group: String,
    region: String,
    channel_id: String,
    position: usize,
    handle: std::result::Result<Arc<dyn ChannelControl>, String>,
}

impl Job {
    fn failed(
        &self,
        kind: FailureKind,
        detail: impl Into<String>,
        duration_ms: u64,
    ) -> CommandResult {
        CommandResult::failure(
            &self.group,
            &self.region,
            &self.channel_id,
            kind,
            detail,
            duration_ms,
        )
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    resolver: Arc<dyn EndpointResolver>,
    builder: ActionBuilder,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(
        resolver: Arc<dyn EndpointResolver>,
        builder: ActionBuilder,
        options: DispatchOptions,
    ) -> Self {
        Self {
            resolver,
            builder,
            options,
        }
    }

    pub fn builder(&self) -> &ActionBuilder {
        &self.builder
    }

    pub async fn start(&self, topology: &FleetTopology) -> FleetReport {
        self.fan_out("start", topology, ChannelOp::Start).await
    }

    pub async fn stop(&self, topology: &FleetTopology) -> FleetReport {
        self.fan_out("stop", topology, ChannelOp::Stop).await
    }

    /// Sends one switch action, built once, to every channel.
    pub async fn switch_input(
        &self,
        topology: &FleetTopology,
        target_input: &str,
        mode: ScheduleMode,
    ) -> FleetReport {
        let action = self.builder.build_input_switch(target_input, mode);
        info!(
            target_input,
            action_name = %action.action_name,
            "built input switch"
        );
        let update = Arc::new(self.builder.envelope(action));
        self.fan_out("switch_input", topology, ChannelOp::UpdateSchedule(update))
            .await
    }

    pub async fn pause_channel(
        &self,
        topology: &FleetTopology,
        group: &GroupSelector,
        index: usize,
    ) -> Result<FleetReport> {
        let action = self.builder.build_pause();
        self.single_target("pause", topology, group, index, action)
            .await
    }

    pub async fn unpause_channel(
        &self,
        topology: &FleetTopology,
        group: &GroupSelector,
        index: usize,
    ) -> Result<FleetReport> {
        let action = self.builder.build_unpause();
        self.single_target("unpause", topology, group, index, action)
            .await
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Resolves the target before anything is sent; a bad selector or index
    /// touches no channel.
    async fn single_target(
        &self,
        label: &str,
        topology: &FleetTopology,
        selector: &GroupSelector,
        index: usize,
        action: ScheduledAction,
    ) -> Result<FleetReport> {
        let group = topology.select(selector)?;
        let channel_id = group.channel_at(index)?;
        let target = FleetTopology::new(vec![ChannelGroup::new(
            group.name.clone(),
            group.region.clone(),
            [channel_id],
        )]);
        let update = Arc::new(self.builder.envelope(action));
        Ok(self
            .fan_out(label, &target, ChannelOp::UpdateSchedule(update))
            .await)
    }

    async fn fan_out(&self, label: &str, topology: &FleetTopology, op: ChannelOp) -> FleetReport {
        let mut report = FleetReport::new(label);
        let span = tracing::info_span!("fleet", operation = %report.operation_id, command = label);

        async {
            let jobs = self.plan(topology, &mut report.group_errors);
            let started = Instant::now();

            report.results = if self.options.max_concurrency <= 1 {
                let mut results = Vec::with_capacity(jobs.len());
                for job in jobs {
                    pace(&job, self.options, started).await;
                    results.push(run_job(job, op.clone(), self.options).await);
                }
                results
            } else {
                run_pooled(jobs, op, self.options, started).await
            };

            if report.is_success() {
                info!("{}", report.summary());
            } else {
                warn!("{}", report.summary());
            }
        }
        .instrument(span)
        .await;

        report
    }

    /// One handle per distinct region, shared by every channel in it.
    fn plan(&self, topology: &FleetTopology, group_errors: &mut Vec<GroupError>) -> Vec<Job> {
        let mut handles: HashMap<&str, std::result::Result<Arc<dyn ChannelControl>, String>> =
            HashMap::new();
        let mut jobs = Vec::with_capacity(topology.channel_count());

        for (position, group) in topology.groups.iter().enumerate() {
            let handle = handles
                .entry(group.region.as_str())
                .or_insert_with(|| {
                    self.resolver
                        .resolve(&group.region)
                        .map_err(|e| e.to_string())
                })
                .clone();

            if let Err(detail) = &handle {
                warn!(
                    group = %group.name,
                    region = %group.region,
                    error = %detail,
                    "endpoint resolution failed; skipping group"
                );
                group_errors.push(GroupError {
                    group: group.name.clone(),
                    region: group.region.clone(),
                    detail: detail.clone(),
                });
            }

            for channel_id in &group.channel_ids {
                jobs.push(Job {
                    group: group.name.clone(),
                    region: group.region.clone(),
                    channel_id: channel_id.clone(),
                    position,
                    handle: handle.clone(),
                });
            }
        }
        jobs
    }
}

/// Waits out the group's pacing offset. Holds nothing while waiting.
async fn pace(job: &Job, options: DispatchOptions, started: Instant) {
    if options.region_pacing.is_zero() || job.position == 0 {
        return;
    }
    let steps = u32::try_from(job.position).unwrap_or(u32::MAX);
    let offset = options.region_pacing.saturating_mul(steps);
    match started.checked_add(offset) {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => warn!(group = %job.group, "pacing offset out of range; not waiting"),
    }
}

async fn run_job(job: Job, op: ChannelOp, options: DispatchOptions) -> CommandResult {
    let handle = match &job.handle {
        Ok(handle) => handle.clone(),
        Err(detail) => return job.failed(FailureKind::EndpointResolution, detail.clone(), 0),
    };

    info!(
        group = %job.group,
        region = %job.region,
        channel = %job.channel_id,
        call = op.verb(),
        "dispatching"
    );

    let call_started = Instant::now();
    let call = op.apply(handle.as_ref(), &job.channel_id);
    let outcome = tokio::time::timeout(options.call_timeout, call).await;
    let elapsed = u64::try_from(call_started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(Ok(())) => {
            info!(
                channel = %job.channel_id,
                region = %job.region,
                elapsed_ms = elapsed,
                "succeeded"
            );
            CommandResult::success(&job.group, &job.region, &job.channel_id, elapsed)
        }
        Ok(Err(e)) => {
            warn!(channel = %job.channel_id, region = %job.region, error = %e, "call failed");
            job.failed(FailureKind::Remote, e.to_string(), elapsed)
        }
        Err(_) => {
            warn!(
                channel = %job.channel_id,
                region = %job.region,
                timeout_ms = options.call_timeout.as_millis() as u64,
                "call timed out"
            );
            job.failed(
                FailureKind::Timeout,
                format!("no response within {}s", options.call_timeout.as_secs_f64()),
                elapsed,
            )
        }
    }
}

/// Bounded pool: at most `max_concurrency` calls in flight, results
/// collected in submission order.
async fn run_pooled(
    jobs: Vec<Job>,
    op: ChannelOp,
    options: DispatchOptions,
    started: Instant,
) -> Vec<CommandResult> {
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency));
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let sem = semaphore.clone();
        let op = op.clone();
        let key = (job.group.clone(), job.region.clone(), job.channel_id.clone());
        let handle = tokio::spawn(
            async move {
                pace(&job, options, started).await;
                let _permit = match sem.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return job.failed(FailureKind::Remote, "worker pool closed", 0),
                };
                run_job(job, op, options).await
            }
            .in_current_span(),
        );
        handles.push((key, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for ((group, region, channel_id), handle) in handles {
        match handle.await {
            Ok(r) => results.push(r),
            Err(e) => results.push(CommandResult::failure(
                &group,
                &region,
                &channel_id,
                FailureKind::Remote,
                format!("task join error: {e}"),
                0,
            )),
        }
    }
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
