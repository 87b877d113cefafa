use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a channel call did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No handle could be built for the channel's region.
    EndpointResolution,
    /// The remote call returned an error.
    Remote,
    /// The remote call did not answer within the call timeout.
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::EndpointResolution => "endpoint_resolution",
            FailureKind::Remote => "remote",
            FailureKind::Timeout => "timeout",
        }
    }
}

/// Outcome of one channel call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub group: String,
    pub region: String,
    pub channel_id: String,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub duration_ms: u64,
}

impl CommandResult {
    pub fn success(group: &str, region: &str, channel_id: &str, duration_ms: u64) -> Self {
        Self {
            group: group.to_string(),
            region: region.to_string(),
            channel_id: channel_id.to_string(),
            succeeded: true,
            failure: None,
            error_detail: None,
            duration_ms,
        }
    }

    pub fn failure(
        group: &str,
        region: &str,
        channel_id: &str,
        kind: FailureKind,
        detail: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            group: group.to_string(),
            region: region.to_string(),
            channel_id: channel_id.to_string(),
            succeeded: false,
            failure: Some(kind),
            error_detail: Some(detail.into()),
            duration_ms,
        }
    }
}

/// A group whose region could not be reached at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupError {
    pub group: String,
    pub region: String,
    pub detail: String,
}

/// Aggregated outcome of one fleet operation, in topology order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetReport {
    pub operation_id: Uuid,
    pub command: String,
    pub results: Vec<CommandResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_errors: Vec<GroupError>,
}

impl FleetReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            command: command.into(),
            results: Vec::new(),
            group_errors: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.group_errors.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommandResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} succeeded, {} failed",
            self.command,
            self.succeeded(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_summary() {
        let mut report = FleetReport::new("start");
        report
            .results
            .push(CommandResult::success("tokyo", "ap-northeast-1", "1", 3));
        report.results.push(CommandResult::failure(
            "osaka",
            "ap-northeast-3",
            "2",
            FailureKind::Remote,
            "boom",
            4,
        ));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(report.summary(), "start: 1 succeeded, 1 failed");
        assert_eq!(report.failures().next().unwrap().channel_id, "2");
    }

    #[test]
    fn empty_report_is_success() {
        assert!(FleetReport::new("stop").is_success());
    }

    #[test]
    fn json_omits_absent_failure_fields() {
        let r = CommandResult::success("tokyo", "ap-northeast-1", "1", 0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("failure"));
        assert!(!json.contains("error_detail"));

        let f = CommandResult::failure("t", "r", "1", FailureKind::Timeout, "slow", 0);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["failure"], "timeout");
    }
}
