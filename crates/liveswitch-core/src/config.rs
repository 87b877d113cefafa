use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use medialive_api::EndpointSettings;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchOptions;
use crate::error::{LiveSwitchError, Result};
use crate::topology::{FleetTopology, GroupSelector};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: String) -> Self {
        Self {
            level: WarnLevel::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: WarnLevel::Error,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// PauseTargets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseTarget {
    pub group: GroupSelector,
    #[serde(default)]
    pub index: usize,
}

/// Which channel `ch1_*` and `ch2_*` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseTargets {
    #[serde(default = "default_ch1_target")]
    pub ch1: PauseTarget,
    #[serde(default = "default_ch2_target")]
    pub ch2: PauseTarget,
}

fn default_ch1_target() -> PauseTarget {
    PauseTarget {
        group: GroupSelector::Position(0),
        index: 0,
    }
}

fn default_ch2_target() -> PauseTarget {
    PauseTarget {
        group: GroupSelector::Position(1),
        index: 0,
    }
}

impl Default for PauseTargets {
    fn default() -> Self {
        Self {
            ch1: default_ch1_target(),
            ch2: default_ch2_target(),
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    #[serde(default = "default_call_timeout")]
    pub call_timeout_seconds: u64,
    /// `1` keeps calls strictly sequential.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Spacing between consecutive regions' first calls.
    #[serde(default)]
    pub region_pacing_ms: u64,
}

/// One hour between consecutive regions.
const MAX_REGION_PACING_MS: u64 = 3_600_000;

fn default_call_timeout() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    1
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            call_timeout_seconds: default_call_timeout(),
            max_concurrency: default_max_concurrency(),
            region_pacing_ms: 0,
        }
    }
}

impl DispatchSettings {
    pub fn options(&self) -> DispatchOptions {
        DispatchOptions {
            call_timeout: Duration::from_secs(self.call_timeout_seconds),
            max_concurrency: self.max_concurrency.max(1),
            region_pacing: Duration::from_millis(self.region_pacing_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// ExitPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Non-zero exit when any channel failed.
    #[default]
    Strict,
    /// Zero exit whenever a recognised command was dispatched.
    Lenient,
}

impl std::str::FromStr for ExitPolicy {
    type Err = LiveSwitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ExitPolicy::Strict),
            "lenient" => Ok(ExitPolicy::Lenient),
            other => Err(LiveSwitchError::InvalidConfig(format!(
                "unknown exit policy '{other}'; valid: strict, lenient"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub topology: FleetTopology,
    /// Fallback source; `input_s3` switches here immediately.
    pub primary_input: String,
    /// Production source; `input_live` switches here after the lead time.
    pub secondary_input: String,
    #[serde(default = "default_switch_lead")]
    pub switch_lead_seconds: u64,
    #[serde(default)]
    pub pause_targets: PauseTargets,
    #[serde(default)]
    pub endpoints: EndpointSettings,
    #[serde(default)]
    pub dispatch: DispatchSettings,
    #[serde(default)]
    pub exit_policy: ExitPolicy,
}

fn default_version() -> u32 {
    1
}

fn default_switch_lead() -> u64 {
    30
}

static REGION_RE: OnceLock<Regex> = OnceLock::new();

fn region_re() -> &'static Regex {
    REGION_RE.get_or_init(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").unwrap())
}

impl Config {
    pub fn new(
        topology: FleetTopology,
        primary_input: impl Into<String>,
        secondary_input: impl Into<String>,
    ) -> Self {
        Self {
            version: default_version(),
            topology,
            primary_input: primary_input.into(),
            secondary_input: secondary_input.into(),
            switch_lead_seconds: default_switch_lead(),
            pause_targets: PauseTargets::default(),
            endpoints: EndpointSettings::default(),
            dispatch: DispatchSettings::default(),
            exit_policy: ExitPolicy::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LiveSwitchError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn switch_lead(&self) -> Duration {
        Duration::from_secs(self.switch_lead_seconds)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let groups = &self.topology.groups;

        if groups.is_empty() {
            warnings.push(ConfigWarning::error(
                "topology has no channel groups".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut seen_in_region: HashMap<&str, HashSet<&str>> = HashMap::new();
        for group in groups {
            if !names.insert(group.name.as_str()) {
                warnings.push(ConfigWarning::error(format!(
                    "duplicate channel group name '{}'",
                    group.name
                )));
            }
            if group.channel_ids.is_empty() {
                warnings.push(ConfigWarning::error(format!(
                    "channel group '{}' has no channel ids",
                    group.name
                )));
            }
            if !region_re().is_match(&group.region) {
                warnings.push(ConfigWarning::warning(format!(
                    "region '{}' of group '{}' does not look like a region id",
                    group.region, group.name
                )));
            }
            let seen = seen_in_region.entry(group.region.as_str()).or_default();
            for id in &group.channel_ids {
                if !seen.insert(id.as_str()) {
                    warnings.push(ConfigWarning::warning(format!(
                        "channel '{}' appears more than once in region '{}'",
                        id, group.region
                    )));
                }
            }
        }

        if self.primary_input.trim().is_empty() {
            warnings.push(ConfigWarning::error("primary_input is empty".to_string()));
        }
        if self.secondary_input.trim().is_empty() {
            warnings.push(ConfigWarning::error("secondary_input is empty".to_string()));
        }

        if self.switch_lead_seconds > 3600 {
            warnings.push(ConfigWarning::warning(format!(
                "switch_lead_seconds={} (>3600 is unusual)",
                self.switch_lead_seconds
            )));
        }

        if self.dispatch.max_concurrency == 0 {
            warnings.push(ConfigWarning::error(
                "dispatch.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.dispatch.call_timeout_seconds == 0 {
            warnings.push(ConfigWarning::error(
                "dispatch.call_timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.dispatch.region_pacing_ms > MAX_REGION_PACING_MS {
            warnings.push(ConfigWarning::error(format!(
                "dispatch.region_pacing_ms={} exceeds {MAX_REGION_PACING_MS}",
                self.dispatch.region_pacing_ms
            )));
        }

        for (label, target) in [
            ("ch1", &self.pause_targets.ch1),
            ("ch2", &self.pause_targets.ch2),
        ] {
            let resolved = self
                .topology
                .select(&target.group)
                .and_then(|g| g.channel_at(target.index).map(|_| ()));
            if let Err(e) = resolved {
                warnings.push(ConfigWarning::warning(format!(
                    "pause target {label} does not resolve: {e}"
                )));
            }
        }

        warnings
    }

    /// The first error-level finding, if any.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(LiveSwitchError::InvalidConfig(w.message)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
