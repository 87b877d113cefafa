use serde::{Deserialize, Serialize};

use crate::error::{LiveSwitchError, Result};

// ---------------------------------------------------------------------------
// ChannelGroup
// ---------------------------------------------------------------------------

/// One region's deployment of a redundant pipeline.
///
/// By convention index 0 of `channel_ids` is the primary and index 1 the
/// secondary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub name: String,
    pub region: String,
    pub channel_ids: Vec<String>,
}

impl ChannelGroup {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        channel_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            channel_ids: channel_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn channel_at(&self, index: usize) -> Result<&str> {
        self.channel_ids
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| LiveSwitchError::IndexOutOfRange {
                group: self.name.clone(),
                index,
                len: self.channel_ids.len(),
            })
    }
}

// ---------------------------------------------------------------------------
// GroupSelector
// ---------------------------------------------------------------------------

/// Addresses a group by position in the topology or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSelector {
    Position(usize),
    Name(String),
}

impl std::fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupSelector::Position(i) => write!(f, "#{i}"),
            GroupSelector::Name(n) => f.write_str(n),
        }
    }
}

// ---------------------------------------------------------------------------
// FleetTopology
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetTopology {
    #[serde(default)]
    pub groups: Vec<ChannelGroup>,
}

impl FleetTopology {
    pub fn new(groups: Vec<ChannelGroup>) -> Self {
        Self { groups }
    }

    pub fn select(&self, selector: &GroupSelector) -> Result<&ChannelGroup> {
        let found = match selector {
            GroupSelector::Position(i) => self.groups.get(*i),
            GroupSelector::Name(n) => self.groups.iter().find(|g| &g.name == n),
        };
        found.ok_or_else(|| LiveSwitchError::GroupNotFound(selector.to_string()))
    }

    /// Total channels across all groups.
    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|g| g.channel_ids.len()).sum()
    }

    /// Rejects shapes no fleet command can run against.
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(LiveSwitchError::InvalidConfig(
                "topology has no channel groups".to_string(),
            ));
        }
        if let Some(g) = self.groups.iter().find(|g| g.channel_ids.is_empty()) {
            return Err(LiveSwitchError::InvalidConfig(format!(
                "channel group '{}' has no channel ids",
                g.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> FleetTopology {
        FleetTopology::new(vec![
            ChannelGroup::new("tokyo", "ap-northeast-1", ["7528721", "7528722"]),
            ChannelGroup::new("osaka", "ap-northeast-3", ["3320982"]),
        ])
    }

    #[test]
    fn select_by_position_and_name() {
        let t = topology();
        assert_eq!(t.select(&GroupSelector::Position(1)).unwrap().name, "osaka");
        assert_eq!(
            t.select(&GroupSelector::Name("tokyo".into())).unwrap().region,
            "ap-northeast-1"
        );
    }

    #[test]
    fn select_missing_group_fails() {
        let t = topology();
        let err = t.select(&GroupSelector::Position(5)).unwrap_err();
        assert!(matches!(err, LiveSwitchError::GroupNotFound(s) if s == "#5"));
        assert!(t.select(&GroupSelector::Name("nagoya".into())).is_err());
    }

    #[test]
    fn channel_at_bounds() {
        let t = topology();
        let tokyo = &t.groups[0];
        assert_eq!(tokyo.channel_at(0).unwrap(), "7528721");
        assert_eq!(tokyo.channel_at(1).unwrap(), "7528722");
        let err = tokyo.channel_at(2).unwrap_err();
        assert!(matches!(
            err,
            LiveSwitchError::IndexOutOfRange { index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn selector_yaml_accepts_int_or_name() {
        let by_pos: GroupSelector = serde_yaml::from_str("1").unwrap();
        let by_name: GroupSelector = serde_yaml::from_str("osaka").unwrap();
        assert_eq!(by_pos, GroupSelector::Position(1));
        assert_eq!(by_name, GroupSelector::Name("osaka".into()));
    }

    #[test]
    fn validate_rejects_empty_shapes() {
        assert!(FleetTopology::default().validate().is_err());
        let t = FleetTopology::new(vec![ChannelGroup::new(
            "empty",
            "ap-northeast-1",
            Vec::<String>::new(),
        )]);
        assert!(t.validate().is_err());
        assert!(topology().validate().is_ok());
        assert_eq!(topology().channel_count(), 3);
    }
}
