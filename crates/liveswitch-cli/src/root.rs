use std::path::{Path, PathBuf};

use liveswitch_core::{paths, LiveSwitchError};

/// Resolve the config file.
///
/// Priority:
/// 1. `--config` flag / `LIVESWITCH_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `liveswitch.yaml`
/// 3. `~/.config/liveswitch/config.yaml`
pub fn resolve_config(explicit: Option<&Path>) -> Result<PathBuf, LiveSwitchError> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Some(found) = find_upward(&cwd) {
        return Ok(found);
    }

    if let Ok(user) = paths::user_config_path() {
        if user.is_file() {
            return Ok(user);
        }
    }

    Err(LiveSwitchError::ConfigNotFound(paths::project_config_path(
        &cwd,
    )))
}

/// Nearest `liveswitch.yaml` at or above `start`.
pub fn find_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = paths::project_config_path(&dir);
        if candidate.is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.yaml");
        assert_eq!(resolve_config(Some(&path)).unwrap(), path);
    }

    #[test]
    fn finds_config_in_parent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("liveswitch.yaml"), "x").unwrap();
        let deep = dir.path().join("ops/runbooks");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(
            find_upward(&deep).unwrap(),
            dir.path().join("liveswitch.yaml")
        );
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("liveswitch.yaml")).unwrap();
        let found = find_upward(dir.path());
        assert_ne!(found, Some(dir.path().join("liveswitch.yaml")));
    }
}
