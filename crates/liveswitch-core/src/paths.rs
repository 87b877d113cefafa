use std::path::{Path, PathBuf};

use crate::error::{LiveSwitchError, Result};

pub const CONFIG_FILE: &str = "liveswitch.yaml";
pub const USER_CONFIG_DIR: &str = ".config/liveswitch";
pub const USER_CONFIG_FILE: &str = "config.yaml";

pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// `~/.config/liveswitch/config.yaml`
pub fn user_config_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(LiveSwitchError::HomeNotFound)?;
    Ok(home.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_config_is_in_dir() {
        let p = project_config_path(Path::new("/srv/ops"));
        assert_eq!(p, PathBuf::from("/srv/ops/liveswitch.yaml"));
    }
}
