// Publish-side configuration
//
// The extraction pipeline takes no configuration at all; everything here
// belongs to the publish collaborator and is handed to it explicitly at
// call time.

use std::env;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MEDIA_DIR: &str = "public/media";
pub const DEFAULT_INDEX_PATH: &str = "reels.json";

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub media_dir: String,
    pub index_path: String,
}

#[derive(Debug)]
pub enum ConfigError {
    /// A required key is set neither in the environment nor the config file
    Missing(&'static str),
    Unreadable(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(
                f,
                "Missing configuration: set {} or add it to the config file \
                 under your config dir (reel-publisher/config.json)",
                key
            ),
            Self::Unreadable(msg) => write!(f, "Could not read config file: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Optional config file; environment variables override its values
#[derive(Debug, Default, Deserialize)]
struct ConfigSource {
    token: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
    media_dir: Option<String>,
    index_path: Option<String>,
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reel-publisher").join("config.json"))
}

fn read_file_config() -> Result<ConfigSource, ConfigError> {
    let Some(path) = config_file_path() else {
        return Ok(ConfigSource::default());
    };
    if !path.exists() {
        return Ok(ConfigSource::default());
    }
    let raw =
        std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Unreadable(e.to_string()))
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_config() -> ConfigSource {
    ConfigSource {
        token: env_var("REEL_GITHUB_TOKEN"),
        owner: env_var("REEL_GITHUB_OWNER"),
        repo: env_var("REEL_GITHUB_REPO"),
        branch: env_var("REEL_GITHUB_BRANCH"),
        media_dir: env_var("REEL_MEDIA_DIR"),
        index_path: env_var("REEL_INDEX_PATH"),
    }
}

impl PublishConfig {
    /// Environment variables (REEL_GITHUB_*) override the config file;
    /// token, owner and repo are required.
    pub fn load() -> Result<Self, ConfigError> {
        let file = read_file_config()?;
        Self::merge(env_config(), file)
    }

    fn merge(env: ConfigSource, file: ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            token: env
                .token
                .or(file.token)
                .ok_or(ConfigError::Missing("REEL_GITHUB_TOKEN"))?,
            owner: env
                .owner
                .or(file.owner)
                .ok_or(ConfigError::Missing("REEL_GITHUB_OWNER"))?,
            repo: env
                .repo
                .or(file.repo)
                .ok_or(ConfigError::Missing("REEL_GITHUB_REPO"))?,
            branch: env
                .branch
                .or(file.branch)
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            media_dir: env
                .media_dir
                .or(file.media_dir)
                .unwrap_or_else(|| DEFAULT_MEDIA_DIR.to_string()),
            index_path: env
                .index_path
                .or(file.index_path)
                .unwrap_or_else(|| DEFAULT_INDEX_PATH.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins_over_file() {
        let env = ConfigSource {
            token: Some("env-token".to_string()),
            owner: Some("env-owner".to_string()),
            repo: None,
            ..ConfigSource::default()
        };
        let file = ConfigSource {
            token: Some("file-token".to_string()),
            repo: Some("file-repo".to_string()),
            branch: Some("gh-pages".to_string()),
            ..ConfigSource::default()
        };

        let config = PublishConfig::merge(env, file).unwrap();
        assert_eq!(config.token, "env-token");
        assert_eq!(config.repo, "file-repo");
        assert_eq!(config.branch, "gh-pages");
        assert_eq!(config.media_dir, DEFAULT_MEDIA_DIR);
    }

    #[test]
    fn test_missing_required_key_is_an_error() {
        let result = PublishConfig::merge(ConfigSource::default(), ConfigSource::default());
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }
}
