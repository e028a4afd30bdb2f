//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treewalk/treewalk.toml`
//! 3. Local config: `./.treewalk.toml`, or the file passed with `--config`
//! 4. Environment variables: `TREEWALK_*` prefix, `__` between sections
//!    (e.g. `TREEWALK_COMPARE__STRATEGY=early-exit`)
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult, Strategy};
use crate::domain::DEFAULT_TREE_SIZE;

/// File name of the local config, looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = ".treewalk.toml";

/// Comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompareConfig {
    /// `drain` reads both streams to the end, `early-exit` stops at the first mismatch
    pub strategy: Strategy,
    /// Channel buffer per walker; 0 is an unbuffered handoff
    pub channel_capacity: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Drain,
            channel_capacity: 0,
        }
    }
}

/// Generated tree settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    /// Number of values in a `k=N` tree
    pub size: usize,
    /// Fixed RNG seed for reproducible shapes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_TREE_SIZE,
            seed: None,
        }
    }
}

/// Raw settings for intermediate parsing (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub compare: RawCompareConfig,
    pub tree: RawTreeConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawCompareConfig {
    pub strategy: Option<Strategy>,
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawTreeConfig {
    pub size: Option<usize>,
    pub seed: Option<u64>,
}

/// Unified configuration for treewalk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub compare: CompareConfig,
    pub tree: TreeConfig,
}

/// Get the XDG config directory for treewalk.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treewalk").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treewalk.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_NAME)
}

/// The `TREEWALK_*` environment source.
pub fn environment() -> Environment {
    Environment::with_prefix("TREEWALK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            compare: CompareConfig {
                strategy: overlay.compare.strategy.unwrap_or(self.compare.strategy),
                channel_capacity: overlay
                    .compare
                    .channel_capacity
                    .unwrap_or(self.compare.channel_capacity),
            },
            tree: TreeConfig {
                size: overlay.tree.size.unwrap_or(self.tree.size),
                seed: overlay.tree.seed.or(self.tree.seed),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `config_file` replaces the `./.treewalk.toml` lookup and must exist.
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        let local = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .map(|dir| local_config_path(&dir)),
        };
        Self::load_from(
            global_config_path().as_deref(),
            local.as_deref(),
            environment(),
        )
    }

    /// Load from explicit sources. Missing files are skipped.
    pub fn load_from(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Environment,
    ) -> ApplicationResult<Self> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
                tracing::debug!("loaded config from {}", path.display());
            }
        }

        Self::apply_env_overrides(current, env)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = lookup::<String>(&config, "compare.strategy")? {
            settings.compare.strategy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Some(val) = lookup::<usize>(&config, "compare.channel_capacity")? {
            settings.compare.channel_capacity = val;
        }
        if let Some(val) = lookup::<usize>(&config, "tree.size")? {
            settings.tree.size = val;
        }
        if let Some(val) = lookup::<u64>(&config, "tree.seed")? {
            settings.tree.seed = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treewalk configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treewalk/treewalk.toml
#   Local:  ./.treewalk.toml (or --config <file>)
#   Env:    TREEWALK_* environment variables, e.g. TREEWALK_COMPARE__STRATEGY
#   Flags:  command-line options

[compare]
# "drain" reads both trees to the end, "early-exit" stops at the first mismatch
# strategy = "drain"

# Values buffered per walker channel (0 = unbuffered handoff)
# channel_capacity = 0

[tree]
# Number of values in a generated k=N tree
# size = 10

# Fixed seed for reproducible tree shapes
# seed = 42
"#
        .to_string()
    }
}

fn lookup<T: DeserializeOwned>(config: &Config, key: &str) -> ApplicationResult<Option<T>> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_sources_when_loading_then_uses_defaults() {
        let env = environment().source(Some(Default::default()));
        let settings = Settings::load_from(None, None, env).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.compare.strategy, Strategy::Drain);
        assert_eq!(settings.compare.channel_capacity, 0);
        assert_eq!(settings.tree.size, DEFAULT_TREE_SIZE);
        assert_eq!(settings.tree.seed, None);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings {
            compare: CompareConfig {
                strategy: Strategy::EarlyExit,
                channel_capacity: 4,
            },
            tree: TreeConfig {
                size: 5,
                seed: Some(1),
            },
        };
        let overlay = RawSettings {
            compare: RawCompareConfig {
                strategy: None,
                channel_capacity: Some(0),
            },
            tree: RawTreeConfig {
                size: None,
                seed: Some(9),
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.compare.strategy, Strategy::EarlyExit);
        assert_eq!(merged.compare.channel_capacity, 0);
        assert_eq!(merged.tree.size, 5);
        assert_eq!(merged.tree.seed, Some(9));
    }

    #[test]
    fn given_defaults_when_serialized_then_omits_unset_seed() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("strategy = \"drain\""));
        assert!(toml.contains("size = 10"));
        assert!(!toml.contains("seed"));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_empty_config() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.compare.strategy.is_none());
        assert!(raw.tree.size.is_none());
    }
}
