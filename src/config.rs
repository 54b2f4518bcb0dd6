//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/fractree/fractree.toml`
//! 3. Local config: file given with `--config` / `FRACTREE_CONFIG`
//! 4. Environment variables: `FRACTREE_*` prefix, `__` separates nested keys
//!    (e.g. `FRACTREE_TREE__MAX_DEPTH=5`); a variable that is set but does not
//!    parse is an error, never silently ignored
//!
//! Angles are configured in degrees and converted to radians by [`Settings::to_params`].

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use glam::DVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{TraversalOrder, TreeParams};

/// Default parameters of the root branch, in user-facing units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeSettings {
    pub start_x: f64,
    pub start_y: f64,
    /// Trunk length
    pub length: f64,
    /// Trunk direction in degrees
    pub angle: f64,
    /// Number of branches per node
    pub num_children: i32,
    /// Length ratio child/parent
    pub length_scale: f64,
    /// Angle between sibling branches in degrees
    pub delta_angle: f64,
    pub max_depth: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        let params = TreeParams::default();
        Self {
            start_x: params.start.x,
            start_y: params.start.y,
            length: params.length,
            angle: params.angle.to_degrees(),
            num_children: params.num_children,
            length_scale: params.length_scale,
            delta_angle: params.delta_angle.to_degrees(),
            max_depth: params.max_depth,
        }
    }
}

/// Raw tree settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeSettings {
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    pub length: Option<f64>,
    pub angle: Option<f64>,
    pub num_children: Option<i32>,
    pub length_scale: Option<f64>,
    pub delta_angle: Option<f64>,
    pub max_depth: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub traversal: Option<TraversalOrder>,
    pub parallel: Option<bool>,
    pub max_nodes: Option<usize>,
    pub tree: RawTreeSettings,
}

impl TreeSettings {
    /// Merge overlay onto self (base): overlay wins if Some.
    pub fn merge(&self, overlay: &RawTreeSettings) -> Self {
        Self {
            start_x: overlay.start_x.unwrap_or(self.start_x),
            start_y: overlay.start_y.unwrap_or(self.start_y),
            length: overlay.length.unwrap_or(self.length),
            angle: overlay.angle.unwrap_or(self.angle),
            num_children: overlay.num_children.unwrap_or(self.num_children),
            length_scale: overlay.length_scale.unwrap_or(self.length_scale),
            delta_angle: overlay.delta_angle.unwrap_or(self.delta_angle),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }
}

/// Unified configuration for fractree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Order used by `segments` when none is given on the command line
    pub traversal: TraversalOrder,
    /// Build sibling subtrees on the rayon thread pool
    pub parallel: bool,
    /// Largest tree the command line agrees to build
    pub max_nodes: usize,
    /// Root branch parameters
    pub tree: TreeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            traversal: TraversalOrder::BreadthFirst,
            parallel: false,
            max_nodes: DEFAULT_MAX_NODES,
            tree: TreeSettings::default(),
        }
    }
}

/// Default node limit, a few hundred MiB of segments.
pub const DEFAULT_MAX_NODES: usize = 5_000_000;

/// Get the XDG config directory for fractree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fractree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("fractree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| ApplicationError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Typed value of an environment key: `None` if unset, an error if unparsable.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> ApplicationResult<Option<T>> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("environment override {}: {}", key, e),
        }),
    }
}

/// Reject parameters that cannot describe a drawable tree.
///
/// A negative `num_children` is deliberately not checked here, the domain
/// reports it as an invalid argument when the tree is built.
pub fn validate_params(params: &TreeParams) -> ApplicationResult<()> {
    if !(params.length.is_finite() && params.length > 0.0) {
        return Err(ApplicationError::Config {
            message: format!("length must be a positive number, got {}", params.length),
        });
    }
    for (name, value) in [
        ("start_x", params.start.x),
        ("start_y", params.start.y),
        ("angle", params.angle),
        ("length_scale", params.length_scale),
        ("delta_angle", params.delta_angle),
    ] {
        if !value.is_finite() {
            return Err(ApplicationError::Config {
                message: format!("{} must be finite, got {}", name, value),
            });
        }
    }
    Ok(())
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given explicitly by the user; it must exist
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers(global_config_path().as_deref(), local)
    }

    /// Load settings from explicit layer files.
    ///
    /// A missing global file is skipped, a missing local file is an error
    /// because the user asked for it by name.
    pub fn load_layers(global: Option<&Path>, local: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers_with_env(global, local, None)
    }

    /// Like [`Settings::load_layers`], reading `FRACTREE_*` variables from
    /// `env` instead of the process environment when given.
    #[instrument(level = "debug", skip(env))]
    pub fn load_layers_with_env(
        global: Option<&Path>,
        local: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Local config
        if let Some(local_path) = local {
            debug!("loading local config {}", local_path.display());
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, env)?;

        current.validate()?;
        Ok(current)
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            traversal: overlay.traversal.unwrap_or(self.traversal),
            parallel: overlay.parallel.unwrap_or(self.parallel),
            max_nodes: overlay.max_nodes.unwrap_or(self.max_nodes),
            tree: self.tree.merge(&overlay.tree),
        }
    }

    /// Apply FRACTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FRACTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        let tree = &mut settings.tree;
        if let Some(val) = env_value(&config, "tree.start_x")? {
            tree.start_x = val;
        }
        if let Some(val) = env_value(&config, "tree.start_y")? {
            tree.start_y = val;
        }
        if let Some(val) = env_value(&config, "tree.length")? {
            tree.length = val;
        }
        if let Some(val) = env_value(&config, "tree.angle")? {
            tree.angle = val;
        }
        if let Some(val) = env_value(&config, "tree.num_children")? {
            tree.num_children = val;
        }
        if let Some(val) = env_value(&config, "tree.length_scale")? {
            tree.length_scale = val;
        }
        if let Some(val) = env_value(&config, "tree.delta_angle")? {
            tree.delta_angle = val;
        }
        if let Some(val) = env_value(&config, "tree.max_depth")? {
            tree.max_depth = val;
        }
        if let Some(val) = env_value(&config, "traversal")? {
            settings.traversal = val;
        }
        if let Some(val) = env_value(&config, "parallel")? {
            settings.parallel = val;
        }
        if let Some(val) = env_value(&config, "max_nodes")? {
            settings.max_nodes = val;
        }

        Ok(settings)
    }

    /// Reject values that cannot describe a drawable tree.
    pub fn validate(&self) -> ApplicationResult<()> {
        validate_params(&self.to_params()).map_err(|e| match e {
            ApplicationError::Config { message } => ApplicationError::Config {
                message: format!("tree.{}", message),
            },
            other => other,
        })
    }

    /// Convert to domain parameters (degrees become radians).
    pub fn to_params(&self) -> TreeParams {
        let tree = &self.tree;
        TreeParams {
            start: DVec2::new(tree.start_x, tree.start_y),
            length: tree.length,
            angle: tree.angle.to_radians(),
            num_children: tree.num_children,
            length_scale: tree.length_scale,
            delta_angle: tree.delta_angle.to_radians(),
            depth: 0,
            max_depth: tree.max_depth,
        }
    }

    /// Render as TOML, the format of the config files.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
