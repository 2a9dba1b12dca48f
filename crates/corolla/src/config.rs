use crate::menu::tree::ItemId;
use crate::menu::{DEFAULT_COLLISION_THRESHOLD, NodeState};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DisplayFromStr, PickFirst, serde_as};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[strum(serialize = "North", serialize = "n", serialize = "top")]
    North,
    #[strum(serialize = "NorthEast", serialize = "ne")]
    NorthEast,
    #[strum(serialize = "East", serialize = "e", serialize = "right")]
    East,
    #[strum(serialize = "SouthEast", serialize = "se")]
    SouthEast,
    #[strum(serialize = "South", serialize = "s", serialize = "bottom")]
    South,
    #[strum(serialize = "SouthWest", serialize = "sw")]
    SouthWest,
    #[strum(serialize = "West", serialize = "w", serialize = "left")]
    West,
    #[strum(serialize = "NorthWest", serialize = "nw")]
    NorthWest,
}

impl Direction {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Clockwise from the top.
    pub fn degrees(&self) -> f64 {
        self.as_index() as f64 * 45.0
    }
}

/// A fixed item direction, written either as degrees or as a compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Heading(pub f64);

impl FromStr for Heading {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<f64>() {
            Ok(degrees) => Ok(Self(degrees)),
            Err(_) => Direction::from_str(s).map(|d| Self(d.degrees())),
        }
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied description of a menu tree.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuStructure {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub angle: Option<Heading>,
    #[serde(default, alias = "items")]
    pub children: Vec<MenuStructure>,
}

impl MenuStructure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.angle = Some(Heading(degrees));
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(ItemId::new(id));
        self
    }

    pub fn with_children(mut self, children: Vec<MenuStructure>) -> Self {
        self.children = children;
        self
    }
}

/// Size and distance of one visual tier, already multiplied by the global scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TierStyle {
    pub size: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub center_size: f64,
    pub center_size_hover: f64,
    pub child_size: f64,
    pub child_size_hover: f64,
    pub child_offset: f64,
    pub child_offset_hover: f64,
    pub grandchild_size: f64,
    pub grandchild_size_hover: f64,
    pub grandchild_offset: f64,
    pub grandchild_offset_hover: f64,
    pub global_scale: f64,
    pub wedge_inner_radius: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            center_size: 100.0,
            center_size_hover: 100.0,
            child_size: 50.0,
            child_size_hover: 60.0,
            child_offset: 100.0,
            child_offset_hover: 110.0,
            grandchild_size: 15.0,
            grandchild_size_hover: 20.0,
            grandchild_offset: 25.0,
            grandchild_offset_hover: 30.0,
            global_scale: 1.0,
            wedge_inner_radius: 42.0,
        }
    }
}

impl Settings {
    /// Sizes must be finite and non-negative, the scale finite and positive.
    pub fn is_valid(&self) -> bool {
        let sizes = [
            self.center_size,
            self.center_size_hover,
            self.child_size,
            self.child_size_hover,
            self.child_offset,
            self.child_offset_hover,
            self.grandchild_size,
            self.grandchild_size_hover,
            self.grandchild_offset,
            self.grandchild_offset_hover,
            self.wedge_inner_radius,
        ];

        sizes.iter().all(|v| v.is_finite() && *v >= 0.0)
            && self.global_scale.is_finite()
            && self.global_scale > 0.0
    }

    /// Largest distance from a center anchor that anything of the menu can reach.
    pub fn max_radius(&self) -> f64 {
        let center = self.center_size.max(self.center_size_hover) / 2.0;
        let child = (self.child_size / 2.0 + self.child_offset)
            .max(self.child_size_hover / 2.0 + self.child_offset_hover);
        let grandchild = (self.child_offset + self.grandchild_size / 2.0 + self.grandchild_offset)
            .max(
                self.child_offset_hover
                    + self.grandchild_size_hover / 2.0
                    + self.grandchild_offset_hover,
            );

        [self.wedge_inner_radius, center, child, grandchild]
            .into_iter()
            .fold(0.0, f64::max)
            * self.global_scale
    }

    pub fn inner_radius(&self) -> f64 {
        self.wedge_inner_radius * self.global_scale
    }

    /// Parent states are drawn like the matching child states.
    pub fn tier(&self, state: NodeState) -> TierStyle {
        let (size, offset) = match state.visual() {
            NodeState::Center => (self.center_size, 0.0),
            NodeState::CenterHovered => (self.center_size_hover, 0.0),
            NodeState::Child => (self.child_size, self.child_offset),
            NodeState::ChildHovered => (self.child_size_hover, self.child_offset_hover),
            NodeState::Grandchild => (self.grandchild_size, self.grandchild_offset),
            NodeState::GrandchildHovered => {
                (self.grandchild_size_hover, self.grandchild_offset_hover)
            }
            _ => (0.0, 0.0),
        };

        TierStyle {
            size: size * self.global_scale,
            offset: offset * self.global_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub collision_threshold: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            collision_threshold: DEFAULT_COLLISION_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub menus: Vec<MenuStructure>,
}

impl Config {
    pub fn find_menu(&self, name: &str) -> Option<&MenuStructure> {
        self.menus
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Replaces sizing or layout values that would break geometry with the defaults.
    fn sanitized(mut self) -> Self {
        if !self.settings.is_valid() {
            log::warn!("Ignoring non-finite or negative sizing settings, using defaults");
            self.settings = Settings::default();
        }
        let threshold = self.layout.collision_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            log::warn!("Ignoring collision threshold {}, using the default", threshold);
            self.layout = LayoutConfig::default();
        }
        self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "corolla", "corolla").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("COROLLA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Layers the config file, then the environment, over the built-in config. Arrays
/// such as `menus` are replaced as a whole by later sources.
fn build_config(
    path: Option<PathBuf>,
    env: Option<config::Environment>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder().add_source(config::File::from_str(
        DEFAULT_CONFIG,
        config::FileFormat::Toml,
    ));
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    if let Some(env) = env {
        builder = builder.add_source(env);
    }

    let config: Config = builder.build()?.try_deserialize()?;
    Ok(config.sanitized())
}

pub fn load_config() -> Result<Config, ConfigError> {
    build_config(Some(get_config_path()?), Some(environment()))
}

pub fn default_config() -> Result<Config, ConfigError> {
    build_config(None, None)
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        log::info!("No config at {}, using the built-in menu", path.display());
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using the built-in menu: {}", e);
            default_config().unwrap_or_default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

const RELOAD_SETTLE: Duration = Duration::from_millis(150);

fn touches_config(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch {}: {}", config_dir.display(), e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        };
        if !touches_config(&event, &config_path) {
            continue;
        }

        log::debug!("{} changed ({:?})", config_path.display(), event.kind);

        // editors save in bursts of events; reload once the burst is over
        while let Ok(Ok(_)) = tokio::time::timeout(RELOAD_SETTLE, bridge_rx.recv()).await {}

        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}
