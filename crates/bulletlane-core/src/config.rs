use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// How overlapping click and hover pauses combine on a single item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PausePolicy {
    /// An item resumes only once neither the user nor the pointer holds it
    #[default]
    RequireAllClear,
    /// Each toggle sets the play state directly, so hover-out can undo a click pause
    LastToggleWins,
}

/// Process-wide scheduling defaults. Per-item `ItemOptions` are merged over these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Lane height in pixels; lane count is floor(viewport height / lane height)
    #[serde(default = "default_lane_height")]
    pub lane_height: f64,
    /// Pause an item while the pointer is over it
    #[serde(default = "default_true")]
    pub pause_on_hover: bool,
    /// Toggle an item's pause when it is clicked
    #[serde(default = "default_true")]
    pub pause_on_click: bool,
    /// Fallback duration ("10", "10s", "2.5s") used when no speed applies
    #[serde(default = "default_duration")]
    pub duration: String,
    /// Speed in pixels per second; overrides `duration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Speed overrides indexed by lane
    #[serde(default)]
    pub lane_speeds: Vec<f64>,
    #[serde(default)]
    pub pause_policy: PausePolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lane_height: default_lane_height(),
            pause_on_hover: default_true(),
            pause_on_click: default_true(),
            duration: default_duration(),
            speed: None,
            lane_speeds: Vec::new(),
            pause_policy: PausePolicy::default(),
        }
    }
}

impl SchedulerConfig {
    /// True when a global speed or a lane speed table is configured.
    ///
    /// Admission then uses the simple edge-overlap test instead of
    /// comparing item velocities.
    pub fn has_fixed_speed(&self) -> bool {
        self.speed.is_some_and(|s| s > 0.0) || !self.lane_speeds.is_empty()
    }
}

/// Geometry of the simulated stage used by the terminal and headless runners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub left: f64,
    #[serde(default = "default_stage_width")]
    pub width: f64,
    #[serde(default = "default_stage_height")]
    pub height: f64,
    /// Pixels per display column when measuring content
    #[serde(default = "default_glyph_width")]
    pub glyph_width: f64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            left: 0.0,
            width: default_stage_width(),
            height: default_stage_height(),
            glyph_width: default_glyph_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frame interval in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Interval between automatic submissions in milliseconds
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval_ms: u64,
    /// Pixels represented by one terminal column
    #[serde(default = "default_cell_width")]
    pub cell_width_px: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            spawn_interval_ms: default_spawn_interval(),
            cell_width_px: default_cell_width(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bulletlane")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_lane_height() -> f64 {
    40.0
}

fn default_duration() -> String {
    "10s".to_string()
}

fn default_stage_width() -> f64 {
    800.0
}

fn default_stage_height() -> f64 {
    400.0
}

fn default_glyph_width() -> f64 {
    10.0
}

fn default_tick_rate() -> u64 {
    16 // ~60fps
}

fn default_spawn_interval() -> u64 {
    400
}

fn default_cell_width() -> f64 {
    10.0
}

/// Parse a duration string such as "10", "10s" or "2.5s" into seconds.
///
/// Falls back to 10 seconds when the leading number is missing or not positive.
pub fn parse_duration_secs(value: &str) -> f64 {
    const FALLBACK: f64 = 10.0;

    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());

    match trimmed[..end].parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => secs,
        _ => FALLBACK,
    }
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/bulletlane/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("bulletlane")
            .join("config.toml")
    }

    /// Get the log file path used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("bulletlane.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    fn validate(&self) -> crate::Result<()> {
        let lane_height = self.scheduler.lane_height;
        if !(lane_height.is_finite() && lane_height > 0.0) {
            return Err(crate::Error::Config(format!(
                "scheduler.lane_height must be positive, got {}",
                lane_height
            )));
        }
        if self.stage.width <= 0.0 || self.stage.height < 0.0 {
            return Err(crate::Error::Config(
                "stage width must be positive and height non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scheduler.lane_height, 40.0);
        assert!(config.scheduler.pause_on_hover);
        assert!(config.scheduler.pause_on_click);
        assert_eq!(config.scheduler.duration, "10s");
        assert!(config.scheduler.speed.is_none());
        assert!(!config.scheduler.has_fixed_speed());
        assert_eq!(config.scheduler.pause_policy, PausePolicy::RequireAllClear);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [scheduler]
            speed = 120.0
            pause_policy = "last_toggle_wins"
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.speed, Some(120.0));
        assert_eq!(config.scheduler.lane_height, 40.0);
        assert_eq!(config.scheduler.pause_policy, PausePolicy::LastToggleWins);
        assert!(config.scheduler.has_fixed_speed());
        assert_eq!(config.ui.tick_rate_ms, 16);
    }

    #[test]
    fn test_invalid_lane_height_rejected() {
        let result = AppConfig::from_toml("[scheduler]\nlane_height = 0.0\n");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_zero_speed_is_not_fixed() {
        let config = SchedulerConfig {
            speed: Some(0.0),
            ..Default::default()
        };
        assert!(!config.has_fixed_speed());
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("10"), 10.0);
        assert_eq!(parse_duration_secs("10s"), 10.0);
        assert_eq!(parse_duration_secs(" 2.5s "), 2.5);
        assert_eq!(parse_duration_secs("abc"), 10.0);
        assert_eq!(parse_duration_secs("0s"), 10.0);
        assert_eq!(parse_duration_secs("-3"), 10.0);
    }

    #[test]
    fn test_toml_roundtrip_keeps_lane_speeds() {
        let mut config = AppConfig::default();
        config.scheduler.lane_speeds = vec![150.0, 130.0];
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.scheduler.lane_speeds, vec![150.0, 130.0]);
    }
}
