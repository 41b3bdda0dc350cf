use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::map::EditOptions;
use crate::state::DragGranularity;
use crate::throttle::DEFAULT_REINIT_WINDOW;
use crate::toolbar::ToolbarOptions;

const APP_DIR: &str = "map-modes";
const APP_CONFIG_FILE: &str = "config.json";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read config: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
}

/// Per-map settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModesConfig {
    pub drag_granularity: DragGranularity,
    pub layer_group_drag_menu: bool,
    pub removal_reinit_window_ms: u64,
    pub edit: EditOptions,
    pub toolbar: ToolbarOptions,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            drag_granularity: DragGranularity::default(),
            layer_group_drag_menu: true,
            removal_reinit_window_ms: DEFAULT_REINIT_WINDOW.as_millis() as u64,
            edit: EditOptions::default(),
            toolbar: ToolbarOptions::default(),
        }
    }
}

impl ModesConfig {
    pub fn removal_reinit_window(&self) -> Duration {
        Duration::from_millis(self.removal_reinit_window_ms)
    }
}

pub fn load_modes_config() -> ModesConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_modes_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_modes_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ModesConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return ModesConfig::default(),
    };
    if !path.exists() {
        return ModesConfig::default();
    }
    read_modes_config(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, ?path, "failed to load config.json; using defaults");
        ModesConfig::default()
    })
}

pub fn read_modes_config(path: &Path) -> ConfigResult<ModesConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_modes_config(&contents)
}

pub fn parse_modes_config(contents: &str) -> ConfigResult<ModesConfig> {
    Ok(serde_json::from_str(contents)?)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("map-modes-config-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path, &Path)>(f: F) {
        let root = fixture_root();
        let path = app_config_path(APP_DIR, APP_CONFIG_FILE, Some(&root), None)
            .expect("path should resolve");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        f(&root, &path);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_config_file_falls_back_to_defaults() {
        with_temp_root(|root, path| {
            fs::write(path, r#"{ "drag_granularity": "sideways" "#).unwrap();

            assert!(matches!(read_modes_config(path), Err(ConfigError::Parse(_))));
            let config = load_modes_config_with(Some(root), None);
            assert_eq!(config, ModesConfig::default());
        });
    }

    #[test]
    fn unreadable_config_file_falls_back_to_defaults() {
        with_temp_root(|root, path| {
            fs::create_dir_all(path).unwrap();

            assert!(matches!(read_modes_config(path), Err(ConfigError::Read { .. })));
            let config = load_modes_config_with(Some(root), None);
            assert_eq!(config, ModesConfig::default());
        });
    }

    #[test]
    fn existing_config_file_is_loaded() {
        with_temp_root(|root, path| {
            fs::write(path, r#"{ "layer_group_drag_menu": false }"#).unwrap();

            let config = load_modes_config_with(Some(root), None);
            assert!(!config.layer_group_drag_menu);
            assert_eq!(config.drag_granularity, DragGranularity::LayerGroup);
        });
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "map-modes",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/map-modes/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("map-modes", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/map-modes/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("map-modes", "config.json", None, None).unwrap_err();
        assert!(matches!(error, ConfigError::MissingHomeDirectory));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let config = load_modes_config_with(Some(Path::new("/nonexistent/map-modes-root")), None);
        assert_eq!(config, ModesConfig::default());
        assert_eq!(config.removal_reinit_window(), Duration::from_millis(100));
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config = parse_modes_config(
            r#"{
                "drag_granularity": "layer",
                "removal_reinit_window_ms": 250,
                "toolbar": { "delete_layer": false, "position": "bottomright" }
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.drag_granularity, DragGranularity::Layer);
        assert!(config.layer_group_drag_menu);
        assert_eq!(config.removal_reinit_window(), Duration::from_millis(250));
        assert!(!config.toolbar.removal_mode);
        assert!(config.edit.snappable);
    }

    #[test]
    fn malformed_config_reports_parse_error() {
        let error = parse_modes_config("{ not json").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
