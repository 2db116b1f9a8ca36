use crate::component::ComponentName;
use crate::grid::DeviceProfile;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV: &str = "LAUNCHER_PREFS_CONFIG";
const CONFIG_FILE_NAME: &str = "platform.json";
const DATA_DIR_NAME: &str = "launcher-prefs";

/// First API level with adaptive launcher shortcuts and the badging dialog.
pub const API_LEVEL_OREO: u32 = 26;

/// Device and build capabilities the settings screen adapts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub api_level: u32,
    pub low_ram_device: bool,
    /// When the launcher always rotates, the rotation control is not shown.
    pub rotation_always_allowed: bool,
    pub allow_rotation_default: bool,
    pub notification_badging_supported: bool,
    pub search_package_installed: bool,
    /// Whether the build ships the protected-apps manager.
    pub protected_apps_available: bool,
    pub listener_component: ComponentName,
    pub home_component: ComponentName,
    pub device_profile: DeviceProfile,
    /// Installed icon-pack candidates, package id to label.
    pub installed_packages: BTreeMap<String, String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_level: API_LEVEL_OREO,
            low_ram_device: false,
            rotation_always_allowed: false,
            allow_rotation_default: false,
            notification_badging_supported: true,
            search_package_installed: false,
            protected_apps_available: true,
            listener_component: ComponentName::new(
                "com.android.launcher3",
                "com.android.launcher3.notification.NotificationListener",
            ),
            home_component: ComponentName::new(
                "com.android.launcher3",
                "com.android.launcher3.Launcher",
            ),
            device_profile: DeviceProfile::default(),
            installed_packages: BTreeMap::new(),
        }
    }
}

impl PlatformConfig {
    pub fn at_least_oreo(&self) -> bool {
        self.api_level >= API_LEVEL_OREO
    }

    /// Loads the config from `$LAUNCHER_PREFS_CONFIG` or the data dir.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.is_file() {
            crate::debug_log!("[config] no config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                crate::debug_log!("[config] {:#}, using defaults", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    data_dir().join(CONFIG_FILE_NAME)
}

/// Root directory for the persisted stores, logs and config.
pub fn data_dir() -> PathBuf {
    if let Some(app_data) = std::env::var_os("APPDATA") {
        return PathBuf::from(app_data).join(DATA_DIR_NAME);
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(format!(".{DATA_DIR_NAME}"));
    }

    PathBuf::from(format!(".{DATA_DIR_NAME}"))
}
