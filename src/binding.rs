//! Per-setting policy: what to refresh on change and whether the launcher
//! has to restart for the new value to take effect.

use crate::i18n::I18n;
use crate::keys::SettingKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    DarkThemeSummary,
    AdaptiveIconsSummary,
    GridSizeSummary,
    IconPackEntry,
    IconShapeSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingBinding {
    pub key: SettingKey,
    pub reaction: Reaction,
    pub invalidates_icon_cache: bool,
    pub requires_restart: bool,
}

impl SettingBinding {
    const fn new(key: SettingKey, reaction: Reaction, requires_restart: bool) -> Self {
        Self {
            key,
            reaction,
            invalidates_icon_cache: false,
            requires_restart,
        }
    }

    const fn invalidating_icon_cache(mut self) -> Self {
        self.invalidates_icon_cache = true;
        self
    }
}

/// Exhaustive over [`SettingKey`], so every key has exactly one entry.
pub const fn binding_for(key: SettingKey) -> SettingBinding {
    use SettingKey::*;
    match key {
        DarkTheme => SettingBinding::new(key, Reaction::DarkThemeSummary, true),
        ShowDesktopLabels | ShowDrawerLabels | ThemeBuiltinIcons => {
            SettingBinding::new(key, Reaction::None, true)
        }
        AdaptiveIcons => {
            SettingBinding::new(key, Reaction::AdaptiveIconsSummary, true).invalidating_icon_cache()
        }
        GridSize => SettingBinding::new(key, Reaction::GridSizeSummary, true),
        IconPack => SettingBinding::new(key, Reaction::IconPackEntry, false),
        IconShape => {
            SettingBinding::new(key, Reaction::IconShapeSummary, true).invalidating_icon_cache()
        }
        AllowRotation | IconBadging | MinusOne | PredictiveApps | WorkspaceEdit
        | AddIconToHome | ProtectedApps => SettingBinding::new(key, Reaction::None, false),
    }
}

/// `None` for keys this screen does not own.
pub fn lookup(raw_key: &str) -> Option<SettingBinding> {
    SettingKey::from_key(raw_key).map(binding_for)
}

pub fn bindings() -> impl Iterator<Item = SettingBinding> {
    SettingKey::ALL.into_iter().map(binding_for)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DarkThemeMode {
    Off,
    Drawer,
    Full,
    Auto,
}

impl DarkThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Drawer => "drawer",
            Self::Full => "full",
            Self::Auto => "auto",
        }
    }

    /// Unset and unrecognized values read as [`DarkThemeMode::Auto`].
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("off") => Self::Off,
            Some("drawer") => Self::Drawer,
            Some("full") => Self::Full,
            _ => Self::Auto,
        }
    }

    pub fn summary(self, i18n: I18n) -> &'static str {
        match self {
            Self::Off => i18n.darktheme_off_desc,
            Self::Drawer => i18n.darktheme_drawer_desc,
            Self::Full => i18n.darktheme_full_desc,
            Self::Auto => i18n.darktheme_auto_desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptiveIconsMode {
    Disabled,
    Enabled,
    Force,
    EnabledBypass,
    ForceBypass,
}

impl AdaptiveIconsMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Force => "force",
            Self::EnabledBypass => "enabled_bypass",
            Self::ForceBypass => "force_bypass",
        }
    }

    /// Unset and unrecognized values read as [`AdaptiveIconsMode::Enabled`].
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("disabled") => Self::Disabled,
            Some("force") => Self::Force,
            Some("enabled_bypass") => Self::EnabledBypass,
            Some("force_bypass") => Self::ForceBypass,
            _ => Self::Enabled,
        }
    }

    pub fn summary(self, i18n: I18n) -> String {
        match self {
            Self::Disabled => i18n.settings_icon_adaptive_desc_disabled.to_string(),
            Self::Force => i18n.settings_icon_force_adaptive_desc_on.to_string(),
            Self::EnabledBypass => i18n.two_line(
                i18n.settings_icon_force_adaptive_desc_off,
                i18n.settings_icon_adaptive_desc_bypass,
            ),
            Self::ForceBypass => i18n.two_line(
                i18n.settings_icon_force_adaptive_desc_on,
                i18n.settings_icon_adaptive_desc_bypass,
            ),
            Self::Enabled => i18n.settings_icon_force_adaptive_desc_off.to_string(),
        }
    }
}

/// Icon mask forced over the system one; the empty string keeps the system mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconShapeOverride {
    System,
    Square,
    Squircle,
    Circle,
    Teardrop,
}

impl IconShapeOverride {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "",
            Self::Square => "square",
            Self::Squircle => "squircle",
            Self::Circle => "circle",
            Self::Teardrop => "teardrop",
        }
    }

    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("square") => Self::Square,
            Some("squircle") => Self::Squircle,
            Some("circle") => Self::Circle,
            Some("teardrop") => Self::Teardrop,
            _ => Self::System,
        }
    }

    pub fn summary(self, i18n: I18n) -> &'static str {
        match self {
            Self::System => i18n.icon_shape_system,
            Self::Square => i18n.icon_shape_square,
            Self::Squircle => i18n.icon_shape_squircle,
            Self::Circle => i18n.icon_shape_circle,
            Self::Teardrop => i18n.icon_shape_teardrop,
        }
    }
}
