//! The fixed set of settings this screen owns.

/// Bumped whenever a stored default in [`SettingKey::default_value`] changes.
pub const DEFAULTS_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    DarkTheme,
    ShowDesktopLabels,
    ShowDrawerLabels,
    ThemeBuiltinIcons,
    AdaptiveIcons,
    GridSize,
    IconPack,
    IconShape,
    AllowRotation,
    IconBadging,
    MinusOne,
    PredictiveApps,
    WorkspaceEdit,
    AddIconToHome,
    ProtectedApps,
}

/// Stored default for a key; grid size depends on the device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Str(&'static str),
    DeviceProfileGrid,
    PlatformRotation,
    /// Nothing is stored; the entry only reacts to clicks.
    Action,
}

impl SettingKey {
    pub const ALL: [SettingKey; 15] = [
        Self::DarkTheme,
        Self::ShowDesktopLabels,
        Self::ShowDrawerLabels,
        Self::ThemeBuiltinIcons,
        Self::AdaptiveIcons,
        Self::GridSize,
        Self::IconPack,
        Self::IconShape,
        Self::AllowRotation,
        Self::IconBadging,
        Self::MinusOne,
        Self::PredictiveApps,
        Self::WorkspaceEdit,
        Self::AddIconToHome,
        Self::ProtectedApps,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DarkTheme => "pref_ui_darktheme",
            Self::ShowDesktopLabels => "pref_desktop_show_labels",
            Self::ShowDrawerLabels => "pref_drawer_show_labels",
            Self::ThemeBuiltinIcons => "pref_icon_builtin_theme",
            Self::AdaptiveIcons => "pref_icon_adaptive",
            Self::GridSize => "pref_grid_size",
            Self::IconPack => "pref_icon_pack",
            Self::IconShape => "pref_override_icon_shape",
            Self::AllowRotation => "pref_allowRotation",
            Self::IconBadging => "pref_icon_badging",
            Self::MinusOne => "pref_enable_minus_one",
            Self::PredictiveApps => "pref_predictive_apps",
            Self::WorkspaceEdit => "pref_workspace_edit",
            Self::AddIconToHome => "pref_add_icon_to_home",
            Self::ProtectedApps => "pref_protected_apps",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }

    pub const fn default_value(self) -> DefaultValue {
        match self {
            Self::DarkTheme => DefaultValue::Str("auto"),
            Self::AdaptiveIcons => DefaultValue::Str("enabled"),
            Self::IconPack | Self::IconShape => DefaultValue::Str(""),
            Self::ProtectedApps => DefaultValue::Action,
            Self::GridSize => DefaultValue::DeviceProfileGrid,
            Self::AllowRotation => DefaultValue::PlatformRotation,
            Self::ThemeBuiltinIcons => DefaultValue::Bool(false),
            Self::ShowDesktopLabels
            | Self::ShowDrawerLabels
            | Self::IconBadging
            | Self::MinusOne
            | Self::PredictiveApps
            | Self::WorkspaceEdit
            | Self::AddIconToHome => DefaultValue::Bool(true),
        }
    }

    /// Whether the value is persisted as a boolean switch.
    pub const fn is_switch(self) -> bool {
        matches!(
            self.default_value(),
            DefaultValue::Bool(_) | DefaultValue::PlatformRotation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_strings_are_unique_and_round_trip() {
        let mut seen = HashSet::new();
        for key in SettingKey::ALL {
            assert!(seen.insert(key.as_str()), "duplicate key {}", key.as_str());
            assert_eq!(SettingKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::from_key("pref_something_else"), None);
    }

    #[test]
    fn switches_and_strings() {
        assert!(SettingKey::AllowRotation.is_switch());
        assert!(SettingKey::ShowDrawerLabels.is_switch());
        assert!(!SettingKey::GridSize.is_switch());
        assert!(!SettingKey::DarkTheme.is_switch());
        assert!(!SettingKey::IconShape.is_switch());
        assert!(!SettingKey::ProtectedApps.is_switch());
    }

    #[test]
    fn protected_apps_is_click_only() {
        assert_eq!(SettingKey::ProtectedApps.default_value(), DefaultValue::Action);
        assert_eq!(
            SettingKey::from_key("pref_protected_apps"),
            Some(SettingKey::ProtectedApps)
        );
    }
}
