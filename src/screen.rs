//! Headless model of the settings controls.
//!
//! Rendering is someone else's job; this is the state a renderer reads.

use crate::i18n::I18n;
use crate::keys::SettingKey;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// The control's own toggle/list behavior.
    Default,
    /// Ask the user to grant notification-listener access first.
    ConfirmNotificationAccess,
    /// Jump straight to the listener settings surface.
    OpenListenerSettings,
    ShowGridPicker,
    ShowIconPackPicker,
    /// Open the protected-apps manager and close the settings UI.
    OpenProtectedApps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    SystemDefault,
    Package(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceControl {
    pub key: SettingKey,
    pub enabled: bool,
    pub summary: Option<String>,
    pub icon: Option<IconRef>,
    /// Trailing warning indicator next to the control.
    pub widget_frame_visible: bool,
    pub click: ClickAction,
    pub default_value: Option<bool>,
}

impl PreferenceControl {
    pub fn new(key: SettingKey) -> Self {
        let click = match key {
            SettingKey::GridSize => ClickAction::ShowGridPicker,
            SettingKey::IconPack => ClickAction::ShowIconPackPicker,
            SettingKey::ProtectedApps => ClickAction::OpenProtectedApps,
            _ => ClickAction::Default,
        };
        Self {
            key,
            enabled: true,
            summary: None,
            icon: None,
            widget_frame_visible: false,
            click,
            default_value: None,
        }
    }

    pub fn title(&self, i18n: I18n) -> &'static str {
        match self.key {
            SettingKey::DarkTheme => i18n.title_dark_theme,
            SettingKey::ShowDesktopLabels => i18n.title_show_desktop_labels,
            SettingKey::ShowDrawerLabels => i18n.title_show_drawer_labels,
            SettingKey::ThemeBuiltinIcons => i18n.title_builtin_icon_theme,
            SettingKey::AdaptiveIcons => i18n.title_adaptive_icons,
            SettingKey::GridSize => i18n.title_grid_size,
            SettingKey::IconPack => i18n.title_icon_pack,
            SettingKey::IconShape => i18n.title_icon_shape,
            SettingKey::AllowRotation => i18n.title_allow_rotation,
            SettingKey::IconBadging => i18n.title_icon_badging,
            SettingKey::MinusOne => i18n.title_minus_one,
            SettingKey::PredictiveApps => i18n.title_predictive_apps,
            SettingKey::WorkspaceEdit => i18n.title_workspace_edit,
            SettingKey::AddIconToHome => i18n.title_add_icon_to_home,
            SettingKey::ProtectedApps => i18n.title_protected_apps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceScreen {
    controls: BTreeMap<SettingKey, PreferenceControl>,
}

impl PreferenceScreen {
    /// Every known control; setup removes what the platform can't support.
    pub fn with_all_controls() -> Self {
        Self {
            controls: SettingKey::ALL
                .into_iter()
                .map(|key| (key, PreferenceControl::new(key)))
                .collect(),
        }
    }

    pub fn remove(&mut self, key: SettingKey) -> bool {
        self.controls.remove(&key).is_some()
    }

    pub fn contains(&self, key: SettingKey) -> bool {
        self.controls.contains_key(&key)
    }

    pub fn get(&self, key: SettingKey) -> Option<&PreferenceControl> {
        self.controls.get(&key)
    }

    pub fn get_mut(&mut self, key: SettingKey) -> Option<&mut PreferenceControl> {
        self.controls.get_mut(&key)
    }

    pub fn summary(&self, key: SettingKey) -> Option<&str> {
        self.get(key)?.summary.as_deref()
    }

    pub fn set_summary(&mut self, key: SettingKey, summary: impl Into<String>) {
        if let Some(control) = self.get_mut(key) {
            control.summary = Some(summary.into());
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = &PreferenceControl> {
        self.controls.values()
    }
}
