use crate::binding::{
    self, AdaptiveIconsMode, DarkThemeMode, IconShapeOverride, Reaction, SettingBinding,
};
use crate::grid::{DeviceProfile, GridSize};
use crate::i18n::I18n;
use crate::icons::{IconCache, PackageLookup, resolve_icon_pack_entry};
use crate::keys::SettingKey;
use crate::restart::RestartFlag;
use crate::screen::PreferenceScreen;
use crate::store::SettingsStore;
use std::sync::Arc;

/// Long-lived launcher state the settings screen pokes at, passed in rather
/// than reached through globals.
#[derive(Clone)]
pub struct DispatcherDeps {
    pub icon_cache: Arc<dyn IconCache>,
    pub packages: Arc<dyn PackageLookup>,
    pub device_profile: DeviceProfile,
}

pub struct ChangeDispatcher {
    deps: DispatcherDeps,
    i18n: I18n,
}

impl ChangeDispatcher {
    pub fn new(deps: DispatcherDeps, i18n: I18n) -> Self {
        Self { deps, i18n }
    }

    /// Handles one store mutation. The store already holds the new value.
    pub fn on_changed(
        &self,
        raw_key: &str,
        store: &SettingsStore,
        screen: &mut PreferenceScreen,
        restart: &mut RestartFlag,
    ) -> Option<SettingBinding> {
        let Some(binding) = binding::lookup(raw_key) else {
            crate::debug_log!("[dispatch] ignoring foreign key {}", raw_key);
            return None;
        };

        if binding.invalidates_icon_cache {
            self.deps.icon_cache.clear();
        }
        self.refresh(binding, store, screen);
        if binding.requires_restart {
            restart.request();
        }

        crate::debug_log!(
            "[dispatch] {} reaction={:?} restart={}",
            raw_key,
            binding.reaction,
            restart.is_set()
        );
        Some(binding)
    }

    /// Recomputes the derived summary for a binding without side effects.
    pub fn refresh(&self, binding: SettingBinding, store: &SettingsStore, screen: &mut PreferenceScreen) {
        let key = binding.key;
        match binding.reaction {
            Reaction::None => {}
            Reaction::DarkThemeSummary => {
                let mode = DarkThemeMode::from_stored(store.get_string(key.as_str()).as_deref());
                screen.set_summary(key, mode.summary(self.i18n));
            }
            Reaction::AdaptiveIconsSummary => {
                let mode =
                    AdaptiveIconsMode::from_stored(store.get_string(key.as_str()).as_deref());
                screen.set_summary(key, mode.summary(self.i18n));
            }
            Reaction::IconShapeSummary => {
                let shape =
                    IconShapeOverride::from_stored(store.get_string(key.as_str()).as_deref());
                screen.set_summary(key, shape.summary(self.i18n));
            }
            Reaction::GridSizeSummary => {
                screen.set_summary(key, self.grid_size(store).encode());
            }
            Reaction::IconPackEntry => {
                let package = store.get_string(key.as_str()).unwrap_or_default();
                let entry = resolve_icon_pack_entry(&package, self.deps.packages.as_ref(), self.i18n);
                if let Some(control) = screen.get_mut(key) {
                    control.summary = Some(entry.summary);
                    control.icon = Some(entry.icon);
                }
            }
        }
    }

    pub fn refresh_all(&self, store: &SettingsStore, screen: &mut PreferenceScreen) {
        for binding in binding::bindings() {
            self.refresh(binding, store, screen);
        }
    }

    pub fn grid_size(&self, store: &SettingsStore) -> GridSize {
        GridSize::decode_or_default(
            store.get_string(SettingKey::GridSize.as_str()).as_deref(),
            &self.deps.device_profile,
        )
    }
}
