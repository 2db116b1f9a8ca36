use crate::config::PlatformConfig;
use crate::dispatcher::{ChangeDispatcher, DispatcherDeps};
use crate::event::{EventQueue, ObserverToken, SettingsEvent};
use crate::grid::GridSize;
use crate::i18n::I18n;
use crate::keys::{DefaultValue, SettingKey};
use crate::notification_access::{AccessConfirmation, PermissionRequest};
use crate::observer::{
    IconBadgingObserver, ObserverContext, ObserverRegistration, RotationLockObserver,
};
use crate::os_settings::{
    ACCELEROMETER_ROTATION, ENABLED_NOTIFICATION_LISTENERS, NOTIFICATION_BADGING, OsSettings,
};
use crate::restart::{Relauncher, RestartFlag, RestartOutcome, RestartScheduler};
use crate::screen::{ClickAction, PreferenceScreen};
use crate::store::{ListenerId, SettingsStore};
use anyhow::{Result, anyhow, bail};

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Start with a restart already pending.
    pub schedule_restart: bool,
}

/// What clicking a control asks the host UI to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResponse {
    Confirm(AccessConfirmation),
    Launch(PermissionRequest),
    GridPicker(GridSize),
    IconPackPicker,
    /// Launch the protected-apps manager; the settings UI finishes.
    ProtectedApps,
}

/// One appearance of the settings UI, from setup to teardown.
///
/// All callbacks (store changes, OS changes) are queued and only run from
/// [`SettingsSession::dispatch_pending`], on the thread that owns the session.
pub struct SettingsSession {
    store: SettingsStore,
    os: OsSettings,
    config: PlatformConfig,
    i18n: I18n,
    dispatcher: ChangeDispatcher,
    screen: PreferenceScreen,
    restart: RestartFlag,
    icon_pack_picker_open: bool,
    finish_requested: bool,
    queue: EventQueue,
    store_listener: Option<ListenerId>,
    rotation: Option<ObserverRegistration<RotationLockObserver>>,
    badging: Option<ObserverRegistration<IconBadgingObserver>>,
}

impl SettingsSession {
    pub fn setup(
        store: SettingsStore,
        os: OsSettings,
        config: PlatformConfig,
        deps: DispatcherDeps,
        i18n: I18n,
        options: SessionOptions,
    ) -> Self {
        let queue = EventQueue::new();
        let store_listener = Some(store.register_listener(queue.sender()));
        let mut screen = PreferenceScreen::with_all_controls();
        let mut rotation = None;
        let mut badging = None;

        {
            let cx = ObserverContext {
                os: &os,
                config: &config,
                i18n,
            };

            if config.rotation_always_allowed {
                screen.remove(SettingKey::AllowRotation);
            } else {
                if let Some(control) = screen.get_mut(SettingKey::AllowRotation) {
                    control.default_value = Some(config.allow_rotation_default);
                }
                let mut registration = ObserverRegistration::new(RotationLockObserver);
                registration.register(&[ACCELEROMETER_ROTATION], queue.sender(), &cx, &mut screen);
                rotation = Some(registration);
            }

            if !config.at_least_oreo() {
                screen.remove(SettingKey::AddIconToHome);
            }

            if config.notification_badging_supported {
                let mut registration = ObserverRegistration::new(IconBadgingObserver::default());
                registration.register(
                    &[NOTIFICATION_BADGING, ENABLED_NOTIFICATION_LISTENERS],
                    queue.sender(),
                    &cx,
                    &mut screen,
                );
                badging = Some(registration);
            } else {
                screen.remove(SettingKey::IconBadging);
            }

            if !config.search_package_installed {
                screen.remove(SettingKey::MinusOne);
            }

            if !config.protected_apps_available {
                screen.remove(SettingKey::ProtectedApps);
            }
        }

        let dispatcher = ChangeDispatcher::new(deps, i18n);
        dispatcher.refresh_all(&store, &mut screen);

        crate::debug_log!(
            "[session] setup rotation={} badging={} restart={}",
            rotation.is_some(),
            badging.is_some(),
            options.schedule_restart
        );

        Self {
            store,
            os,
            config,
            i18n,
            dispatcher,
            screen,
            restart: RestartFlag::preset(options.schedule_restart),
            icon_pack_picker_open: false,
            finish_requested: false,
            queue,
            store_listener,
            rotation,
            badging,
        }
    }

    pub fn screen(&self) -> &PreferenceScreen {
        &self.screen
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn os_settings(&self) -> &OsSettings {
        &self.os
    }

    pub fn i18n(&self) -> I18n {
        self.i18n
    }

    pub fn restart_required(&self) -> bool {
        self.restart.is_set()
    }

    pub fn badging_observer(&self) -> Option<&IconBadgingObserver> {
        self.badging.as_ref().map(|registration| registration.observer())
    }

    /// Runs every queued callback in arrival order; returns how many ran.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.queue.try_next() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    fn handle(&mut self, event: SettingsEvent) {
        match event {
            SettingsEvent::StoreChanged(key) => {
                if self.store_listener.is_none() {
                    return;
                }
                self.dispatcher
                    .on_changed(&key, &self.store, &mut self.screen, &mut self.restart);
            }
            SettingsEvent::ExternalChanged(token) => self.handle_external(token),
        }
    }

    fn handle_external(&mut self, token: ObserverToken) {
        let cx = ObserverContext {
            os: &self.os,
            config: &self.config,
            i18n: self.i18n,
        };
        if let Some(registration) = self
            .rotation
            .as_mut()
            .filter(|registration| registration.token() == Some(token))
        {
            registration.on_change(&cx, &mut self.screen);
        } else if let Some(registration) = self
            .badging
            .as_mut()
            .filter(|registration| registration.token() == Some(token))
        {
            registration.on_change(&cx, &mut self.screen);
        } else {
            crate::debug_log!("[session] stale observer event {:?}", token);
        }
    }

    pub fn set_bool(&self, key: SettingKey, value: bool) -> Result<()> {
        self.store.put_bool(key.as_str(), value)
    }

    pub fn set_string(&self, key: SettingKey, value: &str) -> Result<()> {
        self.store.put_string(key.as_str(), value)
    }

    /// Picker result; out-of-range values are clamped to the picker bounds.
    pub fn set_grid_size(&self, size: GridSize) -> Result<()> {
        self.set_string(SettingKey::GridSize, &size.clamped().encode())
    }

    /// Parses a user-entered value for `key` and writes it.
    pub fn apply_user_value(&self, key: SettingKey, raw: &str) -> Result<()> {
        if key.default_value() == DefaultValue::Action {
            bail!("{} holds no value", key.as_str());
        }
        if key.is_switch() {
            return self.set_bool(key, parse_switch(raw)?);
        }
        if key == SettingKey::GridSize {
            let size = GridSize::decode(raw)
                .ok_or_else(|| anyhow!("grid size must look like 5x4, got {raw:?}"))?;
            return self.set_grid_size(size);
        }
        self.set_string(key, raw.trim())
    }

    pub fn on_click(&mut self, key: SettingKey) -> Option<ClickResponse> {
        let control = self.screen.get(key)?;
        match control.click {
            ClickAction::Default => None,
            ClickAction::ConfirmNotificationAccess => Some(ClickResponse::Confirm(
                AccessConfirmation::new(self.i18n, self.config.listener_component.clone()),
            )),
            ClickAction::OpenListenerSettings => Some(ClickResponse::Launch(
                PermissionRequest::listener_settings(&self.config.listener_component),
            )),
            ClickAction::ShowGridPicker => Some(ClickResponse::GridPicker(GridSize::picker_initial(
                self.store.get_string(SettingKey::GridSize.as_str()).as_deref(),
            ))),
            ClickAction::ShowIconPackPicker => {
                self.icon_pack_picker_open = true;
                Some(ClickResponse::IconPackPicker)
            }
            ClickAction::OpenProtectedApps => {
                self.finish_requested = true;
                crate::debug_log!("[session] leaving for protected apps");
                Some(ClickResponse::ProtectedApps)
            }
        }
    }

    pub fn icon_pack_picker_open(&self) -> bool {
        self.icon_pack_picker_open
    }

    /// Picker result; closes the picker.
    pub fn choose_icon_pack(&mut self, package: &str) -> Result<()> {
        self.icon_pack_picker_open = false;
        self.set_string(SettingKey::IconPack, package)
    }

    /// The UI lost focus; an open icon-pack picker is dismissed.
    /// Returns whether one was open.
    pub fn on_pause(&mut self) -> bool {
        std::mem::take(&mut self.icon_pack_picker_open)
    }

    /// A click asked the settings UI to close.
    pub fn finish_requested(&self) -> bool {
        self.finish_requested
    }

    /// The UI went to the background; true means it should finish now so
    /// the pending restart happens.
    pub fn on_stop(&self) -> bool {
        self.restart.is_set()
    }

    fn release(&mut self) {
        if let Some(registration) = self.rotation.as_mut() {
            registration.unregister(&self.os);
        }
        if let Some(registration) = self.badging.as_mut() {
            registration.unregister(&self.os);
        }
        if let Some(id) = self.store_listener.take() {
            self.store.unregister_listener(id);
        }
    }

    /// Unsubscribes everything, then hands the final restart flag to the scheduler.
    pub fn teardown<R: Relauncher>(mut self, scheduler: &RestartScheduler<R>) -> RestartOutcome {
        self.release();
        let restart_required = self.restart.is_set();
        crate::debug_log!("[session] teardown restart={}", restart_required);
        scheduler.on_teardown(restart_required)
    }
}

impl Drop for SettingsSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected on/off, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::{IconCacheGeneration, InstalledPackages};
    use crate::i18n::Language;
    use crate::os_settings::Scope;
    use crate::store::temporary_database;
    use std::sync::Arc;

    fn session_with(config: PlatformConfig) -> SettingsSession {
        let db = temporary_database().unwrap();
        let deps = DispatcherDeps {
            icon_cache: Arc::new(IconCacheGeneration::default()),
            packages: Arc::new(InstalledPackages::default()),
            device_profile: config.device_profile,
        };
        SettingsSession::setup(
            SettingsStore::from_db(&db).unwrap(),
            OsSettings::from_db(&db).unwrap(),
            config,
            deps,
            I18n::new(Language::EnUs),
            SessionOptions::default(),
        )
    }

    #[test]
    fn unsupported_controls_are_omitted() {
        let session = session_with(PlatformConfig {
            rotation_always_allowed: true,
            notification_badging_supported: false,
            api_level: 23,
            ..PlatformConfig::default()
        });
        let screen = session.screen();
        assert!(!screen.contains(SettingKey::AllowRotation));
        assert!(!screen.contains(SettingKey::IconBadging));
        assert!(!screen.contains(SettingKey::AddIconToHome));
        assert!(!screen.contains(SettingKey::MinusOne));
        assert!(screen.contains(SettingKey::ProtectedApps));
        assert_eq!(session.os_settings().observer_count(), 0);

        let session = session_with(PlatformConfig {
            protected_apps_available: false,
            ..PlatformConfig::default()
        });
        assert!(!session.screen().contains(SettingKey::ProtectedApps));
    }

    #[test]
    fn setup_delivers_initial_observer_state() {
        let session = session_with(PlatformConfig {
            allow_rotation_default: true,
            ..PlatformConfig::default()
        });
        let rotation = session.screen().get(SettingKey::AllowRotation).unwrap();
        assert!(!rotation.enabled);
        assert_eq!(rotation.default_value, Some(true));
        assert_eq!(
            session.screen().summary(SettingKey::IconBadging),
            Some(session.i18n().icon_badging_desc_off)
        );
        assert_eq!(session.os_settings().observer_count(), 2);
    }

    #[test]
    fn os_changes_reach_controls_only_after_dispatch() {
        let mut session = session_with(PlatformConfig::default());
        session
            .os_settings()
            .put_int(Scope::System, ACCELEROMETER_ROTATION, 1)
            .unwrap();
        assert!(!session.screen().get(SettingKey::AllowRotation).unwrap().enabled);

        assert_eq!(session.dispatch_pending(), 1);
        assert!(session.screen().get(SettingKey::AllowRotation).unwrap().enabled);
    }

    #[test]
    fn user_values_are_parsed_per_key() {
        let mut session = session_with(PlatformConfig::default());
        session
            .apply_user_value(SettingKey::ShowDesktopLabels, "off")
            .unwrap();
        session.apply_user_value(SettingKey::GridSize, "12x2").unwrap();
        assert!(session.apply_user_value(SettingKey::GridSize, "big").is_err());
        assert!(
            session
                .apply_user_value(SettingKey::ShowDrawerLabels, "maybe")
                .is_err()
        );
        session.dispatch_pending();

        assert!(!session.store().get_bool("pref_desktop_show_labels", true));
        assert_eq!(session.screen().summary(SettingKey::GridSize), Some("9x3"));
        assert!(session.restart_required());
        assert!(session.on_stop());
    }

    #[test]
    fn badging_click_flow_depends_on_access() {
        let mut session = session_with(PlatformConfig::default());
        session
            .os_settings()
            .put_int(Scope::Secure, NOTIFICATION_BADGING, 1)
            .unwrap();
        session.dispatch_pending();

        let Some(ClickResponse::Confirm(confirmation)) = session.on_click(SettingKey::IconBadging)
        else {
            panic!("expected confirmation");
        };
        assert_eq!(
            confirmation.accept(),
            PermissionRequest::listener_settings(&PlatformConfig::default().listener_component)
        );
        assert_eq!(session.on_click(SettingKey::DarkTheme), None);
        assert_eq!(
            session.on_click(SettingKey::GridSize),
            Some(ClickResponse::GridPicker(GridSize::new(4, 5)))
        );
    }

    #[test]
    fn protected_apps_click_finishes_the_ui() {
        let mut session = session_with(PlatformConfig::default());
        assert!(!session.finish_requested());
        assert_eq!(
            session.on_click(SettingKey::ProtectedApps),
            Some(ClickResponse::ProtectedApps)
        );
        assert!(session.finish_requested());
        assert!(!session.restart_required());
        assert!(
            session
                .apply_user_value(SettingKey::ProtectedApps, "on")
                .is_err()
        );
    }

    #[test]
    fn pausing_dismisses_the_icon_pack_picker() {
        let mut session = session_with(PlatformConfig::default());
        assert!(!session.on_pause());
        assert_eq!(
            session.on_click(SettingKey::IconPack),
            Some(ClickResponse::IconPackPicker)
        );
        assert!(session.icon_pack_picker_open());
        assert!(session.on_pause());
        assert!(!session.icon_pack_picker_open());
        assert!(!session.on_pause());

        session.on_click(SettingKey::IconPack);
        session.choose_icon_pack("org.pack.missing").unwrap();
        assert!(!session.icon_pack_picker_open());
        assert_eq!(session.dispatch_pending(), 1);
        assert_eq!(
            session.screen().summary(SettingKey::IconPack),
            Some(session.i18n().icon_pack_system)
        );
    }

    #[test]
    fn rewriting_current_values_does_not_restart() {
        let db = temporary_database().unwrap();
        let store = SettingsStore::from_db(&db).unwrap();
        store.put_string("pref_grid_size", "5x4").unwrap();
        store.put_bool("pref_desktop_show_labels", true).unwrap();
        let mut session = SettingsSession::setup(
            store,
            OsSettings::from_db(&db).unwrap(),
            PlatformConfig::default(),
            DispatcherDeps {
                icon_cache: Arc::new(IconCacheGeneration::default()),
                packages: Arc::new(InstalledPackages::default()),
                device_profile: Default::default(),
            },
            I18n::new(Language::EnUs),
            SessionOptions::default(),
        );

        session.set_grid_size(GridSize::new(5, 4)).unwrap();
        session.set_bool(SettingKey::ShowDesktopLabels, true).unwrap();
        assert_eq!(session.dispatch_pending(), 0);
        assert!(!session.restart_required());

        session.set_grid_size(GridSize::new(6, 4)).unwrap();
        assert_eq!(session.dispatch_pending(), 1);
        assert!(session.restart_required());
    }

    #[test]
    fn dropping_a_session_releases_subscriptions() {
        let db = temporary_database().unwrap();
        let store = SettingsStore::from_db(&db).unwrap();
        let os = OsSettings::from_db(&db).unwrap();
        let session = SettingsSession::setup(
            store.clone(),
            os.clone(),
            PlatformConfig::default(),
            DispatcherDeps {
                icon_cache: Arc::new(IconCacheGeneration::default()),
                packages: Arc::new(InstalledPackages::default()),
                device_profile: Default::default(),
            },
            I18n::new(Language::EnUs),
            SessionOptions::default(),
        );
        assert_eq!(store.listener_count(), 1);
        drop(session);
        assert_eq!(store.listener_count(), 0);
        assert_eq!(os.observer_count(), 0);
    }

    #[test]
    fn switch_spellings() {
        assert!(parse_switch(" YES ").unwrap());
        assert!(!parse_switch("0").unwrap());
        assert!(parse_switch("").is_err());
    }
}
