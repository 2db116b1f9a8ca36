//! Observers that mirror OS-level state into the settings controls.
//!
//! An observer is registered for a set of keys in one [`Scope`]. On
//! registration and on every change to a watched key it re-reads the OS
//! values, folds them into one `enabled` flag and hands that to
//! [`ExternalStateObserver::on_setting_changed`].

use crate::component::ComponentName;
use crate::config::PlatformConfig;
use crate::event::{EventSender, ObserverToken};
use crate::i18n::I18n;
use crate::keys::SettingKey;
use crate::os_settings::{ENABLED_NOTIFICATION_LISTENERS, OsSettings, Scope};
use crate::screen::{ClickAction, PreferenceScreen};

/// What an observer callback may look at besides the flag itself.
pub struct ObserverContext<'a> {
    pub os: &'a OsSettings,
    pub config: &'a PlatformConfig,
    pub i18n: I18n,
}

pub trait ExternalStateObserver {
    fn scope(&self) -> Scope;

    fn on_setting_changed(
        &mut self,
        enabled: bool,
        cx: &ObserverContext<'_>,
        screen: &mut PreferenceScreen,
    );
}

/// Pairs an observer with its subscription so it is registered at most once
/// and can always be unregistered.
pub struct ObserverRegistration<O> {
    observer: O,
    keys: Vec<&'static str>,
    token: Option<ObserverToken>,
}

impl<O: ExternalStateObserver> ObserverRegistration<O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            keys: Vec::new(),
            token: None,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn token(&self) -> Option<ObserverToken> {
        self.token
    }

    pub fn is_registered(&self) -> bool {
        self.token.is_some()
    }

    /// Subscribes to `keys` and delivers the current state once.
    ///
    /// The first key carries the `enabled` flag. A second call while
    /// registered keeps the existing subscription.
    pub fn register(
        &mut self,
        keys: &[&'static str],
        sender: EventSender,
        cx: &ObserverContext<'_>,
        screen: &mut PreferenceScreen,
    ) -> ObserverToken {
        if let Some(token) = self.token {
            crate::debug_log!("[observer] {:?} already registered, ignoring", token);
            return token;
        }

        let token = cx
            .os
            .register_content_observer(self.observer.scope(), keys, sender);
        self.keys = keys.to_vec();
        self.token = Some(token);
        self.dispatch(cx, screen);
        token
    }

    /// Re-reads and delivers the state; a no-op once unregistered.
    pub fn on_change(&mut self, cx: &ObserverContext<'_>, screen: &mut PreferenceScreen) {
        if self.token.is_none() {
            return;
        }
        self.dispatch(cx, screen);
    }

    pub fn unregister(&mut self, os: &OsSettings) -> bool {
        let Some(token) = self.token.take() else {
            return false;
        };
        os.unregister_content_observer(token);
        crate::debug_log!("[observer] {:?} unregistered", token);
        true
    }

    fn dispatch(&mut self, cx: &ObserverContext<'_>, screen: &mut PreferenceScreen) {
        let enabled = self
            .keys
            .first()
            .is_some_and(|key| cx.os.get_flag(self.observer.scope(), key));
        self.observer.on_setting_changed(enabled, cx, screen);
    }
}

/// Enables the rotation control only while the OS allows auto-rotate.
#[derive(Debug, Default)]
pub struct RotationLockObserver;

impl ExternalStateObserver for RotationLockObserver {
    fn scope(&self) -> Scope {
        Scope::System
    }

    fn on_setting_changed(
        &mut self,
        enabled: bool,
        cx: &ObserverContext<'_>,
        screen: &mut PreferenceScreen,
    ) {
        let Some(control) = screen.get_mut(SettingKey::AllowRotation) else {
            return;
        };
        control.enabled = enabled;
        control.summary = Some(
            if enabled {
                cx.i18n.settings_allow_rotation_desc
            } else {
                cx.i18n.allow_rotation_blocked_desc
            }
            .to_string(),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgingState {
    pub enabled: bool,
    /// `None` when badging is off and access was not looked at.
    pub service_granted: Option<bool>,
}

impl BadgingState {
    pub fn fully_active(&self) -> bool {
        self.enabled && self.service_granted == Some(true)
    }

    pub fn missing_access(&self) -> bool {
        self.service_granted == Some(false)
    }
}

/// Access is only checked while badging is on.
pub fn reconcile_badging(enabled: bool, os: &OsSettings, listener: &ComponentName) -> BadgingState {
    let service_granted = enabled.then(|| {
        let listeners = os
            .get_string(Scope::Secure, ENABLED_NOTIFICATION_LISTENERS)
            .unwrap_or_default();
        listener.listed_in(&listeners)
    });
    BadgingState {
        enabled,
        service_granted,
    }
}

/// Tracks the OS badging switch together with the listener allowlist.
#[derive(Debug, Default)]
pub struct IconBadgingObserver {
    state: Option<BadgingState>,
}

impl IconBadgingObserver {
    pub fn state(&self) -> Option<BadgingState> {
        self.state
    }
}

impl ExternalStateObserver for IconBadgingObserver {
    fn scope(&self) -> Scope {
        Scope::Secure
    }

    fn on_setting_changed(
        &mut self,
        enabled: bool,
        cx: &ObserverContext<'_>,
        screen: &mut PreferenceScreen,
    ) {
        let state = reconcile_badging(enabled, cx.os, &cx.config.listener_component);
        self.state = Some(state);

        let Some(control) = screen.get_mut(SettingKey::IconBadging) else {
            return;
        };

        let summary = if state.missing_access() {
            cx.i18n.title_missing_notification_access
        } else if state.enabled {
            cx.i18n.icon_badging_desc_on
        } else {
            cx.i18n.icon_badging_desc_off
        };

        control.widget_frame_visible = state.missing_access();
        control.click = if state.missing_access() {
            ClickAction::ConfirmNotificationAccess
        } else if cx.config.at_least_oreo() {
            ClickAction::Default
        } else {
            ClickAction::OpenListenerSettings
        };
        control.summary = Some(if cx.config.low_ram_device && !state.fully_active() {
            cx.i18n.with_low_ram_warning(summary)
        } else {
            summary.to_string()
        });
    }
}
