use crate::component::ComponentName;
use crate::i18n::I18n;

pub const ACTION_NOTIFICATION_LISTENER_SETTINGS: &str =
    "android.settings.ACTION_NOTIFICATION_LISTENER_SETTINGS";
pub const EXTRA_FRAGMENT_ARG_KEY: &str = ":settings:fragment_args_key";

/// Request to open the OS surface where the listener can be granted access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub action: &'static str,
    pub new_task: bool,
    pub extras: Vec<(&'static str, String)>,
}

impl PermissionRequest {
    pub fn listener_settings(listener: &ComponentName) -> Self {
        Self {
            action: ACTION_NOTIFICATION_LISTENER_SETTINGS,
            new_task: true,
            extras: vec![(EXTRA_FRAGMENT_ARG_KEY, listener.flatten_to_string())],
        }
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(extra_key, _)| *extra_key == key)
            .map(|(_, value)| value.as_str())
    }
}

/// The "notification access needed" confirmation shown before leaving for
/// the OS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfirmation {
    pub title: &'static str,
    pub message: String,
    pub positive: &'static str,
    pub negative: &'static str,
    listener: ComponentName,
}

impl AccessConfirmation {
    pub fn new(i18n: I18n, listener: ComponentName) -> Self {
        Self {
            title: i18n.title_missing_notification_access,
            message: i18n.msg_missing_notification_access(),
            positive: i18n.title_change_settings,
            negative: i18n.cancel_button,
            listener,
        }
    }

    /// Positive button: the request to launch.
    pub fn accept(&self) -> PermissionRequest {
        PermissionRequest::listener_settings(&self.listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    #[test]
    fn accepting_targets_the_listener_settings_with_our_component() {
        let listener = ComponentName::new("com.example", "com.example.Listener");
        let confirmation = AccessConfirmation::new(I18n::new(Language::EnUs), listener);
        let request = confirmation.accept();

        assert_eq!(request.action, ACTION_NOTIFICATION_LISTENER_SETTINGS);
        assert!(request.new_task);
        assert_eq!(
            request.extra(EXTRA_FRAGMENT_ARG_KEY),
            Some("com.example/com.example.Listener")
        );
        assert_eq!(request.extra("missing"), None);
    }
}
