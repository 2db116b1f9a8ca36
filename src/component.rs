use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an application component: owning package plus class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// `package/fully.qualified.Class`
    pub fn flatten_to_string(&self) -> String {
        format!("{}/{}", self.package, self.class)
    }

    /// `package/.Class` when the class lives under the package, otherwise the long form.
    pub fn flatten_to_short_string(&self) -> String {
        match self.class.strip_prefix(self.package.as_str()) {
            Some(rest) if rest.starts_with('.') => format!("{}/{}", self.package, rest),
            _ => self.flatten_to_string(),
        }
    }

    /// Whether a flattened component list mentions this component in either form.
    pub fn listed_in(&self, flattened_list: &str) -> bool {
        if flattened_list.is_empty() {
            return false;
        }
        flattened_list.contains(&self.flatten_to_string())
            || flattened_list.contains(&self.flatten_to_short_string())
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten_to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> ComponentName {
        ComponentName::new(
            "com.android.launcher3",
            "com.android.launcher3.notification.NotificationListener",
        )
    }

    #[test]
    fn short_form_drops_package_prefix() {
        assert_eq!(
            listener().flatten_to_short_string(),
            "com.android.launcher3/.notification.NotificationListener"
        );
        let foreign = ComponentName::new("com.example", "org.other.Listener");
        assert_eq!(foreign.flatten_to_short_string(), "com.example/org.other.Listener");
    }

    #[test]
    fn class_sharing_only_a_name_prefix_is_not_shortened() {
        let component = ComponentName::new("com.example", "com.examplex.Listener");
        assert_eq!(
            component.flatten_to_short_string(),
            "com.example/com.examplex.Listener"
        );
    }

    #[test]
    fn listed_in_matches_long_and_short_forms() {
        let long = "a.b/a.b.C:com.android.launcher3/com.android.launcher3.notification.NotificationListener";
        let short = "com.android.launcher3/.notification.NotificationListener";
        assert!(listener().listed_in(long));
        assert!(listener().listed_in(short));
        assert!(!listener().listed_in("a.b/a.b.C"));
        assert!(!listener().listed_in(""));
    }
}
