//! Icon-related collaborators handed to the dispatcher.

use crate::i18n::I18n;
use crate::screen::IconRef;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Package id stored when the user picks the system icons.
pub const DEFAULT_ICON_PACK: &str = "";

pub trait IconCache {
    /// Drops every cached icon so the next load picks up new icon settings.
    fn clear(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub package: String,
    pub label: String,
}

pub trait PackageLookup {
    /// `None` when the package is not installed.
    fn application_info(&self, package: &str) -> Option<ApplicationInfo>;
}

/// Cache handle that only tracks invalidations; icon loaders compare
/// generations to decide whether their entries are stale.
#[derive(Debug, Default)]
pub struct IconCacheGeneration {
    generation: AtomicU64,
}

impl IconCacheGeneration {
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

impl IconCache for IconCacheGeneration {
    fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        crate::debug_log!("[icons] cache cleared, generation={}", generation);
    }
}

/// Installed packages known up front, keyed by package id.
#[derive(Debug, Clone, Default)]
pub struct InstalledPackages {
    labels: BTreeMap<String, String>,
}

impl InstalledPackages {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }
}

impl PackageLookup for InstalledPackages {
    fn application_info(&self, package: &str) -> Option<ApplicationInfo> {
        self.labels.get(package).map(|label| ApplicationInfo {
            package: package.to_string(),
            label: label.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconPackEntry {
    pub summary: String,
    pub icon: IconRef,
}

pub fn is_default_icon_pack(package: &str) -> bool {
    package.trim() == DEFAULT_ICON_PACK
}

/// Label and icon for the selected pack; the system default when the pack
/// is the default one or is no longer installed.
pub fn resolve_icon_pack_entry(
    package: &str,
    lookup: &dyn PackageLookup,
    i18n: I18n,
) -> IconPackEntry {
    let fallback = IconPackEntry {
        summary: i18n.icon_pack_system.to_string(),
        icon: IconRef::SystemDefault,
    };
    if is_default_icon_pack(package) {
        return fallback;
    }

    match lookup.application_info(package) {
        Some(info) => IconPackEntry {
            summary: info.label,
            icon: IconRef::Package(info.package),
        },
        None => {
            crate::debug_log!("[icons] icon pack not installed: {}", package);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    fn packages() -> InstalledPackages {
        InstalledPackages::new(BTreeMap::from([(
            "com.example.pack".to_string(),
            "Example Pack".to_string(),
        )]))
    }

    #[test]
    fn installed_pack_uses_its_label_and_icon() {
        let entry = resolve_icon_pack_entry(
            "com.example.pack",
            &packages(),
            I18n::new(Language::EnUs),
        );
        assert_eq!(entry.summary, "Example Pack");
        assert_eq!(entry.icon, IconRef::Package("com.example.pack".into()));
    }

    #[test]
    fn missing_or_default_pack_falls_back_to_system() {
        let i18n = I18n::new(Language::EnUs);
        for package in ["com.gone.pack", DEFAULT_ICON_PACK] {
            let entry = resolve_icon_pack_entry(package, &packages(), i18n);
            assert_eq!(entry.summary, i18n.icon_pack_system);
            assert_eq!(entry.icon, IconRef::SystemDefault);
        }
    }

    #[test]
    fn clearing_bumps_generation() {
        let cache = IconCacheGeneration::default();
        cache.clear();
        cache.clear();
        assert_eq!(cache.generation(), 2);
    }
}
