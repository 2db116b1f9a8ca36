use rust_embed::RustEmbed;
use serde::Deserialize;
use std::borrow::Cow;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::OnceLock;

const I18N_DIR_ENV: &str = "LAUNCHER_PREFS_I18N_DIR";

/// Catalogs bundled into the binary; a directory named by
/// `LAUNCHER_PREFS_I18N_DIR` takes precedence when it has the file.
#[derive(RustEmbed)]
#[folder = "assets/i18n"]
#[include = "*.json"]
struct BundledLocales;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Language {
    ZhCn,
    EnUs,
}

impl Language {
    pub fn detect() -> Self {
        if let Some(locale_tag) = sys_locale::get_locale() {
            return Self::from_locale_tag(&locale_tag);
        }

        Self::EnUs
    }

    pub fn from_locale_tag(raw: &str) -> Self {
        let tag = raw.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Self::EnUs;
        }

        let is_chinese = tag.starts_with("zh")
            || tag == "cn"
            || tag.starts_with("cn_")
            || tag.starts_with("cn-")
            || tag.contains("_zh")
            || tag.contains("-zh");
        if is_chinese {
            return Self::ZhCn;
        }

        Self::EnUs
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::ZhCn => "zh_CN.json",
            Self::EnUs => "en_US.json",
        }
    }
}

macro_rules! locale_message_fields {
    ($macro:ident) => {
        $macro! {
            derived_app_name,
            title_dark_theme,
            title_show_desktop_labels,
            title_show_drawer_labels,
            title_builtin_icon_theme,
            title_adaptive_icons,
            title_grid_size,
            title_icon_pack,
            title_allow_rotation,
            title_icon_badging,
            title_minus_one,
            title_predictive_apps,
            title_workspace_edit,
            title_add_icon_to_home,
            title_icon_shape,
            title_protected_apps,
            settings_allow_rotation_desc,
            allow_rotation_blocked_desc,
            icon_badging_desc_on,
            icon_badging_desc_off,
            title_missing_notification_access,
            msg_missing_notification_access,
            title_change_settings,
            cancel_button,
            low_ram_warning,
            darktheme_off_desc,
            darktheme_drawer_desc,
            darktheme_full_desc,
            darktheme_auto_desc,
            settings_icon_adaptive_desc_disabled,
            settings_icon_force_adaptive_desc_on,
            settings_icon_force_adaptive_desc_off,
            settings_icon_adaptive_desc_bypass,
            icon_pack_system,
            icon_shape_system,
            icon_shape_square,
            icon_shape_squircle,
            icon_shape_circle,
            icon_shape_teardrop,
            grid_size_text,
            grid_size_custom_positive,
            restart_pending_notice,
        }
    };
}

macro_rules! define_raw_locale_messages {
    ($($field:ident),+ $(,)?) => {
        #[derive(Debug, Deserialize)]
        #[serde(deny_unknown_fields)]
        struct RawLocaleMessages {
            $(
                $field: String,
            )+
        }
    };
}

macro_rules! define_locale_messages {
    ($($field:ident),+ $(,)?) => {
        #[derive(Debug)]
        pub struct LocaleMessages {
            $(
                pub $field: &'static str,
            )+
        }
    };
}

macro_rules! impl_from_raw_locale_messages {
    ($($field:ident),+ $(,)?) => {
        impl From<RawLocaleMessages> for LocaleMessages {
            fn from(raw: RawLocaleMessages) -> Self {
                Self {
                    $(
                        $field: leak_str(raw.$field),
                    )+
                }
            }
        }
    };
}

macro_rules! impl_placeholder_locale_messages {
    ($($field:ident),+ $(,)?) => {
        impl LocaleMessages {
            /// Key names in place of text, for when no catalog loads at all.
            fn placeholders() -> Self {
                Self {
                    $(
                        $field: stringify!($field),
                    )+
                }
            }
        }
    };
}

locale_message_fields!(define_raw_locale_messages);
locale_message_fields!(define_locale_messages);
locale_message_fields!(impl_from_raw_locale_messages);
locale_message_fields!(impl_placeholder_locale_messages);

fn leak_str(value: String) -> &'static str {
    Box::leak(value.into_boxed_str())
}

static ZH_CN_MESSAGES: OnceLock<LocaleMessages> = OnceLock::new();
static EN_US_MESSAGES: OnceLock<LocaleMessages> = OnceLock::new();

#[derive(Clone, Copy, Debug)]
pub struct I18n {
    messages: &'static LocaleMessages,
}

impl I18n {
    pub fn new(lang: Language) -> Self {
        Self {
            messages: messages_for(lang),
        }
    }

    pub fn msg_missing_notification_access(self) -> String {
        format_template(
            self.messages.msg_missing_notification_access,
            &[("app_name", self.derived_app_name.to_string())],
        )
    }

    /// Appends the low-RAM warning line to a summary.
    pub fn with_low_ram_warning(self, summary: &str) -> String {
        format!("{summary}\n{}", self.low_ram_warning)
    }

    /// Two stacked summary lines, as used by the bypass adaptive-icon modes.
    pub fn two_line(self, first: &str, second: &str) -> String {
        format!("{first}\n{second}")
    }
}

impl Deref for I18n {
    type Target = LocaleMessages;

    fn deref(&self) -> &Self::Target {
        self.messages
    }
}

fn messages_for(lang: Language) -> &'static LocaleMessages {
    match lang {
        Language::ZhCn => ZH_CN_MESSAGES.get_or_init(|| load_messages(Language::ZhCn)),
        Language::EnUs => EN_US_MESSAGES.get_or_init(|| load_messages(Language::EnUs)),
    }
}

fn load_messages(lang: Language) -> LocaleMessages {
    let attempts = [
        (lang.file_name(), try_load_messages(lang)),
        (Language::EnUs.file_name(), try_load_messages(Language::EnUs)),
        ("bundled en_US", try_load_bundled_messages(Language::EnUs)),
    ];
    first_loaded(attempts).unwrap_or_else(|| {
        crate::debug_log!("[i18n] no catalog loaded, showing key names");
        LocaleMessages::placeholders()
    })
}

/// Takes the first catalog that loaded and logs the ones that did not.
fn first_loaded<I>(attempts: I) -> Option<LocaleMessages>
where
    I: IntoIterator<Item = (&'static str, Result<LocaleMessages, String>)>,
{
    for (source, attempt) in attempts {
        match attempt {
            Ok(messages) => return Some(messages),
            Err(err) => crate::debug_log!("[i18n] failed to load {}: {}", source, err),
        }
    }
    None
}

fn try_load_bundled_messages(lang: Language) -> Result<LocaleMessages, String> {
    let (origin, raw) = load_bundled_file(lang.file_name())?;
    parse_messages(&raw).map_err(|err| format!("{origin} parse failed: {err}"))
}

fn try_load_messages(lang: Language) -> Result<LocaleMessages, String> {
    let (origin, raw) = load_locale_file(lang.file_name())?;
    crate::debug_log!("[i18n] loading locale {} from {}", lang.file_name(), origin);

    parse_messages(&raw).map_err(|err| format!("{origin} parse failed: {err}"))
}

fn parse_messages(raw: &str) -> Result<LocaleMessages, serde_json::Error> {
    serde_json::from_str::<RawLocaleMessages>(raw).map(LocaleMessages::from)
}

fn override_dir() -> Option<PathBuf> {
    let dir = std::env::var_os(I18N_DIR_ENV)?;
    if dir.is_empty() {
        return None;
    }
    Some(PathBuf::from(dir))
}

fn load_locale_file(file_name: &str) -> Result<(String, String), String> {
    if let Some(dir) = override_dir() {
        let path = dir.join(file_name);
        if path.is_file() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| format!("{} read failed: {}", path.display(), err))?;
            return Ok((path.display().to_string(), raw));
        }
    }

    load_bundled_file(file_name)
}

fn load_bundled_file(file_name: &str) -> Result<(String, String), String> {
    let file = BundledLocales::get(file_name)
        .ok_or_else(|| format!("{file_name} not bundled and no override found"))?;
    let raw = match file.data {
        Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    };
    Ok((format!("bundled:{file_name}"), raw))
}

fn format_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut output = template.to_string();
    for (key, value) in vars {
        let token = format!("{{{key}}}");
        output = output.replace(&token, value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags_map_to_languages() {
        assert_eq!(Language::from_locale_tag("zh-Hans-CN"), Language::ZhCn);
        assert_eq!(Language::from_locale_tag("en_US.UTF-8"), Language::EnUs);
        assert_eq!(Language::from_locale_tag(""), Language::EnUs);
        assert_eq!(Language::from_locale_tag("de-DE"), Language::EnUs);
    }

    #[test]
    fn bundled_catalogs_parse() {
        for lang in [Language::EnUs, Language::ZhCn] {
            let (_, raw) = load_locale_file(lang.file_name()).unwrap();
            parse_messages(&raw).unwrap();
        }
    }

    #[test]
    fn broken_catalogs_fall_back_without_panicking() {
        let broken = || parse_messages("{}").map_err(|err| err.to_string());
        assert!(broken().is_err());

        let loaded = first_loaded([
            ("zh_CN.json", broken()),
            ("en_US.json", try_load_bundled_messages(Language::EnUs)),
        ])
        .unwrap();
        assert_eq!(loaded.title_protected_apps, "Protected apps");

        assert!(first_loaded([("zh_CN.json", broken())]).is_none());
        let placeholders = LocaleMessages::placeholders();
        assert_eq!(placeholders.title_icon_shape, "title_icon_shape");
    }

    #[test]
    fn templates_fill_app_name() {
        let i18n = I18n::new(Language::EnUs);
        let message = i18n.msg_missing_notification_access();
        assert!(message.contains(i18n.derived_app_name));
        assert!(!message.contains("{app_name}"));
    }

    #[test]
    fn low_ram_warning_is_a_new_line() {
        let i18n = I18n::new(Language::EnUs);
        assert_eq!(
            i18n.with_low_ram_warning("Off"),
            "Off\nWARNING: low ram device"
        );
    }
}
