//! Locale catalog: single source of truth for locale display metadata.
//!
//! The catalog knows far more locales than any one application supports.
//! Which of them are active is decided by `LocaleConfig::supported_locales`;
//! the catalog only answers "what is this code called and how is it written".

use crate::i18n::Locale;
use std::sync::OnceLock;

/// Registry of every locale the crate has display metadata for.
///
/// The built-in instance is initialized once on first access and is
/// immutable thereafter.
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    locales: Vec<Locale>,
}

static CATALOG: OnceLock<LocaleCatalog> = OnceLock::new();

impl LocaleCatalog {
    /// Build a catalog from an explicit list of entries.
    ///
    /// Later entries with the same code are shadowed by earlier ones.
    pub fn new(locales: Vec<Locale>) -> Self {
        Self { locales }
    }

    /// Get the built-in catalog instance.
    ///
    /// This method initializes the catalog on first call and returns a reference
    /// to the same instance on subsequent calls.
    pub fn builtin() -> &'static LocaleCatalog {
        CATALOG.get_or_init(|| LocaleCatalog::new(builtin_locales()))
    }

    /// Get a locale entry by its exact (case-sensitive) code.
    ///
    /// # Arguments
    /// * `code` - The locale code (e.g., "en", "zh-TW")
    ///
    /// # Returns
    /// * `Some(&Locale)` if the catalog has an entry for the code
    /// * `None` otherwise
    pub fn get_by_code(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// All entries, in catalog order.
    pub fn list_all(&self) -> &[Locale] {
        &self.locales
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        LocaleCatalog::builtin().clone()
    }
}

/// Built-in locale entries, grouped roughly by region.
fn builtin_locales() -> Vec<Locale> {
    vec![
        // Middle East and Asia
        Locale::new("ar", "Arabic", "العربية", "🇸🇦").rtl(),
        Locale::new("fa", "Persian", "فارسی", "🇮🇷").rtl(),
        Locale::new("ur", "Urdu", "اردو", "🇵🇰").rtl(),
        Locale::new("tr", "Turkish", "Türkçe", "🇹🇷"),
        Locale::new("ku", "Kurdish", "Kurdî", "🇮🇶"),
        Locale::new("ps", "Pashto", "پښتو", "🇦🇫").rtl(),
        Locale::new("hi", "Hindi", "हिन्दी", "🇮🇳"),
        Locale::new("bn", "Bengali", "বাংলা", "🇧🇩"),
        Locale::new("ta", "Tamil", "தமிழ்", "🇮🇳"),
        Locale::new("te", "Telugu", "తెలుగు", "🇮🇳"),
        Locale::new("mr", "Marathi", "मराठी", "🇮🇳"),
        Locale::new("th", "Thai", "ไทย", "🇹🇭"),
        Locale::new("vi", "Vietnamese", "Tiếng Việt", "🇻🇳"),
        Locale::new("id", "Indonesian", "Bahasa Indonesia", "🇮🇩"),
        Locale::new("ms", "Malay", "Bahasa Melayu", "🇲🇾"),
        Locale::new("fil", "Filipino", "Filipino", "🇵🇭"),
        Locale::new("zh", "Chinese", "中文", "🇨🇳"),
        Locale::new("zh-TW", "Traditional Chinese", "繁體中文", "🇹🇼"),
        Locale::new("ja", "Japanese", "日本語", "🇯🇵"),
        Locale::new("ko", "Korean", "한국어", "🇰🇷"),
        // Europe and the Americas
        Locale::new("en", "English", "English", "🇬🇧"),
        Locale::new("en-US", "English (US)", "English", "🇺🇸"),
        Locale::new("en-GB", "English (UK)", "English", "🇬🇧"),
        Locale::new("fr", "French", "Français", "🇫🇷"),
        Locale::new("es", "Spanish", "Español", "🇪🇸"),
        Locale::new("es-MX", "Spanish (Mexico)", "Español", "🇲🇽"),
        Locale::new("de", "German", "Deutsch", "🇩🇪"),
        Locale::new("it", "Italian", "Italiano", "🇮🇹"),
        Locale::new("pt", "Portuguese", "Português", "🇵🇹"),
        Locale::new("pt-BR", "Portuguese (Brazil)", "Português", "🇧🇷"),
        Locale::new("ru", "Russian", "Русский", "🇷🇺"),
        Locale::new("pl", "Polish", "Polski", "🇵🇱"),
        Locale::new("nl", "Dutch", "Nederlands", "🇳🇱"),
        Locale::new("sv", "Swedish", "Svenska", "🇸🇪"),
        Locale::new("no", "Norwegian", "Norsk", "🇳🇴"),
        Locale::new("da", "Danish", "Dansk", "🇩🇰"),
        Locale::new("fi", "Finnish", "Suomi", "🇫🇮"),
        Locale::new("el", "Greek", "Ελληνικά", "🇬🇷"),
        Locale::new("cs", "Czech", "Čeština", "🇨🇿"),
        Locale::new("sk", "Slovak", "Slovenčina", "🇸🇰"),
        Locale::new("hu", "Hungarian", "Magyar", "🇭🇺"),
        Locale::new("ro", "Romanian", "Română", "🇷🇴"),
        Locale::new("bg", "Bulgarian", "Български", "🇧🇬"),
        Locale::new("hr", "Croatian", "Hrvatski", "🇭🇷"),
        Locale::new("sr", "Serbian", "Српски", "🇷🇸"),
        Locale::new("sl", "Slovenian", "Slovenščina", "🇸🇮"),
        Locale::new("uk", "Ukrainian", "Українська", "🇺🇦"),
        Locale::new("be", "Belarusian", "Беларуская", "🇧🇾"),
        Locale::new("lt", "Lithuanian", "Lietuvių", "🇱🇹"),
        Locale::new("lv", "Latvian", "Latviešu", "🇱🇻"),
        Locale::new("et", "Estonian", "Eesti", "🇪🇪"),
        Locale::new("ga", "Irish", "Gaeilge", "🇮🇪"),
        Locale::new("cy", "Welsh", "Cymraeg", "🇬🇧"),
        Locale::new("mt", "Maltese", "Malti", "🇲🇹"),
        Locale::new("is", "Icelandic", "Íslenska", "🇮🇸"),
        // Africa
        Locale::new("sw", "Swahili", "Kiswahili", "🇰🇪"),
        Locale::new("af", "Afrikaans", "Afrikaans", "🇿🇦"),
        Locale::new("am", "Amharic", "አማርኛ", "🇪🇹"),
        Locale::new("zu", "Zulu", "isiZulu", "🇿🇦"),
        Locale::new("xh", "Xhosa", "isiXhosa", "🇿🇦"),
        Locale::new("yo", "Yoruba", "Yorùbá", "🇳🇬"),
        Locale::new("ig", "Igbo", "Igbo", "🇳🇬"),
        Locale::new("ha", "Hausa", "Hausa", "🇳🇬"),
        // Regional European
        Locale::new("ca", "Catalan", "Català", "🇪🇸"),
        Locale::new("eu", "Basque", "Euskara", "🇪🇸"),
        Locale::new("gl", "Galician", "Galego", "🇪🇸"),
        Locale::new("br", "Breton", "Brezhoneg", "🇫🇷"),
        Locale::new("lb", "Luxembourgish", "Lëtzebuergesch", "🇱🇺"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_returns_singleton() {
        let catalog1 = LocaleCatalog::builtin();
        let catalog2 = LocaleCatalog::builtin();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(catalog1, catalog2));
    }

    #[test]
    fn test_get_by_code_arabic() {
        let arabic = LocaleCatalog::builtin()
            .get_by_code("ar")
            .expect("ar should be in the catalog");

        assert_eq!(arabic.name, "Arabic");
        assert_eq!(arabic.native_name, "العربية");
        assert!(arabic.rtl);
    }

    #[test]
    fn test_get_by_code_region_subtag() {
        let catalog = LocaleCatalog::builtin();
        let tw = catalog.get_by_code("zh-TW").expect("zh-TW should exist");
        assert_eq!(tw.name, "Traditional Chinese");
        assert!(!tw.rtl);
    }

    #[test]
    fn test_get_by_code_is_case_sensitive() {
        let catalog = LocaleCatalog::builtin();
        assert!(catalog.get_by_code("EN").is_none());
        assert!(catalog.get_by_code("zh-tw").is_none());
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LocaleCatalog::builtin().get_by_code("tlh").is_none());
    }

    #[test]
    fn test_builtin_codes_are_unique() {
        let catalog = LocaleCatalog::builtin();
        let codes: HashSet<_> = catalog.list_all().iter().map(|l| l.code).collect();
        assert_eq!(codes.len(), catalog.len());
    }

    #[test]
    fn test_builtin_rtl_set() {
        let rtl: Vec<_> = LocaleCatalog::builtin()
            .list_all()
            .iter()
            .filter(|l| l.rtl)
            .map(|l| l.code)
            .collect();
        assert_eq!(rtl, vec!["ar", "fa", "ur", "ps"]);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = LocaleCatalog::new(vec![Locale::new("eo", "Esperanto", "Esperanto", "🟩")]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("eo"));
        assert!(!catalog.contains("en"));
    }
}
