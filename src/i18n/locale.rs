//! Locale metadata and text direction.

use serde::Serialize;
use std::fmt;

/// Display metadata for one locale code.
///
/// Entries live in the static catalog and never change after startup.
/// Codes are case-sensitive and may carry a region subtag (`"zh-TW"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Locale {
    /// Locale code as it appears in URLs, sessions and cookies (e.g. "en", "pt-BR")
    pub code: &'static str,

    /// English name of the language (e.g. "Arabic", "French")
    pub name: &'static str,

    /// Name of the language in the language itself (e.g. "العربية", "Français")
    pub native_name: &'static str,

    /// Flag emoji shown next to the name, if any
    pub flag: Option<&'static str>,

    /// Whether the script is written right-to-left
    pub rtl: bool,
}

impl Locale {
    pub const fn new(
        code: &'static str,
        name: &'static str,
        native_name: &'static str,
        flag: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            native_name,
            flag: Some(flag),
            rtl: false,
        }
    }

    /// Mark the locale as right-to-left.
    pub const fn rtl(mut self) -> Self {
        self.rtl = true;
        self
    }

    pub fn direction(&self) -> Direction {
        Direction::from_rtl(self.rtl)
    }
}

/// Text direction, rendered as the HTML `dir` attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn from_rtl(rtl: bool) -> Self {
        if rtl {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
