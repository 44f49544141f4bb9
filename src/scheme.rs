//! Color schemes and the themes that select them.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// Binary rendering mode an image variant is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    /// Name used as the themed filename prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }

    /// Extract a scheme from a CSS `color-scheme` value.
    ///
    /// The first `light` or `dark` keyword wins, so `"light dark"` is light.
    /// Values with neither keyword (`normal`, `only`, empty) yield `None`.
    pub fn from_css(value: &str) -> Option<Self> {
        value
            .split_ascii_whitespace()
            .find_map(|keyword| match keyword.to_ascii_lowercase().as_str() {
                "light" => Some(ColorScheme::Light),
                "dark" => Some(ColorScheme::Dark),
                _ => None,
            })
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            _ => Err(Error::UnknownScheme {
                name: s.to_string(),
            }),
        }
    }
}

/// Identifier of an overall visual theme.
///
/// Parsing never fails: names outside the built-in set are kept as `Other`
/// and classified as dark, so new dark themes need no code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Light,
    Rust,
    Coal,
    Navy,
    Ayu,
    Other(String),
}

impl ThemeId {
    /// Map the theme onto the color scheme its images are drawn for.
    pub fn scheme(&self) -> ColorScheme {
        match self {
            ThemeId::Light | ThemeId::Rust => ColorScheme::Light,
            _ => ColorScheme::Dark,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ThemeId::Light => "light",
            ThemeId::Rust => "rust",
            ThemeId::Coal => "coal",
            ThemeId::Navy => "navy",
            ThemeId::Ayu => "ayu",
            ThemeId::Other(name) => name,
        }
    }
}

impl From<&str> for ThemeId {
    fn from(name: &str) -> Self {
        match name {
            "light" => ThemeId::Light,
            "rust" => ThemeId::Rust,
            "coal" => ThemeId::Coal,
            "navy" => ThemeId::Navy,
            "ayu" => ThemeId::Ayu,
            other => ThemeId::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color scheme for a theme given by name.
pub fn theme_scheme(name: &str) -> ColorScheme {
    ThemeId::from(name).scheme()
}
