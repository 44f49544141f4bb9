use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::html::HtmlOptions;
use crate::preference::{ElementStyle, Fixed, System};
use crate::scheme::ColorScheme;

/// Where the ambient color scheme comes from when no theme is selected.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Ambient {
    /// Ask the operating system.
    #[default]
    System,
    /// Always light.
    Light,
    /// Always dark.
    Dark,
}

/// Site configuration loaded from themed-images.toml
#[derive(Debug, Deserialize)]
pub struct Site {
    /// Directory containing rendered HTML (relative to site root)
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Directory for build output (relative to site root)
    #[serde(default = "default_build")]
    pub build: PathBuf,

    /// Theme to apply to every page. Without a theme or scheme, pages get
    /// the ambient pass.
    pub theme: Option<String>,

    /// Explicit color scheme, takes precedence over `theme`
    pub scheme: Option<ColorScheme>,

    /// Ambient preference source
    #[serde(default)]
    pub ambient: Ambient,

    /// Scheme used when OS detection has no answer
    #[serde(default = "default_fallback")]
    pub fallback: ColorScheme,

    /// Attribute carrying an image's original source path
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Class marking theme-selector buttons
    #[serde(default = "default_button_class")]
    pub button_class: String,

    /// Whether to minify HTML output (defaults to false)
    #[serde(default)]
    pub minify: bool,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            source: default_source(),
            build: default_build(),
            theme: None,
            scheme: None,
            ambient: Ambient::default(),
            fallback: default_fallback(),
            attribute: default_attribute(),
            button_class: default_button_class(),
            minify: false,
        }
    }
}

impl Site {
    /// Load the config file, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn html_options(&self) -> HtmlOptions {
        HtmlOptions {
            attribute: self.attribute.clone(),
            button_class: self.button_class.clone(),
        }
    }

    /// Preference provider for the ambient pass.
    ///
    /// An image's own scheme wins (inline `color-scheme`, else the page's
    /// theme class); otherwise the configured ambient source. The OS is
    /// queried once per build.
    pub fn preference(&self) -> ElementStyle<Fixed> {
        let ambient = match self.ambient {
            Ambient::System => System::new(self.fallback).snapshot(),
            Ambient::Light => Fixed(ColorScheme::Light),
            Ambient::Dark => Fixed(ColorScheme::Dark),
        };
        tracing::debug!(ambient = %ambient.0, "resolved ambient color scheme");
        ElementStyle::new(ambient)
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("book")
}

fn default_build() -> PathBuf {
    PathBuf::from("dist")
}

fn default_fallback() -> ColorScheme {
    ColorScheme::Light
}

fn default_attribute() -> String {
    "data-src".to_string()
}

fn default_button_class() -> String {
    "theme".to_string()
}
