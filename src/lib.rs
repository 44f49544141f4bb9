//! Swap theme-sensitive images to match a light or dark theme.
//!
//! An image opts in by carrying its original source path in an annotation
//! (`data-src` in HTML). Its rendered source is derived from that path by
//! prefixing the filename with the color scheme: `img/logo.png` becomes
//! `img/dark_logo.png` under a dark theme.

pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod minify;
pub mod pipeline;
pub mod preference;
pub mod resolver;
pub mod scheme;
pub mod switcher;
pub mod updater;
pub mod watch;

pub use document::{Document, ImageDescriptor, ImageSet, ThemeButton};
pub use error::{Error, Result};
pub use resolver::{resolve, themed_path};
pub use scheme::{ColorScheme, ThemeId, theme_scheme};
pub use switcher::ThemeSwitcher;
pub use updater::{UpdateStats, update_images};
