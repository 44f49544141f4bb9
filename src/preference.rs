//! Ambient color-scheme preference, consulted when no scheme is given.
//!
//! Providers are injected into the updater instead of being read from a
//! global, so resolution can be tested with a fixed preference.

use crate::document::ImageDescriptor;
use crate::scheme::ColorScheme;

/// Answers which scheme an image should be rendered for.
pub trait SchemePreference {
    fn scheme_for(&self, image: &ImageDescriptor) -> ColorScheme;
}

impl<P: SchemePreference + ?Sized> SchemePreference for &P {
    fn scheme_for(&self, image: &ImageDescriptor) -> ColorScheme {
        (**self).scheme_for(image)
    }
}

/// Provider backed by a closure.
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

/// Wrap a closure as a preference provider.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&ImageDescriptor) -> ColorScheme,
{
    FromFn(f)
}

impl<F> SchemePreference for FromFn<F>
where
    F: Fn(&ImageDescriptor) -> ColorScheme,
{
    fn scheme_for(&self, image: &ImageDescriptor) -> ColorScheme {
        (self.0)(image)
    }
}

/// Always the same scheme.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub ColorScheme);

impl SchemePreference for Fixed {
    fn scheme_for(&self, _image: &ImageDescriptor) -> ColorScheme {
        self.0
    }
}

/// The operating system's light/dark setting.
#[derive(Debug, Clone, Copy)]
pub struct System {
    /// Used when detection fails or the OS has no preference.
    pub fallback: ColorScheme,
}

impl System {
    pub fn new(fallback: ColorScheme) -> Self {
        Self { fallback }
    }

    /// Query the OS once.
    pub fn detect(&self) -> ColorScheme {
        match dark_light::detect() {
            Ok(dark_light::Mode::Dark) => ColorScheme::Dark,
            Ok(dark_light::Mode::Light) => ColorScheme::Light,
            Ok(dark_light::Mode::Unspecified) => {
                tracing::debug!(fallback = %self.fallback, "no OS color preference");
                self.fallback
            }
            Err(e) => {
                tracing::warn!(error = ?e, fallback = %self.fallback, "color preference detection failed");
                self.fallback
            }
        }
    }

    /// Snapshot the current OS preference as a fixed provider.
    pub fn snapshot(&self) -> Fixed {
        Fixed(self.detect())
    }
}

impl SchemePreference for System {
    fn scheme_for(&self, _image: &ImageDescriptor) -> ColorScheme {
        self.detect()
    }
}

/// The element's own declared scheme, falling back to another provider.
#[derive(Debug, Clone, Copy)]
pub struct ElementStyle<P> {
    pub fallback: P,
}

impl<P> ElementStyle<P> {
    pub fn new(fallback: P) -> Self {
        Self { fallback }
    }
}

impl<P: SchemePreference> SchemePreference for ElementStyle<P> {
    fn scheme_for(&self, image: &ImageDescriptor) -> ColorScheme {
        image
            .style_scheme()
            .unwrap_or_else(|| self.fallback.scheme_for(image))
    }
}
