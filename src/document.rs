//! Abstract view of a page: its theme-sensitive images and theme buttons.

use crate::scheme::ColorScheme;

/// An image element together with its original-source annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDescriptor {
    original: Option<String>,
    rendered: Option<String>,
    style_scheme: Option<ColorScheme>,
}

impl ImageDescriptor {
    /// An image that takes part in theming.
    pub fn annotated(original: impl Into<String>) -> Self {
        Self {
            original: Some(original.into()),
            ..Self::default()
        }
    }

    /// An image without an original-source annotation.
    pub fn plain(rendered: impl Into<String>) -> Self {
        Self {
            rendered: Some(rendered.into()),
            ..Self::default()
        }
    }

    pub fn with_rendered(mut self, rendered: impl Into<String>) -> Self {
        self.rendered = Some(rendered.into());
        self
    }

    /// Scheme the element itself asks for (e.g. inline `color-scheme`).
    pub fn with_style_scheme(mut self, scheme: ColorScheme) -> Self {
        self.style_scheme = Some(scheme);
        self
    }

    pub(crate) fn from_parts(
        original: Option<String>,
        rendered: Option<String>,
        style_scheme: Option<ColorScheme>,
    ) -> Self {
        Self {
            original,
            rendered,
            style_scheme,
        }
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    pub fn style_scheme(&self) -> Option<ColorScheme> {
        self.style_scheme
    }

    /// Only the updater writes the rendered path.
    pub(crate) fn set_rendered(&mut self, rendered: String) {
        self.rendered = Some(rendered);
    }
}

/// A theme-selector button, identified by its element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeButton {
    pub id: String,
}

impl ThemeButton {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Anything that exposes image descriptors and theme buttons.
pub trait Document {
    /// Every image in the document, annotated or not, in document order.
    fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageDescriptor>;

    /// Theme-selector buttons present in the document.
    fn theme_buttons(&self) -> Vec<ThemeButton>;
}

/// In-memory document.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    pub images: Vec<ImageDescriptor>,
    pub buttons: Vec<ThemeButton>,
}

impl ImageSet {
    pub fn new(images: Vec<ImageDescriptor>) -> Self {
        Self {
            images,
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons.extend(ids.into_iter().map(ThemeButton::new));
        self
    }
}

impl Document for ImageSet {
    fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageDescriptor> {
        self.images.iter_mut()
    }

    fn theme_buttons(&self) -> Vec<ThemeButton> {
        self.buttons.clone()
    }
}
