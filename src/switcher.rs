//! Startup pass and theme-button handling over a document.

use crate::document::{Document, ThemeButton};
use crate::preference::SchemePreference;
use crate::scheme::{ColorScheme, ThemeId};
use crate::updater::{UpdateStats, update_images};

/// Keeps a document's themed images in step with the selected theme.
#[derive(Debug)]
pub struct ThemeSwitcher<D, P> {
    document: D,
    preference: P,
}

impl<D: Document, P: SchemePreference> ThemeSwitcher<D, P> {
    pub fn new(document: D, preference: P) -> Self {
        Self {
            document,
            preference,
        }
    }

    /// Initial pass: every image follows the ambient preference.
    pub fn start(&mut self) -> UpdateStats {
        tracing::debug!("applying ambient color scheme");
        update_images(&mut self.document, None, &self.preference)
    }

    /// Theme-selector buttons the document offers.
    pub fn buttons(&self) -> Vec<ThemeButton> {
        self.document.theme_buttons()
    }

    /// Handle a click on a theme button.
    pub fn click(&mut self, button: &ThemeButton) -> UpdateStats {
        self.select(&ThemeId::from(button.id.as_str()))
    }

    /// Switch to a theme without going through a button.
    pub fn select(&mut self, theme: &ThemeId) -> UpdateStats {
        let scheme = theme.scheme();
        tracing::debug!(%theme, %scheme, "theme selected");
        self.apply(scheme)
    }

    /// Re-render every image for an explicit scheme.
    pub fn apply(&mut self, scheme: ColorScheme) -> UpdateStats {
        update_images(&mut self.document, Some(scheme), &self.preference)
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ImageDescriptor, ImageSet};
    use crate::preference::Fixed;

    fn book() -> ImageSet {
        ImageSet::new(vec![
            ImageDescriptor::annotated("icons/logo.png"),
            ImageDescriptor::plain("photo.jpg"),
            ImageDescriptor::annotated("img/flow.svg"),
        ])
        .with_buttons(["light", "rust", "coal", "navy", "ayu"])
    }

    fn rendered(switcher: &ThemeSwitcher<ImageSet, Fixed>) -> Vec<Option<&str>> {
        switcher
            .document()
            .images
            .iter()
            .map(ImageDescriptor::rendered)
            .collect()
    }

    #[test]
    fn start_uses_ambient_preference() {
        let mut switcher = ThemeSwitcher::new(book(), Fixed(ColorScheme::Dark));

        switcher.start();

        assert_eq!(
            rendered(&switcher),
            vec![
                Some("icons/dark_logo.png"),
                Some("photo.jpg"),
                Some("img/dark_flow.svg")
            ]
        );
    }

    #[test]
    fn navy_click_forces_dark() {
        let mut switcher = ThemeSwitcher::new(book(), Fixed(ColorScheme::Light));
        switcher.start();

        let navy = switcher
            .buttons()
            .into_iter()
            .find(|b| b.id == "navy")
            .unwrap();
        let stats = switcher.click(&navy);

        assert_eq!(stats.updated, 2);
        assert_eq!(
            rendered(&switcher),
            vec![
                Some("icons/dark_logo.png"),
                Some("photo.jpg"),
                Some("img/dark_flow.svg")
            ]
        );
    }

    #[test]
    fn every_button_maps_to_its_scheme() {
        let mut switcher = ThemeSwitcher::new(book(), Fixed(ColorScheme::Dark));

        for button in switcher.buttons() {
            switcher.click(&button);
            let expected = match button.id.as_str() {
                "light" | "rust" => "icons/light_logo.png",
                _ => "icons/dark_logo.png",
            };
            assert_eq!(rendered(&switcher)[0], Some(expected), "button {}", button.id);
        }
    }

    #[test]
    fn unknown_theme_selects_dark() {
        let mut switcher = ThemeSwitcher::new(book(), Fixed(ColorScheme::Light));

        switcher.select(&ThemeId::from("midnight"));

        assert_eq!(rendered(&switcher)[2], Some("img/dark_flow.svg"));
    }
}
