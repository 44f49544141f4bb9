//! Full synchronous pass that re-renders every theme-sensitive image.

use crate::document::Document;
use crate::preference::SchemePreference;
use crate::resolver;
use crate::scheme::ColorScheme;

/// Counts from a single update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Images seen in the document.
    pub scanned: usize,
    /// Images carrying an original path, all of which were rewritten.
    pub updated: usize,
}

/// Rewrite the rendered path of every annotated image in `doc`.
///
/// With `explicit` set every image gets that scheme; otherwise each image
/// asks `preference`. Images without an original path are left untouched.
pub fn update_images<D, P>(doc: &mut D, explicit: Option<ColorScheme>, preference: &P) -> UpdateStats
where
    D: Document,
    P: SchemePreference + ?Sized,
{
    let mut stats = UpdateStats::default();

    for image in doc.images_mut() {
        stats.scanned += 1;

        let Some(themed) = resolver::resolve(image, explicit, preference) else {
            continue;
        };

        tracing::trace!(
            original = image.original().unwrap_or_default(),
            rendered = %themed,
            "themed image"
        );
        image.set_rendered(themed);
        stats.updated += 1;
    }

    tracing::debug!(
        scheme = explicit.map(ColorScheme::as_str).unwrap_or("ambient"),
        scanned = stats.scanned,
        updated = stats.updated,
        "updated images"
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ImageDescriptor, ImageSet};
    use crate::preference::{Fixed, from_fn};

    #[test]
    fn ambient_preference_without_explicit_scheme() {
        let mut doc = ImageSet::new(vec![ImageDescriptor::annotated("icons/logo.png")]);

        let stats = update_images(&mut doc, None, &Fixed(ColorScheme::Dark));

        assert_eq!(stats, UpdateStats { scanned: 1, updated: 1 });
        assert_eq!(doc.images[0].rendered(), Some("icons/dark_logo.png"));
    }

    #[test]
    fn explicit_scheme_overrides_preference() {
        let mut doc = ImageSet::new(vec![
            ImageDescriptor::annotated("a/one.png"),
            ImageDescriptor::annotated("b/two.svg").with_style_scheme(ColorScheme::Light),
        ]);

        update_images(&mut doc, Some(ColorScheme::Dark), &Fixed(ColorScheme::Light));

        assert_eq!(doc.images[0].rendered(), Some("a/dark_one.png"));
        assert_eq!(doc.images[1].rendered(), Some("b/dark_two.svg"));
    }

    #[test]
    fn unannotated_images_untouched() {
        let plain = ImageDescriptor::plain("photo.jpg");
        let mut doc = ImageSet::new(vec![plain.clone(), ImageDescriptor::annotated("x.png")]);

        let stats = update_images(&mut doc, Some(ColorScheme::Light), &Fixed(ColorScheme::Dark));

        assert_eq!(stats, UpdateStats { scanned: 2, updated: 1 });
        assert_eq!(doc.images[0], plain);
        assert_eq!(doc.images[1].rendered(), Some("light_x.png"));
    }

    #[test]
    fn rerun_overwrites_from_original() {
        let mut doc = ImageSet::new(vec![
            ImageDescriptor::annotated("img/diagram.png").with_rendered("img/diagram.png"),
        ]);

        update_images(&mut doc, Some(ColorScheme::Dark), &Fixed(ColorScheme::Dark));
        update_images(&mut doc, Some(ColorScheme::Dark), &Fixed(ColorScheme::Dark));
        assert_eq!(doc.images[0].rendered(), Some("img/dark_diagram.png"));

        update_images(&mut doc, Some(ColorScheme::Light), &Fixed(ColorScheme::Dark));
        assert_eq!(doc.images[0].rendered(), Some("img/light_diagram.png"));
    }

    #[test]
    fn empty_document_is_noop() {
        let mut doc = ImageSet::default();

        let stats = update_images(&mut doc, None, &Fixed(ColorScheme::Light));

        assert_eq!(stats, UpdateStats::default());
    }

    #[test]
    fn per_image_preference() {
        let mut doc = ImageSet::new(vec![
            ImageDescriptor::annotated("a.png").with_style_scheme(ColorScheme::Dark),
            ImageDescriptor::annotated("b.png"),
        ]);
        let pref = from_fn(|image: &ImageDescriptor| {
            image.style_scheme().unwrap_or(ColorScheme::Light)
        });

        update_images(&mut doc, None, &pref);

        assert_eq!(doc.images[0].rendered(), Some("dark_a.png"));
        assert_eq!(doc.images[1].rendered(), Some("light_b.png"));
    }
}
