//! Themed image path computation.

use crate::document::ImageDescriptor;
use crate::preference::SchemePreference;
use crate::scheme::ColorScheme;

/// Prefix the filename part of `original` with the scheme name.
///
/// The path is split at the last `/`; everything up to and including it is
/// kept as-is. Extensions are not inspected, so `a/b.tar.gz` becomes
/// `a/dark_b.tar.gz`. Applying this to an already themed path adds a second
/// prefix, so callers must always start from the original path.
pub fn themed_path(original: &str, scheme: ColorScheme) -> String {
    let (dir, filename) = match original.rfind('/') {
        Some(idx) => original.split_at(idx + 1),
        None => ("", original),
    };

    format!("{}{}_{}", dir, scheme, filename)
}

/// Themed path for a descriptor, or `None` if it carries no original path.
pub fn resolve<P>(
    image: &ImageDescriptor,
    explicit: Option<ColorScheme>,
    preference: &P,
) -> Option<String>
where
    P: SchemePreference + ?Sized,
{
    let original = image.original()?;
    let scheme = explicit.unwrap_or_else(|| preference.scheme_for(image));

    Some(themed_path(original, scheme))
}
