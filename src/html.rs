//! HTML pages as theming documents.
//!
//! Pages are scanned for `<html>`, `<img>` and `<button>` start tags with a
//! small tag lexer rather than a full parser, so that rendering can splice
//! new `src` values into the original text and leave every other byte alone.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, ImageDescriptor, ThemeButton};
use crate::scheme::{ColorScheme, ThemeId};

/// Named references understood in attribute values.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
];

/// Start tags of interest. Quoted values may contain `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(img|button|html)\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("valid tag pattern")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute pattern")
});

/// Which markup marks participating images and theme buttons.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Attribute holding an image's original source path.
    pub attribute: String,
    /// Class carried by theme-selector buttons.
    pub button_class: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            attribute: "data-src".to_string(),
            button_class: "theme".to_string(),
        }
    }
}

/// A parsed attribute with its byte span in the page.
#[derive(Debug)]
struct Attribute {
    name: String,
    value: Option<String>,
    span: Range<usize>,
}

#[derive(Debug)]
struct ImageTag {
    /// Byte offset just past the tag name, where a missing `src` is inserted.
    name_end: usize,
    /// Span of the existing `src` attribute, if any.
    src: Option<Range<usize>>,
    initial_src: Option<String>,
    descriptor: ImageDescriptor,
}

/// An HTML page whose images can be re-themed in place.
#[derive(Debug)]
pub struct HtmlPage {
    source: String,
    images: Vec<ImageTag>,
    buttons: Vec<ThemeButton>,
}

impl HtmlPage {
    pub fn parse(source: impl Into<String>, options: &HtmlOptions) -> Self {
        let source = source.into();
        let mut images = Vec::new();
        let mut buttons = Vec::new();
        // Scheme implied by the theme class on <html>, inherited by images.
        let mut page_scheme = None;

        for caps in TAG.captures_iter(&source) {
            let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let attrs = parse_attributes(body.as_str(), body.start());

            if name.as_str().eq_ignore_ascii_case("img") {
                images.push(image_tag(name.end(), &attrs, page_scheme, options));
            } else if name.as_str().eq_ignore_ascii_case("html") {
                page_scheme = root_theme_scheme(&attrs);
            } else if let Some(button) = theme_button(&attrs, options) {
                buttons.push(button);
            }
        }

        tracing::trace!(
            images = images.len(),
            buttons = buttons.len(),
            "parsed page"
        );

        Self {
            source,
            images,
            buttons,
        }
    }

    /// The page with rewritten `src` attributes on annotated images.
    ///
    /// Images whose rendered path did not change are copied verbatim.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;

        for tag in &self.images {
            let Some(rendered) = tag.descriptor.rendered() else {
                continue;
            };
            if tag.descriptor.original().is_none() || tag.initial_src.as_deref() == Some(rendered) {
                continue;
            }

            let attr = format!("src=\"{}\"", escape_attr(rendered));
            match &tag.src {
                Some(span) => {
                    out.push_str(&self.source[cursor..span.start]);
                    out.push_str(&attr);
                    cursor = span.end;
                }
                None => {
                    out.push_str(&self.source[cursor..tag.name_end]);
                    out.push(' ');
                    out.push_str(&attr);
                    cursor = tag.name_end;
                }
            }
        }

        out.push_str(&self.source[cursor..]);
        out
    }

    /// Descriptors of every image on the page, in document order.
    pub fn images(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.images.iter().map(|tag| &tag.descriptor)
    }
}

impl Document for HtmlPage {
    fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageDescriptor> {
        self.images.iter_mut().map(|tag| &mut tag.descriptor)
    }

    fn theme_buttons(&self) -> Vec<ThemeButton> {
        self.buttons.clone()
    }
}

fn parse_attributes(body: &str, offset: usize) -> Vec<Attribute> {
    ATTR.captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()));

            Some(Attribute {
                name,
                value,
                span: offset + whole.start()..offset + whole.end(),
            })
        })
        .collect()
}

fn find<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}

fn image_tag(
    name_end: usize,
    attrs: &[Attribute],
    page_scheme: Option<ColorScheme>,
    options: &HtmlOptions,
) -> ImageTag {
    let src = find(attrs, "src");
    let initial_src = src.and_then(|a| a.value.clone());
    let original = find(attrs, &options.attribute).map(|a| a.value.clone().unwrap_or_default());
    let style_scheme = find(attrs, "style")
        .and_then(|a| a.value.as_deref())
        .and_then(inline_color_scheme)
        .or(page_scheme);

    ImageTag {
        name_end,
        src: src.map(|a| a.span.clone()),
        initial_src: initial_src.clone(),
        descriptor: ImageDescriptor::from_parts(original, initial_src, style_scheme),
    }
}

fn theme_button(attrs: &[Attribute], options: &HtmlOptions) -> Option<ThemeButton> {
    let is_theme = find(attrs, "class")
        .and_then(|a| a.value.as_deref())
        .is_some_and(|class| {
            class
                .split_ascii_whitespace()
                .any(|c| c == options.button_class)
        });
    if !is_theme {
        return None;
    }

    let id = find(attrs, "id")?.value.as_deref()?;
    Some(ThemeButton::new(id))
}

/// Scheme of the first known theme named in the root element's classes.
///
/// Unknown classes (`js`, `sidebar-visible`) are skipped rather than read as
/// dark themes.
fn root_theme_scheme(attrs: &[Attribute]) -> Option<ColorScheme> {
    find(attrs, "class")?
        .value
        .as_deref()?
        .split_ascii_whitespace()
        .map(ThemeId::from)
        .find(|theme| !matches!(theme, ThemeId::Other(_)))
        .map(|theme| theme.scheme())
}

/// `color-scheme` declared in an inline style; the last declaration wins.
fn inline_color_scheme(style: &str) -> Option<ColorScheme> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(prop, _)| prop.trim().eq_ignore_ascii_case("color-scheme"))
        .last()
        .and_then(|(_, value)| ColorScheme::from_css(value))
}

/// Decode character references the way a browser reads attribute values.
///
/// Handles decimal and hex numeric references and a few named ones;
/// anything else, including references without `;`, stays literal.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .and_then(|semi| decode_reference(&rest[1..semi + 1]).map(|c| (c, semi + 2)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Character for a reference body (`#47`, `#x2F`, `amp`), without `&` and `;`.
fn decode_reference(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return Some(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{fffd}'));
    }

    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|&(_, c)| c)
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
