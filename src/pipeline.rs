use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Site;
use crate::error::{Error, Result};
use crate::html::{HtmlOptions, HtmlPage};
use crate::minify;
use crate::preference::{ElementStyle, Fixed, SchemePreference};
use crate::scheme::{ColorScheme, ThemeId};
use crate::switcher::ThemeSwitcher;
use crate::updater::UpdateStats;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// How images on every page are themed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Explicit scheme for every image.
    Scheme(ColorScheme),
    /// As if the theme's button had been clicked.
    Theme(ThemeId),
    /// The startup pass: each image follows the ambient preference.
    Ambient,
}

impl Selection {
    /// An explicit scheme wins over a theme; neither means ambient.
    pub fn from_site(site: &Site) -> Self {
        match (site.scheme, &site.theme) {
            (Some(scheme), _) => Selection::Scheme(scheme),
            (None, Some(theme)) => Selection::Theme(ThemeId::from(theme.as_str())),
            (None, None) => Selection::Ambient,
        }
    }

    /// Run this selection against a document.
    ///
    /// A theme is applied by clicking the page's button for it when the page
    /// has one.
    pub fn apply<D, P>(&self, switcher: &mut ThemeSwitcher<D, P>) -> UpdateStats
    where
        D: crate::document::Document,
        P: SchemePreference,
    {
        match self {
            Selection::Scheme(scheme) => switcher.apply(*scheme),
            Selection::Theme(theme) => {
                let button = switcher
                    .buttons()
                    .into_iter()
                    .find(|b| b.id == theme.as_str());
                match button {
                    Some(button) => switcher.click(&button),
                    None => switcher.select(theme),
                }
            }
            Selection::Ambient => switcher.start(),
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Scheme(scheme) => write!(f, "scheme {}", scheme),
            Selection::Theme(theme) => write!(f, "theme {} ({})", theme, theme.scheme()),
            Selection::Ambient => write!(f, "ambient"),
        }
    }
}

/// Stats from a build.
#[derive(Debug, Default)]
pub struct BuildStats {
    pub pages: usize,
    pub images: usize,
    pub themed: usize,
    pub copied: usize,
    pub removed: usize,
}

/// What happened to a single source file.
enum FileOutcome {
    Page(UpdateStats),
    Copied,
}

/// Themes every HTML page under the source directory into the build directory.
#[derive(Debug)]
pub struct Pipeline {
    /// Site configuration
    pub config: Site,

    /// Site directory (where the config file lives)
    pub site_dir: PathBuf,
}

impl Pipeline {
    pub fn load(site_dir: PathBuf, config: Site) -> Result<Self> {
        let source_dir = site_dir.join(&config.source);
        if !source_dir.is_dir() {
            return Err(Error::MissingSource { path: source_dir });
        }

        let pipeline = Self { config, site_dir };
        pipeline.check_layout()?;
        Ok(pipeline)
    }

    /// Refuse an output directory equal to or above the source directory:
    /// stale-file cleanup would delete the source pages.
    fn check_layout(&self) -> Result<()> {
        let source_dir = self.source_dir().canonicalize()?;
        let output_dir = absolute_dir(&self.output_dir())?;

        if source_dir.starts_with(&output_dir) {
            return Err(Error::OutputOverlapsSource {
                output_dir,
                source_dir,
            });
        }

        Ok(())
    }

    pub fn source_dir(&self) -> PathBuf {
        self.site_dir.join(&self.config.source)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.site_dir.join(&self.config.build)
    }

    /// Build the site to the output directory.
    pub fn build(&self) -> Result<BuildStats> {
        let source_dir = self.source_dir();
        let output_dir = self.output_dir();
        let selection = Selection::from_site(&self.config);
        // Only the ambient pass consults the preference; skip OS detection otherwise.
        let preference = match selection {
            Selection::Ambient => self.config.preference(),
            _ => ElementStyle::new(Fixed(self.config.fallback)),
        };
        let options = self.config.html_options();

        // Config fields are public; re-check before anything is deleted.
        self.check_layout()?;

        tracing::info!(
            source = %source_dir.display(),
            output = %output_dir.display(),
            %selection,
            "building site"
        );

        fs::create_dir_all(&output_dir)?;
        let output_dir = output_dir.canonicalize().unwrap_or(output_dir);

        let files = discover(&source_dir, &output_dir)?;
        tracing::debug!(files = files.len(), "discovered source files");

        let outcomes = files
            .par_iter()
            .map(|relative| {
                self.process_file(
                    &source_dir.join(relative),
                    &output_dir.join(relative),
                    &selection,
                    &preference,
                    &options,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stats = BuildStats::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Page(update) => {
                    stats.pages += 1;
                    stats.images += update.scanned;
                    stats.themed += update.updated;
                }
                FileOutcome::Copied => stats.copied += 1,
            }
        }

        let expected: HashSet<PathBuf> = files.iter().map(|f| output_dir.join(f)).collect();
        stats.removed = cleanup_stale_files(&output_dir, &expected)?;

        tracing::info!(
            pages = stats.pages,
            images = stats.images,
            themed = stats.themed,
            copied = stats.copied,
            removed = stats.removed,
            "site built"
        );

        Ok(stats)
    }

    fn process_file<P: SchemePreference>(
        &self,
        src: &Path,
        dest: &Path,
        selection: &Selection,
        preference: &P,
        options: &HtmlOptions,
    ) -> Result<FileOutcome> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        if !is_html(src) {
            fs::copy(src, dest)?;
            return Ok(FileOutcome::Copied);
        }

        let bytes = fs::read(src)?;
        let source = match String::from_utf8(bytes) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %src.display(), "page is not valid UTF-8, copying as-is");
                fs::write(dest, e.into_bytes())?;
                return Ok(FileOutcome::Copied);
            }
        };

        let (html, stats) = theme_page(source, selection, preference, options);
        let html = if self.config.minify {
            minify::html(&html)?
        } else {
            html
        };

        fs::write(dest, html)?;
        tracing::debug!(
            path = %src.display(),
            images = stats.scanned,
            themed = stats.updated,
            "themed page"
        );

        Ok(FileOutcome::Page(stats))
    }
}

/// Parse a page, apply the selection and render it back to HTML.
pub fn theme_page<P: SchemePreference>(
    source: String,
    selection: &Selection,
    preference: &P,
    options: &HtmlOptions,
) -> (String, UpdateStats) {
    let page = HtmlPage::parse(source, options);
    let mut switcher = ThemeSwitcher::new(page, preference);

    let stats = selection.apply(&mut switcher);

    (switcher.into_document().render(), stats)
}

/// Canonical form of a directory that may not exist yet: the deepest
/// existing ancestor is canonicalized and the rest appended.
fn absolute_dir(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)?;

    for ancestor in path.ancestors() {
        if let Ok(canonical) = ancestor.canonicalize() {
            let rest = path
                .strip_prefix(ancestor)
                .map_err(|e| Error::Other(e.to_string()))?;
            return Ok(canonical.join(rest));
        }
    }

    Ok(path)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| HTML_EXTENSIONS.iter().any(|h| e.eq_ignore_ascii_case(h)))
}

/// Source files relative to `source_dir`, skipping hidden entries and the
/// output directory when it is nested inside the source.
fn discover(source_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let hidden = entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'));
            let is_output = entry.file_type().is_dir()
                && entry
                    .path()
                    .canonicalize()
                    .is_ok_and(|p| p == output_dir);
            !hidden && !is_output
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| Error::Other(e.to_string()))?;
        files.push(relative.to_path_buf());
    }

    Ok(files)
}

/// Remove files from output directory that aren't in the expected set.
fn cleanup_stale_files(output_dir: &Path, expected: &HashSet<PathBuf>) -> Result<usize> {
    let mut removed = 0;
    cleanup_recursive(output_dir, expected, &mut removed)?;
    Ok(removed)
}

fn cleanup_recursive(dir: &Path, expected: &HashSet<PathBuf>, removed: &mut usize) -> Result<()> {
    let entries: Vec<_> = fs::read_dir(dir)?.collect::<std::result::Result<_, _>>()?;

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            cleanup_recursive(&path, expected, removed)?;

            if fs::read_dir(&path)?.next().is_none() {
                fs::remove_dir(&path)?;
                tracing::debug!(path = %path.display(), "removed empty directory");
            }
        } else if !expected.contains(&path) {
            fs::remove_file(&path)?;
            tracing::debug!(path = %path.display(), "removed stale file");
            *removed += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<img src="icons/logo.png" data-src="icons/logo.png">
<img src="photo.jpg">
<button id="light" class="theme">Light</button>
<button id="navy" class="theme">Navy</button>
</body></html>
"#;

    fn site(dir: &Path, config: &str) -> Pipeline {
        let book = dir.join("book");
        fs::create_dir_all(book.join("chapter")).unwrap();
        fs::write(book.join("index.html"), PAGE).unwrap();
        fs::write(book.join("chapter/intro.html"), PAGE).unwrap();
        fs::write(book.join("style.css"), "body { margin: 0 }").unwrap();
        fs::write(book.join(".hidden.html"), PAGE).unwrap();

        let config: Site = toml::from_str(config).unwrap();
        Pipeline::load(dir.to_path_buf(), config).unwrap()
    }

    #[test]
    fn selection_precedence() {
        let both: Site = toml::from_str("theme = \"navy\"\nscheme = \"light\"").unwrap();
        let theme: Site = toml::from_str("theme = \"rust\"").unwrap();

        assert_eq!(Selection::from_site(&both), Selection::Scheme(ColorScheme::Light));
        assert_eq!(Selection::from_site(&theme), Selection::Theme(ThemeId::Rust));
        assert_eq!(Selection::from_site(&Site::default()), Selection::Ambient);
    }

    #[test]
    fn ambient_page_uses_preference() {
        let (html, stats) = theme_page(
            PAGE.to_string(),
            &Selection::Ambient,
            &ElementStyle::new(Fixed(ColorScheme::Dark)),
            &HtmlOptions::default(),
        );

        assert_eq!(stats.updated, 1);
        assert!(html.contains(r#"<img src="icons/dark_logo.png" data-src="icons/logo.png">"#));
        assert!(html.contains(r#"<img src="photo.jpg">"#));
    }

    #[test]
    fn navy_theme_ignores_preference() {
        let (html, _) = theme_page(
            PAGE.to_string(),
            &Selection::Theme(ThemeId::Navy),
            &Fixed(ColorScheme::Light),
            &HtmlOptions::default(),
        );

        assert!(html.contains(r#"src="icons/dark_logo.png""#));
    }

    #[test]
    fn builds_site() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = site(dir.path(), "theme = \"coal\"");

        let stats = pipeline.build().unwrap();

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.images, 4);
        assert_eq!(stats.themed, 2);
        assert_eq!(stats.copied, 1);

        let dist = dir.path().join("dist");
        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        let intro = fs::read_to_string(dist.join("chapter/intro.html")).unwrap();
        assert!(index.contains(r#"src="icons/dark_logo.png""#));
        assert_eq!(index, intro);
        assert_eq!(
            fs::read_to_string(dist.join("style.css")).unwrap(),
            "body { margin: 0 }"
        );
        assert!(!dist.join(".hidden.html").exists());
    }

    #[test]
    fn rebuild_removes_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = site(dir.path(), "scheme = \"light\"");
        pipeline.build().unwrap();

        fs::remove_file(dir.path().join("book/chapter/intro.html")).unwrap();
        let stats = pipeline.build().unwrap();

        assert_eq!(stats.removed, 1);
        assert!(!dir.path().join("dist/chapter").exists());
        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(index.contains(r#"src="icons/light_logo.png""#));
    }

    #[test]
    fn output_inside_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = site(dir.path(), "build = \"book/out\"\nscheme = \"dark\"");

        pipeline.build().unwrap();
        let stats = pipeline.build().unwrap();

        assert_eq!(stats.pages, 2);
        assert!(!dir.path().join("book/out/out").exists());
    }

    #[test]
    fn theme_clicks_matching_button() {
        let page = PAGE.replace(r#"id="navy""#, r#"id="midnight""#);

        let (html, stats) = theme_page(
            page,
            &Selection::Theme(ThemeId::from("midnight")),
            &Fixed(ColorScheme::Light),
            &HtmlOptions::default(),
        );

        assert_eq!(stats.updated, 1);
        assert!(html.contains(r#"src="icons/dark_logo.png""#));
    }

    #[test]
    fn output_equal_to_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("book")).unwrap();
        fs::write(dir.path().join("book/index.html"), PAGE).unwrap();
        let config: Site = toml::from_str("build = \"book\"").unwrap();

        let result = Pipeline::load(dir.path().to_path_buf(), config);

        assert!(matches!(result, Err(Error::OutputOverlapsSource { .. })));
        assert!(dir.path().join("book/index.html").exists());
    }

    #[test]
    fn output_above_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("book")).unwrap();
        fs::write(dir.path().join("book/index.html"), PAGE).unwrap();
        fs::write(dir.path().join("themed-images.toml"), "build = \".\"").unwrap();
        let config: Site = toml::from_str("build = \".\"").unwrap();

        let result = Pipeline::load(dir.path().to_path_buf(), config);

        assert!(matches!(result, Err(Error::OutputOverlapsSource { .. })));
        assert!(dir.path().join("book/index.html").exists());
        assert!(dir.path().join("themed-images.toml").exists());
    }

    #[test]
    fn build_rechecks_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = site(dir.path(), "");
        pipeline.config.build = PathBuf::from("book/..");

        let result = pipeline.build();

        assert!(matches!(result, Err(Error::OutputOverlapsSource { .. })));
        assert!(dir.path().join("book/index.html").exists());
    }

    #[test]
    fn missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = Pipeline::load(dir.path().to_path_buf(), Site::default());

        assert!(matches!(result, Err(Error::MissingSource { .. })));
    }
}
