//! File system watcher for automatic rebuilds.
//!
//! Watches the source directory and config file and re-themes the site when
//! pages change. Events are debounced so a book re-render that touches many
//! files triggers a single rebuild.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::time::Duration;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Site;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Command line overrides re-applied on every rebuild.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub scheme: Option<crate::scheme::ColorScheme>,
}

impl Overrides {
    pub fn apply(&self, site: &mut Site) {
        if let Some(theme) = &self.theme {
            site.theme = Some(theme.clone());
        }
        if let Some(scheme) = self.scheme {
            site.scheme = Some(scheme);
        }
    }
}

/// Build once, then rebuild on every change. Blocks until the watcher stops.
pub fn watch(
    site_dir: PathBuf,
    config_path: PathBuf,
    overrides: Overrides,
    debounce: Duration,
) -> Result<()> {
    tracing::info!("performing initial build");
    if let Err(e) = do_build(&site_dir, &config_path, &overrides) {
        tracing::error!(error = %e, "initial build failed");
    }

    // Config is only read here to learn what to watch; rebuilds reload it.
    let site = load_site(&config_path, &overrides)?;
    let source_dir = site_dir.join(&site.source);
    // Canonicalize output_dir so it matches absolute paths from notify events
    let output_dir = site_dir
        .join(&site.build)
        .canonicalize()
        .unwrap_or_else(|_| site_dir.join(&site.build));

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default(),
    )?;

    tracing::info!(path = %source_dir.display(), "watching source directory");
    watcher.watch(&source_dir, RecursiveMode::Recursive)?;

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "watching config file");
        watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!(
        debounce_secs = debounce.as_secs(),
        "watch mode active, press Ctrl+C to stop"
    );

    let mut needs_rebuild = false;

    loop {
        match rx.recv_timeout(debounce) {
            Ok(event) => {
                let _span = tracing::debug_span!(
                    "file_event",
                    kind = ?event.kind,
                    paths = ?event.paths,
                )
                .entered();

                if should_ignore_event(&event, &output_dir) {
                    tracing::debug!("ignoring event (filtered)");
                    continue;
                }

                if !needs_rebuild {
                    tracing::info!(
                        "change detected, waiting {}s for more changes...",
                        debounce.as_secs()
                    );
                }
                needs_rebuild = true;
            }
            Err(RecvTimeoutError::Timeout) => {
                if needs_rebuild {
                    tracing::info!("rebuilding site...");

                    match do_build(&site_dir, &config_path, &overrides) {
                        Ok(()) => tracing::info!("build complete"),
                        Err(e) => tracing::error!(error = %e, "build failed"),
                    }

                    needs_rebuild = false;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("watcher disconnected, stopping");
                break;
            }
        }
    }

    Ok(())
}

fn load_site(config_path: &Path, overrides: &Overrides) -> Result<Site> {
    let mut site = Site::load(config_path)?;
    overrides.apply(&mut site);
    Ok(site)
}

/// Perform a single build of the site, reloading the config.
pub fn do_build(site_dir: &Path, config_path: &Path, overrides: &Overrides) -> Result<()> {
    let site = load_site(config_path, overrides)?;
    let pipeline = Pipeline::load(site_dir.to_path_buf(), site)?;
    pipeline.build()?;

    Ok(())
}

/// Check if an event should be ignored.
pub fn should_ignore_event(event: &notify::Event, output_dir: &Path) -> bool {
    use notify::EventKind;

    // Reads during the build would otherwise retrigger it
    match &event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        other => {
            tracing::trace!(kind = ?other, "ignoring: non-content event");
            return true;
        }
    }

    for path in &event.paths {
        if path.starts_with(output_dir) {
            tracing::trace!(path = %path.display(), "ignoring: in output directory");
            return true;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with('.')
        {
            tracing::trace!(path = %path.display(), "ignoring: hidden file");
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::ColorScheme;

    fn event(kind: notify::EventKind, path: &str) -> notify::Event {
        notify::Event {
            kind,
            paths: vec![PathBuf::from(path)],
            attrs: Default::default(),
        }
    }

    fn create() -> notify::EventKind {
        notify::EventKind::Create(notify::event::CreateKind::File)
    }

    #[test]
    fn ignores_hidden_files() {
        let output_dir = PathBuf::from("/site/dist");

        assert!(should_ignore_event(
            &event(create(), "/site/book/.index.html.swp"),
            &output_dir
        ));
    }

    #[test]
    fn ignores_output_dir() {
        let output_dir = PathBuf::from("/site/dist");

        assert!(should_ignore_event(
            &event(create(), "/site/dist/index.html"),
            &output_dir
        ));
    }

    #[test]
    fn keeps_page_changes() {
        let output_dir = PathBuf::from("/site/dist");

        assert!(!should_ignore_event(
            &event(create(), "/site/book/chapter_1.html"),
            &output_dir
        ));
    }

    #[test]
    fn ignores_access_events() {
        let output_dir = PathBuf::from("/site/dist");
        let kind = notify::EventKind::Access(notify::event::AccessKind::Read);

        assert!(should_ignore_event(
            &event(kind, "/site/book/index.html"),
            &output_dir
        ));
    }

    #[test]
    fn overrides_replace_config() {
        let mut site: Site = toml::from_str("theme = \"light\"").unwrap();
        let overrides = Overrides {
            theme: Some("ayu".to_string()),
            scheme: Some(ColorScheme::Dark),
        };

        overrides.apply(&mut site);

        assert_eq!(site.theme.as_deref(), Some("ayu"));
        assert_eq!(site.scheme, Some(ColorScheme::Dark));
    }

    #[test]
    fn do_build_reloads_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("book")).unwrap();
        std::fs::write(
            dir.path().join("book/index.html"),
            r#"<img data-src="img/a.png">"#,
        )
        .unwrap();
        let config_path = dir.path().join("themed-images.toml");
        std::fs::write(&config_path, "theme = \"rust\"").unwrap();

        do_build(dir.path(), &config_path, &Overrides::default()).unwrap();

        let out = std::fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(out, r#"<img src="img/light_a.png" data-src="img/a.png">"#);
    }
}
