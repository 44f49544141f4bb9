use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::Level;

use themed_images::config::Site;
use themed_images::pipeline::{Pipeline, Selection};
use themed_images::scheme::ColorScheme;
use themed_images::watch::{self, Overrides};
use themed_images::{ImageDescriptor, resolve};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = VERSION)]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
struct Args {
    /// Site directory (contains the config file and rendered pages)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    directory: PathBuf,

    /// Path to configuration file (relative to site directory)
    #[arg(short, long, default_value = "themed-images.toml", global = true)]
    config: PathBuf,

    /// Logging verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Theme to apply (light, rust, coal, navy, ayu, ...)
    #[arg(short, long, global = true)]
    theme: Option<String>,

    /// Explicit color scheme, overrides the theme
    #[arg(long, global = true, value_parser = parse_scheme)]
    scheme: Option<ColorScheme>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Theme the site (default if no command specified)
    Build,

    /// Watch for changes and rebuild automatically
    Watch {
        /// Debounce delay in seconds
        #[arg(long, default_value = "2")]
        debounce: u64,
    },

    /// Print the themed path for each original image path
    Resolve {
        /// Original image paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Delete the output directory
    Clean,
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }

    fn config_path(&self) -> PathBuf {
        self.directory.join(&self.config)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            theme: self.theme.clone(),
            scheme: self.scheme,
        }
    }
}

fn parse_scheme(s: &str) -> Result<ColorScheme, String> {
    s.parse().map_err(|e: themed_images::Error| e.to_string())
}

fn init_tracing(level: Level) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    #[cfg(distribute)]
    {
        fmt().json().with_env_filter(filter).init();
    }

    #[cfg(not(distribute))]
    {
        fmt()
            .pretty()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(args.log_level());

    tracing::debug!(?args, "parsed arguments");

    let config_path = args.config_path();
    let overrides = args.overrides();

    // Watch reloads the config itself on every rebuild
    if let Some(Command::Watch { debounce }) = args.command {
        watch::watch(
            args.directory,
            config_path,
            overrides,
            Duration::from_secs(debounce),
        )?;
        return Ok(());
    }

    tracing::debug!(path = %config_path.display(), "loading site config");
    let mut site = Site::load(&config_path)?;
    overrides.apply(&mut site);

    match args.command.unwrap_or(Command::Build) {
        Command::Build => {
            let pipeline = Pipeline::load(args.directory.clone(), site)?;
            pipeline.build()?;
            tracing::info!("build complete");
        }
        Command::Resolve { paths } => {
            let selection = Selection::from_site(&site);
            let explicit = match &selection {
                Selection::Scheme(scheme) => Some(*scheme),
                Selection::Theme(theme) => Some(theme.scheme()),
                Selection::Ambient => None,
            };
            let preference = site.preference();
            tracing::debug!(%selection, "resolving paths");

            for path in paths {
                let image = ImageDescriptor::annotated(path);
                if let Some(themed) = resolve(&image, explicit, &preference) {
                    println!("{}", themed);
                }
            }
        }
        Command::Watch { .. } => unreachable!("handled above"),
        Command::Clean => {
            let output_dir = args.directory.join(&site.build);
            if output_dir.exists() {
                std::fs::remove_dir_all(&output_dir)?;
                tracing::info!(path = %output_dir.display(), "cleaned output directory");
            } else {
                tracing::info!(path = %output_dir.display(), "output directory does not exist");
            }
        }
    }

    Ok(())
}
