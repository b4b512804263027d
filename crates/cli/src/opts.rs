use clap::{Parser, ValueEnum};
use fuzz_utils_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// Global shell options.
#[derive(Clone, Copy, Debug, Default, Parser)]
pub struct ShellOptions {
    /// Use verbose output.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors.
    #[arg(long, short, global = true, alias = "silent", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log messages coloring.
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,
}

/// When to color the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color the output when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ShellOptions {
    /// The default log level, unless `RUST_LOG` says otherwise.
    pub fn level(self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => LevelFilter::DEBUG,
            (_, true) => LevelFilter::WARN,
            _ => LevelFilter::INFO,
        }
    }

    /// Sets up coloring and the global log subscriber.
    pub fn init(self) {
        crate::utils::enable_paint(self.color.unwrap_or_default());
        crate::utils::subscriber(self.level());
    }
}

/// Location of the config file.
#[derive(Clone, Debug, Default, Parser)]
pub struct ConfigOpts {
    /// Path to the config file. Defaults to `fuzz-utils.json` when it exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigOpts {
    /// The config file to read, if any.
    pub fn file(&self) -> Option<&Path> {
        match &self.config {
            Some(path) => Some(path),
            None => {
                let default = Path::new(Config::FILE_NAME);
                default.is_file().then_some(default)
            }
        }
    }
}
