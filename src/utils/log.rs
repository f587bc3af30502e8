use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Set this to `1` to also write log records into a file beside the executable.
pub const LOG_FILE_ENV: &str = "TDM_LOG_FILE";

#[derive(Debug)]
pub struct Logger {
    to_file: bool,
    dispatcher_: fern::Dispatch,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        #[cfg(not(debug_assertions))]
        let level = LevelFilter::Info;
        #[cfg(debug_assertions)]
        let level = LevelFilter::Debug;

        Self {
            to_file: matches!(env::var(LOG_FILE_ENV).as_deref(), Ok("1")),
            dispatcher_: fern::Dispatch::new().level(level),
        }
    }
    /// Set verbose output, this will print `debug!` messages as well.
    pub fn verbose(mut self, v: bool) -> Self {
        if v {
            self.dispatcher_ = self.dispatcher_.level(LevelFilter::Debug);
        }
        self
    }
    /// Ignore most output, keep only the `error` messages.
    pub fn quiet(mut self, q: bool) -> Self {
        if q {
            self.dispatcher_ = self.dispatcher_.level(LevelFilter::Error);
        }
        self
    }

    /// Setup logger using [`log`] and [`fern`], this must be called first before
    /// any of the `info!`, `warn!`, `trace!`, `debug!`, `error!` macros.
    ///
    /// Errors go to `stderr`, everything else to `stdout`, so the log lines stay in order with
    /// the output of the build commands that share the same console.
    pub fn setup(self) -> Result<()> {
        let colors = ColoredLevelConfig::new()
            .info(Color::BrightBlue)
            .debug(Color::Magenta);
        let console = fern::Dispatch::new()
            .format(move |out, msg, rec| {
                out.finish(format_args!(
                    "{}: {msg}",
                    colors.color(rec.level()).to_string().to_lowercase(),
                ));
            })
            .chain(
                fern::Dispatch::new()
                    .filter(|meta| meta.level() > log::Level::Error)
                    .chain(io::stdout()),
            )
            .chain(
                fern::Dispatch::new()
                    .level(LevelFilter::Error)
                    .chain(io::stderr()),
            );

        let mut dispatcher = self.dispatcher_.chain(console);
        if self.to_file {
            let file_config = fern::Dispatch::new()
                .format(|out, msg, rec| {
                    out.finish(format_args!(
                        "[{} {}] {msg}",
                        Local::now().to_rfc3339(),
                        rec.target(),
                    ))
                })
                .chain(fern::log_file(log_file_path()?)?);
            dispatcher = dispatcher.chain(file_config);
        }

        dispatcher.apply()?;
        Ok(())
    }
}

static LOG_FILE_PATH: OnceLock<PathBuf> = OnceLock::new();
/// Get the path to log file to write.
///
/// The log directory sits beside current binary. If the path to current binary cannot be found,
/// a `log` dir is created in the current working dir instead.
///
/// # Error
///
/// Because this will attemp to create a directory named `log` to place the actual log file,
/// this function might fail if it cannot be created.
pub fn log_file_path() -> Result<&'static Path> {
    let mut log_dir = super::parent_dir_of_cur_exe().unwrap_or(PathBuf::from("."));
    log_dir.push("log");
    super::ensure_dir(&log_dir)?;

    let bin_name = super::lowercase_program_name().unwrap_or(env!("CARGO_PKG_NAME").to_string());

    Ok(LOG_FILE_PATH
        .get_or_init(|| log_dir.join(format!("{bin_name}-{}.log", Local::now().date_naive()))))
}
