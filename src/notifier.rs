//! Logging setup and progress UI.
//!
//! [`Notifier`] puts `env_logger` (text logs) and `indicatif` (spinners) under a single
//! verbosity switch:
//! - [`VerbosityLevel::Quiet`] → warnings only; waits show a live spinner on stderr.
//! - [`VerbosityLevel::Info`]/[`VerbosityLevel::Debug`]/[`VerbosityLevel::Trace`] → standard
//!   logs, and wait messages become log lines.
//!
//! stdout stays reserved for the command result (JSON or `--add-host` args).

use env_logger::Env;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerbosityLevel {
    Quiet = 0, // Spinners, warnings only
    Info = 1,  // Text logs at info level
    Debug = 2, // Text logs at debug level
    Trace = 3, // Text logs at trace level
}

impl From<u8> for VerbosityLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Info,
            2 => VerbosityLevel::Debug,
            _ => VerbosityLevel::Trace,
        }
    }
}

impl VerbosityLevel {
    fn to_log_level(self) -> LevelFilter {
        match self {
            VerbosityLevel::Quiet => LevelFilter::Warn,
            VerbosityLevel::Info => LevelFilter::Info,
            VerbosityLevel::Debug => LevelFilter::Debug,
            VerbosityLevel::Trace => LevelFilter::Trace,
        }
    }
}

pub struct Notifier {
    verbosity: VerbosityLevel,
    multi_progress: Option<MultiProgress>,
}

impl Notifier {
    pub fn new(verbosity_level: u8) -> Self {
        let verbosity = VerbosityLevel::from(verbosity_level);

        let multi_progress = if verbosity == VerbosityLevel::Quiet {
            Some(MultiProgress::new())
        } else {
            None
        };

        Self {
            verbosity,
            multi_progress,
        }
    }

    /// Installs the process-wide logger at this notifier's level. `RUST_LOG` can refine it.
    pub fn init_logger(&self) {
        let result = env_logger::Builder::from_env(Env::default())
            .filter_level(self.verbosity.to_log_level())
            .try_init();
        if result.is_err() {
            log::debug!("logger was already initialized");
        }
    }

    /// Starts a wait indicator. In Quiet mode this is a spinner, otherwise an info line.
    pub fn wait(&self, message: &str) -> Wait {
        match &self.multi_progress {
            Some(multi_progress) => {
                let spinner_style = ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed}] {msg}")
                    .unwrap();

                let spinner = multi_progress.add(ProgressBar::new_spinner());
                spinner.set_style(spinner_style);
                spinner.set_message(message.to_string());
                spinner.enable_steady_tick(Duration::from_millis(100));
                Wait {
                    spinner: Some(spinner),
                }
            }
            None => {
                info!("{}", message);
                Wait { spinner: None }
            }
        }
    }
}

/// A running wait indicator; the spinner disappears when dropped.
pub struct Wait {
    spinner: Option<ProgressBar>,
}

impl Wait {
    pub fn update(&self, message: &str) {
        match &self.spinner {
            Some(spinner) => spinner.set_message(message.to_string()),
            None => log::debug!("{}", message),
        }
    }
}

impl Drop for Wait {
    fn drop(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
