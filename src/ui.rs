//! Stderr progress reporting for the dataset CLIs.
//!
//! Pretty mode draws an indicatif spinner per phase; plain mode prints
//! one line per phase so logs stay readable when output is piped.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

impl UiMode {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "plain" => UiMode::Plain,
            "pretty" => UiMode::Pretty,
            _ => UiMode::Auto,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    fn pretty(&self) -> bool {
        match self.mode {
            UiMode::Pretty => true,
            UiMode::Auto => self.is_tty,
            UiMode::Plain => false,
        }
    }

    /// Mark a phase of work. Finish it with [`Progress::done`] to report
    /// the outcome counts in place of the spinner.
    pub fn phase(&self, name: &str) -> Progress {
        if self.pretty() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message(format!("{name}…"));
            Progress { bar: Some(spinner) }
        } else {
            eprintln!("==> {}", name);
            Progress { bar: None }
        }
    }
}

pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    pub fn done(self, message: String) {
        match self.bar {
            Some(bar) => bar.finish_with_message(message),
            None => eprintln!("{message}"),
        }
    }
}
