//! Terminal UI implementation.

use super::output::OutputMode;
use super::theme::{should_use_colors, PreflightTheme};
use super::UserInterface;

/// Writes styled output to stdout and stderr.
///
/// Results and details go to stdout; warnings and errors go to stderr.
pub struct TerminalUI {
    mode: OutputMode,
    theme: PreflightTheme,
}

impl TerminalUI {
    /// Create a terminal UI, colored when stdout is a TTY and `NO_COLOR`
    /// is unset.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            PreflightTheme::new()
        } else {
            PreflightTheme::plain()
        };
        Self { mode, theme }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_details() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("{}", self.theme.format_success(msg));
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_details() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_details() {
            println!("{}", self.theme.format_header(title));
        }
    }

    fn raw(&mut self, text: &str) {
        println!("{}", text);
    }
}
