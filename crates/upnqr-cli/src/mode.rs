use std::io::{self, IsTerminal};

use clap::ValueEnum;

/// Value of the global `--output` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Auto,
    Json,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Operator,
    Agent,
}

/// `auto` picks agent mode whenever stdout is not a terminal.
pub fn resolve_mode(requested: OutputMode, stdout_is_terminal: bool) -> Mode {
    match requested {
        OutputMode::Json => Mode::Agent,
        OutputMode::Human => Mode::Operator,
        OutputMode::Auto if stdout_is_terminal => Mode::Operator,
        OutputMode::Auto => Mode::Agent,
    }
}

pub fn detect_mode(requested: OutputMode) -> Mode {
    resolve_mode(requested, io::stdout().is_terminal())
}
