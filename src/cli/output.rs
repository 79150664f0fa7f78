//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::Write;

use colored::Colorize;

use crate::infrastructure::{InfraError, InfraResult};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print section header (cyan bold)
pub fn header(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> InfraResult<()> {
    writeln!(out, "{}", msg.to_string().cyan().bold()).map_err(write_err)
}

/// Print plain line (no color, tree and data output)
pub fn info(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> InfraResult<()> {
    writeln!(out, "{}", msg).map_err(write_err)
}

/// Print created group (green +)
pub fn created(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> InfraResult<()> {
    writeln!(out, "  {} {}", "+".green(), msg).map_err(write_err)
}

/// Print reused group (blue =)
pub fn reused(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> InfraResult<()> {
    writeln!(out, "  {} {}", "=".blue(), msg).map_err(write_err)
}

/// Print destroyed group (red -)
pub fn destroyed(out: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> InfraResult<()> {
    writeln!(out, "  {} {}", "-".red(), msg).map_err(write_err)
}

fn write_err(e: std::io::Error) -> InfraError {
    InfraError::output("to stdout", e)
}
