//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::Pinned;

/// Build multi-level grid headers from column-group definitions
#[derive(Parser, Debug)]
#[command(name = "headertree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./.headertree.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the displayed header tree of every section
    Tree {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Build, apply the layout changes, rebuild and report group reuse
    Rebuild {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}

/// Definition file plus column-management changes.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Column definition file (TOML, default: definitions.path setting)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Hide a column
    #[arg(long = "hide", value_name = "COLUMN")]
    pub hide: Vec<String>,

    /// Show a column hidden by its definition
    #[arg(long = "show", value_name = "COLUMN")]
    pub show: Vec<String>,

    /// Pin a column: COLUMN=left|right|none
    #[arg(long = "pin", value_name = "COLUMN=SIDE", value_parser = parse_pin)]
    pub pin: Vec<(String, Option<Pinned>)>,

    /// Move a column to a position in the overall order: COLUMN=INDEX
    #[arg(long = "move", value_name = "COLUMN=INDEX", value_parser = parse_move)]
    pub moves: Vec<(String, usize)>,

    /// Do not pad shallow columns with filler groups
    #[arg(long)]
    pub no_balance: bool,
}

impl LayoutArgs {
    pub fn has_changes(&self) -> bool {
        !(self.hide.is_empty()
            && self.show.is_empty()
            && self.pin.is_empty()
            && self.moves.is_empty())
    }
}

fn split_assignment(s: &str) -> Result<(&str, &str), String> {
    s.split_once('=')
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))
}

fn parse_pin(s: &str) -> Result<(String, Option<Pinned>), String> {
    let (column, side) = split_assignment(s)?;
    let pinned = match side {
        "none" | "" => None,
        side => Some(side.parse::<Pinned>()?),
    };
    Ok((column.to_string(), pinned))
}

fn parse_move(s: &str) -> Result<(String, usize), String> {
    let (column, index) = split_assignment(s)?;
    let index = index
        .parse::<usize>()
        .map_err(|e| format!("invalid index '{}': {}", index, e))?;
    Ok((column.to_string(), index))
}
