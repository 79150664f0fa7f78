//! headertree: multi-level grid headers from column-group definitions
//!
//! Builds the displayed column-group tree of each header section from the
//! visible, ordered leaf columns, reusing group instances across rebuilds.
//!
//! # Architecture
//!
//! - `domain`: provided column tree, displayed group arena and builder
//! - `application`: column state and the header service
//! - `infrastructure`: filesystem boundary and dependency wiring
//! - `cli`: argument parsing, command dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use application::services::{HeaderService, RefreshStats, Section};
pub use domain::{ColumnDef, ColumnTree, DisplayItem, DisplayedGroupBuilder, GroupHandle};
