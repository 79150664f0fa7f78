//! Domain layer: column trees and the displayed group builder
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod definitions;
pub mod entities;
pub mod error;
pub mod indexer;
pub mod instance_id;
pub mod lifecycle;

pub use arena::{DisplayItem, DisplayedArena, DisplayedGroup, GroupHandle, TreeIterator};
pub use builder::{BuildOutput, DisplayedGroupBuilder, DEFAULT_MAX_PASSES};
pub use definitions::{ColumnDef, ColumnGroupDef, ColumnKeyCreator, ColumnTree, LeafColumnDef};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use indexer::index_tree;
pub use instance_id::InstanceIdAllocator;
pub use lifecycle::{GroupLifecycle, NoopLifecycle, RecordingLifecycle};

/// Expand `~` and `$VAR` / `${VAR}` in a path-like string, leaving it as-is on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
