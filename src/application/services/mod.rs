//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod definitions;
mod header;
mod state;

pub use definitions::{DefinitionFile, DefinitionService};
pub use header::{HeaderService, RefreshStats};
pub use state::{ColumnState, Section};
