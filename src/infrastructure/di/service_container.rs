//! Service container for dependency injection
//!
//! Wires settings and the filesystem into the application services.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::{DefinitionService, HeaderService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::ColumnTree;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn definition_service(&self) -> DefinitionService {
        DefinitionService::new(Arc::clone(&self.fs))
    }

    /// Definition file to use: the explicit one, else `definitions.path` from settings.
    pub fn definitions_path(&self, explicit: Option<&Path>) -> ApplicationResult<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.settings.definitions.path.clone())
            .ok_or_else(|| ApplicationError::Config {
                message: "no definition file given and definitions.path not configured"
                    .to_string(),
            })
    }

    /// Load definitions, honoring the configured balancing.
    pub fn load_tree(&self, explicit: Option<&Path>, balance: bool) -> ApplicationResult<ColumnTree> {
        let path = self.definitions_path(explicit)?;
        self.definition_service()
            .load(&path, balance && self.settings.definitions.balance)
    }

    /// Header service over a column tree, configured from settings.
    pub fn header_service(&self, tree: ColumnTree) -> HeaderService {
        HeaderService::new(tree).with_max_passes(self.settings.builder.max_passes)
    }
}
