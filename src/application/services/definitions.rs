//! Loading column definition files.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ColumnDef, ColumnTree};
use crate::infrastructure::traits::FileSystem;

/// On-disk layout of a definition file: a top-level `columns` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

/// Service for reading column definitions into provided column trees.
pub struct DefinitionService {
    fs: Arc<dyn FileSystem>,
}

impl DefinitionService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a TOML definition file.
    #[instrument(level = "debug", skip(self))]
    pub fn read(&self, path: &Path) -> ApplicationResult<DefinitionFile> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("definition file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Definition {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        let content =
            self.fs
                .read_to_string(path)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("read {}", path.display()),
                    source: Box::new(e),
                })?;
        let file: DefinitionFile =
            toml::from_str(&content).map_err(|e| ApplicationError::Definition {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!(columns = file.columns.len(), "read definition file");
        Ok(file)
    }

    /// Read a definition file and build its provided column tree.
    pub fn load(&self, path: &Path, balance: bool) -> ApplicationResult<ColumnTree> {
        let file = self.read(path)?;
        if file.columns.is_empty() {
            return Err(ApplicationError::Definition {
                path: path.to_path_buf(),
                message: "no columns defined".to_string(),
            });
        }
        Ok(ColumnTree::from_defs(&file.columns, balance))
    }
}
