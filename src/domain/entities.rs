//! Domain entities: leaf columns and provided (definition-level) column groups

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique id of a leaf column within one definition set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Interned handle of a provided group.
///
/// Handles are allocated from a process-wide counter, so two groups compare
/// equal only if they are the same group of the same definition set. Groups
/// sharing a key across reloads never share a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProvidedGroupId(usize);

impl ProvidedGroupId {
    pub(crate) fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ProvidedGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pinned side of a column. `None` in an `Option<Pinned>` means the center section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    Left,
    Right,
}

impl fmt::Display for Pinned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pinned::Left => f.write_str("left"),
            Pinned::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Pinned {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Pinned::Left),
            "right" => Ok(Pinned::Right),
            other => Err(format!("invalid pinned side '{}': expected left or right", other)),
        }
    }
}

/// Runtime wrapper of a leaf column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub header_name: Option<String>,
    /// Group this column belongs to in the definition tree, `None` at top level
    pub original_parent: Option<ProvidedGroupId>,
    pub pinned: Option<Pinned>,
    /// Initial visibility from the definition
    pub hide: bool,
}

impl Column {
    pub fn display_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// Child slot of a provided group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvidedChild {
    Column(ColumnId),
    Group(ProvidedGroupId),
}

/// Static, definition-level column group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedColumnGroup {
    pub id: ProvidedGroupId,
    pub group_key: String,
    pub header_name: Option<String>,
    /// Enclosing group in the definition tree, `None` at top level
    pub original_parent: Option<ProvidedGroupId>,
    pub children: Vec<ProvidedChild>,
    /// Number of group ancestors
    pub level: usize,
    /// Inserted while balancing the tree, not part of the user definition
    pub padding: bool,
}

impl ProvidedColumnGroup {
    pub fn display_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(&self.group_key)
    }
}
