//! Column-management state: display order, visibility and pinning.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::application::ApplicationResult;
use crate::domain::{ColumnId, ColumnTree, DisplayItem, DomainError, Pinned};

/// Horizontal header section; pinned columns live in their own sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Left,
    Center,
    Right,
}

impl Section {
    /// Order in which sections are rebuilt during a refresh.
    pub const BUILD_ORDER: [Section; 3] = [Section::Left, Section::Right, Section::Center];

    /// Order in which sections appear on screen.
    pub const DISPLAY_ORDER: [Section; 3] = [Section::Left, Section::Center, Section::Right];

    pub fn of(pinned: Option<Pinned>) -> Self {
        match pinned {
            Some(Pinned::Left) => Section::Left,
            Some(Pinned::Right) => Section::Right,
            None => Section::Center,
        }
    }

    pub fn pinned(self) -> Option<Pinned> {
        match self {
            Section::Left => Some(Pinned::Left),
            Section::Right => Some(Pinned::Right),
            Section::Center => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Section::Left => 0,
            Section::Center => 1,
            Section::Right => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Left => f.write_str("left"),
            Section::Center => f.write_str("center"),
            Section::Right => f.write_str("right"),
        }
    }
}

/// Which columns are shown, where, and in what order.
///
/// Supplies the sorted, section-partitioned visible leaves the builder consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnState {
    order: Vec<ColumnId>,
    hidden: HashSet<ColumnId>,
    pinned: HashMap<ColumnId, Pinned>,
}

impl ColumnState {
    /// Initial state: definition order, definition visibility and pinning.
    pub fn from_tree(tree: &ColumnTree) -> Self {
        let mut state = Self::default();
        state.sync(tree);
        state
    }

    pub fn order(&self) -> &[ColumnId] {
        &self.order
    }

    pub fn is_visible(&self, id: &ColumnId) -> bool {
        self.order.contains(id) && !self.hidden.contains(id)
    }

    pub fn pinned(&self, id: &ColumnId) -> Option<Pinned> {
        self.pinned.get(id).copied()
    }

    pub fn set_visible(&mut self, id: &ColumnId, visible: bool) -> ApplicationResult<()> {
        self.require(id)?;
        if visible {
            self.hidden.remove(id);
        } else {
            self.hidden.insert(id.clone());
        }
        debug!(column = %id, visible, "visibility changed");
        Ok(())
    }

    pub fn set_pinned(&mut self, id: &ColumnId, pinned: Option<Pinned>) -> ApplicationResult<()> {
        self.require(id)?;
        match pinned {
            Some(side) => self.pinned.insert(id.clone(), side),
            None => self.pinned.remove(id),
        };
        debug!(column = %id, ?pinned, "pinning changed");
        Ok(())
    }

    /// Move a column to `to_index` in the overall order, clamped to the last slot.
    pub fn move_column(&mut self, id: &ColumnId, to_index: usize) -> ApplicationResult<()> {
        let from = self
            .order
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| DomainError::UnknownColumn(id.to_string()))?;
        let column = self.order.remove(from);
        let to = to_index.min(self.order.len());
        self.order.insert(to, column);
        debug!(column = %id, from, to, "column moved");
        Ok(())
    }

    /// Visible columns of one section, in display order.
    pub fn visible_sorted(&self, section: Section) -> Vec<DisplayItem> {
        self.order
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .filter(|id| Section::of(self.pinned(id)) == section)
            .map(|id| DisplayItem::Column(id.clone()))
            .collect()
    }

    /// Align with a (re)loaded tree.
    ///
    /// Known columns keep their order and state, vanished ones are dropped,
    /// new ones are appended with their definition defaults.
    pub fn sync(&mut self, tree: &ColumnTree) {
        self.order.retain(|id| tree.column(id).is_some());
        self.hidden.retain(|id| tree.column(id).is_some());
        self.pinned.retain(|id, _| tree.column(id).is_some());

        for column in tree.columns() {
            if self.order.contains(&column.id) {
                continue;
            }
            self.order.push(column.id.clone());
            if column.hide {
                self.hidden.insert(column.id.clone());
            }
            if let Some(side) = column.pinned {
                self.pinned.insert(column.id.clone(), side);
            }
        }
    }

    fn require(&self, id: &ColumnId) -> ApplicationResult<()> {
        if self.order.contains(id) {
            Ok(())
        } else {
            Err(DomainError::UnknownColumn(id.to_string()).into())
        }
    }
}
