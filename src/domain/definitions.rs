//! Column definitions and the provided (static) column tree built from them.
//!
//! The provided tree mirrors the user's nested group definitions. It is the
//! source of every leaf column's original parent and is immutable once built;
//! a definition reload produces a new tree with new group handles.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{
    Column, ColumnId, Pinned, ProvidedChild, ProvidedColumnGroup, ProvidedGroupId,
};

static NEXT_GROUP_ID: AtomicUsize = AtomicUsize::new(0);

fn next_group_id() -> ProvidedGroupId {
    ProvidedGroupId::from_raw(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
}

/// A column definition: either a group with children or a leaf column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnDef {
    Group(ColumnGroupDef),
    Leaf(LeafColumnDef),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroupDef {
    pub group_id: Option<String>,
    pub header_name: Option<String>,
    pub children: Vec<ColumnDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafColumnDef {
    pub col_id: Option<String>,
    pub field: Option<String>,
    pub header_name: Option<String>,
    pub pinned: Option<Pinned>,
    #[serde(default)]
    pub hide: bool,
}

impl LeafColumnDef {
    pub fn new(col_id: impl Into<String>) -> Self {
        Self {
            col_id: Some(col_id.into()),
            ..Self::default()
        }
    }

    pub fn pinned(mut self, pinned: Pinned) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }
}

impl From<LeafColumnDef> for ColumnDef {
    fn from(def: LeafColumnDef) -> Self {
        ColumnDef::Leaf(def)
    }
}

impl ColumnDef {
    pub fn leaf(col_id: impl Into<String>) -> Self {
        ColumnDef::Leaf(LeafColumnDef::new(col_id))
    }

    pub fn group(group_id: impl Into<String>, children: Vec<ColumnDef>) -> Self {
        ColumnDef::Group(ColumnGroupDef {
            group_id: Some(group_id.into()),
            header_name: None,
            children,
        })
    }
}

/// Creates keys that are unique within one definition set.
///
/// Explicit ids win over fields; a taken key gets `_1`, `_2`, ... appended.
/// Definitions with neither get the lowest free number.
#[derive(Debug, Default)]
pub struct ColumnKeyCreator {
    existing: HashSet<String>,
}

impl ColumnKeyCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unique_key(&mut self, id: Option<&str>, field: Option<&str>) -> String {
        let base = id
            .filter(|s| !s.is_empty())
            .or_else(|| field.filter(|s| !s.is_empty()));
        let mut count = 0usize;
        loop {
            let candidate = match base {
                Some(base) if count == 0 => base.to_string(),
                Some(base) => format!("{}_{}", base, count),
                None => count.to_string(),
            };
            if self.existing.insert(candidate.clone()) {
                return candidate;
            }
            count += 1;
        }
    }
}

/// The provided column tree of one definition set.
#[derive(Debug, Clone)]
pub struct ColumnTree {
    roots: Vec<ProvidedChild>,
    columns: Vec<Column>,
    column_index: HashMap<ColumnId, usize>,
    groups: HashMap<ProvidedGroupId, ProvidedColumnGroup>,
    depth: usize,
}

impl ColumnTree {
    /// Build the provided tree from nested definitions.
    ///
    /// With `balance`, every leaf shallower than the deepest one is wrapped
    /// in padding groups so all leaves sit at the same level and header rows
    /// line up.
    #[instrument(level = "debug", skip(defs))]
    pub fn from_defs(defs: &[ColumnDef], balance: bool) -> Self {
        let mut assembler = TreeAssembler::default();
        let mut roots = assembler.assemble(defs, None, 0);
        if balance {
            roots = assembler.balance(roots, None, 0);
        }

        let column_index = assembler
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.id.clone(), idx))
            .collect();

        debug!(
            columns = assembler.columns.len(),
            groups = assembler.groups.len(),
            depth = assembler.depth,
            "built column tree"
        );

        Self {
            roots,
            columns: assembler.columns,
            column_index,
            groups: assembler.groups,
            depth: assembler.depth,
        }
    }

    pub fn roots(&self) -> &[ProvidedChild] {
        &self.roots
    }

    /// All leaf columns in definition order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.column_index.get(id).map(|&idx| &self.columns[idx])
    }

    pub fn group(&self, id: ProvidedGroupId) -> Option<&ProvidedColumnGroup> {
        self.groups.get(&id)
    }

    pub fn group_by_key(&self, group_key: &str) -> Option<&ProvidedColumnGroup> {
        self.groups.values().find(|g| g.group_key == group_key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &ProvidedColumnGroup> {
        self.groups.values()
    }

    /// Number of group levels above the deepest leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Leaf columns beneath a group, in definition order.
    pub fn leaf_columns(&self, id: ProvidedGroupId) -> Vec<ColumnId> {
        let mut leaves = Vec::new();
        let mut stack = vec![ProvidedChild::Group(id)];
        while let Some(child) = stack.pop() {
            match child {
                ProvidedChild::Column(column_id) => leaves.push(column_id),
                ProvidedChild::Group(group_id) => {
                    if let Some(group) = self.groups.get(&group_id) {
                        // Push children in reverse order for left-to-right traversal
                        for child in group.children.iter().rev() {
                            stack.push(child.clone());
                        }
                    }
                }
            }
        }
        leaves
    }
}

#[derive(Default)]
struct TreeAssembler {
    keys: ColumnKeyCreator,
    columns: Vec<Column>,
    groups: HashMap<ProvidedGroupId, ProvidedColumnGroup>,
    depth: usize,
}

impl TreeAssembler {
    fn assemble(
        &mut self,
        defs: &[ColumnDef],
        parent: Option<ProvidedGroupId>,
        level: usize,
    ) -> Vec<ProvidedChild> {
        let mut children = Vec::with_capacity(defs.len());
        for def in defs {
            match def {
                ColumnDef::Group(group_def) => {
                    let id = next_group_id();
                    let group_key = self.keys.unique_key(group_def.group_id.as_deref(), None);
                    let group_children = self.assemble(&group_def.children, Some(id), level + 1);
                    self.groups.insert(
                        id,
                        ProvidedColumnGroup {
                            id,
                            group_key,
                            header_name: group_def.header_name.clone(),
                            original_parent: parent,
                            children: group_children,
                            level,
                            padding: false,
                        },
                    );
                    children.push(ProvidedChild::Group(id));
                }
                ColumnDef::Leaf(leaf_def) => {
                    let id = ColumnId::new(
                        self.keys
                            .unique_key(leaf_def.col_id.as_deref(), leaf_def.field.as_deref()),
                    );
                    self.depth = self.depth.max(level);
                    self.columns.push(Column {
                        id: id.clone(),
                        header_name: leaf_def.header_name.clone(),
                        original_parent: parent,
                        pinned: leaf_def.pinned,
                        hide: leaf_def.hide,
                    });
                    children.push(ProvidedChild::Column(id));
                }
            }
        }
        children
    }

    fn balance(
        &mut self,
        children: Vec<ProvidedChild>,
        parent: Option<ProvidedGroupId>,
        level: usize,
    ) -> Vec<ProvidedChild> {
        let mut balanced = Vec::with_capacity(children.len());
        for child in children {
            match child {
                ProvidedChild::Group(id) => {
                    let group_children = self
                        .groups
                        .get_mut(&id)
                        .map(|g| std::mem::take(&mut g.children))
                        .unwrap_or_default();
                    let group_children = self.balance(group_children, Some(id), level + 1);
                    if let Some(group) = self.groups.get_mut(&id) {
                        group.children = group_children;
                    }
                    balanced.push(ProvidedChild::Group(id));
                }
                ProvidedChild::Column(column_id) if level < self.depth => {
                    balanced.push(self.pad_column(column_id, parent, level));
                }
                column => balanced.push(column),
            }
        }
        balanced
    }

    /// Wrap a shallow column in a chain of padding groups down to the leaf level.
    fn pad_column(
        &mut self,
        column_id: ColumnId,
        parent: Option<ProvidedGroupId>,
        level: usize,
    ) -> ProvidedChild {
        let mut outermost = None;
        let mut innermost: Option<ProvidedGroupId> = None;
        for pad_level in level..self.depth {
            let id = next_group_id();
            let group_key = self.keys.unique_key(None, None);
            self.groups.insert(
                id,
                ProvidedColumnGroup {
                    id,
                    group_key,
                    header_name: None,
                    original_parent: innermost.or(parent),
                    children: Vec::new(),
                    level: pad_level,
                    padding: true,
                },
            );
            match innermost.and_then(|prev| self.groups.get_mut(&prev)) {
                Some(prev) => prev.children.push(ProvidedChild::Group(id)),
                None => outermost = Some(id),
            }
            innermost = Some(id);
        }

        if let Some(pad) = innermost.and_then(|id| self.groups.get_mut(&id)) {
            pad.children.push(ProvidedChild::Column(column_id.clone()));
        }
        if let Some(column) = self.columns.iter_mut().find(|c| c.id == column_id) {
            column.original_parent = innermost.or(parent);
        }

        outermost
            .map(ProvidedChild::Group)
            .unwrap_or(ProvidedChild::Column(column_id))
    }
}
