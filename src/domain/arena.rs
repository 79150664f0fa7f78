use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{ColumnId, Pinned, ProvidedColumnGroup, ProvidedGroupId};
use crate::domain::error::{DomainError, DomainResult};

/// Stable handle of a displayed group in the [`DisplayedArena`].
///
/// A handle survives rebuilds as long as the group is reused; once the group
/// is destroyed the generation check makes the handle resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(Index);

impl fmt::Display for GroupHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "{}v{}", slot, generation)
    }
}

/// Element of a displayed level: a leaf column or a displayed group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayItem {
    Column(ColumnId),
    Group(GroupHandle),
}

/// Runtime header group: one occurrence of a provided group in the displayed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedGroup {
    unique_id: String,
    provided: ProvidedGroupId,
    group_key: String,
    instance_id: u32,
    pinned: Option<Pinned>,
    padding: bool,
    children: Vec<DisplayItem>,
    parent: Option<GroupHandle>,
    /// Displayed leaf columns beneath this group, filled after parents are stamped
    displayed_leaves: Option<Vec<ColumnId>>,
}

impl DisplayedGroup {
    pub fn new(provided: &ProvidedColumnGroup, instance_id: u32, pinned: Option<Pinned>) -> Self {
        Self {
            unique_id: Self::create_unique_id(&provided.group_key, instance_id),
            provided: provided.id,
            group_key: provided.group_key.clone(),
            instance_id,
            pinned,
            padding: provided.padding,
            children: Vec::new(),
            parent: None,
            displayed_leaves: None,
        }
    }

    pub fn create_unique_id(group_key: &str, instance_id: u32) -> String {
        format!("{}_{}", group_key, instance_id)
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn provided(&self) -> ProvidedGroupId {
        self.provided
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub fn pinned(&self) -> Option<Pinned> {
        self.pinned
    }

    pub fn is_padding(&self) -> bool {
        self.padding
    }

    pub fn children(&self) -> &[DisplayItem] {
        &self.children
    }

    pub fn parent(&self) -> Option<GroupHandle> {
        self.parent
    }

    /// Displayed leaves beneath this group, empty until the tree has been stamped.
    pub fn displayed_leaves(&self) -> &[ColumnId] {
        self.displayed_leaves.as_deref().unwrap_or(&[])
    }

    pub fn add_child(&mut self, child: DisplayItem) {
        self.children.push(child);
        self.displayed_leaves = None;
    }

    /// Drop children and derived display state, keeping identity and binding.
    pub fn reset(&mut self) {
        self.children.clear();
        self.parent = None;
        self.displayed_leaves = None;
    }
}

/// Arena pool owning every displayed group across rebuilds.
#[derive(Debug, Default)]
pub struct DisplayedArena {
    arena: Arena<DisplayedGroup>,
}

impl DisplayedArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self, group), fields(unique_id = %group.unique_id))]
    pub fn insert(&mut self, group: DisplayedGroup) -> GroupHandle {
        GroupHandle(self.arena.insert(group))
    }

    pub fn get(&self, handle: GroupHandle) -> Option<&DisplayedGroup> {
        self.arena.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: GroupHandle) -> Option<&mut DisplayedGroup> {
        self.arena.get_mut(handle.0)
    }

    /// Like [`get`](Self::get) but reports a stale handle as an error.
    pub fn group(&self, handle: GroupHandle) -> DomainResult<&DisplayedGroup> {
        self.get(handle)
            .ok_or_else(|| DomainError::StaleHandle(handle.to_string()))
    }

    pub fn group_mut(&mut self, handle: GroupHandle) -> DomainResult<&mut DisplayedGroup> {
        self.arena
            .get_mut(handle.0)
            .ok_or_else(|| DomainError::StaleHandle(handle.to_string()))
    }

    pub fn remove(&mut self, handle: GroupHandle) -> Option<DisplayedGroup> {
        self.arena.remove(handle.0)
    }

    pub fn contains(&self, handle: GroupHandle) -> bool {
        self.arena.contains(handle.0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All live groups, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupHandle, &DisplayedGroup)> {
        self.arena.iter().map(|(idx, group)| (GroupHandle(idx), group))
    }

    /// Pre-order, left-to-right walk over a displayed tree given by its roots.
    pub fn iter_tree<'a>(&'a self, roots: &'a [DisplayItem]) -> TreeIterator<'a> {
        TreeIterator::new(self, roots)
    }

    /// Number of nested group levels in a displayed tree.
    #[instrument(level = "trace", skip(self, roots))]
    pub fn group_depth(&self, roots: &[DisplayItem]) -> usize {
        self.iter_tree(roots)
            .filter(|(_, item)| matches!(item, DisplayItem::Group(_)))
            .map(|(depth, _)| depth + 1)
            .max()
            .unwrap_or(0)
    }

    /// Set parent links top-down and refresh each group's displayed leaves.
    ///
    /// Roots get no parent. Returns the displayed parent of every leaf column
    /// that sits inside a group.
    #[instrument(level = "debug", skip(self, roots))]
    pub fn stamp_parents(
        &mut self,
        roots: &[DisplayItem],
    ) -> DomainResult<HashMap<ColumnId, GroupHandle>> {
        let mut leaf_parents = HashMap::new();
        let mut visit_order = Vec::new();
        let mut stack: Vec<(DisplayItem, Option<GroupHandle>)> =
            roots.iter().rev().map(|item| (item.clone(), None)).collect();

        while let Some((item, parent)) = stack.pop() {
            match item {
                DisplayItem::Column(column_id) => {
                    if let Some(parent) = parent {
                        leaf_parents.insert(column_id, parent);
                    }
                }
                DisplayItem::Group(handle) => {
                    let group = self.group_mut(handle)?;
                    group.parent = parent;
                    for child in group.children.iter().rev() {
                        stack.push((child.clone(), Some(handle)));
                    }
                    visit_order.push(handle);
                }
            }
        }

        // Reverse pre-order visits every child group before its parent
        for &handle in visit_order.iter().rev() {
            let mut leaves = Vec::new();
            for child in self.group(handle)?.children() {
                match child {
                    DisplayItem::Column(column_id) => leaves.push(column_id.clone()),
                    DisplayItem::Group(child) => {
                        leaves.extend_from_slice(self.group(*child)?.displayed_leaves())
                    }
                }
            }
            self.group_mut(handle)?.displayed_leaves = Some(leaves);
        }

        Ok(leaf_parents)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a DisplayedArena,
    stack: Vec<(usize, &'a DisplayItem)>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a DisplayedArena, roots: &'a [DisplayItem]) -> Self {
        let stack = roots.iter().rev().map(|item| (0, item)).collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    /// Depth below the roots and the item itself
    type Item = (usize, &'a DisplayItem);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, item) = self.stack.pop()?;
        if let DisplayItem::Group(handle) = item {
            if let Some(group) = self.arena.get(*handle) {
                // Push children in reverse order for left-to-right traversal
                for child in group.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
            }
        }
        Some((depth, item))
    }
}
