//! Builds the displayed group tree from an ordered list of visible columns.
//!
//! Grouping works level by level, bottom-up. Each pass splits the working
//! level into maximal contiguous runs of items sharing the same original
//! parent and wraps every run in one displayed group; the groups form the next
//! working level. Items without an original parent are final and go straight
//! to the top level, which is kept in screen order; they stay behind as
//! placeholders so later passes never merge the groups on either side of
//! them. Runs are contiguity based: two columns of the same group separated by
//! a foreign column end up in two separate group instances, at every level.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{DisplayItem, DisplayedArena, DisplayedGroup, GroupHandle};
use crate::domain::definitions::ColumnTree;
use crate::domain::entities::{ColumnId, Pinned, ProvidedGroupId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::indexer::index_tree;
use crate::domain::instance_id::InstanceIdAllocator;
use crate::domain::lifecycle::GroupLifecycle;

/// Default bound on grouping passes per build.
pub const DEFAULT_MAX_PASSES: usize = 64;

/// Result of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    /// Top-level items in display order
    pub roots: Vec<DisplayItem>,
    /// Displayed parent group of each grouped leaf column
    pub leaf_parents: HashMap<ColumnId, GroupHandle>,
    /// Groups constructed during this build
    pub created: Vec<GroupHandle>,
    /// Groups taken over from the previous tree
    pub reused: Vec<GroupHandle>,
}

/// Builds displayed group trees against one provided column tree.
pub struct DisplayedGroupBuilder<'a> {
    tree: &'a ColumnTree,
    max_passes: usize,
}

impl<'a> DisplayedGroupBuilder<'a> {
    pub fn new(tree: &'a ColumnTree) -> Self {
        Self {
            tree,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Bound the number of grouping passes; exceeding it means the group
    /// parents are cyclic.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Build the displayed tree for one pinned section.
    ///
    /// # Arguments
    /// * `sorted_visible` - Visible items of the section in display order
    /// * `allocator` - Instance numbering shared by all sections of one refresh
    /// * `pinned` - Section the new groups belong to
    /// * `old_roots` - Previous roots of the same section; matching groups are reused
    /// * `arena` - Pool owning old and new groups
    /// * `lifecycle` - Notified once per newly constructed group
    ///
    /// A group of the previous tree is reused when its unique id comes up
    /// again and it is still bound to the same provided group. Reused groups
    /// are reset and refilled; they keep their handle.
    #[instrument(level = "debug", skip_all, fields(pinned = ?pinned, items = sorted_visible.len()))]
    pub fn create_displayed_groups(
        &self,
        sorted_visible: &[DisplayItem],
        allocator: &mut InstanceIdAllocator,
        pinned: Option<Pinned>,
        old_roots: Option<&[DisplayItem]>,
        arena: &mut DisplayedArena,
        lifecycle: &mut dyn GroupLifecycle,
    ) -> DomainResult<BuildOutput> {
        let old_index = index_tree(arena, old_roots);
        let mut pass = BuildPass {
            allocator,
            arena,
            lifecycle,
            old_index,
            pinned,
            created: Vec::new(),
            reused: Vec::new(),
        };

        // Items carry the display position of their leftmost leaf so that
        // roots finalized in different passes end up in screen order.
        let mut top_level: Vec<(usize, DisplayItem)> = Vec::new();
        let mut current_level: Vec<Slot> = sorted_visible
            .iter()
            .cloned()
            .enumerate()
            .map(|(pos, item)| Slot::Pending(pos, item))
            .collect();
        let mut passes = 0;

        while current_level.iter().any(Slot::is_pending) {
            passes += 1;
            if passes > self.max_passes {
                return Err(DomainError::PassLimitExceeded {
                    limit: self.max_passes,
                });
            }

            let keyed = current_level
                .into_iter()
                .map(|slot| {
                    let key = match &slot {
                        Slot::Pending(_, item) => match self.original_parent(pass.arena, item)? {
                            Some(parent) => RunKey::Parent(parent),
                            None => RunKey::Final,
                        },
                        Slot::Placed => RunKey::Final,
                    };
                    Ok((key, slot))
                })
                .collect::<DomainResult<Vec<_>>>()?;

            let mut next_level = Vec::new();
            let runs = keyed.into_iter().chunk_by(|(key, _)| *key);
            for (key, run) in &runs {
                match key {
                    // Finalized items leave a placeholder behind, so groups on
                    // either side of them are never merged in later passes.
                    RunKey::Final => {
                        for (_, slot) in run {
                            if let Slot::Pending(pos, item) = slot {
                                top_level.push((pos, item));
                            }
                        }
                        next_level.push(Slot::Placed);
                    }
                    RunKey::Parent(parent) => {
                        let handle = pass.acquire_group(self.tree, parent)?;
                        let group = pass.arena.group_mut(handle)?;
                        let mut first_pos = None;
                        for (_, slot) in run {
                            if let Slot::Pending(pos, item) = slot {
                                first_pos.get_or_insert(pos);
                                group.add_child(item);
                            }
                        }
                        if let Some(pos) = first_pos {
                            next_level.push(Slot::Pending(pos, DisplayItem::Group(handle)));
                        }
                    }
                }
            }
            trace!(pass = passes, slots = next_level.len(), "grouping pass done");
            current_level = next_level;
        }

        top_level.sort_by_key(|(pos, _)| *pos);
        let top_level: Vec<DisplayItem> = top_level.into_iter().map(|(_, item)| item).collect();

        let leaf_parents = pass.arena.stamp_parents(&top_level)?;
        debug!(
            roots = top_level.len(),
            created = pass.created.len(),
            reused = pass.reused.len(),
            passes,
            "built displayed groups"
        );

        Ok(BuildOutput {
            roots: top_level,
            leaf_parents,
            created: pass.created,
            reused: pass.reused,
        })
    }

    /// The provided group an item belongs to; for a displayed group that is
    /// the parent of its own provided group.
    fn original_parent(
        &self,
        arena: &DisplayedArena,
        item: &DisplayItem,
    ) -> DomainResult<Option<ProvidedGroupId>> {
        match item {
            DisplayItem::Column(column_id) => self
                .tree
                .column(column_id)
                .map(|column| column.original_parent)
                .ok_or_else(|| DomainError::UnknownColumn(column_id.to_string())),
            DisplayItem::Group(handle) => {
                let provided = arena.group(*handle)?.provided();
                self.tree
                    .group(provided)
                    .map(|group| group.original_parent)
                    .ok_or_else(|| DomainError::UnknownGroup(provided.to_string()))
            }
        }
    }
}

/// Working-level entry during grouping.
enum Slot {
    /// Item still to be grouped, with the display position of its leftmost leaf
    Pending(usize, DisplayItem),
    /// Item already moved to the top level; splits runs around it
    Placed,
}

impl Slot {
    fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending(..))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKey {
    Final,
    Parent(ProvidedGroupId),
}

/// Mutable state of a single `create_displayed_groups` call.
struct BuildPass<'b> {
    allocator: &'b mut InstanceIdAllocator,
    arena: &'b mut DisplayedArena,
    lifecycle: &'b mut dyn GroupLifecycle,
    old_index: HashMap<String, GroupHandle>,
    pinned: Option<Pinned>,
    created: Vec<GroupHandle>,
    reused: Vec<GroupHandle>,
}

impl BuildPass<'_> {
    /// Reuse the matching group of the previous tree or construct a new one.
    fn acquire_group(
        &mut self,
        tree: &ColumnTree,
        parent: ProvidedGroupId,
    ) -> DomainResult<GroupHandle> {
        let provided = tree
            .group(parent)
            .ok_or_else(|| DomainError::UnknownGroup(parent.to_string()))?;
        let instance_id = self.allocator.next_instance_id(&provided.group_key);
        let unique_id = DisplayedGroup::create_unique_id(&provided.group_key, instance_id);

        if let Some(&handle) = self.old_index.get(&unique_id) {
            if let Some(existing) = self.arena.get_mut(handle) {
                if existing.provided() == parent {
                    existing.reset();
                    self.reused.push(handle);
                    trace!(%unique_id, "reusing displayed group");
                    return Ok(handle);
                }
                debug!(%unique_id, "previous group bound to other definition, not reused");
            }
        }

        let handle = self
            .arena
            .insert(DisplayedGroup::new(provided, instance_id, self.pinned));
        self.lifecycle.created(handle, self.arena.group(handle)?);
        self.created.push(handle);
        trace!(%unique_id, "created displayed group");
        Ok(handle)
    }
}
