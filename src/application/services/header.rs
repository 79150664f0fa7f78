//! Header service: keeps the displayed group trees of all sections current.
//!
//! Owns the provided column tree, the column-management state and the arena
//! of displayed groups. Every refresh rebuilds the left, right and center
//! sections against their previous trees, so unchanged groups keep their
//! handles, and sweeps groups that are no longer displayed.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::application::services::state::{ColumnState, Section};
use crate::application::ApplicationResult;
use crate::domain::{
    ColumnId, ColumnTree, DisplayItem, DisplayedArena, DisplayedGroup, DisplayedGroupBuilder,
    GroupHandle, GroupLifecycle, InstanceIdAllocator, DEFAULT_MAX_PASSES,
};

/// Unique ids touched by one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub created: Vec<String>,
    pub reused: Vec<String>,
    pub destroyed: Vec<String>,
}

pub struct HeaderService {
    tree: ColumnTree,
    state: ColumnState,
    arena: DisplayedArena,
    max_passes: usize,
    /// Roots per section, indexed by `Section::index`
    sections: [Vec<DisplayItem>; 3],
    leaf_parents: HashMap<ColumnId, GroupHandle>,
    /// Group lookup by unique id; column ids live apart and may collide with it
    displayed_groups: HashMap<String, GroupHandle>,
    shown_columns: HashSet<ColumnId>,
}

impl HeaderService {
    pub fn new(tree: ColumnTree) -> Self {
        let state = ColumnState::from_tree(&tree);
        Self {
            tree,
            state,
            arena: DisplayedArena::new(),
            max_passes: DEFAULT_MAX_PASSES,
            sections: Default::default(),
            leaf_parents: HashMap::new(),
            displayed_groups: HashMap::new(),
            shown_columns: HashSet::new(),
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn tree(&self) -> &ColumnTree {
        &self.tree
    }

    pub fn state(&self) -> &ColumnState {
        &self.state
    }

    /// Column-management state; changes take effect on the next refresh.
    pub fn state_mut(&mut self) -> &mut ColumnState {
        &mut self.state
    }

    pub fn arena(&self) -> &DisplayedArena {
        &self.arena
    }

    pub fn roots(&self, section: Section) -> &[DisplayItem] {
        &self.sections[section.index()]
    }

    pub fn group(&self, handle: GroupHandle) -> Option<&DisplayedGroup> {
        self.arena.get(handle)
    }

    /// Swap in reloaded column definitions.
    ///
    /// Displayed groups stay in the arena until the next refresh. Groups of
    /// the new tree get new provided handles, so old groups with colliding
    /// unique ids are not reused.
    pub fn reload(&mut self, tree: ColumnTree) {
        self.state.sync(&tree);
        self.tree = tree;
        debug!("column definitions reloaded");
    }

    /// Rebuild all sections and drop groups that are no longer displayed.
    ///
    /// One instance-id allocator spans the three sections, so the same group
    /// split across sections gets distinct unique ids. A failed build leaves
    /// the service as it was: groups constructed so far are removed again and
    /// reported as destroyed, reused groups get their previous content back.
    #[instrument(level = "debug", skip_all)]
    pub fn refresh(&mut self, lifecycle: &mut dyn GroupLifecycle) -> ApplicationResult<RefreshStats> {
        let snapshot: Vec<(GroupHandle, DisplayedGroup)> = self
            .arena
            .iter()
            .map(|(handle, group)| (handle, group.clone()))
            .collect();

        let built = self.build_sections(lifecycle);
        let (sections, leaf_parents, mut stats) = match built {
            Ok(built) => built,
            Err(e) => {
                self.roll_back(snapshot, lifecycle);
                return Err(e);
            }
        };

        let live: HashSet<GroupHandle> = sections
            .iter()
            .flat_map(|roots| self.arena.iter_tree(roots))
            .filter_map(|(_, item)| match item {
                DisplayItem::Group(handle) => Some(*handle),
                DisplayItem::Column(_) => None,
            })
            .collect();
        let unreferenced: Vec<GroupHandle> = self
            .arena
            .iter()
            .map(|(handle, _)| handle)
            .filter(|handle| !live.contains(handle))
            .collect();
        for handle in unreferenced {
            if let Some(group) = self.arena.remove(handle) {
                lifecycle.destroyed(handle, &group);
                stats.destroyed.push(group.unique_id().to_string());
            }
        }

        self.sections = sections;
        self.leaf_parents = leaf_parents;
        self.rebuild_displayed_maps();

        info!(
            created = stats.created.len(),
            reused = stats.reused.len(),
            destroyed = stats.destroyed.len(),
            "header refreshed"
        );
        Ok(stats)
    }

    fn build_sections(
        &mut self,
        lifecycle: &mut dyn GroupLifecycle,
    ) -> ApplicationResult<(
        [Vec<DisplayItem>; 3],
        HashMap<ColumnId, GroupHandle>,
        RefreshStats,
    )> {
        let builder = DisplayedGroupBuilder::new(&self.tree).with_max_passes(self.max_passes);
        let mut allocator = InstanceIdAllocator::new();
        let mut sections: [Vec<DisplayItem>; 3] = Default::default();
        let mut leaf_parents = HashMap::new();
        let mut stats = RefreshStats::default();

        for section in Section::BUILD_ORDER {
            let leaves = self.state.visible_sorted(section);
            let output = builder.create_displayed_groups(
                &leaves,
                &mut allocator,
                section.pinned(),
                Some(self.sections[section.index()].as_slice()),
                &mut self.arena,
                lifecycle,
            )?;

            for handle in &output.created {
                stats.created.push(self.arena.group(*handle)?.unique_id().to_string());
            }
            for handle in &output.reused {
                stats.reused.push(self.arena.group(*handle)?.unique_id().to_string());
            }
            leaf_parents.extend(output.leaf_parents);
            sections[section.index()] = output.roots;
        }
        Ok((sections, leaf_parents, stats))
    }

    /// Undo a partial build: drop groups missing from the snapshot and
    /// restore the content of the ones that were reset.
    fn roll_back(
        &mut self,
        snapshot: Vec<(GroupHandle, DisplayedGroup)>,
        lifecycle: &mut dyn GroupLifecycle,
    ) {
        let known: HashSet<GroupHandle> = snapshot.iter().map(|(handle, _)| *handle).collect();
        let constructed: Vec<GroupHandle> = self
            .arena
            .iter()
            .map(|(handle, _)| handle)
            .filter(|handle| !known.contains(handle))
            .collect();
        for handle in constructed {
            if let Some(group) = self.arena.remove(handle) {
                lifecycle.destroyed(handle, &group);
            }
        }
        for (handle, group) in snapshot {
            if let Some(slot) = self.arena.get_mut(handle) {
                *slot = group;
            }
        }
        warn!(groups = self.arena.len(), "refresh failed, previous header kept");
    }

    fn rebuild_displayed_maps(&mut self) {
        let mut groups = HashMap::new();
        let mut columns = HashSet::new();
        for section in Section::DISPLAY_ORDER {
            for (_, item) in self.arena.iter_tree(&self.sections[section.index()]) {
                match item {
                    DisplayItem::Column(id) => {
                        columns.insert(id.clone());
                    }
                    DisplayItem::Group(handle) => {
                        if let Some(group) = self.arena.get(*handle) {
                            groups.insert(group.unique_id().to_string(), *handle);
                        }
                    }
                }
            }
        }
        self.displayed_groups = groups;
        self.shown_columns = columns;
    }

    /// Displayed group by unique id (`{group_key}_{instance_id}`).
    pub fn displayed_group(&self, unique_id: &str) -> Option<GroupHandle> {
        self.displayed_groups.get(unique_id).copied()
    }

    pub fn is_column_displayed(&self, column: &ColumnId) -> bool {
        self.shown_columns.contains(column)
    }

    pub fn find_group(&self, group_key: &str, instance_id: u32) -> Option<GroupHandle> {
        self.displayed_group(&DisplayedGroup::create_unique_id(group_key, instance_id))
    }

    /// Displayed group directly above a column, `None` for top-level or hidden columns.
    pub fn leaf_parent(&self, column: &ColumnId) -> Option<GroupHandle> {
        self.leaf_parents.get(column).copied()
    }

    pub fn displayed_leaves(&self, handle: GroupHandle) -> &[ColumnId] {
        self.arena
            .get(handle)
            .map(DisplayedGroup::displayed_leaves)
            .unwrap_or(&[])
    }

    /// All displayed columns, left section first.
    pub fn displayed_columns(&self) -> Vec<ColumnId> {
        Section::DISPLAY_ORDER
            .iter()
            .flat_map(|section| self.arena.iter_tree(self.roots(*section)))
            .filter_map(|(_, item)| match item {
                DisplayItem::Column(id) => Some(id.clone()),
                DisplayItem::Group(_) => None,
            })
            .collect()
    }

    /// Header rows needed: one per group level plus the column row.
    pub fn header_row_count(&self) -> usize {
        if self.shown_columns.is_empty() && self.displayed_groups.is_empty() {
            return 0;
        }
        Section::DISPLAY_ORDER
            .iter()
            .map(|section| self.arena.group_depth(self.roots(*section)))
            .max()
            .unwrap_or(0)
            + 1
    }
}
