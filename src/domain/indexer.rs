//! Lookup of a previous displayed tree by unique id.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::domain::arena::{DisplayItem, DisplayedArena, GroupHandle};

/// Index every displayed group reachable from `previous_roots` by its unique id.
///
/// Leaf columns are skipped, only groups are reused across rebuilds. The
/// previous tree is read, never modified. No roots yields an empty map.
#[instrument(level = "debug", skip_all)]
pub fn index_tree(
    arena: &DisplayedArena,
    previous_roots: Option<&[DisplayItem]>,
) -> HashMap<String, GroupHandle> {
    let mut index = HashMap::new();
    let Some(roots) = previous_roots else {
        return index;
    };

    for (_, item) in arena.iter_tree(roots) {
        if let DisplayItem::Group(handle) = item {
            if let Some(group) = arena.get(*handle) {
                index.insert(group.unique_id().to_string(), *handle);
            }
        }
    }
    trace!(groups = index.len(), "indexed previous tree");
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::DisplayedGroup;
    use crate::domain::definitions::{ColumnDef, ColumnTree};
    use crate::domain::entities::ColumnId;

    #[test]
    fn test_missing_tree_gives_empty_index() {
        let arena = DisplayedArena::new();
        assert!(index_tree(&arena, None).is_empty());
        assert!(index_tree(&arena, Some(&[][..])).is_empty());
    }

    #[test]
    fn test_nested_groups_are_indexed_and_columns_skipped() {
        let tree = ColumnTree::from_defs(
            &[ColumnDef::group(
                "outer",
                vec![ColumnDef::group("inner", vec![ColumnDef::leaf("a")])],
            )],
            false,
        );
        let outer_def = tree.group_by_key("outer").unwrap();
        let inner_def = tree.group_by_key("inner").unwrap();

        let mut arena = DisplayedArena::new();
        let inner = arena.insert(DisplayedGroup::new(inner_def, 0, None));
        let outer = arena.insert(DisplayedGroup::new(outer_def, 0, None));
        arena
            .get_mut(inner)
            .unwrap()
            .add_child(DisplayItem::Column(ColumnId::from("a")));
        arena.get_mut(outer).unwrap().add_child(DisplayItem::Group(inner));
        let roots = vec![
            DisplayItem::Group(outer),
            DisplayItem::Column(ColumnId::from("outer_0")),
        ];

        let index = index_tree(&arena, Some(roots.as_slice()));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("outer_0"), Some(&outer));
        assert_eq!(index.get("inner_0"), Some(&inner));
    }
}
