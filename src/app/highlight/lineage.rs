use std::collections::HashSet;

use tracing::warn;

use crate::tree::Hierarchy;

use super::HighlightSet;

/// Preferred-parent chain from `selected` up to the root. The root is always a
/// member so it stays lit in every lineage view.
pub(super) fn lineage_of(hierarchy: &Hierarchy, selected: usize) -> HighlightSet {
    let mut set = HighlightSet::default();
    if selected >= hierarchy.len() {
        return set;
    }

    let mut visited = HashSet::from([selected]);
    set.nodes.insert(selected);

    let mut cursor = selected;
    while cursor != hierarchy.root() {
        let Some(parent) = hierarchy.preferred_parent_index(cursor) else {
            break;
        };
        if !visited.insert(parent) {
            warn!(
                node = %hierarchy.id(selected),
                revisited = %hierarchy.id(parent),
                "preferred-parent cycle while tracing lineage"
            );
            break;
        }

        set.edges.insert((parent, cursor));
        set.nodes.insert(parent);
        cursor = parent;
    }

    set.nodes.insert(hierarchy.root());
    set
}
