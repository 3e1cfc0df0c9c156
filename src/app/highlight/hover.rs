use crate::tree::Hierarchy;

use super::HighlightSet;

/// One hop around `hovered`: its preferred parent and every direct advisee.
pub(super) fn hover_neighborhood(hierarchy: &Hierarchy, hovered: usize) -> HighlightSet {
    let mut set = HighlightSet::default();
    if hovered >= hierarchy.len() {
        return set;
    }

    set.nodes.insert(hovered);
    if let Some(parent) = hierarchy.preferred_parent_index(hovered) {
        set.nodes.insert(parent);
        set.edges.insert((parent, hovered));
    }

    for &child in hierarchy.children_of(hovered) {
        set.nodes.insert(child);
        set.edges.insert((hovered, child));
    }
    set
}
