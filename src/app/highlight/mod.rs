use std::collections::HashSet;

use crate::tree::Hierarchy;

mod hover;
mod lineage;

use self::hover::hover_neighborhood;
use self::lineage::lineage_of;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct HighlightSet {
    pub(in crate::app) nodes: HashSet<usize>,
    pub(in crate::app) edges: HashSet<(usize, usize)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct NodeFlags {
    pub(in crate::app) in_lineage: bool,
    pub(in crate::app) in_hover: bool,
    pub(in crate::app) lineage_muted: bool,
    pub(in crate::app) hover_muted: bool,
}

impl NodeFlags {
    pub(in crate::app) fn muted(self) -> bool {
        self.lineage_muted || self.hover_muted
    }
}

pub(in crate::app) type EdgeFlags = NodeFlags;

/// Lineage (follows selection) and hover (follows the pointer) overlays. Each is
/// rebuilt from scratch on change and neither touches the other.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct HighlightState {
    lineage: HighlightSet,
    hover: Option<HighlightSet>,
}

impl HighlightState {
    pub(in crate::app) fn set_selection(&mut self, hierarchy: &Hierarchy, selected: Option<usize>) {
        self.lineage = selected
            .map(|index| lineage_of(hierarchy, index))
            .unwrap_or_default();
    }

    pub(in crate::app) fn set_hover(&mut self, hierarchy: &Hierarchy, hovered: Option<usize>) {
        self.hover = hovered.map(|index| hover_neighborhood(hierarchy, index));
    }

    #[cfg(test)]
    pub(in crate::app) fn lineage(&self) -> &HighlightSet {
        &self.lineage
    }

    #[cfg(test)]
    pub(in crate::app) fn hover(&self) -> Option<&HighlightSet> {
        self.hover.as_ref()
    }

    fn lineage_mutes(&self) -> bool {
        self.lineage.nodes.len() > 1
    }

    #[cfg(test)]
    pub(in crate::app) fn is_active(&self) -> bool {
        self.lineage_mutes() || self.hover.is_some()
    }

    pub(in crate::app) fn node_flags(&self, index: usize) -> NodeFlags {
        let in_lineage = self.lineage.nodes.contains(&index);
        let in_hover = self
            .hover
            .as_ref()
            .is_some_and(|hover| hover.nodes.contains(&index));
        NodeFlags {
            in_lineage,
            in_hover,
            lineage_muted: self.lineage_mutes() && !in_lineage,
            hover_muted: self.hover.is_some() && !in_hover,
        }
    }

    pub(in crate::app) fn edge_flags(&self, edge: (usize, usize)) -> EdgeFlags {
        let in_lineage = self.lineage.edges.contains(&edge);
        let in_hover = self
            .hover
            .as_ref()
            .is_some_and(|hover| hover.edges.contains(&edge));
        EdgeFlags {
            in_lineage,
            in_hover,
            lineage_muted: self.lineage_mutes() && !in_lineage,
            hover_muted: self.hover.is_some() && !in_hover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::{chain_tree, sample_tree, tree_from_json};

    const R: usize = 0;
    const A: usize = 1;
    const B: usize = 2;
    const C: usize = 3;

    fn set(nodes: &[usize], edges: &[(usize, usize)]) -> HighlightSet {
        HighlightSet {
            nodes: nodes.iter().copied().collect(),
            edges: edges.iter().copied().collect(),
        }
    }

    #[test]
    fn lineage_of_leaf_climbs_to_root() {
        let hierarchy = Hierarchy::new(&sample_tree());
        assert_eq!(lineage_of(&hierarchy, C), set(&[C, A, R], &[(A, C), (R, A)]));
    }

    #[test]
    fn lineage_of_root_is_just_root() {
        let hierarchy = Hierarchy::new(&sample_tree());
        let mut state = HighlightState::default();
        state.set_selection(&hierarchy, Some(R));

        assert_eq!(state.lineage(), &set(&[R], &[]));
        assert!(!state.is_active());
        assert!(!state.node_flags(B).muted());
    }

    #[test]
    fn lineage_includes_root_for_orphans() {
        let tree = tree_from_json(
            r#"{ "root": "R", "nodes": [{ "id": "R" }, { "id": "O", "depth": 2 }], "edges": [] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);
        assert_eq!(lineage_of(&hierarchy, 1), set(&[1, 0], &[]));
    }

    #[test]
    fn lineage_stops_on_cycle() {
        let tree = tree_from_json(
            r#"{ "root": "R",
                 "nodes": [{ "id": "R" }, { "id": "X", "depth": 2 }, { "id": "Y", "depth": 2 }],
                 "edges": [{ "from": "X", "to": "Y" }, { "from": "Y", "to": "X" }] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);
        assert_eq!(lineage_of(&hierarchy, 1), set(&[1, 2, 0], &[(2, 1)]));
    }

    #[test]
    fn reselecting_restores_identical_lineage() {
        let hierarchy = Hierarchy::new(&chain_tree(50));
        let mut state = HighlightState::default();

        state.set_selection(&hierarchy, Some(37));
        let first = state.lineage().clone();
        state.set_selection(&hierarchy, Some(11));
        assert_ne!(state.lineage(), &first);
        state.set_selection(&hierarchy, Some(37));
        assert_eq!(state.lineage(), &first);
    }

    #[test]
    fn selection_mutes_everything_outside_lineage() {
        let hierarchy = Hierarchy::new(&sample_tree());
        let mut state = HighlightState::default();
        state.set_selection(&hierarchy, Some(C));

        assert!(state.node_flags(B).lineage_muted);
        assert!(!state.node_flags(A).muted());
        assert!(state.edge_flags((R, B)).lineage_muted);
        assert!(state.edge_flags((R, A)).in_lineage);

        state.set_selection(&hierarchy, None);
        assert!(!state.node_flags(B).muted());
        assert!(!state.is_active());
    }

    #[test]
    fn hover_covers_parent_and_all_children() {
        let hierarchy = Hierarchy::new(&sample_tree());
        assert_eq!(
            hover_neighborhood(&hierarchy, A),
            set(&[A, R, C], &[(R, A), (A, C)])
        );
        assert_eq!(
            hover_neighborhood(&hierarchy, R),
            set(&[R, A, B], &[(R, A), (R, B)])
        );
    }

    #[test]
    fn hover_of_leaf_has_no_children() {
        let hierarchy = Hierarchy::new(&sample_tree());
        assert_eq!(hover_neighborhood(&hierarchy, C), set(&[C, A], &[(A, C)]));
    }

    #[test]
    fn hover_and_lineage_are_independent() {
        let hierarchy = Hierarchy::new(&sample_tree());
        let mut state = HighlightState::default();
        state.set_selection(&hierarchy, Some(C));
        let lineage = state.lineage().clone();

        state.set_hover(&hierarchy, Some(B));
        assert_eq!(state.lineage(), &lineage);
        let c_flags = state.node_flags(C);
        assert!(c_flags.in_lineage && c_flags.hover_muted && !c_flags.lineage_muted);
        assert!(state.node_flags(B).in_hover);
        assert!(state.node_flags(B).lineage_muted);

        state.set_hover(&hierarchy, None);
        assert_eq!(state.lineage(), &lineage);
        assert!(state.hover().is_none());
        assert!(!state.node_flags(C).hover_muted);

        state.set_selection(&hierarchy, None);
        state.set_hover(&hierarchy, Some(C));
        assert!(state.node_flags(B).hover_muted);
        assert!(state.is_active());
    }
}
