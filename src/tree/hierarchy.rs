use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::graph::AdvisorTree;

/// Parent/child adjacency plus the canonical parent and cluster of every node.
///
/// Adjacency never changes after load, so preferred parents and clusters are
/// resolved once here and served from tables afterwards.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    root: usize,
    ids: Vec<String>,
    index_by_id: HashMap<String, usize>,
    depths: Vec<u32>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    preferred: Vec<Option<usize>>,
    clusters: Vec<usize>,
    max_depth: u32,
}

impl Hierarchy {
    pub fn new(tree: &AdvisorTree) -> Self {
        let node_count = tree.node_count();
        let mut parents = vec![Vec::new(); node_count];
        let mut children = vec![Vec::new(); node_count];
        for &(from, to) in &tree.edges {
            if !children[from].contains(&to) {
                children[from].push(to);
            }
            if !parents[to].contains(&from) {
                parents[to].push(from);
            }
        }

        let mut hierarchy = Self {
            root: tree.root_index(),
            ids: tree.nodes.iter().map(|node| node.id.clone()).collect(),
            index_by_id: tree
                .nodes
                .iter()
                .enumerate()
                .map(|(index, node)| (node.id.clone(), index))
                .collect(),
            depths: tree.nodes.iter().map(|node| node.depth).collect(),
            parents,
            children,
            preferred: Vec::new(),
            clusters: Vec::new(),
            max_depth: tree.nodes.iter().map(|node| node.depth).max().unwrap_or(0),
        };

        hierarchy.preferred = (0..node_count)
            .map(|index| hierarchy.resolve_preferred_parent(index))
            .collect();
        hierarchy.clusters = (0..node_count)
            .map(|index| hierarchy.resolve_cluster(index))
            .collect();
        hierarchy
    }

    fn resolve_preferred_parent(&self, index: usize) -> Option<usize> {
        if index == self.root {
            return None;
        }

        self.parents[index].iter().copied().min_by(|&a, &b| {
            self.depths[a]
                .cmp(&self.depths[b])
                .then_with(|| self.ids[a].cmp(&self.ids[b]))
        })
    }

    fn resolve_cluster(&self, index: usize) -> usize {
        if index == self.root {
            return self.root;
        }

        let mut visited = HashSet::from([index]);
        let mut cursor = index;
        loop {
            match self.preferred[cursor] {
                None => return self.root,
                Some(parent) if parent == self.root => return cursor,
                Some(parent) => {
                    if !visited.insert(parent) {
                        warn!(
                            node = %self.ids[index],
                            revisited = %self.ids[parent],
                            "preferred-parent cycle while resolving cluster, falling back to root"
                        );
                        return self.root;
                    }
                    cursor = parent;
                }
            }
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn depth(&self, index: usize) -> u32 {
        self.depths[index]
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn parents_of(&self, index: usize) -> &[usize] {
        &self.parents[index]
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    pub fn direct_children_of_root(&self) -> &[usize] {
        &self.children[self.root]
    }

    pub fn preferred_parent_index(&self, index: usize) -> Option<usize> {
        self.preferred[index]
    }

    pub fn cluster_index(&self, index: usize) -> usize {
        self.clusters[index]
    }

    pub fn preferred_parent(&self, id: &str) -> Option<&str> {
        let index = self.index_of(id)?;
        self.preferred[index].map(|parent| self.id(parent))
    }

    pub fn cluster_of(&self, id: &str) -> Option<&str> {
        let index = self.index_of(id)?;
        Some(self.id(self.clusters[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::{chain_tree, sample_tree, tree_from_json};

    #[test]
    fn sample_tree_adjacency() {
        let tree = sample_tree();
        let hierarchy = Hierarchy::new(&tree);
        let root = hierarchy.root();
        let a = hierarchy.index_of("A").unwrap();
        let c = hierarchy.index_of("C").unwrap();

        assert!(hierarchy.parents_of(root).is_empty());
        assert_eq!(hierarchy.children_of(a), &[c]);
        assert_eq!(hierarchy.direct_children_of_root().len(), 2);
        assert_eq!(hierarchy.max_depth(), 2);
    }

    #[test]
    fn preferred_parent_of_root_and_orphans_is_none() {
        let tree = tree_from_json(
            r#"{ "root": "R", "nodes": [{ "id": "R" }, { "id": "lonely", "depth": 3 }], "edges": [] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);
        assert_eq!(hierarchy.preferred_parent("R"), None);
        assert_eq!(hierarchy.preferred_parent("lonely"), None);
        assert_eq!(hierarchy.preferred_parent("missing"), None);
        assert_eq!(hierarchy.cluster_of("lonely"), Some("R"));
    }

    #[test]
    fn preferred_parent_takes_shallowest_then_smallest_id() {
        let tree = tree_from_json(
            r#"{ "root": "R",
                 "nodes": [{ "id": "R" }, { "id": "B", "depth": 1 }, { "id": "A", "depth": 1 },
                           { "id": "D", "depth": 2 }, { "id": "X", "depth": 3 }, { "id": "Y", "depth": 2 }],
                 "edges": [{ "from": "R", "to": "B" }, { "from": "R", "to": "A" },
                           { "from": "B", "to": "D" }, { "from": "D", "to": "X" },
                           { "from": "B", "to": "X" }, { "from": "B", "to": "Y" },
                           { "from": "A", "to": "Y" }] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);

        assert_eq!(hierarchy.preferred_parent("X"), Some("B"));
        assert_eq!(hierarchy.preferred_parent("Y"), Some("A"));
        assert_eq!(hierarchy.cluster_of("X"), Some("B"));
        assert_eq!(hierarchy.cluster_of("Y"), Some("A"));
    }

    #[test]
    fn preferred_parent_is_stable_across_builds() {
        let first = Hierarchy::new(&chain_tree(40));
        let second = Hierarchy::new(&chain_tree(40));
        for index in 0..first.len() {
            assert_eq!(
                first.preferred_parent_index(index),
                second.preferred_parent_index(index)
            );
        }
    }

    #[test]
    fn preferred_parent_walk_reaches_root_without_repeats() {
        let tree = chain_tree(60);
        let hierarchy = Hierarchy::new(&tree);
        let limit = hierarchy.max_depth() as usize + 1;

        for start in 0..hierarchy.len() {
            let mut seen = HashSet::from([start]);
            let mut cursor = start;
            let mut steps = 0;
            while let Some(parent) = hierarchy.preferred_parent_index(cursor) {
                assert!(seen.insert(parent), "cycle from {}", hierarchy.id(start));
                cursor = parent;
                steps += 1;
                assert!(steps <= limit);
            }
            assert_eq!(cursor, hierarchy.root());
        }
    }

    #[test]
    fn cluster_is_root_or_direct_child_and_idempotent() {
        let tree = chain_tree(60);
        let hierarchy = Hierarchy::new(&tree);
        let root = hierarchy.root();

        for index in 0..hierarchy.len() {
            let cluster = hierarchy.cluster_index(index);
            assert!(
                cluster == root || hierarchy.preferred_parent_index(cluster) == Some(root),
                "cluster of {} is {}",
                hierarchy.id(index),
                hierarchy.id(cluster)
            );
            assert_eq!(hierarchy.cluster_index(cluster), cluster);
        }
        assert_eq!(hierarchy.cluster_of("R"), Some("R"));
        assert_eq!(hierarchy.cluster_of("N001"), Some("N001"));
    }

    #[test]
    fn sample_clusters() {
        let hierarchy = Hierarchy::new(&sample_tree());
        assert_eq!(hierarchy.cluster_of("C"), Some("A"));
        assert_eq!(hierarchy.cluster_of("B"), Some("B"));
    }

    #[test]
    fn cycle_falls_back_to_root_cluster() {
        let tree = tree_from_json(
            r#"{ "root": "R",
                 "nodes": [{ "id": "R" }, { "id": "A", "depth": 1 },
                           { "id": "X", "depth": 2 }, { "id": "Y", "depth": 2 }],
                 "edges": [{ "from": "R", "to": "A" }, { "from": "X", "to": "Y" },
                           { "from": "Y", "to": "X" }] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);

        assert_eq!(hierarchy.preferred_parent("X"), Some("Y"));
        assert_eq!(hierarchy.cluster_of("X"), Some("R"));
        assert_eq!(hierarchy.cluster_of("Y"), Some("R"));
        assert_eq!(hierarchy.cluster_of("A"), Some("A"));
    }
}
