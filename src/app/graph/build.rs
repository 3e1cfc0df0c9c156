use eframe::egui::{Vec2, vec2};

use crate::tree::{AdvisorTree, Hierarchy};
use crate::util::{normalize, stable_pair};

use super::super::clusters::{ClusterAnchors, compute_cluster_anchors};
use super::super::render_utils::node_radius;
use super::super::{Link, PhysicsScratch, RenderGraph, RenderNode, ViewScratch};

const ROOT_LINK_DISTANCE: f32 = 220.0;
const CLUSTER_HEAD_LINK_DISTANCE: f32 = 160.0;
const BASE_LINK_DISTANCE: f32 = 90.0;
const LINK_DISTANCE_PER_DEPTH: f32 = 30.0;
const LINK_INFLUENCE_GROWTH: f32 = 0.6;

fn link_distance(
    hierarchy: &Hierarchy,
    source: usize,
    target: usize,
    source_influence: f32,
    max_influence: f32,
) -> f32 {
    let root = hierarchy.root();
    let base = if source == root {
        ROOT_LINK_DISTANCE
    } else if hierarchy.direct_children_of_root().contains(&source)
        && hierarchy.depth(target) > hierarchy.depth(source)
    {
        CLUSTER_HEAD_LINK_DISTANCE
    } else {
        BASE_LINK_DISTANCE + LINK_DISTANCE_PER_DEPTH * hierarchy.depth(target) as f32
    };

    base * (1.0 + LINK_INFLUENCE_GROWTH * normalize(source_influence, max_influence))
}

pub(in crate::app) fn build_render_graph(tree: &AdvisorTree, hierarchy: &Hierarchy) -> RenderGraph {
    let root_index = hierarchy.root();
    let max_descendants = tree
        .nodes
        .iter()
        .map(|node| node.total_descendants)
        .max()
        .unwrap_or(0);
    let max_influence = tree
        .nodes
        .iter()
        .map(|node| node.influence())
        .fold(0.0_f32, f32::max);
    let cluster_heads = hierarchy.direct_children_of_root();

    let nodes = tree
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let cluster = hierarchy.cluster_index(index);
            RenderNode {
                world_pos: Vec2::splat(f32::NAN),
                velocity: Vec2::ZERO,
                pin: None,
                radius: node_radius(
                    node.total_descendants,
                    node.direct_advisee_count,
                    max_descendants,
                    index == root_index,
                ),
                depth: node.depth,
                cluster,
                cluster_slot: cluster_heads
                    .iter()
                    .position(|&head| head == cluster)
                    .map_or(0, |slot| slot + 1),
                influence: node.influence(),
            }
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::new();
    for source in 0..hierarchy.len() {
        for &target in hierarchy.children_of(source) {
            edges.push((source, target));
        }
    }

    let mut degree = vec![0usize; nodes.len()];
    for &(source, target) in &edges {
        degree[source] += 1;
        degree[target] += 1;
    }

    let links = edges
        .iter()
        .map(|&(source, target)| Link {
            source,
            target,
            distance: link_distance(
                hierarchy,
                source,
                target,
                nodes[source].influence,
                max_influence,
            ),
            bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
        })
        .collect();

    RenderGraph {
        nodes,
        links,
        edges,
        root_index,
        max_depth: hierarchy.max_depth(),
        seeded: false,
        physics_scratch: PhysicsScratch::default(),
        view_scratch: ViewScratch::default(),
    }
}

impl RenderGraph {
    pub(in crate::app) fn cluster_anchors(
        &self,
        hierarchy: &Hierarchy,
        viewport: Vec2,
    ) -> ClusterAnchors {
        let heads = hierarchy
            .direct_children_of_root()
            .iter()
            .map(|&head| (head, self.nodes[head].influence))
            .collect::<Vec<_>>();
        compute_cluster_anchors(viewport, &heads, self.root_index)
    }

    /// First placement once the viewport is known: every node near its cluster
    /// anchor, spread further the deeper it sits, root pinned at the centre.
    pub(in crate::app) fn seed_positions(
        &mut self,
        anchors: &ClusterAnchors,
        hierarchy: &Hierarchy,
    ) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let (jx, jy) = stable_pair(hierarchy.id(index));
            let spread = 24.0 + 36.0 * node.depth as f32;
            node.world_pos = anchors.anchor_for(node.cluster) + vec2(jx, jy) * spread;
            node.velocity = Vec2::ZERO;
        }
        self.seeded = true;
        self.pin_root(anchors.center());
    }

    pub(in crate::app) fn pin_root(&mut self, center: Vec2) {
        if let Some(root) = self.nodes.get_mut(self.root_index) {
            root.pin = Some(center);
            root.world_pos = center;
            root.velocity = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn position(&self, index: usize) -> Option<Vec2> {
        let position = self.nodes.get(index)?.world_pos;
        (position.x.is_finite() && position.y.is_finite()).then_some(position)
    }
}
