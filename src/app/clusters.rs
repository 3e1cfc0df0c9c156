use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::util::normalize;

const ANCHOR_RING_FRACTION: f32 = 0.32;
const ANCHOR_INFLUENCE_GROWTH: f32 = 0.6;

/// Gravity points for each cluster, in world (viewport) coordinates.
#[derive(Clone, Debug, Default)]
pub(in crate::app) struct ClusterAnchors {
    center: Vec2,
    anchors: HashMap<usize, Vec2>,
}

impl ClusterAnchors {
    pub(in crate::app) fn center(&self) -> Vec2 {
        self.center
    }

    /// Unknown clusters gravitate to the viewport centre.
    pub(in crate::app) fn anchor_for(&self, cluster: usize) -> Vec2 {
        self.anchors.get(&cluster).copied().unwrap_or(self.center)
    }
}

/// Places the root at the centre and each direct child of the root on a ring,
/// pushed outward by its share of the largest influence among those children.
///
/// `direct_children` pairs each child index with its influence score.
pub(in crate::app) fn compute_cluster_anchors(
    viewport: Vec2,
    direct_children: &[(usize, f32)],
    root: usize,
) -> ClusterAnchors {
    let center = viewport * 0.5;
    let mut anchors = HashMap::with_capacity(direct_children.len() + 1);
    anchors.insert(root, center);

    let base_radius = viewport.x.min(viewport.y) * ANCHOR_RING_FRACTION;
    let max_influence = direct_children
        .iter()
        .map(|&(_, influence)| influence)
        .fold(0.0_f32, f32::max);
    let count = direct_children.len();

    for (slot, &(child, influence)) in direct_children.iter().enumerate() {
        let angle = (slot as f32 / count as f32) * TAU - (TAU / 4.0);
        let radius =
            base_radius * (1.0 + ANCHOR_INFLUENCE_GROWTH * normalize(influence, max_influence));
        anchors.insert(child, center + vec2(angle.cos(), angle.sin()) * radius);
    }

    ClusterAnchors { center, anchors }
}
