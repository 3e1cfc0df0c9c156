mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::RenderGraph;
use super::clusters::ClusterAnchors;
use forces::{
    ChargeParams, CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_links, radial_pull,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct SimulationConfig {
    pub(in crate::app) link_strength: f32,
    pub(in crate::app) charge_strength: f32,
    pub(in crate::app) barnes_hut_theta: f32,
    pub(in crate::app) center_strength: f32,
    pub(in crate::app) collision_padding: f32,
    pub(in crate::app) collision_strength: f32,
    pub(in crate::app) radial_strength: f32,
    pub(in crate::app) radial_min_step: f32,
    pub(in crate::app) cluster_strength: f32,
    pub(in crate::app) root_cluster_strength: f32,
    pub(in crate::app) alpha_decay: f32,
    pub(in crate::app) alpha_min: f32,
    pub(in crate::app) velocity_decay: f32,
    pub(in crate::app) drag_alpha_target: f32,
    pub(in crate::app) reheat_alpha: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_strength: 0.9,
            charge_strength: -220.0,
            barnes_hut_theta: 0.9,
            center_strength: 0.05,
            collision_padding: 14.0,
            collision_strength: 1.2,
            radial_strength: 0.3,
            radial_min_step: 130.0,
            cluster_strength: 0.15,
            root_cluster_strength: 0.62,
            alpha_decay: 0.024,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            reheat_alpha: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum TickOutcome {
    Moved,
    /// Alpha just dropped below the floor; the engine is now paused.
    Stabilized,
    Idle,
}

/// Energy bookkeeping for the layout. Positions live in [`RenderGraph`].
pub(in crate::app) struct Simulation {
    config: SimulationConfig,
    alpha: f32,
    alpha_target: f32,
    running: bool,
}

impl Simulation {
    pub(in crate::app) fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
        }
    }

    #[cfg(test)]
    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub(in crate::app) fn is_running(&self) -> bool {
        self.running
    }

    /// Raises energy to at least the reheat level and resumes ticking.
    pub(in crate::app) fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.running = true;
    }

    pub(in crate::app) fn begin_drag(&mut self) {
        self.alpha_target = self.config.drag_alpha_target;
        self.running = true;
    }

    pub(in crate::app) fn end_drag(&mut self) {
        self.alpha_target = 0.0;
    }
}

/// Radius step between generations for the radial-by-depth ring.
pub(in crate::app) fn radial_step(viewport: Vec2, max_depth: u32, min_step: f32) -> f32 {
    let generations = (max_depth as f32 + 1.5).max(2.0);
    min_step.max(viewport.x.min(viewport.y) / generations)
}

pub(in crate::app) fn step_physics(
    cache: &mut RenderGraph,
    simulation: &mut Simulation,
    anchors: &ClusterAnchors,
    viewport: Vec2,
) -> TickOutcome {
    if !simulation.running || cache.nodes.is_empty() {
        return TickOutcome::Idle;
    }

    let config = simulation.config;
    simulation.alpha += (simulation.alpha_target - simulation.alpha) * config.alpha_decay;
    let alpha = simulation.alpha;
    let node_count = cache.nodes.len();

    apply_links(&mut cache.nodes, &cache.links, config.link_strength, alpha);

    let scratch = &mut cache.physics_scratch;
    scratch.positions.clear();
    scratch.predicted.clear();
    scratch.radii.clear();
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch.radii.push(node.radius + config.collision_padding);
    }

    if let Some(quadtree) = QuadNode::build(&scratch.positions, &scratch.radii) {
        let params = ChargeParams {
            strength: config.charge_strength,
            theta: config.barnes_hut_theta,
            alpha,
        };
        for (index, node) in cache.nodes.iter_mut().enumerate() {
            accumulate_charge_for_node(
                &quadtree,
                index,
                &scratch.positions,
                params,
                &mut node.velocity,
            );
        }
    }

    for node in &cache.nodes {
        scratch.predicted.push(node.world_pos + node.velocity);
    }
    scratch.corrections.clear();
    scratch.corrections.resize(node_count, Vec2::ZERO);
    if let Some(quadtree) = QuadNode::build(&scratch.predicted, &scratch.radii) {
        accumulate_collision_pairs(
            &quadtree,
            &quadtree,
            true,
            &scratch.predicted,
            &scratch.radii,
            CollisionParams {
                strength: config.collision_strength,
            },
            &mut scratch.corrections,
        );
    }

    let center = anchors.center();
    let step = radial_step(viewport, cache.max_depth, config.radial_min_step);
    for (index, node) in cache.nodes.iter_mut().enumerate() {
        node.velocity += scratch.corrections[index];
        node.velocity += radial_pull(
            node.world_pos,
            center,
            step * node.depth as f32,
            config.radial_strength,
            alpha,
        );

        let cluster_strength = if index == cache.root_index {
            config.root_cluster_strength
        } else {
            config.cluster_strength
        };
        node.velocity +=
            (anchors.anchor_for(node.cluster) - node.world_pos) * cluster_strength * alpha;
    }

    for node in &mut cache.nodes {
        if let Some(pin) = node.pin {
            node.world_pos = pin;
            node.velocity = Vec2::ZERO;
        } else {
            node.velocity *= 1.0 - config.velocity_decay;
            node.world_pos += node.velocity;
        }
    }

    let mut centroid = Vec2::ZERO;
    for node in &cache.nodes {
        centroid += node.world_pos;
    }
    centroid /= node_count as f32;
    let shift = (center - centroid) * config.center_strength;
    for node in cache.nodes.iter_mut().filter(|node| node.pin.is_none()) {
        node.world_pos += shift;
    }

    if simulation.alpha < config.alpha_min {
        simulation.running = false;
        return TickOutcome::Stabilized;
    }
    TickOutcome::Moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::clusters::compute_cluster_anchors;
    use crate::app::graph::build::build_render_graph;
    use crate::tree::fixtures::{chain_tree, sample_tree};
    use crate::tree::{AdvisorTree, Hierarchy};
    use eframe::egui::vec2;

    fn seeded(tree: &AdvisorTree, viewport: Vec2) -> (RenderGraph, ClusterAnchors) {
        let hierarchy = Hierarchy::new(tree);
        let mut graph = build_render_graph(tree, &hierarchy);
        let anchors = graph.cluster_anchors(&hierarchy, viewport);
        graph.seed_positions(&anchors, &hierarchy);
        (graph, anchors)
    }

    fn run_until_stable(
        graph: &mut RenderGraph,
        simulation: &mut Simulation,
        anchors: &ClusterAnchors,
        viewport: Vec2,
    ) -> usize {
        for tick in 0..2_000 {
            if step_physics(graph, simulation, anchors, viewport) == TickOutcome::Stabilized {
                return tick;
            }
        }
        panic!("simulation never stabilized");
    }

    #[test]
    fn radial_step_has_floor() {
        assert_eq!(radial_step(vec2(400.0, 300.0), 4, 130.0), 130.0);
        assert_eq!(radial_step(vec2(2000.0, 2000.0), 2, 130.0), 2000.0 / 3.5);
        assert_eq!(radial_step(vec2(1000.0, 1000.0), 0, 130.0), 500.0);
    }

    #[test]
    fn empty_graph_is_idle() {
        let tree = crate::tree::fixtures::tree_from_json(
            r#"{ "root": "R", "nodes": [{ "id": "R" }], "edges": [] }"#,
        );
        let hierarchy = Hierarchy::new(&tree);
        let mut graph = build_render_graph(&tree, &hierarchy);
        graph.nodes.clear();
        let anchors = compute_cluster_anchors(vec2(100.0, 100.0), &[], 0);
        let mut simulation = Simulation::new(SimulationConfig::default());

        assert_eq!(
            step_physics(&mut graph, &mut simulation, &anchors, vec2(100.0, 100.0)),
            TickOutcome::Idle
        );
    }

    #[test]
    fn single_node_stays_at_center() {
        let tree = crate::tree::fixtures::tree_from_json(
            r#"{ "root": "R", "nodes": [{ "id": "R" }], "edges": [] }"#,
        );
        let viewport = vec2(640.0, 480.0);
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());

        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);
        assert_eq!(graph.nodes[0].world_pos, vec2(320.0, 240.0));
    }

    #[test]
    fn decays_to_stabilized_once_then_idles() {
        let viewport = vec2(960.0, 720.0);
        let tree = sample_tree();
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());

        let ticks = run_until_stable(&mut graph, &mut simulation, &anchors, viewport);
        // ln(0.001) / ln(1 - 0.024) ~= 284
        assert!((250..320).contains(&ticks), "stabilized after {ticks} ticks");
        assert!(!simulation.is_running());
        assert_eq!(
            step_physics(&mut graph, &mut simulation, &anchors, viewport),
            TickOutcome::Idle
        );

        for node in &graph.nodes {
            assert!(node.world_pos.x.is_finite() && node.world_pos.y.is_finite());
        }
    }

    #[test]
    fn root_stays_pinned_and_nodes_do_not_overlap() {
        let viewport = vec2(1200.0, 900.0);
        let tree = chain_tree(40);
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());

        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);

        let root = graph.root_index;
        assert_eq!(graph.nodes[root].world_pos, viewport * 0.5);

        let mut overlapping = 0;
        for first in 0..graph.nodes.len() {
            for second in (first + 1)..graph.nodes.len() {
                let distance =
                    (graph.nodes[first].world_pos - graph.nodes[second].world_pos).length();
                if distance < (graph.nodes[first].radius + graph.nodes[second].radius) * 0.5 {
                    overlapping += 1;
                }
            }
        }
        assert_eq!(overlapping, 0);
    }

    #[test]
    fn clusters_separate_around_root() {
        let viewport = vec2(960.0, 720.0);
        let tree = sample_tree();
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());
        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);

        let a = graph.nodes[1].world_pos - viewport * 0.5;
        let b = graph.nodes[2].world_pos - viewport * 0.5;
        assert!(a.y < 0.0, "A settles toward its anchor above the root");
        assert!(b.y > 0.0, "B settles toward its anchor below the root");
    }

    #[test]
    fn drag_keeps_simulation_warm() {
        let viewport = vec2(960.0, 720.0);
        let tree = sample_tree();
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());
        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);

        simulation.begin_drag();
        for _ in 0..600 {
            assert_eq!(
                step_physics(&mut graph, &mut simulation, &anchors, viewport),
                TickOutcome::Moved
            );
        }
        assert!(simulation.alpha() > 0.25);

        simulation.end_drag();
        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);
    }

    #[test]
    fn reheat_resumes_paused_simulation() {
        let viewport = vec2(960.0, 720.0);
        let tree = sample_tree();
        let (mut graph, anchors) = seeded(&tree, viewport);
        let mut simulation = Simulation::new(SimulationConfig::default());
        run_until_stable(&mut graph, &mut simulation, &anchors, viewport);

        simulation.reheat();
        assert!(simulation.is_running());
        assert!(simulation.alpha() >= 0.3);
        assert_eq!(
            step_physics(&mut graph, &mut simulation, &anchors, viewport),
            TickOutcome::Moved
        );
    }
}
