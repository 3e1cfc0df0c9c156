use eframe::egui::{Vec2, vec2};

use super::super::{Link, RenderNode};
use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Stand-in direction for coincident points so they separate deterministically.
fn jiggle(first: usize, second: usize) -> Vec2 {
    let angle =
        ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) alpha: f32,
}

fn charge_between(delta: Vec2, weight: f32, params: ChargeParams) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < MIN_DISTANCE_SQ {
        distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt().max(1e-6);
    }
    delta * (params.strength * weight * params.alpha / distance_sq)
}

/// Velocity change on `index` from every other node, with distant cells
/// collapsed to their centre of mass.
pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = positions[other_index] - point;
            if delta.length_sq() == 0.0 {
                delta = jiggle(index, other_index);
            }
            *velocity += charge_between(delta, 1.0, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance = delta.length().max(1e-3);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.mass > 1.0;

    if can_approximate {
        *velocity += charge_between(delta, node.mass, params);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    corrections: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let mut delta = predicted[from] - predicted[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    if distance_sq == 0.0 {
        delta = jiggle(from, to);
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * params.strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = if from_sq + to_sq > 0.0 {
        to_sq / (from_sq + to_sq)
    } else {
        0.5
    };

    corrections[from] += push * share;
    corrections[to] -= push * (1.0 - share);
}

/// Pairwise overlap resolution over two quadtree cells. Cells whose boxes are
/// farther apart than their largest radii could reach are skipped whole.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    corrections: &mut [Vec2],
) {
    let reach = node_a.max_radius + node_b.max_radius;
    if node_a.bounds.distance_sq_to(node_b.bounds) > reach * reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, predicted, radii, params, corrections);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, predicted, radii, params, corrections);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            accumulate_collision_pairs(
                child_a,
                child_a,
                true,
                predicted,
                radii,
                params,
                corrections,
            );

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a,
                    child_b,
                    false,
                    predicted,
                    radii,
                    params,
                    corrections,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(
                child,
                node_b,
                false,
                predicted,
                radii,
                params,
                corrections,
            );
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(
                node_a,
                child,
                false,
                predicted,
                radii,
                params,
                corrections,
            );
        }
    }
}

/// Spring each link toward its rest length, splitting the correction by degree
/// so hubs move less than leaves.
pub(super) fn apply_links(nodes: &mut [RenderNode], links: &[Link], strength: f32, alpha: f32) {
    for link in links {
        let (source, target) = (link.source, link.target);
        let source_next = nodes[source].world_pos + nodes[source].velocity;
        let target_next = nodes[target].world_pos + nodes[target].velocity;

        let mut delta = target_next - source_next;
        if delta.length_sq() == 0.0 {
            delta = jiggle(source, target);
        }
        let distance = delta.length();
        let correction = delta * ((distance - link.distance) / distance * alpha * strength);

        nodes[target].velocity -= correction * link.bias;
        nodes[source].velocity += correction * (1.0 - link.bias);
    }
}

/// Pull toward the ring `radius` away from `center`.
pub(super) fn radial_pull(
    position: Vec2,
    center: Vec2,
    radius: f32,
    strength: f32,
    alpha: f32,
) -> Vec2 {
    let delta = position - center;
    let distance = delta.length();
    if distance <= 1e-6 {
        return Vec2::ZERO;
    }
    delta * ((radius - distance) * strength * alpha / distance)
}
