use std::fmt::Write as _;

use eframe::egui::{Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, vec2};

use super::super::GraphSession;
use super::super::render_utils::{
    blend_color, circle_visible, cluster_color, dim_color, draw_background, edge_visible,
    screen_radius,
};
use super::interaction::pointing_at_node;

const LINEAGE_COLOR: Color32 = Color32::from_rgb(246, 206, 104);
const HOVER_COLOR: Color32 = Color32::from_rgb(241, 146, 94);
const SELECTED_COLOR: Color32 = Color32::from_rgb(255, 240, 200);
const NODE_OUTLINE: Color32 = Color32::from_rgba_premultiplied(14, 14, 14, 190);

impl GraphSession {
    /// One frame of the canvas: input, simulation, camera, then paint.
    pub(in crate::app) fn show_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let now = ui.input(|input| input.time);

        self.set_viewport(rect);
        for event in self.collect_graph_events(ui, &response) {
            self.dispatch(event, now);
        }
        let busy = self.advance(now);

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.camera.transform());

        if self.graph.seeded {
            self.update_screen_space();
            self.draw_edges(&painter, rect);
            self.draw_nodes(&painter, rect);
            self.draw_hover_caption(&painter, rect);
        }

        if self.hovered.is_some() || self.dragging.is_some() {
            pointing_at_node(ui);
        }
        if busy || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn update_screen_space(&mut self) {
        let transform = self.camera.transform();
        let origin = self.canvas_origin;
        let nodes = &self.graph.nodes;
        let scratch = &mut self.graph.view_scratch;

        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in nodes {
            scratch
                .screen_positions
                .push(transform.world_to_screen(origin, node.world_pos));
            scratch
                .screen_radii
                .push(screen_radius(node.radius, transform.scale));
        }

        // Small nodes first so hubs paint on top.
        if scratch.draw_order.len() != nodes.len() {
            scratch.draw_order.clear();
            scratch.draw_order.extend(0..nodes.len());
            scratch
                .draw_order
                .sort_by(|a, b| nodes[*a].influence.total_cmp(&nodes[*b].influence));
        }
    }

    fn draw_edges(&self, painter: &Painter, rect: Rect) {
        let zoom_sqrt = self.camera.transform().scale.sqrt();
        let scratch = &self.graph.view_scratch;
        let mut emphasised = Vec::new();

        for &(source, target) in &self.graph.edges {
            let start = scratch.screen_positions[source];
            let end = scratch.screen_positions[target];
            if !edge_visible(rect, start, end) {
                continue;
            }

            let flags = self.highlight.edge_flags((source, target));
            if flags.in_lineage || flags.in_hover {
                emphasised.push((start, end, flags.in_lineage));
                continue;
            }

            let (width, color) = if flags.muted() {
                (
                    (0.8 * zoom_sqrt).clamp(0.4, 1.8),
                    Color32::from_rgba_unmultiplied(80, 90, 104, 70),
                )
            } else {
                (
                    (1.2 * zoom_sqrt).clamp(0.6, 3.0),
                    Color32::from_rgba_unmultiplied(120, 128, 140, 160),
                )
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        for (start, end, lineage) in emphasised {
            let stroke = if lineage {
                Stroke::new((3.2 * zoom_sqrt).clamp(1.6, 5.6), LINEAGE_COLOR)
            } else {
                Stroke::new((2.4 * zoom_sqrt).clamp(1.2, 4.4), HOVER_COLOR)
            };
            painter.line_segment([start, end], stroke);
        }
    }

    fn draw_nodes(&self, painter: &Painter, rect: Rect) {
        let scale = self.camera.transform().scale;
        let scratch = &self.graph.view_scratch;

        for &index in &scratch.draw_order {
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let node = &self.graph.nodes[index];
            let flags = self.highlight.node_flags(index);
            let is_selected = self.selected == Some(index);
            let is_hovered = self.hovered == Some(index);
            let base = cluster_color(node.cluster_slot);

            let fill = if is_selected {
                SELECTED_COLOR
            } else if is_hovered {
                blend_color(base, HOVER_COLOR, 0.6)
            } else if flags.in_lineage {
                blend_color(base, LINEAGE_COLOR, 0.45)
            } else if flags.in_hover {
                blend_color(base, HOVER_COLOR, 0.3)
            } else if flags.muted() {
                dim_color(base, 0.35)
            } else {
                base
            };
            painter.circle_filled(position, radius, fill);

            let outline = if is_selected || flags.in_lineage {
                Stroke::new(2.2, LINEAGE_COLOR)
            } else if is_hovered {
                Stroke::new(1.8, HOVER_COLOR)
            } else {
                Stroke::new(1.0, NODE_OUTLINE)
            };
            painter.circle_stroke(position, radius, outline);

            let show_label = is_selected
                || is_hovered
                || flags.in_lineage
                || flags.in_hover
                || (!flags.muted() && (radius > 18.0 || scale > 1.6));
            if show_label {
                let text_color = if flags.muted() {
                    Color32::from_gray(150)
                } else {
                    Color32::from_gray(238)
                };
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    self.tree.nodes[index].display_name(),
                    FontId::proportional(12.0),
                    text_color,
                );
            }
        }
    }

    fn draw_hover_caption(&self, painter: &Painter, rect: Rect) {
        let Some(index) = self.hovered else {
            return;
        };

        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            self.hover_caption(index),
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }

    fn hover_caption(&self, index: usize) -> String {
        let node = &self.tree.nodes[index];
        let profile = &node.profile;
        let mut caption = format!(
            "{}  |  generation {}  |  {} advisees, {} descendants",
            node.display_name(),
            node.depth,
            node.direct_advisee_count,
            node.total_descendants
        );
        match (&profile.affiliation_name, &profile.affiliation_domain) {
            (Some(name), Some(domain)) => {
                let _ = write!(caption, "  |  {name} ({domain})");
            }
            (Some(name), None) | (None, Some(name)) => {
                let _ = write!(caption, "  |  {name}");
            }
            (None, None) => {}
        }

        if let Some(advisor) = self
            .hierarchy
            .preferred_parent(&node.id)
            .and_then(|id| self.tree.node(id))
        {
            let _ = write!(caption, "\nadvisor: {}", advisor.display_name());
            let others = self.hierarchy.parents_of(index).len().saturating_sub(1);
            if others > 0 {
                let _ = write!(caption, " (+{others} more)");
            }
        }
        if let Some(branch) = self
            .hierarchy
            .cluster_of(&node.id)
            .filter(|&id| id != self.tree.root_id)
            .and_then(|id| self.tree.node(id))
        {
            let _ = write!(caption, "  |  branch: {}", branch.display_name());
        }

        if let Some(research) = &profile.research_area_summary {
            let _ = write!(caption, "\nresearch: {research}");
        }
        if !profile.expertise_keywords.is_empty() {
            let _ = write!(caption, "\nkeywords: {}", profile.expertise_keywords.join(", "));
        }

        let links = [
            ("homepage", &profile.homepage),
            ("scholar", &profile.gscholar),
            ("dblp", &profile.dblp),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.as_ref().map(|url| format!("{label} {url}")))
        .collect::<Vec<_>>();
        if !links.is_empty() {
            let _ = write!(caption, "\n{}", links.join("  |  "));
        }

        caption
    }
}
