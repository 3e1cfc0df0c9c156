use eframe::egui::{self, Key, PointerButton, Pos2, Response, Ui, Vec2};

use super::super::GraphSession;
use super::super::render_utils::screen_radius;
use super::super::session::{FIT_MAX_SCALE, FIT_PADDING, ROOT_FOCUS_SCALE, SelectOptions};

const SCROLL_ZOOM_RATE: f32 = 0.0018;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum GraphKey {
    ClearSelection,
    FitAll,
    FocusRoot,
}

/// Canvas input after hit testing. Pointer positions are in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum GraphEvent {
    NodeClicked(usize),
    BackgroundClicked,
    Hover(Option<usize>),
    DragStarted { node: usize, pointer: Pos2 },
    DragMoved { node: usize, pointer: Pos2 },
    DragEnded { node: usize },
    Pan(Vec2),
    Zoom { pointer: Pos2, factor: f32 },
    Key(GraphKey),
}

impl GraphSession {
    /// Topmost node under `pointer`, nearest centre first.
    pub(in crate::app) fn node_at(&self, pointer: Pos2) -> Option<usize> {
        let transform = self.camera.transform();
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let world = self.graph.position(index)?;
                let screen = transform.world_to_screen(self.canvas_origin, world);
                let distance = screen.distance(pointer);
                (distance <= screen_radius(node.radius, transform.scale))
                    .then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn collect_graph_events(
        &self,
        ui: &Ui,
        response: &Response,
    ) -> Vec<GraphEvent> {
        let mut events = Vec::new();
        let hover_pos = response.hover_pos();

        if self.dragging.is_none() {
            let target = hover_pos.and_then(|pointer| self.node_at(pointer));
            if target != self.hovered {
                events.push(GraphEvent::Hover(target));
            }
        }

        if let Some(node) = self.dragging {
            if response.dragged_by(PointerButton::Primary) {
                if let Some(pointer) = response.interact_pointer_pos() {
                    events.push(GraphEvent::DragMoved { node, pointer });
                }
            } else {
                events.push(GraphEvent::DragEnded { node });
            }
        } else if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(node) = self.node_at(origin)
        {
            let pointer = response.interact_pointer_pos().unwrap_or(origin);
            events.push(GraphEvent::DragStarted { node, pointer });
        } else if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                events.push(GraphEvent::Pan(delta));
            }
        }

        if response.clicked_by(PointerButton::Primary) {
            let target = response
                .interact_pointer_pos()
                .and_then(|pointer| self.node_at(pointer));
            events.push(match target {
                Some(node) => GraphEvent::NodeClicked(node),
                None => GraphEvent::BackgroundClicked,
            });
        }

        if response.hovered()
            && let Some(pointer) = hover_pos
        {
            let (scroll, pinch) =
                ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
            if scroll.abs() > f32::EPSILON {
                let factor = (1.0 + (scroll * SCROLL_ZOOM_RATE)).clamp(0.85, 1.15);
                events.push(GraphEvent::Zoom { pointer, factor });
            }
            if (pinch - 1.0).abs() > f32::EPSILON {
                events.push(GraphEvent::Zoom {
                    pointer,
                    factor: pinch,
                });
            }
        }

        if !ui.ctx().wants_keyboard_input() {
            ui.input(|input| {
                for (key, action) in [
                    (Key::Escape, GraphKey::ClearSelection),
                    (Key::F, GraphKey::FitAll),
                    (Key::R, GraphKey::FocusRoot),
                ] {
                    if input.key_pressed(key) {
                        events.push(GraphEvent::Key(action));
                    }
                }
            });
        }

        events
    }

    pub(in crate::app) fn dispatch(&mut self, event: GraphEvent, now: f64) {
        match event {
            GraphEvent::NodeClicked(node) => {
                self.select_index(Some(node), SelectOptions { focus: true }, now);
            }
            GraphEvent::BackgroundClicked | GraphEvent::Key(GraphKey::ClearSelection) => {
                self.select_index(None, SelectOptions::default(), now);
            }
            GraphEvent::Hover(target) => self.set_hover(target),
            GraphEvent::DragStarted { node, pointer } => {
                self.dragging = Some(node);
                self.pin_to_pointer(node, pointer);
                self.simulation.begin_drag();
                self.simulation.reheat();
            }
            GraphEvent::DragMoved { node, pointer } => {
                if self.dragging == Some(node) {
                    self.pin_to_pointer(node, pointer);
                }
            }
            GraphEvent::DragEnded { node } => self.release_drag(node),
            GraphEvent::Pan(delta) => self.camera.pan_by(delta),
            GraphEvent::Zoom { pointer, factor } => {
                self.camera.zoom_at(pointer - self.canvas_origin, factor);
            }
            GraphEvent::Key(GraphKey::FitAll) => {
                self.fit_all_bounds(FIT_PADDING, FIT_MAX_SCALE, now);
            }
            GraphEvent::Key(GraphKey::FocusRoot) => {
                self.focus_node(self.graph.root_index, ROOT_FOCUS_SCALE, now);
            }
        }
    }

    fn pin_to_pointer(&mut self, node: usize, pointer: Pos2) {
        let world = self
            .camera
            .transform()
            .screen_to_world(self.canvas_origin, pointer);
        if let Some(render_node) = self.graph.nodes.get_mut(node) {
            render_node.pin = Some(world);
            render_node.world_pos = world;
            render_node.velocity = Vec2::ZERO;
        }
    }

    fn release_drag(&mut self, node: usize) {
        if self.dragging == Some(node) {
            self.dragging = None;
        }

        if node == self.graph.root_index {
            self.graph.pin_root(self.anchors.center());
        } else if let Some(render_node) = self.graph.nodes.get_mut(node) {
            render_node.pin = None;
        }
        self.simulation.end_drag();
    }
}

pub(in crate::app) fn pointing_at_node(ui: &Ui) {
    ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
}
