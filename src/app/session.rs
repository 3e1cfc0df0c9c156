use eframe::egui::{Pos2, Rect, Vec2};
use tracing::{debug, info, warn};

use crate::tree::{AdvisorNode, AdvisorTree, Hierarchy};

use super::camera::{Camera, CameraConfig};
use super::graph::build::build_render_graph;
use super::highlight::HighlightState;
use super::physics::{Simulation, SimulationConfig, TickOutcome, step_physics};
use super::{GraphSession, SessionOptions};

pub(in crate::app) const FIT_PADDING: f32 = 48.0;
pub(in crate::app) const FIT_MAX_SCALE: f32 = 2.0;
pub(in crate::app) const SELECT_FOCUS_SCALE: f32 = 1.25;
pub(in crate::app) const ROOT_FOCUS_SCALE: f32 = 0.85;

const INITIAL_FIT_MAX_SCALE: f32 = 1.4;
const MIN_INITIAL_VIEWPORT: f32 = 240.0;

/// A focus that could not run yet because the node had no usable position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct FocusRequest {
    pub(in crate::app) node: usize,
    pub(in crate::app) scale: f32,
    pub(in crate::app) attempts: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct InitialFocus {
    pub(in crate::app) done: bool,
    pub(in crate::app) attempts: u32,
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct SelectOptions {
    pub(in crate::app) focus: bool,
}

impl GraphSession {
    pub(in crate::app) fn new(tree: AdvisorTree, options: SessionOptions) -> Self {
        let hierarchy = Hierarchy::new(&tree);
        let graph = build_render_graph(&tree, &hierarchy);
        let anchors = graph.cluster_anchors(&hierarchy, Vec2::ZERO);
        let initial_selection = options.initial_selection.clone();

        let mut session = Self {
            tree,
            hierarchy,
            graph,
            simulation: Simulation::new(SimulationConfig::default()),
            anchors,
            camera: Camera::new(CameraConfig::default()),
            highlight: HighlightState::default(),
            viewport: Vec2::ZERO,
            canvas_origin: Pos2::ZERO,
            selected: None,
            hovered: None,
            dragging: None,
            pending_focus: None,
            initial_focus: InitialFocus::default(),
            options,
        };

        if let Some(id) = initial_selection {
            session.select(&id, SelectOptions { focus: true }, 0.0);
        }
        session
    }

    fn viewport_ready(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }

    /// Tracks the canvas rectangle. The first non-empty size seeds the layout;
    /// later size changes move the anchors, re-pin the root and reheat.
    pub(in crate::app) fn set_viewport(&mut self, rect: Rect) {
        self.canvas_origin = rect.min;
        let size = rect.size();
        if size.x <= 0.0 || size.y <= 0.0 || size == self.viewport {
            return;
        }

        self.viewport = size;
        self.anchors = self.graph.cluster_anchors(&self.hierarchy, size);

        if self.graph.seeded {
            self.graph.pin_root(self.anchors.center());
            self.simulation.reheat();
            debug!(width = size.x, height = size.y, "viewport resized, layout reheated");
        } else {
            self.graph.seed_positions(&self.anchors, &self.hierarchy);
            debug!(
                width = size.x,
                height = size.y,
                nodes = self.graph.nodes.len(),
                "seeded layout"
            );
        }
    }

    /// Runs one frame of simulation and camera work. Returns whether anything
    /// is still moving or waiting.
    pub(in crate::app) fn advance(&mut self, now: f64) -> bool {
        let outcome = if self.graph.seeded {
            step_physics(
                &mut self.graph,
                &mut self.simulation,
                &self.anchors,
                self.viewport,
            )
        } else {
            TickOutcome::Idle
        };
        if outcome == TickOutcome::Stabilized {
            info!(nodes = self.graph.nodes.len(), "layout stabilized");
        }

        self.poll_initial_focus(now);
        self.poll_pending_focus(now);
        let animating = self.camera.tick(now);

        outcome == TickOutcome::Moved
            || animating
            || self.pending_focus.is_some()
            || !self.initial_focus.done
    }

    fn poll_initial_focus(&mut self, now: f64) {
        if self.initial_focus.done {
            return;
        }

        let large_enough =
            self.viewport.x >= MIN_INITIAL_VIEWPORT && self.viewport.y >= MIN_INITIAL_VIEWPORT;
        if large_enough && let Some(root) = self.graph.position(self.graph.root_index) {
            let focused = self.fit_all_bounds(FIT_PADDING, INITIAL_FIT_MAX_SCALE, now)
                || self
                    .camera
                    .focus_on(root, ROOT_FOCUS_SCALE, self.viewport, now);
            if focused {
                self.initial_focus.done = true;
                return;
            }
        }

        self.initial_focus.attempts += 1;
        if self.initial_focus.attempts >= self.options.focus_retry_frames {
            warn!(
                attempts = self.initial_focus.attempts,
                width = self.viewport.x,
                height = self.viewport.y,
                "initial focus gave up waiting for a usable viewport"
            );
            self.initial_focus.done = true;
        }
    }

    fn poll_pending_focus(&mut self, now: f64) {
        let Some(request) = self.pending_focus else {
            return;
        };

        if self.try_focus(request.node, request.scale, now) {
            self.pending_focus = None;
            return;
        }

        let attempts = request.attempts + 1;
        if attempts >= self.options.focus_retry_frames {
            warn!(
                node = self.hierarchy.id(request.node),
                attempts, "dropping focus request, node never got a position"
            );
            self.pending_focus = None;
        } else {
            self.pending_focus = Some(FocusRequest { attempts, ..request });
        }
    }

    fn try_focus(&mut self, index: usize, scale: f32, now: f64) -> bool {
        if !self.viewport_ready() {
            return false;
        }
        let Some(world) = self.graph.position(index) else {
            return false;
        };
        self.camera.focus_on(world, scale, self.viewport, now)
    }

    /// Centres the camera on `index`, or parks the request until the node has a
    /// finite position. A newer request replaces a parked one.
    pub(in crate::app) fn focus_node(&mut self, index: usize, scale: f32, now: f64) -> bool {
        if self.try_focus(index, scale, now) {
            self.pending_focus = None;
            return true;
        }

        self.pending_focus = Some(FocusRequest {
            node: index,
            scale,
            attempts: 0,
        });
        false
    }

    pub(in crate::app) fn fit_all_bounds(
        &mut self,
        padding: f32,
        max_scale: f32,
        now: f64,
    ) -> bool {
        if !self.viewport_ready() {
            return false;
        }

        let points = (0..self.graph.nodes.len()).filter_map(|index| self.graph.position(index));
        self.camera
            .fit_points(points, self.viewport, padding, max_scale, now)
    }

    /// Selects by id. Unknown ids leave the selection untouched.
    pub(in crate::app) fn select(&mut self, id: &str, options: SelectOptions, now: f64) -> bool {
        let Some(index) = self.hierarchy.index_of(id) else {
            warn!(id, "ignoring selection of unknown node");
            return false;
        };
        self.select_index(Some(index), options, now);
        debug!(id, position = ?self.node_position(id), "selected node");
        true
    }

    pub(in crate::app) fn select_index(
        &mut self,
        index: Option<usize>,
        options: SelectOptions,
        now: f64,
    ) {
        if self.selected != index {
            self.selected = index;
            self.highlight.set_selection(&self.hierarchy, index);
        }

        if options.focus
            && let Some(index) = index
        {
            self.focus_node(index, SELECT_FOCUS_SCALE, now);
        }
    }

    pub(in crate::app) fn set_hover(&mut self, index: Option<usize>) {
        if self.hovered == index {
            return;
        }
        self.hovered = index;
        self.highlight.set_hover(&self.hierarchy, index);
    }

    pub(in crate::app) fn node_position(&self, id: &str) -> Option<Vec2> {
        self.graph.position(self.hierarchy.index_of(id)?)
    }

    pub(in crate::app) fn selected_node(&self) -> Option<&AdvisorNode> {
        self.selected.map(|index| &self.tree.nodes[index])
    }

    pub(in crate::app) fn root_node(&self) -> &AdvisorNode {
        &self.tree.nodes[self.graph.root_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::sample_tree;
    use eframe::egui::vec2;

    const VIEWPORT: Vec2 = vec2(960.0, 720.0);

    fn session_with_budget(frames: u32) -> GraphSession {
        GraphSession::new(
            sample_tree(),
            SessionOptions {
                focus_retry_frames: frames,
                ..SessionOptions::default()
            },
        )
    }

    fn canvas(size: Vec2) -> Rect {
        Rect::from_min_size(Pos2::ZERO, size)
    }

    #[test]
    fn nothing_is_positioned_before_the_viewport_is_known() {
        let mut session = session_with_budget(600);

        assert!(session.node_position("R").is_none());
        assert!(!session.fit_all_bounds(FIT_PADDING, FIT_MAX_SCALE, 0.0));
        assert!(!session.focus_node(3, 1.0, 0.0));
        assert!(session.pending_focus.is_some());
        assert!(session.advance(0.0));
        assert!(!session.camera.is_animating());
    }

    #[test]
    fn parked_focus_runs_once_layout_is_seeded() {
        let mut session = session_with_budget(600);
        session.focus_node(3, 1.5, 0.0);
        session.advance(0.016);

        session.set_viewport(canvas(VIEWPORT));
        session.advance(0.032);

        assert!(session.pending_focus.is_none());
        assert!(session.camera.is_animating());
        session.advance(5.0);
        let world = session.node_position("C").unwrap();
        let screen = session.camera.transform().world_to_screen(Pos2::ZERO, world);
        // C kept drifting after the transition started, so only check it is on screen.
        assert!(Rect::from_min_size(Pos2::ZERO, VIEWPORT).contains(screen));
        assert_eq!(session.camera.transform().scale, 1.5);
    }

    #[test]
    fn parked_focus_is_dropped_after_retry_budget() {
        let mut session = session_with_budget(3);
        session.focus_node(2, 1.0, 0.0);

        for frame in 0..2 {
            session.advance(frame as f64);
            assert!(session.pending_focus.is_some());
        }
        session.advance(2.0);
        assert!(session.pending_focus.is_none());
        // The initial fit shares the budget and has given up as well.
        assert!(session.initial_focus.done);

        session.set_viewport(canvas(VIEWPORT));
        session.advance(3.0);
        assert!(!session.camera.is_animating());
    }

    #[test]
    fn initial_focus_waits_for_large_enough_viewport() {
        let mut session = session_with_budget(600);
        session.set_viewport(canvas(vec2(200.0, 900.0)));
        for frame in 0..10 {
            session.advance(frame as f64 * 0.016);
        }
        assert!(!session.initial_focus.done);
        assert_eq!(session.camera.transform().scale, 1.0);

        session.set_viewport(canvas(VIEWPORT));
        session.advance(0.2);
        assert!(session.initial_focus.done);
        assert!(session.camera.is_animating());
    }

    #[test]
    fn initial_focus_runs_once() {
        let mut session = session_with_budget(600);
        session.set_viewport(canvas(VIEWPORT));
        session.advance(0.0);
        assert!(session.initial_focus.done);

        session.advance(10.0);
        let settled = session.camera.transform();
        assert!(settled.scale >= 0.35 && settled.scale <= 1.4);

        session.advance(10.1);
        assert!(!session.camera.is_animating());
        assert_eq!(session.camera.transform(), settled);
    }

    #[test]
    fn initial_focus_gives_up_after_budget() {
        let mut session = session_with_budget(5);
        session.set_viewport(canvas(vec2(100.0, 100.0)));
        for frame in 0..5 {
            session.advance(frame as f64);
        }
        assert!(session.initial_focus.done);
        assert!(!session.camera.is_animating());
    }

    #[test]
    fn select_by_id_updates_lineage_and_focuses() {
        let mut session = session_with_budget(600);
        session.set_viewport(canvas(VIEWPORT));

        assert!(session.select("C", SelectOptions { focus: true }, 0.0));
        assert_eq!(session.selected, Some(3));
        assert_eq!(session.highlight.lineage().nodes.len(), 3);
        assert!(session.camera.is_animating());
        assert_eq!(session.selected_node().map(|node| node.id.as_str()), Some("C"));

        assert!(!session.select("nobody", SelectOptions::default(), 0.0));
        assert_eq!(session.selected, Some(3));

        session.select_index(None, SelectOptions::default(), 0.0);
        assert!(session.highlight.lineage().nodes.is_empty());
    }

    #[test]
    fn resize_moves_pinned_root_and_reheats() {
        let mut session = session_with_budget(600);
        session.set_viewport(canvas(VIEWPORT));
        for frame in 0..400 {
            session.advance(frame as f64 * 0.016);
        }
        assert!(!session.simulation.is_running());

        session.set_viewport(canvas(vec2(480.0, 360.0)));
        assert!(session.simulation.is_running());
        assert_eq!(session.node_position("R"), Some(vec2(240.0, 180.0)));
        assert_eq!(session.anchors.center(), vec2(240.0, 180.0));
    }

    #[test]
    fn canvas_offset_does_not_reseed() {
        let mut session = session_with_budget(600);
        session.set_viewport(canvas(VIEWPORT));
        let before = session.node_position("A");

        session.set_viewport(Rect::from_min_size(Pos2::new(0.0, 32.0), VIEWPORT));
        assert_eq!(session.canvas_origin, Pos2::new(0.0, 32.0));
        assert_eq!(session.node_position("A"), before);
    }

    #[test]
    fn initial_selection_is_applied_and_focused_after_seeding() {
        let mut session = GraphSession::new(
            sample_tree(),
            SessionOptions {
                initial_selection: Some("A".to_owned()),
                ..SessionOptions::default()
            },
        );
        assert_eq!(session.selected, Some(1));
        assert!(session.pending_focus.is_some());

        session.set_viewport(canvas(VIEWPORT));
        session.advance(0.5);
        assert!(session.pending_focus.is_none());
        session.advance(5.0);
        assert_eq!(session.camera.transform().scale, SELECT_FOCUS_SCALE);
    }
}
