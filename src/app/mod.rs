use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{Context, Pos2, Vec2};
use tracing::error;

use crate::tree::{AdvisorTree, Hierarchy, load_tree};

mod camera;
mod clusters;
mod graph;
mod highlight;
mod physics;
mod render_utils;
mod session;
mod ui;

use camera::Camera;
use clusters::ClusterAnchors;
use highlight::HighlightState;
use physics::Simulation;
use session::{FocusRequest, InitialFocus};

#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Frames a parked focus request or the initial fit may wait for a usable layout.
    pub focus_retry_frames: u32,
    /// Node id to select and focus once the tree is loaded.
    pub initial_selection: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            focus_retry_frames: 600,
            initial_selection: None,
        }
    }
}

pub struct AdvisorTreeApp {
    dataset_path: PathBuf,
    options: SessionOptions,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<AdvisorTree, String>>,
    },
    Ready(Box<GraphSession>),
    Error(String),
}

/// Everything one loaded tree needs on screen. Built when a dataset arrives and
/// dropped wholesale on reload.
struct GraphSession {
    tree: AdvisorTree,
    hierarchy: Hierarchy,
    graph: RenderGraph,
    simulation: Simulation,
    anchors: ClusterAnchors,
    camera: Camera,
    highlight: HighlightState,
    viewport: Vec2,
    canvas_origin: Pos2,
    selected: Option<usize>,
    hovered: Option<usize>,
    dragging: Option<usize>,
    pending_focus: Option<FocusRequest>,
    initial_focus: InitialFocus,
    options: SessionOptions,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    links: Vec<Link>,
    edges: Vec<(usize, usize)>,
    root_index: usize,
    max_depth: u32,
    seeded: bool,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    radii: Vec<f32>,
    corrections: Vec<Vec2>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    draw_order: Vec<usize>,
}

struct RenderNode {
    world_pos: Vec2,
    velocity: Vec2,
    pin: Option<Vec2>,
    radius: f32,
    depth: u32,
    cluster: usize,
    cluster_slot: usize,
    influence: f32,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    source: usize,
    target: usize,
    distance: f32,
    bias: f32,
}

impl AdvisorTreeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset_path: PathBuf,
        options: SessionOptions,
    ) -> Self {
        let state = Self::start_load(dataset_path.clone());
        Self {
            dataset_path,
            options,
            state,
        }
    }

    fn spawn_load(dataset_path: PathBuf) -> Receiver<Result<AdvisorTree, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_tree(&dataset_path).map_err(|error| {
                error!(error = %format!("{error:#}"), "failed to load advisor tree");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(dataset_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(dataset_path),
        }
    }
}

impl eframe::App for AdvisorTreeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(tree) => AppState::Ready(Box::new(GraphSession::new(
                                tree,
                                self.options.clone(),
                            ))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(mpsc::TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                    Err(mpsc::TryRecvError::Empty) => {}
                }

                ui::show_loading(ctx, &self.dataset_path);
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                if ui::show_error(ctx, &self.dataset_path, error) {
                    transition = Some(Self::start_load(self.dataset_path.clone()));
                }
            }
            AppState::Ready(session) => {
                let mut reload_requested = false;
                session.show(ctx, &mut reload_requested);
                if reload_requested {
                    transition = Some(Self::start_load(self.dataset_path.clone()));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
