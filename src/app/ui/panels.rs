use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};

use super::super::GraphSession;
use super::super::graph::interaction::{GraphEvent, GraphKey};
use crate::tree::TreeSummary;

pub(in crate::app) fn show_loading(ctx: &Context, dataset_path: &Path) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading("Loading advisor tree...");
            ui.add_space(4.0);
            ui.weak(dataset_path.display().to_string());
            ui.add_space(8.0);
            ui.spinner();
        });
    });
}

/// Returns `true` when the user asked to retry.
pub(in crate::app) fn show_error(ctx: &Context, dataset_path: &Path, error: &str) -> bool {
    let mut retry = false;
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Failed to load advisor tree");
        ui.add_space(6.0);
        ui.label(format!("dataset: {}", dataset_path.display()));
        ui.label(error);
        ui.add_space(10.0);
        if ui.button("Retry").clicked() {
            retry = true;
        }
    });
    retry
}

impl GraphSession {
    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        let now = ctx.input(|input| input.time);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("advisor-tree");
                    ui.separator();
                    ui.label(format!("root: {}", self.root_node().display_name()));
                    ui.label(format!("nodes: {}", self.tree.node_count()));
                    ui.label(format!("edges: {}", self.tree.edges.len()));
                    let summary = &self.tree.summary;
                    ui.label(format!(
                        "advisees: {}  generations: {}",
                        summary.direct_advisees, summary.max_depth
                    ))
                    .on_hover_text(depth_breakdown(summary));
                    if let Some(generated_at) = &self.tree.generated_at {
                        let label = ui.label(format!("generated: {generated_at}"));
                        if let Some(source) = &summary.generated_from {
                            label.on_hover_text(format!("from {source}"));
                        }
                    }
                    ui.separator();
                    if ui.button("Fit").clicked() {
                        self.dispatch(GraphEvent::Key(GraphKey::FitAll), now);
                    }
                    if ui.button("Root").clicked() {
                        self.dispatch(GraphEvent::Key(GraphKey::FocusRoot), now);
                    }
                    if ui.button("Reload").clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        match self.selected_node() {
                            Some(node) => {
                                ui.label(format!("selected: {}", node.display_name()));
                            }
                            None => {
                                ui.weak("nothing selected");
                            }
                        }
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_canvas(ui));
    }
}

/// One line per generation, e.g. `generation 1: 12`.
fn depth_breakdown(summary: &TreeSummary) -> String {
    if summary.depth_counts.is_empty() {
        return "no per-generation counts".to_owned();
    }

    let mut depths = summary
        .depth_counts
        .iter()
        .map(|(depth, count)| (depth.parse::<u32>().ok(), depth, count))
        .collect::<Vec<_>>();
    depths.sort_by_key(|(numeric, _, _)| numeric.unwrap_or(u32::MAX));

    depths
        .into_iter()
        .map(|(_, depth, count)| format!("generation {depth}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}
