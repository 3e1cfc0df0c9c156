mod app;
mod logging;
mod tree;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Advisor genealogy dataset (JSON).
    #[arg(long, default_value = "advisor_tree.json")]
    dataset: PathBuf,

    /// Frames a focus request may wait for the layout before it is dropped.
    #[arg(long, default_value_t = 600)]
    focus_retry_frames: u32,

    /// Node id to select and focus once the tree is loaded.
    #[arg(long)]
    select: Option<String>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    logging::init_logging();
    info!(dataset = %args.dataset.display(), "starting advisor-tree");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_title("advisor-tree"),
        ..Default::default()
    };
    let session_options = app::SessionOptions {
        focus_retry_frames: args.focus_retry_frames,
        initial_selection: args.select.clone(),
    };

    eframe::run_native(
        "advisor-tree",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::AdvisorTreeApp::new(
                cc,
                args.dataset.clone(),
                session_options,
            )))
        }),
    )
}
