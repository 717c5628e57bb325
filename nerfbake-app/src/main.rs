//! Nerfbake
//!
//! Exports a scene's train and test cameras as a zipped NeRF dataset.
//!
//! ```text
//! nerfbake --scene scene.json --render
//! ```

mod app;

use app::{ExportOverrides, LoggingConfig};
use clap::Parser;
use std::path::PathBuf;

/// Nerfbake - train/test camera dataset export
#[derive(Parser, Debug)]
#[command(name = "nerfbake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scene description (JSON)
    #[arg(short, long)]
    scene: PathBuf,

    /// Directory the dataset is written to, overriding the scene's save path
    #[arg(short = 'o', long)]
    save_path: Option<PathBuf>,

    /// Dataset name, overriding the scene's
    #[arg(short, long)]
    name: Option<String>,

    /// Render images for both phases
    #[arg(long, conflicts_with = "no_render")]
    render: bool,

    /// Only write transforms, even if the scene enables rendering
    #[arg(long)]
    no_render: bool,

    /// PLY file to use as the scene point cloud
    #[arg(long)]
    points: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Send spans to Tracy (requires the `tracy` feature)
    #[arg(long)]
    tracy: bool,
}

fn main() {
    let args = Args::parse();

    app::init_logging(&LoggingConfig {
        level: args.log_level.clone(),
        enable_tracy: args.tracy,
    });

    let render_frames = match (args.render, args.no_render) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let overrides = ExportOverrides {
        save_path: args.save_path,
        dataset_name: args.name,
        render_frames,
        points: args.points,
    };

    match app::run(&args.scene, &overrides) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("nerfbake: {e}");
            std::process::exit(1);
        }
    }
}
