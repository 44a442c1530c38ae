//! preprocess - contrast enhancement and resize for training images

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use parklot::preprocess::preprocess_dir;

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory of images to preprocess.
    #[arg(long)]
    input: PathBuf,
    /// Output directory; defaults to `images_preprocessed` next to the
    /// input directory.
    #[arg(long)]
    output: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let ui = ui::Ui::new(
        ui::UiMode::from_flag(&args.ui),
        std::io::stderr().is_terminal(),
    );

    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or(Path::new("."))
            .join("images_preprocessed")
    });

    let progress = ui.phase("preprocessing");
    let processed = preprocess_dir(&args.input, &output)?;
    progress.done(format!("✔ {} images written to {}", processed, output.display()));
    Ok(())
}
