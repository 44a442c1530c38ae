//! subset - carve a shuffled train/valid/test subset out of an image pool

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use parklot::subset::{prepare_subset, SubsetCounts};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the pooled images.
    #[arg(long)]
    images: PathBuf,
    /// Directory holding the pooled annotation files.
    #[arg(long)]
    labels: PathBuf,
    /// Destination root for the subset.
    #[arg(long)]
    dest: PathBuf,
    /// Images dealt to the train split.
    #[arg(long, default_value_t = 50)]
    train: usize,
    /// Images dealt to the valid split.
    #[arg(long, default_value_t = 10)]
    valid: usize,
    /// Images dealt to the test split.
    #[arg(long, default_value_t = 10)]
    test: usize,
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

    let counts = SubsetCounts {
        train: args.train,
        valid: args.valid,
        test: args.test,
    };

    let progress = ui.phase("building subset");
    let reports = prepare_subset(&args.images, &args.labels, &args.dest, counts)?;
    let summary = reports
        .iter()
        .map(|copy| format!("{} {}", copy.split, copy.images))
        .collect::<Vec<_>>()
        .join(", ");
    progress.done(format!("✔ subset at {} ({})", args.dest.display(), summary));
    Ok(())
}
