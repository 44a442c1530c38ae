//! augment - generate photometric variants of a YOLO-layout dataset

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use parklot::augment::{augment_split, SPLITS};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Source dataset root (contains train/ and val/).
    #[arg(long)]
    source: PathBuf,
    /// Target dataset root for originals plus variants.
    #[arg(long)]
    target: PathBuf,
    /// Variants generated per source image.
    #[arg(long, default_value_t = 3)]
    num_variations: usize,
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

    let mut rng = rand::thread_rng();
    for split in SPLITS {
        let progress = ui.phase(&format!("augmenting '{split}'"));
        match augment_split(
            &args.source,
            &args.target,
            split,
            args.num_variations,
            &mut rng,
        )? {
            Some(summary) => progress.done(format!(
                "✔ {}: {} originals, {} variants, {} skipped",
                split, summary.originals, summary.variants, summary.skipped
            )),
            None => progress.done(format!("- {}: no source images, skipped", split)),
        }
    }

    log::info!(
        "augmented dataset written to {}; point the training data config there",
        args.target.display()
    );
    Ok(())
}
