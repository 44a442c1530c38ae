//! labelme2yolo - convert LabelMe rectangle JSON to YOLO annotations

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use parklot::convert::{convert_dir, write_classes_file, ClassTable};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the LabelMe .json documents.
    #[arg(long)]
    json_dir: PathBuf,
    /// Output directory for .txt annotations; defaults to the json
    /// directory itself.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Comma-separated class names, in id order.
    #[arg(long, default_value = "occupied,vacant")]
    classes: String,
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

    let classes = ClassTable::new(
        args.classes
            .split(',')
            .map(|name| name.trim().to_string())
            .collect(),
    )?;
    let output = args.output.clone().unwrap_or_else(|| args.json_dir.clone());

    let progress = ui.phase("converting annotations");
    let summary = convert_dir(&args.json_dir, &output, &classes)?;
    write_classes_file(&output, &classes)?;
    progress.done(format!(
        "✔ {} converted, {} failed, classes.txt written to {}",
        summary.converted,
        summary.failed,
        output.display()
    ));
    Ok(())
}
