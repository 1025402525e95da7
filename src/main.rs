use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use panda_merge::config::ConvertArgs;
use panda_merge::data::loader::load_directory;
use panda_merge::merge_sources;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ConvertArgs::parse();

    if !args.input_dir.is_dir() {
        bail!("Input directory not found: {}", args.input_dir.display());
    }

    let sources = load_directory(&args.input_dir, &args.extension)
        .with_context(|| format!("reading {}", args.input_dir.display()))?;
    if sources.is_empty() {
        bail!(
            "No .{} files found in {}",
            args.extension,
            args.input_dir.display()
        );
    }

    let output = merge_sources(&sources, &args.merge_options()).context("merging spectra")?;
    std::fs::write(&args.output_file, &output.csv_text)
        .with_context(|| format!("writing {}", args.output_file.display()))?;

    info!("columns: {}", output.column_names.join(", "));
    println!(
        "Merged {} files, {} points -> {}",
        sources.len(),
        output.total_point_count,
        args.output_file.display()
    );
    Ok(())
}
