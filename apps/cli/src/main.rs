// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: reconstruct watertight per-floor meshes from a floor plan
//! document (JSON) and write one OBJ file per floor.
//!
//! Usage:
//!   plan-to-obj <plan.json> [options]
//!
//! Settings are layered: defaults, then `--config <file.json>`, then
//! `PLAN_MESH_*` environment variables, then explicit flags.

use anyhow::{anyhow, bail, Context, Result};
use plan_mesh_core::PlanDocument;
use plan_mesh_geometry::{generate_document, MeshConfig, SlabMode};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq)]
struct Options {
    input: PathBuf,
    output_dir: PathBuf,
    config_path: Option<PathBuf>,
    slab_mode: Option<SlabMode>,
    wall_height: Option<f64>,
    sequential: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(Options),
    Help,
}

fn print_usage() {
    println!("Usage: plan-to-obj <plan.json> [options]");
    println!();
    println!("Options:");
    println!("  --output-dir <dir>     Directory for OBJ files (default: .)");
    println!("  --config <file.json>   Mesh settings overlay");
    println!("  --slab <solid|raster>  Floor slab mode");
    println!("  --wall-height <cm>     Standard wall height");
    println!("  --sequential           Generate floors one at a time");
    println!();
    println!("Environment: PLAN_MESH_WALL_HEIGHT, PLAN_MESH_SLAB_MODE, PLAN_MESH_RASTER_CELL,");
    println!("             PLAN_MESH_SLAB_THICKNESS, PLAN_MESH_UNIT_SCALE, PLAN_MESH_PARALLEL");
    println!("Logging:     RUST_LOG (default: info)");
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };
    if first == "--help" || first == "-h" {
        return Ok(Command::Help);
    }

    let mut options = Options {
        input: PathBuf::from(first),
        output_dir: PathBuf::from("."),
        ..Options::default()
    };

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        let mut value = || {
            rest.next()
                .ok_or_else(|| anyhow!("{} needs a value", arg))
        };
        match arg.as_str() {
            "--output-dir" => options.output_dir = PathBuf::from(value()?),
            "--config" => options.config_path = Some(PathBuf::from(value()?)),
            "--slab" => {
                let mode = value()?.parse::<SlabMode>().map_err(|e| anyhow!(e))?;
                options.slab_mode = Some(mode);
            }
            "--wall-height" => {
                let raw = value()?;
                let height = raw
                    .parse::<f64>()
                    .with_context(|| format!("invalid wall height '{}'", raw))?;
                options.wall_height = Some(height);
            }
            "--sequential" => options.sequential = true,
            "--help" | "-h" => return Ok(Command::Help),
            other => bail!("unknown option: {}", other),
        }
    }

    Ok(Command::Run(options))
}

fn load_config(options: &Options) -> Result<MeshConfig> {
    let mut config = match &options.config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<MeshConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => MeshConfig::default(),
    }
    .with_env_overrides();

    if let Some(mode) = options.slab_mode {
        config.slab_mode = mode;
    }
    if let Some(height) = options.wall_height {
        config.wall_height = height;
    }
    if options.sequential {
        config.parallel = false;
    }

    config.validate().map_err(|e| anyhow!("invalid settings: {}", e))?;
    Ok(config)
}

fn output_path(dir: &Path, input: &Path, index: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plan");
    dir.join(format!("{}_floor_{}.obj", stem, index))
}

fn run(options: Options) -> Result<()> {
    let config = load_config(&options)?;
    let doc = PlanDocument::from_path(&options.input)
        .with_context(|| format!("loading plan {}", options.input.display()))?;
    info!(
        input = %options.input.display(),
        floors = doc.floors.len(),
        slab = ?config.slab_mode,
        "generating meshes"
    );

    let outputs = generate_document(&doc, &config)?;
    if outputs.is_empty() {
        bail!("no floor produced any geometry");
    }

    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("creating {}", options.output_dir.display()))?;

    for (index, output) in &outputs {
        for op in &output.diagnostics.recovered {
            warn!(floor = index, operation = %op, "polygon operation fell back to unmerged input");
        }
        let path = output_path(&options.output_dir, &options.input, *index);
        fs::write(&path, output.to_obj()).with_context(|| format!("writing {}", path.display()))?;
        info!(
            floor = index,
            vertices = output.mesh.vertex_count(),
            faces = output.mesh.face_count(),
            path = %path.display(),
            "wrote floor"
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Run(options) => run(options),
    }
}
