//! halfmesh CLI - inspect and normalize OBJ meshes.
//!
//! Usage: halfmesh <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `halfmesh --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use halfmesh::{Mesh, ObjReadOptions};

#[derive(Parser)]
#[command(name = "halfmesh")]
#[command(author, version, about = "Halfedge mesh CLI", long_about = None)]
struct Cli {
    /// Print debug logs. `RUST_LOG` takes precedence when set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input OBJ file
        input: PathBuf,

        /// Report the mesh at its original scale
        #[arg(long)]
        no_unify: bool,
    },

    /// Center a mesh and scale it to a fixed size
    Unify {
        /// Input OBJ file
        input: PathBuf,

        /// Output OBJ file
        output: PathBuf,

        /// Length of the longest side of the bounding box
        #[arg(short, long, default_value = "2.0")]
        size: f32,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, no_unify } => {
            cmd_info(&input, no_unify, &mut std::io::stdout().lock())?;
        }

        Commands::Unify {
            input,
            output,
            size,
        } => {
            cmd_unify(&input, &output, size)?;
        }
    }

    Ok(())
}

fn cmd_info(
    input: &Path,
    no_unify: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = if no_unify {
        ObjReadOptions { unify: None }
    } else {
        ObjReadOptions::default()
    };
    let mesh = Mesh::load_obj(input, &options)?;

    writeln!(out, "File: {}", input.display())?;
    writeln!(out, "Vertices: {}", mesh.num_vertices())?;
    writeln!(out, "Edges: {}", mesh.num_edges())?;
    writeln!(out, "Half-edges: {}", mesh.num_halfedges())?;
    writeln!(out, "Faces: {}", mesh.num_faces())?;

    let loops = mesh.boundary_loops();
    if loops.is_empty() {
        writeln!(out, "Topology: Closed (no boundary)")?;
    } else {
        writeln!(
            out,
            "Topology: Open ({} boundary vertices, {} boundary loops)",
            mesh.num_boundary_vertices(),
            loops.len()
        )?;
    }
    writeln!(out, "Components: {}", mesh.num_components())?;

    let bb = mesh.bounding_box();
    writeln!(
        out,
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        bb.min.x, bb.min.y, bb.min.z, bb.max.x, bb.max.y, bb.max.z
    )?;
    let diag = bb.extents();
    writeln!(out, "Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z)?;
    writeln!(out, "Average edge length: {:.6}", mesh.average_edge_length())?;

    let status = match mesh.check_topology() {
        Ok(()) => "OK".to_string(),
        Err(e) => format!("FAILED ({})", e),
    };
    writeln!(out, "Topology check: {}", status)?;

    Ok(())
}

fn cmd_unify(input: &Path, output: &Path, size: f32) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = Mesh::load_obj(input, &ObjReadOptions { unify: None })?;
    mesh.unify(size)?;
    mesh.save_obj(output)?;
    log::info!(
        "Wrote {} vertices and {} faces to {}",
        mesh.num_vertices(),
        mesh.num_faces(),
        output.display()
    );
    Ok(())
}
