use anyhow::Context;
use cellpack_assets::{ModelAsset, RadialGradient, TextureImage, load_cell_model};
use cellpack_pack::{CellTemplate, PackSession};
use cellpack_render::{DebugTextRenderer, RenderView, Renderer, SceneSettings};
use cellpack_tools::PackInspector;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellpack-cli", about = "CLI tool for battery pack layouts")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build a pack and list its cells
    Build {
        /// Cells along X
        #[arg(short, long, default_value = "1")]
        x: String,
        /// Layers along Y
        #[arg(short, long, default_value = "1")]
        y: String,
        /// Cells along Z
        #[arg(short, long, default_value = "1")]
        z: String,
        /// Cell model; the built-in cylinder is used when omitted
        #[arg(short, long)]
        model: Option<PathBuf>,
        /// Maximum number of cells to list
        #[arg(long, default_value = "50")]
        rows: usize,
    },
    /// Load a cell model and print its geometry statistics
    Inspect {
        /// Path to a glTF or GLB file
        model: PathBuf,
    },
    /// Render the cell texture and print sample colours
    TextureStats,
}

fn load_model(path: Option<&Path>) -> anyhow::Result<ModelAsset> {
    match path {
        Some(path) => {
            let asset = load_cell_model(path)
                .with_context(|| format!("loading cell model {}", path.display()))?;
            tracing::info!(
                "loaded {} ({} triangles)",
                path.display(),
                asset.mesh.triangle_count()
            );
            Ok(asset)
        }
        None => {
            tracing::debug!("using procedural cell");
            Ok(ModelAsset::procedural_cell())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cellpack-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", cellpack_assets::crate_info());
            println!("pack: {}", cellpack_pack::crate_info());
            println!("render: {}", cellpack_render::crate_info());
            println!("tools: {}", cellpack_tools::crate_info());
            println!(
                "limits: {} per axis, {} cells total",
                cellpack_pack::MAX_EXTENT,
                cellpack_pack::MAX_CELLS
            );
        }
        Commands::Build {
            x,
            y,
            z,
            model,
            rows,
        } => {
            let model = load_model(model.as_deref())?;
            let mut session = PackSession::new(CellTemplate::from_model(model));
            session
                .regenerate_from_text(&x, &y, &z)
                .with_context(|| format!("building {x}x{y}x{z} pack"))?;
            tracing::info!(
                "built pack: {} cells, generation {}",
                session.instances().len(),
                session.generation()
            );

            let output = DebugTextRenderer::with_max_rows(rows).render(
                &session,
                &SceneSettings::default(),
                &RenderView::default(),
            );
            print!("{output}");
            println!("{}", PackInspector::summary(&session));
        }
        Commands::Inspect { model } => {
            let asset = load_model(Some(&model))?;
            let mesh = &asset.mesh;
            println!("Model: {} [{}]", asset.name, asset.id);
            println!(
                "Vertices: {}  Triangles: {}  Edges: {}",
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.edge_indices().len() / 2
            );
            if let Some(bounds) = mesh.bounds() {
                let (min, max, size) = (bounds.min, bounds.max, bounds.size());
                println!(
                    "Bounds: min=({:.3}, {:.3}, {:.3}) max=({:.3}, {:.3}, {:.3})",
                    min.x, min.y, min.z, max.x, max.y, max.z
                );
                println!("Size: ({:.3}, {:.3}, {:.3})", size.x, size.y, size.z);
            }
        }
        Commands::TextureStats => {
            let gradient = RadialGradient::cell_texture();
            for stop in gradient.stops() {
                println!("stop {:.2}: {}", stop.offset, stop.color);
            }

            let image = TextureImage::cell_texture();
            println!("Texture: {}x{}", image.width, image.height);
            let (w, h) = (image.width, image.height);
            for (label, px, py) in [
                ("centre", w / 2, h / 2),
                ("mid", w / 2 + w / 4, h / 2),
                ("edge", w - 1, h / 2),
                ("corner", 0, 0),
            ] {
                if let Some([r, g, b, _]) = image.pixel(px, py) {
                    println!("{label:>6} ({px:>3}, {py:>3}): #{r:02x}{g:02x}{b:02x}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults_to_single_cell() {
        let cli = Cli::try_parse_from(["cellpack-cli", "build", "-x", "2"]).unwrap();
        match cli.command {
            Commands::Build { x, y, z, model, rows } => {
                assert_eq!((x.as_str(), y.as_str(), z.as_str()), ("2", "1", "1"));
                assert!(model.is_none());
                assert_eq!(rows, 50);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn inspect_requires_model() {
        assert!(Cli::try_parse_from(["cellpack-cli", "inspect"]).is_err());
    }

    #[test]
    fn missing_model_keeps_path_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.glb");
        let err = load_model(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("absent.glb"));
    }

    #[test]
    fn no_model_uses_procedural_cell() {
        let asset = load_model(None).unwrap();
        assert_eq!(asset.id, ModelAsset::procedural_cell().id);
    }
}
