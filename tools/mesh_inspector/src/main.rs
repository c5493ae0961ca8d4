mod terrain;

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use blockface_mesher::{meshers_for_catalog, ChunkRenderState, LightArena, MesherConfig};
use blockface_shared::block::{BlockId, VoxelCatalog};
use blockface_shared::coords::ChunkPos;
use tracing::info;

use terrain::{generate_chunk, TerrainPalette};

const DEFAULT_SEED: u64 = 0xC0FFEE;
const USAGE: &str =
    "Usage: mesh_inspector [--config <path>] [--catalog <path>] [--seed <u64>] [--chunk <x,y,z>]";

struct Options {
    config_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    seed: u64,
    chunk_pos: ChunkPos,
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        eprintln!("mesh_inspector error: {err}");
        std::process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, String> {
    let mut options = Options {
        config_path: None,
        catalog_path: None,
        seed: DEFAULT_SEED,
        chunk_pos: ChunkPos::default(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or("--config expects a path argument")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--catalog" => {
                let value = args.next().ok_or("--catalog expects a path argument")?;
                options.catalog_path = Some(PathBuf::from(value));
            }
            "--seed" => {
                let value = args.next().ok_or("--seed expects a numeric argument")?;
                options.seed = value
                    .parse()
                    .map_err(|err| format!("invalid seed '{value}': {err}"))?;
            }
            "--chunk" => {
                let value = args.next().ok_or("--chunk expects x,y,z")?;
                options.chunk_pos = parse_chunk_pos(&value)?;
            }
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Some(options))
}

fn parse_chunk_pos(value: &str) -> Result<ChunkPos, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid chunk position '{value}': {err}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(ChunkPos::new(*x, *y, *z)),
        _ => Err(format!("chunk position '{value}' must have three components")),
    }
}

fn run(options: Options) -> Result<(), String> {
    let config = match &options.config_path {
        Some(path) => MesherConfig::load(path).map_err(|err| err.to_string())?,
        None => MesherConfig::default(),
    };
    let catalog_path = options
        .catalog_path
        .or_else(|| config.catalog.clone())
        .ok_or("no voxel catalog given; pass --catalog or set `catalog` in the config")?;
    let catalog = Arc::new(VoxelCatalog::load(&catalog_path).map_err(|err| err.to_string())?);
    info!(
        "Loaded {} voxels in {} materials from {}",
        catalog.len(),
        catalog.material_count(),
        catalog_path.display()
    );

    let palette = TerrainPalette::from_catalog(&catalog)?;
    let mut chunk = generate_chunk(options.seed, options.chunk_pos, palette);
    let meshers = meshers_for_catalog(&catalog, &config);
    let mut arena = LightArena::new();
    let mut state = ChunkRenderState::new(options.chunk_pos);

    println!(
        "Chunk ({}, {}, {}) seed {}: {} solid cells",
        options.chunk_pos.x,
        options.chunk_pos.y,
        options.chunk_pos.z,
        options.seed,
        chunk.count_non_air()
    );

    for mesh in state.rebuild(&chunk, &meshers, &mut arena) {
        let name = catalog.material_name(mesh.material).unwrap_or("?");
        println!(
            "  material {name}: {} vertices, {} triangles, {} bytes",
            mesh.mesh.vertices.len(),
            mesh.mesh.triangle_count(),
            mesh.mesh.vertex_bytes().len()
                + mesh.mesh.tex_coord_bytes().len()
                + mesh.mesh.index_bytes().len()
        );
    }
    println!("  lights: {}", state.lights().len());

    // Knock out one lit block to show the tracker retiring its light.
    let lit = state.lights().positions().min_by_key(|pos| (pos.x, pos.y, pos.z));
    if let Some(pos) = lit {
        chunk.set(pos, BlockId::AIR);
        state.rebuild(&chunk, &meshers, &mut arena);
        println!(
            "  cleared lit block at ({}, {}, {}): {} lights remain",
            pos.x,
            pos.y,
            pos.z,
            state.lights().len()
        );
    }

    for (handle, light) in arena.iter() {
        let world = light.world_position();
        println!(
            "  light #{} at ({:.1}, {:.1}, {:.1}) colour {} range {} intensity {}",
            handle.index(),
            world.x,
            world.y,
            world.z,
            light.color.to_hex(),
            light.range,
            light.intensity
        );
    }

    state.release(&mut arena);
    Ok(())
}
