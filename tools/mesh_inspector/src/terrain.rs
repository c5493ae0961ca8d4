use noise::{NoiseFn, Perlin};

use blockface_shared::block::{BlockId, VoxelCatalog};
use blockface_shared::chunk::ChunkData;
use blockface_shared::coords::{chunk_to_world, ChunkPos, LocalPos, CHUNK_SIZE};

const HEIGHT_OFFSET: f64 = 12.0;
const LAMP_THRESHOLD: f64 = 0.55;

/// Block ids the demo terrain is built from, looked up by name in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct TerrainPalette {
    pub stone: BlockId,
    pub turf: BlockId,
    pub glass: Option<BlockId>,
    pub lamp: Option<BlockId>,
}

impl TerrainPalette {
    pub fn from_catalog(catalog: &VoxelCatalog) -> Result<Self, String> {
        let require = |name: &str| {
            catalog
                .by_name(name)
                .ok_or_else(|| format!("catalog has no '{name}' voxel"))
        };
        Ok(Self {
            stone: require("stone")?,
            turf: require("turf")?,
            glass: catalog.by_name("glass"),
            lamp: catalog.by_name("lamp"),
        })
    }
}

/// Rolling hills of stone under a turf layer, with glass pillars and lamps scattered on top.
pub fn generate_chunk(seed: u64, chunk_pos: ChunkPos, palette: TerrainPalette) -> ChunkData {
    let terrain = Perlin::new(seed as u32);
    let scatter = Perlin::new(seed.wrapping_add(11) as u32);
    let mut chunk = ChunkData::new_empty();

    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let column = chunk_to_world(chunk_pos, LocalPos::new(x as u8, 0, z as u8));
            let wx = f64::from(column.x);
            let wz = f64::from(column.z);

            let coarse = terrain.get([wx * 0.03, wz * 0.03]);
            let detail = terrain.get([wx * 0.11 + 31.7, wz * 0.11 - 12.9]) * 0.3;
            let surface = ((coarse + detail) * 8.0 + HEIGHT_OFFSET).round() as i32;

            for y in 0..CHUNK_SIZE {
                let world_y = chunk_pos.y * CHUNK_SIZE as i32 + y as i32;
                let block = if world_y < surface {
                    palette.stone
                } else if world_y == surface {
                    palette.turf
                } else {
                    continue;
                };
                chunk.set(LocalPos::new(x as u8, y as u8, z as u8), block);
            }

            let decoration = scatter.get([wx * 0.37, wz * 0.37]);
            let above = surface + 1 - chunk_pos.y * CHUNK_SIZE as i32;
            let Some(local) = LocalPos::from_i32(x as i32, above, z as i32) else {
                continue;
            };
            if decoration > LAMP_THRESHOLD {
                if let Some(lamp) = palette.lamp {
                    chunk.set(local, lamp);
                }
            } else if decoration < -LAMP_THRESHOLD {
                if let Some(glass) = palette.glass {
                    chunk.set(local, glass);
                }
            }
        }
    }

    chunk
}
