use std::sync::Arc;

use blockface_shared::block::{MaterialId, VoxelCatalog};
use blockface_shared::chunk::ChunkData;
use blockface_shared::coords::ChunkPos;
use tracing::debug;

use crate::config::{MesherConfig, MesherKind};
use crate::lights::{LightFactory, LightTracker};
use crate::mesh::MeshInfo;
use crate::mesher::ChunkMesher;

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMesh {
    pub material: MaterialId,
    pub mesh: MeshInfo,
}

/// One mesher per catalog material, in material id order.
pub fn meshers_for_catalog(
    catalog: &Arc<VoxelCatalog>,
    config: &MesherConfig,
) -> Vec<ChunkMesher> {
    match config.mesher {
        MesherKind::Basic => catalog
            .materials()
            .map(|(material, _)| {
                ChunkMesher::new(Arc::clone(catalog), material).with_uv_padding(config.uv_padding)
            })
            .collect(),
    }
}

/// Render-side state that outlives individual mesh passes of a chunk.
#[derive(Debug)]
pub struct ChunkRenderState<H> {
    chunk_pos: ChunkPos,
    lights: LightTracker<H>,
}

impl<H> ChunkRenderState<H> {
    pub fn new(chunk_pos: ChunkPos) -> Self {
        Self {
            chunk_pos,
            lights: LightTracker::new(chunk_pos),
        }
    }

    pub fn chunk_pos(&self) -> ChunkPos {
        self.chunk_pos
    }

    pub fn lights(&self) -> &LightTracker<H> {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightTracker<H> {
        &mut self.lights
    }

    /// Runs every mesher over `chunk` and returns one mesh per material.
    pub fn rebuild<F>(
        &mut self,
        chunk: &ChunkData,
        meshers: &[ChunkMesher],
        factory: &mut F,
    ) -> Vec<MaterialMesh>
    where
        F: LightFactory<Handle = H>,
    {
        let meshes: Vec<MaterialMesh> = meshers
            .iter()
            .map(|mesher| MaterialMesh {
                material: mesher.material(),
                mesh: mesher.mesh(chunk, &mut self.lights, factory),
            })
            .collect();

        debug!(
            "Rebuilt chunk {:?}: {} materials, {} quads, {} lights",
            self.chunk_pos,
            meshes.len(),
            meshes.iter().map(|m| m.mesh.quad_count()).sum::<usize>(),
            self.lights.len()
        );
        meshes
    }

    /// Destroys every light of this chunk, e.g. before the chunk is unloaded.
    pub fn release<F>(&mut self, factory: &mut F)
    where
        F: LightFactory<Handle = H>,
    {
        self.lights.clear(factory);
    }
}
