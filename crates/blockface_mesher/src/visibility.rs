use blockface_shared::block::{BlockId, VoxelCatalog};
use blockface_shared::chunk::ChunkData;

/// Answers whether a cell lets the faces of its neighbours show through.
#[derive(Clone, Copy)]
pub struct FaceVisibility<'a> {
    chunk: &'a ChunkData,
    catalog: &'a VoxelCatalog,
}

impl<'a> FaceVisibility<'a> {
    pub fn new(chunk: &'a ChunkData, catalog: &'a VoxelCatalog) -> Self {
        Self { chunk, catalog }
    }

    /// Cells outside the chunk count as empty, so boundary faces are always emitted. Light
    /// emitters count as transparent so their light is never sealed in.
    pub fn is_transparent(&self, x: i32, y: i32, z: i32) -> bool {
        let block = self.chunk.get_or_air(x, y, z);
        if block == BlockId::AIR {
            return true;
        }
        let definition = self.catalog.definition(block);
        definition.transparent || definition.emits_light()
    }
}
