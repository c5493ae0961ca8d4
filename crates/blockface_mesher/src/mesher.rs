use std::sync::Arc;

use blockface_shared::block::{BlockId, MaterialId, VoxelCatalog};
use blockface_shared::chunk::ChunkData;
use blockface_shared::coords::{LocalPos, CHUNK_SIZE};
use tracing::debug;

use crate::face::FACE_SPECS;
use crate::lights::{LightFactory, LightTracker};
use crate::mesh::{MeshBuilder, MeshInfo};
use crate::visibility::FaceVisibility;

/// Builds unit-quad geometry for the voxels of one material.
///
/// A chunk made of several materials is meshed by one `ChunkMesher` per material; every pass
/// also reconciles the chunk's lights.
#[derive(Debug, Clone)]
pub struct ChunkMesher {
    catalog: Arc<VoxelCatalog>,
    material: MaterialId,
    uv_padding: f32,
}

impl ChunkMesher {
    pub fn new(catalog: Arc<VoxelCatalog>, material: MaterialId) -> Self {
        Self {
            catalog,
            material,
            uv_padding: 0.0,
        }
    }

    pub fn with_uv_padding(mut self, uv_padding: f32) -> Self {
        self.uv_padding = uv_padding;
        self
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn catalog(&self) -> &Arc<VoxelCatalog> {
        &self.catalog
    }

    /// Meshes `chunk`, scanning x, then y, then z.
    ///
    /// Empty cells retire any light tracked at their position. Cells of this mesher's material
    /// emit a quad for every face whose neighbour is transparent and spawn their light if it is
    /// not tracked yet. Panics if the chunk holds a block id the catalog doesn't know.
    pub fn mesh<F>(
        &self,
        chunk: &ChunkData,
        lights: &mut LightTracker<F::Handle>,
        factory: &mut F,
    ) -> MeshInfo
    where
        F: LightFactory,
    {
        let catalog = self.catalog.as_ref();
        let visibility = FaceVisibility::new(chunk, catalog);
        let mut builder = MeshBuilder::with_uv_padding(self.uv_padding);
        let mut created = 0usize;
        let mut retired = 0usize;

        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    let pos = LocalPos::new(x as u8, y as u8, z as u8);
                    let block = chunk.get(pos);
                    if block == BlockId::AIR {
                        if lights.retire(pos, factory) {
                            retired += 1;
                        }
                        continue;
                    }

                    let definition = catalog.definition(block);
                    if definition.material != self.material {
                        continue;
                    }

                    let [cx, cy, cz] = pos.as_ivec3().to_array();
                    let corner = pos.corner();
                    for face in FACE_SPECS {
                        let (dx, dy, dz) = face.neighbor;
                        if !visibility.is_transparent(cx + dx, cy + dy, cz + dz) {
                            continue;
                        }
                        builder.append_quad(
                            corner + face.corner,
                            face.up,
                            face.right,
                            face.side.texture(definition),
                            face.reversed,
                        );
                    }

                    if let Some(light) = definition.primary_light() {
                        if lights.ensure(pos, light, pos.center(), factory) {
                            created += 1;
                        }
                    }
                }
            }
        }

        debug!(
            "Meshed chunk {:?} material {}: {} quads, {} lights created, {} retired",
            lights.anchor(),
            self.material.0,
            builder.quad_count(),
            created,
            retired
        );
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use blockface_shared::block::{BlockId, TextureRect};
    use blockface_shared::chunk::ChunkData;
    use blockface_shared::coords::{ChunkPos, LocalPos, CHUNK_SIZE};
    use glam::Vec3;

    use super::ChunkMesher;
    use crate::lights::{LightArena, LightHandle, LightTracker};
    use crate::mesh::MeshInfo;
    use crate::test_support::{
        catalog, GLASS, GLASS_MATERIAL, LAMP, LANTERN, OPAQUE, STONE, TURF, TURF_BOTTOM, TURF_SIDE,
        TURF_TOP,
    };

    const LAST: u8 = (CHUNK_SIZE - 1) as u8;

    fn assert_mesh_invariants(mesh: &MeshInfo) {
        assert_eq!(mesh.vertices.len(), mesh.tex_coords.len());
        assert_eq!(mesh.vertices.len() % 4, 0);
        assert_eq!(mesh.triangles.len() % 6, 0);
        assert_eq!(mesh.triangles.len() / 6, mesh.vertices.len() / 4);
        assert!(mesh
            .triangles
            .iter()
            .all(|&idx| (idx as usize) < mesh.vertices.len()));
    }

    fn uv_rect_of_quad(mesh: &MeshInfo, quad: usize) -> TextureRect {
        let start = mesh.tex_coords[quad * 4];
        let end = mesh.tex_coords[quad * 4 + 2];
        TextureRect::new(start[0], start[1], end[0] - start[0], end[1] - start[1])
    }

    fn mesh_opaque(chunk: &ChunkData) -> (MeshInfo, LightTracker<LightHandle>, LightArena) {
        let mesher = ChunkMesher::new(catalog(), OPAQUE);
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());
        let mesh = mesher.mesh(chunk, &mut tracker, &mut arena);
        (mesh, tracker, arena)
    }

    #[test]
    fn empty_chunk_yields_empty_mesh() {
        let (mesh, tracker, arena) = mesh_opaque(&ChunkData::new_empty());
        assert!(mesh.is_empty());
        assert!(mesh.triangles.is_empty());
        assert!(tracker.is_empty());
        assert!(arena.is_empty());
    }

    #[test]
    fn isolated_voxel_emits_six_textured_faces() {
        let mut chunk = ChunkData::new_empty();
        chunk.set(LocalPos::new(5, 6, 7), TURF);

        let (mesh, _, _) = mesh_opaque(&chunk);
        assert_mesh_invariants(&mesh);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangles.len(), 36);

        // -X, +X, -Y, +Y, -Z, +Z
        let expected = [TURF_SIDE, TURF_SIDE, TURF_BOTTOM, TURF_TOP, TURF_SIDE, TURF_SIDE];
        for (quad, rect) in expected.into_iter().enumerate() {
            assert_eq!(uv_rect_of_quad(&mesh, quad), rect, "quad {quad}");
        }

        // the +Y face sits on the top plane of the cell
        assert!(mesh.vertices[12..16].iter().all(|v| v[1] == 7.0));
        // the -X face sits on the x = 5 plane
        assert!(mesh.vertices[0..4].iter().all(|v| v[0] == 5.0));
    }

    #[test]
    fn every_emitted_triangle_faces_outwards() {
        let mut chunk = ChunkData::new_empty();
        chunk.set(LocalPos::new(2, 2, 2), STONE);
        let (mesh, _, _) = mesh_opaque(&chunk);
        let center = Vec3::splat(2.5);

        for triangle in mesh.triangles.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]]
                .map(|idx| Vec3::from_array(mesh.vertices[idx as usize]));
            let normal = (b - a).cross(c - a);
            let face_point = (a + b + c) / 3.0;
            assert!(normal.dot(face_point - center) > 0.0);
        }
    }

    #[test]
    fn fully_enclosed_voxel_is_culled() {
        let mut chunk = ChunkData::new_empty();
        let center = LocalPos::new(10, 10, 10);
        chunk.set(center, STONE);
        for (dx, dy, dz) in [(-1, 0, 0), (1, 0, 0), (0, -1, 0), (0, 1, 0), (0, 0, -1), (0, 0, 1)] {
            let neighbor = center.offset(dx, dy, dz).expect("in bounds");
            chunk.set(neighbor, STONE);
        }

        let (mesh, _, _) = mesh_opaque(&chunk);
        assert_mesh_invariants(&mesh);
        // 6 neighbours x 5 exposed faces each; the centre contributes nothing
        assert_eq!(mesh.quad_count(), 30);
        // a quad entirely within the centre cell's bounds would be one of its faces
        let on_center = |v: &[f32; 3]| v.iter().all(|c| (10.0..=11.0).contains(c));
        assert!(!mesh
            .vertices
            .chunks_exact(4)
            .any(|quad| quad.iter().all(on_center)));
    }

    #[test]
    fn solid_chunk_only_shows_its_boundary() {
        let (mesh, _, _) = mesh_opaque(&ChunkData::new_filled(STONE));
        assert_mesh_invariants(&mesh);
        assert_eq!(mesh.quad_count(), 6 * CHUNK_SIZE * CHUNK_SIZE);
    }

    #[test]
    fn boundary_voxels_always_emit_outward_faces() {
        let mut chunk = ChunkData::new_empty();
        chunk.set(LocalPos::new(0, 4, 4), STONE);
        chunk.set(LocalPos::new(1, 4, 4), STONE);

        let (mesh, _, _) = mesh_opaque(&chunk);
        // two cubes share one hidden face pair
        assert_eq!(mesh.quad_count(), 10);
        // first quad is the -X face of the x = 0 cube, on the chunk wall
        assert!(mesh.vertices[0..4].iter().all(|v| v[0] == 0.0));
    }

    #[test]
    fn transparent_and_lit_neighbours_do_not_cull() {
        let mut chunk = ChunkData::new_empty();
        let center = LocalPos::new(8, 8, 8);
        chunk.set(center, STONE);
        for (dx, dy, dz) in [(-1, 0, 0), (1, 0, 0), (0, -1, 0), (0, 1, 0), (0, 0, -1)] {
            chunk.set(center.offset(dx, dy, dz).expect("in bounds"), GLASS);
        }
        chunk.set(center.offset(0, 0, 1).expect("in bounds"), LAMP);

        let mesher = ChunkMesher::new(catalog(), OPAQUE);
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());
        let mesh = mesher.mesh(&chunk, &mut tracker, &mut arena);

        // stone keeps all six faces; the lamp is culled only by the stone at -Z
        assert_eq!(mesh.quad_count(), 6 + 5);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn material_filter_skips_other_materials() {
        let mut chunk = ChunkData::new_empty();
        chunk.set(LocalPos::new(3, 3, 3), STONE);
        chunk.set(LocalPos::new(4, 3, 3), GLASS);
        chunk.set(LocalPos::new(LAST, LAST, LAST), LANTERN);

        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());

        let opaque = ChunkMesher::new(catalog(), OPAQUE).mesh(&chunk, &mut tracker, &mut arena);
        assert_eq!(opaque.quad_count(), 6);
        assert!(tracker.is_empty(), "lantern belongs to the glass mesher");

        let glass =
            ChunkMesher::new(catalog(), GLASS_MATERIAL).mesh(&chunk, &mut tracker, &mut arena);
        // glass loses its -X face to the stone; the lantern keeps all six
        assert_eq!(glass.quad_count(), 11);
        assert!(tracker.contains(LocalPos::new(LAST, LAST, LAST)));
    }

    #[test]
    fn light_lifecycle_follows_the_voxel() {
        let mesher = ChunkMesher::new(catalog(), OPAQUE);
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::new(0, 1, 0));
        let pos = LocalPos::new(1, 2, 3);
        let mut chunk = ChunkData::new_empty();

        chunk.set(pos, LAMP);
        mesher.mesh(&chunk, &mut tracker, &mut arena);
        assert_eq!(tracker.len(), 1);
        let handle = *tracker.get(pos).expect("lamp light tracked");
        let light = arena.get(handle).expect("lamp light alive");
        assert_eq!(light.local_position, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(light.range, 12.0);
        assert_eq!(light.intensity, 1.25);

        mesher.mesh(&chunk, &mut tracker, &mut arena);
        assert_eq!(tracker.len(), 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(tracker.get(pos), Some(&handle));

        chunk.set(pos, STONE);
        mesher.mesh(&chunk, &mut tracker, &mut arena);
        // replaced in place without passing through air: the light stays
        assert_eq!(tracker.get(pos), Some(&handle));

        chunk.set(pos, BlockId::AIR);
        mesher.mesh(&chunk, &mut tracker, &mut arena);
        assert!(tracker.is_empty());
        assert!(arena.is_empty());
        assert!(arena.get(handle).is_none());
    }

    #[test]
    fn clearing_the_chunk_retires_all_lights() {
        let mesher = ChunkMesher::new(catalog(), OPAQUE);
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());
        let mut chunk = ChunkData::new_empty();
        for x in 0..5 {
            chunk.set(LocalPos::new(x * 2, 0, LAST), LAMP);
        }

        mesher.mesh(&chunk, &mut tracker, &mut arena);
        assert_eq!(arena.len(), 5);

        let mesh = mesher.mesh(&ChunkData::new_empty(), &mut tracker, &mut arena);
        assert!(mesh.is_empty());
        assert!(tracker.is_empty());
        assert!(arena.is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let mut chunk = ChunkData::new_empty();
        for i in 0..8u8 {
            let block = if i % 3 == 0 { TURF } else { STONE };
            chunk.set(LocalPos::new(i, i / 2, LAST - i), block);
        }

        let (first, _, _) = mesh_opaque(&chunk);
        let (second, _, _) = mesh_opaque(&chunk);
        assert_mesh_invariants(&first);
        assert_eq!(first, second);
    }
}
