use blockface_shared::block::TextureRect;
use glam::Vec3;

const VERTICES_PER_QUAD: usize = 4;
const INDICES_PER_QUAD: usize = 6;

/// Geometry for one chunk and one material, in chunk-local space.
///
/// `vertices` and `tex_coords` are parallel arrays; `triangles` holds three vertex indices per
/// triangle. Every face is a quad, so the vertex count is a multiple of 4 and the index count a
/// multiple of 6.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshInfo {
    pub vertices: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
}

impl MeshInfo {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn tex_coord_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tex_coords)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

/// Accumulates unit quads into a [`MeshInfo`].
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    mesh: MeshInfo,
    uv_padding: f32,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pads every UV rectangle outwards by `uv_padding` on each side.
    pub fn with_uv_padding(uv_padding: f32) -> Self {
        Self {
            mesh: MeshInfo::default(),
            uv_padding,
        }
    }

    pub fn reserve_quads(&mut self, quads: usize) {
        self.mesh.vertices.reserve(quads * VERTICES_PER_QUAD);
        self.mesh.tex_coords.reserve(quads * VERTICES_PER_QUAD);
        self.mesh.triangles.reserve(quads * INDICES_PER_QUAD);
    }

    /// Appends the quad spanned by `up` and `right` from `corner`.
    ///
    /// Vertices go `corner`, `corner + up`, `corner + up + right`, `corner + right`. `reversed`
    /// flips the triangle winding so faces on opposite sides of a voxel both face outwards.
    pub fn append_quad(
        &mut self,
        corner: Vec3,
        up: Vec3,
        right: Vec3,
        rect: TextureRect,
        reversed: bool,
    ) {
        let base = self.mesh.vertices.len() as u32;

        self.mesh.vertices.extend([
            corner.to_array(),
            (corner + up).to_array(),
            (corner + up + right).to_array(),
            (corner + right).to_array(),
        ]);

        let padding = self.uv_padding;
        let start_x = rect.x - padding;
        let start_y = rect.y - padding;
        let end_x = start_x + rect.width + padding * 2.0;
        let end_y = start_y + rect.height + padding * 2.0;
        self.mesh.tex_coords.extend([
            [start_x, start_y],
            [start_x, end_y],
            [end_x, end_y],
            [end_x, start_y],
        ]);

        if reversed {
            self.mesh
                .triangles
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        } else {
            self.mesh
                .triangles
                .extend([base + 1, base, base + 2, base + 3, base + 2, base]);
        }
    }

    pub fn quad_count(&self) -> usize {
        self.mesh.quad_count()
    }

    pub fn finish(self) -> MeshInfo {
        self.mesh
    }
}
