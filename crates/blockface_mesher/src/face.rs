use blockface_shared::block::{TextureRect, VoxelDefinition};
use glam::Vec3;

/// Which of a voxel's three texture rectangles a face samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockSide {
    Top,
    Bottom,
    Side,
}

impl BlockSide {
    pub fn texture(self, definition: &VoxelDefinition) -> TextureRect {
        match self {
            BlockSide::Top => definition.top,
            BlockSide::Bottom => definition.bottom,
            BlockSide::Side => definition.side,
        }
    }
}

/// Emission parameters for one of the six axis directions.
#[derive(Copy, Clone, Debug)]
pub struct FaceSpec {
    /// Offset of the neighbour cell that decides visibility.
    pub neighbor: (i32, i32, i32),
    /// Quad corner relative to the cell's minimum corner.
    pub corner: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub reversed: bool,
    pub side: BlockSide,
}

// Emission order: -X, +X, -Y, +Y, -Z, +Z
pub const FACE_SPECS: [FaceSpec; 6] = [
    // -X
    FaceSpec {
        neighbor: (-1, 0, 0),
        corner: Vec3::ZERO,
        up: Vec3::Y,
        right: Vec3::Z,
        reversed: false,
        side: BlockSide::Side,
    },
    // +X
    FaceSpec {
        neighbor: (1, 0, 0),
        corner: Vec3::X,
        up: Vec3::Y,
        right: Vec3::Z,
        reversed: true,
        side: BlockSide::Side,
    },
    // -Y
    FaceSpec {
        neighbor: (0, -1, 0),
        corner: Vec3::ZERO,
        up: Vec3::Z,
        right: Vec3::X,
        reversed: false,
        side: BlockSide::Bottom,
    },
    // +Y
    FaceSpec {
        neighbor: (0, 1, 0),
        corner: Vec3::Y,
        up: Vec3::Z,
        right: Vec3::X,
        reversed: true,
        side: BlockSide::Top,
    },
    // -Z
    FaceSpec {
        neighbor: (0, 0, -1),
        corner: Vec3::ZERO,
        up: Vec3::Y,
        right: Vec3::X,
        reversed: true,
        side: BlockSide::Side,
    },
    // +Z
    FaceSpec {
        neighbor: (0, 0, 1),
        corner: Vec3::Z,
        up: Vec3::Y,
        right: Vec3::X,
        reversed: false,
        side: BlockSide::Side,
    },
];
