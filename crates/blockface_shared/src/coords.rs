use std::ops::Add;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Chunk coordinates in units of whole chunks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Cell coordinates inside a single chunk, each axis in `0..CHUNK_SIZE`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World-space origin of the chunk's `(0, 0, 0)` cell.
    pub fn origin(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE_I32
    }
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl LocalPos {
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Builds a local position from signed coordinates, `None` when any axis leaves the chunk.
    pub fn from_i32(x: i32, y: i32, z: i32) -> Option<Self> {
        if in_chunk_bounds(x) && in_chunk_bounds(y) && in_chunk_bounds(z) {
            Some(Self {
                x: x as u8,
                y: y as u8,
                z: z as u8,
            })
        } else {
            None
        }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Self::from_i32(
            i32::from(self.x) + dx,
            i32::from(self.y) + dy,
            i32::from(self.z) + dz,
        )
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(i32::from(self.x), i32::from(self.y), i32::from(self.z))
    }

    /// Minimum corner of the cell in chunk-local space.
    pub fn corner(self) -> Vec3 {
        self.as_ivec3().as_vec3()
    }

    /// Geometric centre of the cell in chunk-local space.
    pub fn center(self) -> Vec3 {
        self.corner() + Vec3::splat(0.5)
    }
}

fn in_chunk_bounds(value: i32) -> bool {
    (0..CHUNK_SIZE_I32).contains(&value)
}

pub fn chunk_to_world(chunk_pos: ChunkPos, local: LocalPos) -> IVec3 {
    chunk_pos.origin() + local.as_ivec3()
}

pub fn local_to_index(local: LocalPos) -> usize {
    usize::from(local.x)
        + usize::from(local.z) * CHUNK_SIZE
        + usize::from(local.y) * CHUNK_SIZE * CHUNK_SIZE
}

pub fn index_to_local(index: usize) -> LocalPos {
    assert!(index < CHUNK_VOLUME, "chunk index out of bounds: {index}");

    let y = index / (CHUNK_SIZE * CHUNK_SIZE);
    let rem = index % (CHUNK_SIZE * CHUNK_SIZE);
    let z = rem / CHUNK_SIZE;
    let x = rem % CHUNK_SIZE;

    LocalPos {
        x: x as u8,
        y: y as u8,
        z: z as u8,
    }
}
