//! Per-voxel chunk meshing with face culling, plus the point lights of light-emitting voxels.

pub mod config;
pub mod face;
pub mod lights;
pub mod mesh;
pub mod mesher;
pub mod render_state;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use config::{MesherConfig, MesherKind};
pub use lights::{LightArena, LightFactory, LightHandle, LightRequest, LightTracker};
pub use mesh::{MeshBuilder, MeshInfo};
pub use mesher::ChunkMesher;
pub use render_state::{meshers_for_catalog, ChunkRenderState, MaterialMesh};
