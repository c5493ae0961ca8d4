use std::sync::Arc;

use blockface_shared::block::{BlockId, MaterialId, TextureRect, VoxelCatalog};

pub const OPAQUE: MaterialId = MaterialId(0);
pub const GLASS_MATERIAL: MaterialId = MaterialId(1);

pub const STONE: BlockId = BlockId(1);
pub const TURF: BlockId = BlockId(2);
pub const GLASS: BlockId = BlockId(3);
pub const LAMP: BlockId = BlockId(4);
pub const LANTERN: BlockId = BlockId(5);

pub const TURF_TOP: TextureRect = TextureRect::new(0.25, 0.0, 0.25, 0.25);
pub const TURF_BOTTOM: TextureRect = TextureRect::new(0.5, 0.0, 0.25, 0.25);
pub const TURF_SIDE: TextureRect = TextureRect::new(0.75, 0.0, 0.25, 0.25);

const CATALOG: &str = r##"
    [[materials]]
    name = "opaque"

    [[materials]]
    name = "glass"

    [[voxels]]
    id = 1
    name = "stone"
    material = "opaque"
    texture = { x = 0.0, y = 0.0, width = 0.25, height = 0.25 }

    [[voxels]]
    id = 2
    name = "turf"
    material = "opaque"
    top = { x = 0.25, y = 0.0, width = 0.25, height = 0.25 }
    bottom = { x = 0.5, y = 0.0, width = 0.25, height = 0.25 }
    side = { x = 0.75, y = 0.0, width = 0.25, height = 0.25 }

    [[voxels]]
    id = 3
    name = "glass"
    material = "glass"
    transparent = true
    texture = { x = 0.0, y = 0.25, width = 0.25, height = 0.25 }

    [[voxels]]
    id = 4
    name = "lamp"
    material = "opaque"
    texture = { x = 0.25, y = 0.25, width = 0.25, height = 0.25 }

    [[voxels.lights]]
    color = "#ffd9a0"
    range = 12.0
    intensity = 1.25

    [[voxels]]
    id = 5
    name = "lantern"
    material = "glass"
    transparent = true
    texture = { x = 0.5, y = 0.25, width = 0.25, height = 0.25 }

    [[voxels.lights]]
    color = "#88aaff"
    range = 6.0
    intensity = 0.75
"##;

pub fn catalog() -> Arc<VoxelCatalog> {
    Arc::new(VoxelCatalog::from_toml_str(CATALOG).expect("test catalog should parse"))
}
