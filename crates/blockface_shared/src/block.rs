use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::LightColor;

#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: Self = Self(0);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Index of a material in a [`VoxelCatalog`]; one mesh is built per material.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u16);

/// Rectangle in atlas UV space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextureRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelLight {
    pub color: LightColor,
    pub range: f32,
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoxelDefinition {
    pub name: String,
    pub transparent: bool,
    pub material_name: String,
    pub material: MaterialId,
    pub top: TextureRect,
    pub bottom: TextureRect,
    pub side: TextureRect,
    pub lights: Vec<VoxelLight>,
}

impl VoxelDefinition {
    /// The light this voxel emits. Only the first declared light is ever used.
    pub fn primary_light(&self) -> Option<&VoxelLight> {
        self.lights.first()
    }

    pub fn emits_light(&self) -> bool {
        !self.lights.is_empty()
    }
}

#[derive(Debug)]
pub enum CatalogError {
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    ReservedAirId {
        name: String,
    },
    DuplicateVoxel {
        id: BlockId,
        name: String,
    },
    DuplicateMaterial {
        name: String,
    },
    UnknownMaterial {
        voxel: String,
        material: String,
    },
    MissingTexture {
        voxel: String,
        face: &'static str,
    },
    TooManyMaterials,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read voxel catalog {}: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "failed to parse voxel catalog {}: {source}", path.display()),
            Self::Parse { path: None, source } => {
                write!(f, "failed to parse voxel catalog: {source}")
            }
            Self::ReservedAirId { name } => {
                write!(f, "voxel '{name}' uses id 0, which is reserved for air")
            }
            Self::DuplicateVoxel { id, name } => {
                write!(f, "voxel '{name}' reuses id {} already in the catalog", id.0)
            }
            Self::DuplicateMaterial { name } => write!(f, "material '{name}' declared twice"),
            Self::UnknownMaterial { voxel, material } => {
                write!(f, "voxel '{voxel}' references unknown material '{material}'")
            }
            Self::MissingTexture { voxel, face } => {
                write!(f, "voxel '{voxel}' has no {face} texture and no fallback `texture`")
            }
            Self::TooManyMaterials => write!(f, "catalog exceeded MaterialId capacity (u16::MAX)"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    materials: Vec<MaterialEntry>,
    #[serde(default)]
    voxels: Vec<VoxelEntry>,
}

#[derive(Debug, Deserialize)]
struct MaterialEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VoxelEntry {
    id: u16,
    name: String,
    material: String,
    #[serde(default)]
    transparent: bool,
    texture: Option<TextureRect>,
    top: Option<TextureRect>,
    bottom: Option<TextureRect>,
    side: Option<TextureRect>,
    #[serde(default)]
    lights: Vec<VoxelLight>,
}

impl VoxelEntry {
    fn face(
        &self,
        face: &'static str,
        rect: Option<TextureRect>,
    ) -> Result<TextureRect, CatalogError> {
        rect.or(self.texture).ok_or_else(|| CatalogError::MissingTexture {
            voxel: self.name.clone(),
            face,
        })
    }
}

/// Read-only lookup from block ids to voxel definitions and from material names to ids.
#[derive(Default, Debug, Clone)]
pub struct VoxelCatalog {
    voxels: Vec<Option<VoxelDefinition>>,
    materials: Vec<String>,
    materials_by_name: HashMap<String, MaterialId>,
    voxel_count: usize,
}

impl VoxelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile = toml::from_str(&source).map_err(|source| CatalogError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let catalog = Self::from_file(file)?;
        debug!(
            "Loaded voxel catalog {}: {} voxels, {} materials",
            path.display(),
            catalog.len(),
            catalog.material_count()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|source| CatalogError::Parse { path: None, source })?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for material in file.materials {
            catalog.register_material(&material.name)?;
        }

        for entry in file.voxels {
            let top = entry.face("top", entry.top)?;
            let bottom = entry.face("bottom", entry.bottom)?;
            let side = entry.face("side", entry.side)?;
            let material = catalog.material_id(&entry.material).ok_or_else(|| {
                CatalogError::UnknownMaterial {
                    voxel: entry.name.clone(),
                    material: entry.material.clone(),
                }
            })?;

            catalog.register_voxel(
                BlockId(entry.id),
                VoxelDefinition {
                    name: entry.name,
                    transparent: entry.transparent,
                    material_name: entry.material,
                    material,
                    top,
                    bottom,
                    side,
                    lights: entry.lights,
                },
            )?;
        }

        Ok(catalog)
    }

    pub fn register_material(&mut self, name: &str) -> Result<MaterialId, CatalogError> {
        if self.materials_by_name.contains_key(name) {
            return Err(CatalogError::DuplicateMaterial {
                name: name.to_string(),
            });
        }

        let id = MaterialId(
            u16::try_from(self.materials.len()).map_err(|_| CatalogError::TooManyMaterials)?,
        );
        self.materials.push(name.to_string());
        self.materials_by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Registers `definition` under `id`. The definition's `material` must already be resolved.
    pub fn register_voxel(
        &mut self,
        id: BlockId,
        definition: VoxelDefinition,
    ) -> Result<(), CatalogError> {
        if id.is_air() {
            return Err(CatalogError::ReservedAirId {
                name: definition.name,
            });
        }
        if usize::from(definition.material.0) >= self.materials.len() {
            return Err(CatalogError::UnknownMaterial {
                voxel: definition.name,
                material: definition.material_name,
            });
        }

        let idx = usize::from(id.0);
        if self.voxels.len() <= idx {
            self.voxels.resize(idx + 1, None);
        }
        if self.voxels[idx].is_some() {
            return Err(CatalogError::DuplicateVoxel {
                id,
                name: definition.name,
            });
        }

        self.voxels[idx] = Some(definition);
        self.voxel_count += 1;
        Ok(())
    }

    pub fn get(&self, id: BlockId) -> Option<&VoxelDefinition> {
        self.voxels.get(usize::from(id.0)).and_then(Option::as_ref)
    }

    /// Definition for a block id that is known to be registered.
    ///
    /// Panics on unknown ids: chunk contents are expected to come from this catalog.
    pub fn definition(&self, id: BlockId) -> &VoxelDefinition {
        self.get(id)
            .unwrap_or_else(|| panic!("block id {} is not registered in the voxel catalog", id.0))
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.materials_by_name.get(name).copied()
    }

    pub fn material_name(&self, id: MaterialId) -> Option<&str> {
        self.materials.get(usize::from(id.0)).map(String::as_str)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &str)> + '_ {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, name)| (MaterialId(idx as u16), name.as_str()))
    }

    pub fn voxels(&self) -> impl Iterator<Item = (BlockId, &VoxelDefinition)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter_map(|(idx, def)| def.as_ref().map(|def| (BlockId(idx as u16), def)))
    }

    pub fn by_name(&self, name: &str) -> Option<BlockId> {
        self.voxels()
            .find(|(_, def)| def.name == name)
            .map(|(id, _)| id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn len(&self) -> usize {
        self.voxel_count
    }

    pub fn is_empty(&self) -> bool {
        self.voxel_count == 0
    }
}
