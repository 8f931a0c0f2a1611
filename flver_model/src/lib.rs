//! # flver_model
//! flver_model converts between [Flver](flver_lib::Flver) documents and an editable scene representation.
//!
//! The editable [ModelRoot] stores geometry the way 3D modeling applications do.
//! Each [Mesh] has points with bone influences, triangle faces, and per face corner "loop" attributes
//! like normals and texture coordinates. Bones may be authored in model space or relative to their parent.
//!
//! The FLVER format stores unique vertices with a layout selected by the material's shader,
//! bones relative to their parent as Euler angles, and dummy orientations as forward and up vectors.
//!
//! # Getting Started
//! ```rust no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use flver_model::{ExportSettings, ImportSettings, ModelRoot, MtdNameLookup};
//!
//! # let flver = flver_lib::Flver::default();
//! // Convert a decoded FLVER to an editable scene.
//! let (root, warnings) = ModelRoot::from_flver(&flver, &ImportSettings::default())?;
//! for warning in &warnings {
//!     println!("{warning}");
//! }
//!
//! // Convert back after making any changes.
//! let (new_flver, _warnings) = root.to_flver(&MtdNameLookup, &ExportSettings::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Coordinate Systems
//! The scene uses a right-handed coordinate system with +Z up.
//! All conversions to and from the game's coordinate system happen in [coordinates].
use std::hash::Hash;

use glam::{Vec2, Vec3, Vec4};
use indexmap::IndexMap;

pub use dummy::Dummy;
pub use error::{
    BoneHierarchyError, CreateFlverError, DummyError, LoadFlverError, ValidationWarning, WeldError,
};
pub use flver_lib::Endian;
pub use layout::{LayoutFlags, build_layout};
pub use material::{Material, Texture, TextureType};
pub use model::{BoneBounds, BoneIndexing, ExportSettings, ImportSettings};
pub use shader::{MtdNameLookup, ShaderInfo, ShaderLookup};
pub use skeleton::{Bone, BoneSpace, Skeleton};
pub use skinning::{Influence, SkinWeight, WeightGroup};
pub use transform::Transform;

pub mod bounds;
pub mod coordinates;
pub mod dummy;
pub mod error;
pub mod layout;
pub mod material;
mod model;
pub mod shader;
pub mod skeleton;
pub mod skinning;
mod transform;
pub mod weld;

/// The editable representation of a single FLVER model.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ModelRoot {
    pub name: String,
    pub header: HeaderProperties,
    pub skeleton: Skeleton,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub dummies: Vec<Dummy>,
}

/// Header values that are not calculated from the model data.
/// See [FlverHeader](flver_lib::FlverHeader).
#[derive(Debug, PartialEq, Clone)]
pub struct HeaderProperties {
    pub endian: Endian,
    pub version: u32,
    pub unicode: bool,
    pub unk4a: bool,
    pub unk4c: i32,
    pub unk5c: u8,
    pub unk5d: u8,
    pub unk68: i32,
}

impl Default for HeaderProperties {
    fn default() -> Self {
        let header = flver_lib::FlverHeader::default();
        Self {
            endian: header.endian,
            version: header.version,
            unicode: header.unicode,
            unk4a: header.unk4a,
            unk4c: header.unk4c,
            unk5c: header.unk5c,
            unk5d: header.unk5d,
            unk68: header.unk68,
        }
    }
}

/// Triangulated geometry with a single material.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Mesh {
    /// The name used for error messages and identifying the mesh in applications.
    pub name: String,
    /// The index of the [Material] in [materials](struct.ModelRoot.html#structfield.materials).
    pub material_index: usize,
    /// Points are skinned using bone weights instead of a single rigid bone.
    pub is_bind_pose: bool,
    /// The bone for points without any bone influences.
    pub default_bone_index: Option<usize>,
    pub cull_back_faces: bool,
    /// The position for each point.
    pub positions: Vec<Vec3>,
    /// The skin weights for each point grouped by bone name.
    pub influences: Vec<Influence>,
    /// The indices into [loops](#structfield.loops) for each face.
    /// Each face must be a triangle.
    pub faces: Vec<Vec<usize>>,
    pub loops: Loops,
}

/// Per face corner attributes.
///
/// Each loop references a single point.
/// Attribute lists that are shorter than [point_indices](#structfield.point_indices)
/// use default values for the remaining loops.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Loops {
    pub point_indices: Vec<usize>,
    pub normals: Vec<Vec3>,
    /// Tangents with the bitangent sign in the fourth component.
    pub tangents: Vec<Vec4>,
    /// Tangents for the remaining tangent slots in the vertex layout
    /// or `None` to reuse [tangents](#structfield.tangents).
    pub secondary_tangents: Option<Vec<Vec4>>,
    /// Bitangents with the sign in the fourth component
    /// or `None` to calculate bitangents from the normals and tangents.
    pub bitangents: Option<Vec<Vec4>>,
    pub uv_layers: Vec<Vec<Vec2>>,
    /// RGBA colors in the range `0.0` to `1.0`.
    pub color_layers: Vec<Vec<Vec4>>,
}

impl Loops {
    pub fn len(&self) -> usize {
        self.point_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_indices.is_empty()
    }
}

pub(crate) trait IndexMapExt<T> {
    /// Return the index for `key` or insert it with the next index.
    fn entry_index(&mut self, key: T) -> usize;
}

impl<T> IndexMapExt<T> for IndexMap<T, usize>
where
    T: Hash + Eq,
{
    fn entry_index(&mut self, key: T) -> usize {
        let next_index = self.len();
        *self.entry(key).or_insert(next_index)
    }
}
