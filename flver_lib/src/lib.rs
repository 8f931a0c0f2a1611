//! Typed structures for the FLVER model format used by Dark Souls, Bloodborne, Sekiro, and Elden Ring.
//!
//! # Overview
//! A [Flver] stores the bones, dummy locators, materials, meshes, and vertex buffer layouts
//! for a single model. Each type mirrors a record in the binary file as closely as possible.
//! Indices use the same signed integer types as the file where `-1` represents no value.
//!
//! Reading and writing the container and header bytes is handled by other libraries.
//! This crate starts from already decoded records and only provides helpers that don't require
//! any higher level context like triangulating face sets or computing vertex layout sizes.
//! Higher level constraints like indices being in range are checked by libraries like flver_model.
//!
//! # Coordinate System
//! All positions and directions use the game's left-handed coordinate system with +Y up.
//! Bone rotations are Euler angles in radians applied in X, Z, Y order.
pub mod bone;
pub mod material;
pub mod mesh;
pub mod vertex;

pub use bone::{Bone, Dummy};
pub use material::{Material, Texture};
pub use mesh::{BoundingBox, FaceSet, FaceSetFlags, Mesh, VertexBuffer};
pub use vertex::{BufferLayout, LayoutMember, MemberFormat, MemberType, Vertex};

/// Dark Souls and Dark Souls Remastered.
pub const VERSION_DARK_SOULS: u32 = 0x2000C;
/// Dark Souls 2.
pub const VERSION_DARK_SOULS_2: u32 = 0x20010;
/// Bloodborne and Dark Souls 3.
pub const VERSION_BLOODBORNE: u32 = 0x20016;
/// Sekiro. This and later versions store mesh bounding boxes and use global bone indices.
pub const VERSION_SEKIRO: u32 = 0x2001A;
/// Elden Ring.
pub const VERSION_ELDEN_RING: u32 = 0x2001B;

/// The root of a FLVER model file.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Flver {
    pub header: FlverHeader,
    pub dummies: Vec<Dummy>,
    pub materials: Vec<Material>,
    pub bones: Vec<Bone>,
    pub meshes: Vec<Mesh>,
    /// Unique layouts referenced by [layout_index](struct.VertexBuffer.html#structfield.layout_index).
    pub buffer_layouts: Vec<BufferLayout>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FlverHeader {
    pub endian: Endian,
    pub version: u32,
    /// The minimum of all vertex positions in the model.
    pub bounding_box_min: [f32; 3],
    /// The maximum of all vertex positions in the model.
    pub bounding_box_max: [f32; 3],
    /// Strings are UTF-16 instead of Shift JIS.
    pub unicode: bool,
    pub unk4a: bool,
    pub unk4c: i32,
    pub unk5c: u8,
    pub unk5d: u8,
    pub unk68: i32,
}

impl Default for FlverHeader {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            version: VERSION_DARK_SOULS,
            bounding_box_min: [0.0; 3],
            bounding_box_max: [0.0; 3],
            unicode: true,
            unk4a: false,
            unk4c: 0,
            unk5c: 0,
            unk5d: 0,
            unk68: 0,
        }
    }
}

/// The byte order for all values in the file.
/// Console releases like Dark Souls on PS3 use big endian.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl FlverHeader {
    /// Vertex bone indices address [Flver::bones] directly instead of the mesh bone table.
    pub fn uses_global_bone_indices(&self) -> bool {
        self.version >= VERSION_SEKIRO
    }

    /// Each [Mesh] has a [BoundingBox].
    pub fn has_mesh_bounding_boxes(&self) -> bool {
        self.version >= VERSION_SEKIRO
    }
}

/// Convert a signed file index to an index or `None` for negative values.
pub(crate) fn optional_index<T: TryInto<usize>>(index: T) -> Option<usize> {
    index.try_into().ok()
}
