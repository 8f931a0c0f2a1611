//! Meshes and their face sets.
use bilge::prelude::*;
use log::warn;

use crate::{optional_index, vertex::Vertex};

/// A single draw call with its own vertices, material, and face sets.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Mesh {
    /// Vertices are skinned using bone weights instead of a single rigid bone.
    pub dynamic: bool,
    pub material_index: i32,
    pub default_bone_index: i32,
    /// Maps vertex bone indices to [bones](../struct.Flver.html#structfield.bones).
    ///
    /// Empty for versions where vertex bone indices already index the model's bones.
    pub bone_indices: Vec<i32>,
    /// Only present for versions that store per mesh bounds.
    pub bounding_box: Option<BoundingBox>,
    /// Index buffers for each level of detail with the full detail face set first.
    pub face_sets: Vec<FaceSet>,
    pub vertex_buffers: Vec<VertexBuffer>,
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn material(&self) -> Option<usize> {
        optional_index(self.material_index)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub unk: Option<[f32; 3]>,
}

/// Selects the [BufferLayout](crate::vertex::BufferLayout) describing the mesh's vertices.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VertexBuffer {
    pub layout_index: i32,
}

impl VertexBuffer {
    pub fn layout(&self) -> Option<usize> {
        optional_index(self.layout_index)
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct FaceSet {
    pub flags: FaceSetFlags,
    /// The indices form a triangle strip instead of a triangle list.
    pub triangle_strip: bool,
    pub cull_back_faces: bool,
    pub unk06: i16,
    pub indices: Vec<u32>,
}

/// Level of detail and rendering flags for a [FaceSet].
#[bitsize(32)]
#[derive(DebugBits, FromBits, PartialEq, Eq, Clone, Copy)]
pub struct FaceSetFlags {
    pub unk1: u24,
    /// The first lower level of detail.
    pub lod_level1: bool,
    /// The second lower level of detail.
    pub lod_level2: bool,
    pub unk2: u4,
    pub edge_compressed: bool,
    /// Drawn for the motion blur pass.
    pub motion_blur: bool,
}

impl Default for FaceSetFlags {
    fn default() -> Self {
        Self::from(0u32)
    }
}

// Strips use the maximum 16-bit value to start a new strip.
const PRIMITIVE_RESTART: u32 = 0xFFFF;

impl FaceSet {
    /// The vertex indices for each triangle.
    ///
    /// Strips are converted to lists with degenerate triangles removed.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        if self.triangle_strip {
            strip_triangles(&self.indices)
        } else {
            if self.indices.len() % 3 != 0 {
                warn!(
                    "Ignoring {} trailing indices for triangle list",
                    self.indices.len() % 3
                );
            }
            self.indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect()
        }
    }
}

fn strip_triangles(indices: &[u32]) -> Vec<[u32; 3]> {
    let mut triangles = Vec::new();
    let mut flip = false;
    for window in indices.windows(3) {
        let [v1, v2, v3] = [window[0], window[1], window[2]];
        if v1 == PRIMITIVE_RESTART || v2 == PRIMITIVE_RESTART || v3 == PRIMITIVE_RESTART {
            flip = false;
        } else {
            // Degenerate triangles still affect the winding of later triangles.
            if v1 != v2 && v1 != v3 && v2 != v3 {
                if flip {
                    triangles.push([v3, v2, v1]);
                } else {
                    triangles.push([v1, v2, v3]);
                }
            }
            flip = !flip;
        }
    }
    triangles
}
