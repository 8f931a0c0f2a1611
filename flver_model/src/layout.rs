//! Vertex buffer layouts selected from shader capabilities.
use flver_lib::{BufferLayout, LayoutMember, MemberFormat, MemberType};

use crate::shader::ShaderInfo;

/// Shader and mesh properties that affect the [BufferLayout].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct LayoutFlags {
    /// The shader blends two sets of textures.
    pub is_multiple: bool,
    /// The shader samples a lightmap with its own texture coordinates.
    pub is_lightmap: bool,
    /// Vertices are skinned with bone weights.
    pub is_rigged: bool,
}

impl LayoutFlags {
    pub fn new(shader: &ShaderInfo, is_rigged: bool) -> Self {
        Self {
            is_multiple: shader.is_multiple,
            is_lightmap: shader.is_lightmap,
            is_rigged,
        }
    }
}

/// The layout for vertices using a shader with the given `flags`.
///
/// Identical flags always produce equal layouts.
pub fn build_layout(flags: LayoutFlags) -> BufferLayout {
    let mut members = vec![
        LayoutMember::new(MemberType::Position, MemberFormat::Float3, 0),
        LayoutMember::new(MemberType::BoneIndices, MemberFormat::Byte4B, 0),
    ];
    if flags.is_rigged {
        members.push(LayoutMember::new(
            MemberType::BoneWeights,
            MemberFormat::Short4ToFloat4A,
            0,
        ));
    }
    members.push(LayoutMember::new(MemberType::Normal, MemberFormat::Byte4C, 0));
    members.push(LayoutMember::new(MemberType::Tangent, MemberFormat::Byte4C, 0));
    if flags.is_multiple {
        members.push(LayoutMember::new(
            MemberType::Bitangent,
            MemberFormat::Byte4C,
            0,
        ));
    }
    members.push(LayoutMember::new(
        MemberType::VertexColor,
        MemberFormat::Byte4C,
        0,
    ));

    // Each flag adds a UV set packed into a single member when possible.
    match (flags.is_multiple, flags.is_lightmap) {
        (false, false) => {
            members.push(LayoutMember::new(MemberType::UV, MemberFormat::UV, 0));
        }
        (true, false) | (false, true) => {
            members.push(LayoutMember::new(MemberType::UV, MemberFormat::UVPair, 0));
        }
        (true, true) => {
            members.push(LayoutMember::new(MemberType::UV, MemberFormat::UVPair, 0));
            members.push(LayoutMember::new(MemberType::UV, MemberFormat::UV, 1));
        }
    }

    BufferLayout { members }
}
