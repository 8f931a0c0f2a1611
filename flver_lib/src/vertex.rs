//! Vertices and the buffer layouts describing how they are stored.
//!
//! # Overview
//! Each [Mesh](crate::mesh::Mesh) stores its vertices using the attributes and formats
//! in a [BufferLayout]. Layouts are shared between meshes and stored once in the
//! [Flver](crate::Flver) with meshes selecting a layout by index.
//!
//! The [Vertex] type stores every attribute as floats regardless of the layout.
//! Packing values into the formats like [MemberFormat::Byte4C] is handled when writing the buffer bytes.
use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite, Endian};
use log::warn;

/// A single vertex with all attributes unpacked.
#[derive(Debug, PartialEq, Clone)]
pub struct Vertex {
    pub position: [f32; 3],
    pub bone_weights: [f32; 4],
    pub bone_indices: [i32; 4],
    pub normal: [f32; 3],
    /// Usually `127`.
    pub normal_w: i32,
    /// Tangent vectors with the bitangent sign in the fourth component.
    pub tangents: Vec<[f32; 4]>,
    pub bitangent: [f32; 4],
    /// Texture coordinates with the third component usually `0.0`.
    pub uvs: Vec<[f32; 3]>,
    /// RGBA colors in the range `0.0` to `1.0`.
    pub colors: Vec<[f32; 4]>,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            bone_weights: [0.0; 4],
            bone_indices: [0; 4],
            normal: [0.0; 3],
            normal_w: 127,
            tangents: Vec::new(),
            bitangent: [0.0; 4],
            uvs: Vec::new(),
            colors: Vec::new(),
        }
    }
}

/// The ordered attributes for each vertex in a vertex buffer.
///
/// Layouts compare structurally, so layouts with identical members are the same layout.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default)]
pub struct BufferLayout {
    pub members: Vec<LayoutMember>,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct LayoutMember {
    pub unk00: i32,
    pub member_type: MemberType,
    pub format: MemberFormat,
    /// The index for members with the same [MemberType] like UV channels.
    pub index: u32,
}

impl LayoutMember {
    pub fn new(member_type: MemberType, format: MemberFormat, index: u32) -> Self {
        Self {
            unk00: 0,
            member_type,
            format,
            index,
        }
    }
}

/// The usage of a [LayoutMember].
#[derive(Debug, BinRead, BinWrite, PartialEq, Eq, Hash, Clone, Copy)]
#[brw(repr(u32))]
pub enum MemberType {
    Position = 0,
    BoneWeights = 1,
    BoneIndices = 2,
    Normal = 3,
    UV = 5,
    Tangent = 6,
    Bitangent = 7,
    VertexColor = 10,
}

/// The storage format of a [LayoutMember].
#[derive(Debug, BinRead, BinWrite, PartialEq, Eq, Hash, Clone, Copy)]
#[brw(repr(u32))]
pub enum MemberFormat {
    Float2 = 0x01,
    Float3 = 0x02,
    Float4 = 0x03,
    /// Unorm8x4 with the components in reverse order.
    Byte4A = 0x10,
    /// Uint8x4 values like bone indices.
    Byte4B = 0x11,
    /// Sint16x2 scaled by 1/2048.
    Short2ToFloat2 = 0x12,
    /// Unorm8x4 remapped to `-1.0` to `1.0` for normals and tangents.
    Byte4C = 0x13,
    /// Sint16x2 texture coordinates scaled by 1/1024.
    UV = 0x15,
    /// Two sets of Sint16x2 texture coordinates scaled by 1/1024.
    UVPair = 0x16,
    ShortBoneIndices = 0x18,
    /// Unorm16x4 values like bone weights.
    Short4ToFloat4A = 0x1A,
    Short4ToFloat4B = 0x2E,
    Byte4E = 0x2F,
    EdgeCompressed = 0xF0,
}

impl MemberFormat {
    /// The size in bytes for a single value.
    pub fn size(self) -> u32 {
        match self {
            MemberFormat::Float2 => 8,
            MemberFormat::Float3 => 12,
            MemberFormat::Float4 => 16,
            MemberFormat::Byte4A => 4,
            MemberFormat::Byte4B => 4,
            MemberFormat::Short2ToFloat2 => 4,
            MemberFormat::Byte4C => 4,
            MemberFormat::UV => 4,
            MemberFormat::UVPair => 8,
            MemberFormat::ShortBoneIndices => 8,
            MemberFormat::Short4ToFloat4A => 8,
            MemberFormat::Short4ToFloat4B => 8,
            MemberFormat::Byte4E => 4,
            MemberFormat::EdgeCompressed => 1,
        }
    }
}

// The member table entry as it appears in the file.
#[derive(Debug, BinRead, BinWrite, PartialEq)]
struct MemberRecord {
    unk00: i32,
    struct_offset: u32,
    format: MemberFormat,
    member_type: MemberType,
    index: u32,
}

impl BufferLayout {
    /// The size in bytes of each vertex using this layout.
    pub fn vertex_size(&self) -> u32 {
        self.members.iter().map(|m| m.format.size()).sum()
    }

    pub fn contains(&self, member_type: MemberType) -> bool {
        self.members.iter().any(|m| m.member_type == member_type)
    }

    /// The number of texture coordinate sets for each vertex.
    /// Paired formats store two sets in a single member.
    pub fn uv_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.member_type == MemberType::UV)
            .map(|m| match m.format {
                MemberFormat::UVPair | MemberFormat::Float4 => 2,
                _ => 1,
            })
            .sum()
    }

    pub fn tangent_count(&self) -> usize {
        self.count(MemberType::Tangent)
    }

    pub fn color_count(&self) -> usize {
        self.count(MemberType::VertexColor)
    }

    fn count(&self, member_type: MemberType) -> usize {
        self.members
            .iter()
            .filter(|m| m.member_type == member_type)
            .count()
    }

    /// Read `count` member table entries.
    ///
    /// Member offsets are implied by the member order and are not stored in the layout.
    pub fn read_members<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        count: usize,
    ) -> BinResult<Self> {
        let mut members = Vec::with_capacity(count);
        let mut offset = 0;
        for _ in 0..count {
            let record = MemberRecord::read_options(reader, endian, ())?;
            if record.struct_offset != offset {
                warn!(
                    "Member {:?} offset {} does not match expected offset {offset}",
                    record.member_type, record.struct_offset
                );
            }
            offset = record.struct_offset + record.format.size();

            members.push(LayoutMember {
                unk00: record.unk00,
                member_type: record.member_type,
                format: record.format,
                index: record.index,
            });
        }
        Ok(Self { members })
    }

    /// Write the member table entries with offsets calculated from the member sizes.
    pub fn write_members<W: Write + Seek>(&self, writer: &mut W, endian: Endian) -> BinResult<()> {
        let mut struct_offset = 0;
        for member in &self.members {
            MemberRecord {
                unk00: member.unk00,
                struct_offset,
                format: member.format,
                member_type: member.member_type,
                index: member.index,
            }
            .write_options(writer, endian, ())?;
            struct_offset += member.format.size();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use hexlit::hex;
    use pretty_assertions::assert_eq;

    fn static_layout() -> BufferLayout {
        BufferLayout {
            members: vec![
                LayoutMember::new(MemberType::Position, MemberFormat::Float3, 0),
                LayoutMember::new(MemberType::Normal, MemberFormat::Byte4C, 0),
                LayoutMember::new(MemberType::UV, MemberFormat::UVPair, 0),
            ],
        }
    }

    #[test]
    fn layout_sizes_and_counts() {
        let layout = static_layout();
        assert_eq!(24, layout.vertex_size());
        assert_eq!(2, layout.uv_count());
        assert_eq!(0, layout.tangent_count());
        assert_eq!(0, layout.color_count());
        assert!(layout.contains(MemberType::Normal));
        assert!(!layout.contains(MemberType::BoneWeights));
    }

    #[test]
    fn write_members_little_endian() {
        let mut writer = Cursor::new(Vec::new());
        static_layout()
            .write_members(&mut writer, Endian::Little)
            .unwrap();

        assert_eq!(
            hex!(
                00000000 00000000 02000000 00000000 00000000
                00000000 0c000000 13000000 03000000 00000000
                00000000 10000000 16000000 05000000 00000000
            ),
            &writer.into_inner()[..]
        );
    }

    #[test]
    fn read_members_big_endian() {
        let data = hex!(
            00000000 00000000 00000002 00000000 00000000
            00000000 0000000c 00000013 00000003 00000000
            00000000 00000010 00000016 00000005 00000000
        );
        let layout =
            BufferLayout::read_members(&mut Cursor::new(&data), Endian::Big, 3).unwrap();
        assert_eq!(static_layout(), layout);
    }
}
