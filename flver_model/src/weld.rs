//! Create unique vertices from per face corner attributes.
//!
//! Modeling applications store attributes like texture coordinates for each face corner or "loop".
//! FLVER vertices store all attributes for each vertex, so loops with the same
//! position, texture coordinates, and colors are combined into a single vertex.
//! Normals and tangents are taken from the first loop for each vertex.
use flver_lib::{BufferLayout, MemberType, Vertex};
use glam::{Vec3, Vec4};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::{
    IndexMapExt, Mesh,
    coordinates::{tangent_to_game, uv_to_game, vec3_to_game},
    error::WeldError,
    skinning::point_bone_weights,
};

/// The vertices and triangles for a single mesh.
#[derive(Debug, PartialEq, Clone)]
pub struct WeldedMesh {
    pub vertices: Vec<Vertex>,
    /// Vertex indices for each triangle.
    pub triangles: Vec<u32>,
    /// The index in the skeleton for each mesh bone index in order of first use.
    pub local_bone_indices: Vec<usize>,
}

/// Bone index and weight settings for creating vertices.
#[derive(Debug, Clone, Copy)]
pub struct WeldSettings<'a> {
    /// The skeleton index for each bone name.
    pub bone_lookup: &'a IndexMap<&'a str, usize>,
    /// The number of bones in the skeleton.
    pub bone_count: usize,
    /// Vertex bone indices use skeleton indices instead of mesh bone indices.
    pub global_bone_indices: bool,
}

// Loops with the same key become the same vertex.
#[derive(PartialEq, Eq, Hash)]
struct WeldKey {
    position: [OrderedFloat<f32>; 3],
    uvs: Vec<[OrderedFloat<f32>; 3]>,
    colors: Vec<[OrderedFloat<f32>; 4]>,
}

impl WeldKey {
    fn new(vertex: &Vertex) -> Self {
        Self {
            position: vertex.position.map(OrderedFloat),
            uvs: vertex.uvs.iter().map(|uv| uv.map(OrderedFloat)).collect(),
            colors: vertex.colors.iter().map(|c| c.map(OrderedFloat)).collect(),
        }
    }
}

/// Create the vertices using `layout` and the triangle list for `mesh`.
///
/// The attributes are converted to the game's coordinate system.
pub fn weld(
    mesh: &Mesh,
    layout: &BufferLayout,
    settings: WeldSettings,
) -> Result<WeldedMesh, WeldError> {
    if mesh.faces.is_empty() {
        return Err(WeldError::EmptyMesh);
    }

    let uv_count = layout.uv_count();
    if mesh.loops.uv_layers.len() < uv_count {
        return Err(WeldError::MissingUvLayer {
            required: uv_count,
            count: mesh.loops.uv_layers.len(),
        });
    }

    if let Some(index) = mesh
        .default_bone_index
        .filter(|i| *i >= settings.bone_count)
    {
        return Err(WeldError::DefaultBoneIndexOutOfRange {
            index,
            count: settings.bone_count,
        });
    }
    // Points without influences use the default bone or the first bone.
    let default_bone = Some(mesh.default_bone_index.unwrap_or_default())
        .filter(|i| *i < settings.bone_count);

    // Check every point even if it isn't used or is combined with another point.
    let is_weighted = layout.contains(MemberType::BoneWeights);
    let point_weights =
        point_bone_weights(&mesh.influences, mesh.positions.len(), settings.bone_lookup)?;
    let point_bones = point_weights
        .iter()
        .enumerate()
        .map(|(point, bones)| {
            if is_weighted {
                weighted_bones(bones, point, default_bone)
            } else {
                static_bones(bones, point, default_bone)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut welded = IndexMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::with_capacity(mesh.faces.len() * 3);
    let mut local_bones = IndexMap::new();

    for (face_index, face) in mesh.faces.iter().enumerate() {
        if face.len() != 3 {
            return Err(WeldError::NonTriangularFace {
                face: face_index,
                count: face.len(),
            });
        }

        for &loop_index in face {
            let point = *mesh.loops.point_indices.get(loop_index).ok_or(
                WeldError::LoopIndexOutOfRange {
                    face: face_index,
                    index: loop_index,
                    count: mesh.loops.len(),
                },
            )?;
            let position = *mesh
                .positions
                .get(point)
                .ok_or(WeldError::PointIndexOutOfRange {
                    index: point,
                    count: mesh.positions.len(),
                })?;

            let mut vertex = loop_vertex(mesh, layout, loop_index, position);

            let key = WeldKey::new(&vertex);
            let next_index = welded.len();
            let index = welded.entry_index(key);
            if index == next_index {
                let (indices, weights) = &point_bones[point];

                // Unused slots keep an index of zero.
                for (i, bone_index) in indices.iter().copied().enumerate() {
                    let local_index = local_bones.entry_index(bone_index);
                    vertex.bone_indices[i] = if settings.global_bone_indices {
                        bone_index as i32
                    } else {
                        local_index as i32
                    };
                }
                vertex.bone_weights = *weights;

                vertices.push(vertex);
            }
            triangles.push(index as u32);
        }
    }

    if vertices.is_empty() {
        return Err(WeldError::EmptyMesh);
    }

    Ok(WeldedMesh {
        vertices,
        triangles,
        local_bone_indices: local_bones.into_keys().collect(),
    })
}

fn loop_vertex(mesh: &Mesh, layout: &BufferLayout, loop_index: usize, position: Vec3) -> Vertex {
    let loops = &mesh.loops;

    let normal = loops.normals.get(loop_index).copied().unwrap_or(Vec3::Z);
    let tangent = loops
        .tangents
        .get(loop_index)
        .copied()
        .unwrap_or(Vec4::new(1.0, 0.0, 0.0, 1.0));
    let bitangent = loops
        .bitangents
        .as_ref()
        .and_then(|b| b.get(loop_index).copied())
        .unwrap_or_else(|| (normal.cross(tangent.truncate()) * tangent.w).extend(tangent.w));

    let secondary_tangent = loops
        .secondary_tangents
        .as_ref()
        .and_then(|t| t.get(loop_index).copied())
        .unwrap_or(tangent);

    Vertex {
        position: vec3_to_game(position).to_array(),
        normal: vec3_to_game(normal).to_array(),
        tangents: (0..layout.tangent_count())
            .map(|i| {
                let tangent = if i == 0 { tangent } else { secondary_tangent };
                tangent_to_game(tangent).to_array()
            })
            .collect(),
        bitangent: if layout.contains(MemberType::Bitangent) {
            tangent_to_game(bitangent).to_array()
        } else {
            [0.0; 4]
        },
        // Missing UV layers are checked before creating vertices.
        uvs: loops
            .uv_layers
            .iter()
            .take(layout.uv_count())
            .map(|layer| {
                let uv = layer.get(loop_index).copied().unwrap_or_default();
                uv_to_game(uv).to_array()
            })
            .collect(),
        colors: (0..layout.color_count())
            .map(|i| {
                loops
                    .color_layers
                    .get(i)
                    .and_then(|layer| layer.get(loop_index).copied())
                    .unwrap_or(Vec4::ONE)
                    .to_array()
            })
            .collect(),
        ..Default::default()
    }
}

fn weighted_bones(
    bones: &[(usize, f32)],
    point: usize,
    default_bone: Option<usize>,
) -> Result<(Vec<usize>, [f32; 4]), WeldError> {
    if bones.is_empty() {
        // Zero weights in every slot would be read as a rigid bone.
        let bone_index = default_bone.ok_or(WeldError::MissingDefaultBone { point })?;
        return Ok((vec![bone_index], [1.0, 0.0, 0.0, 0.0]));
    }

    if bones.len() > 4 {
        return Err(WeldError::TooManyBones {
            point,
            count: bones.len(),
        });
    }

    let mut weights = [0.0; 4];
    for (i, (_, weight)) in bones.iter().enumerate() {
        weights[i] = *weight;
    }
    Ok((bones.iter().map(|(i, _)| *i).collect(), weights))
}

fn static_bones(
    bones: &[(usize, f32)],
    point: usize,
    default_bone: Option<usize>,
) -> Result<(Vec<usize>, [f32; 4]), WeldError> {
    let bone_index = match bones {
        [] => default_bone.ok_or(WeldError::MissingDefaultBone { point })?,
        [(bone_index, _)] => *bone_index,
        _ => {
            return Err(WeldError::MultipleStaticBones {
                point,
                count: bones.len(),
            });
        }
    };
    Ok((vec![bone_index; 4], [0.0; 4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        Loops,
        layout::{LayoutFlags, build_layout},
        skinning::{Influence, SkinWeight},
    };
    use glam::{Vec2, vec2, vec3};
    use pretty_assertions::assert_eq;

    fn quad() -> Mesh {
        // Two triangles sharing an edge with matching loop attributes.
        Mesh {
            name: "quad".to_string(),
            positions: vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(1.0, 1.0, 0.0),
                vec3(0.0, 1.0, 0.0),
            ],
            faces: vec![vec![0, 1, 2], vec![3, 4, 5]],
            loops: Loops {
                point_indices: vec![0, 1, 2, 0, 2, 3],
                uv_layers: vec![vec![
                    vec2(0.0, 0.0),
                    vec2(1.0, 0.0),
                    vec2(1.0, 1.0),
                    vec2(0.0, 0.0),
                    vec2(1.0, 1.0),
                    vec2(0.0, 1.0),
                ]],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn weights(bone_name: &str, weights: &[(u32, f32)]) -> Influence {
        Influence {
            bone_name: bone_name.to_string(),
            weights: weights
                .iter()
                .map(|(vertex_index, weight)| SkinWeight {
                    vertex_index: *vertex_index,
                    weight: *weight,
                })
                .collect(),
        }
    }

    fn weld_static(mesh: &Mesh) -> Result<WeldedMesh, WeldError> {
        let lookup: IndexMap<_, _> = [("root", 0)].into();
        weld(
            mesh,
            &build_layout(LayoutFlags::default()),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 1,
                global_bone_indices: false,
            },
        )
    }

    #[test]
    fn weld_shared_loops() {
        let welded = weld_static(&quad()).unwrap();
        assert_eq!(4, welded.vertices.len());
        assert_eq!(vec![0, 1, 2, 0, 2, 3], welded.triangles);
        assert_eq!(vec![0], welded.local_bone_indices);
        assert_eq!([0.0, 0.0, 1.0], welded.vertices[3].position);
        assert_eq!(vec![[0.0, 0.0, 0.0]], welded.vertices[3].uvs);
        assert_eq!(vec![[1.0; 4]], welded.vertices[3].colors);
    }

    #[test]
    fn weld_unique_keys() {
        let welded = weld_static(&quad()).unwrap();
        for (i, a) in welded.vertices.iter().enumerate() {
            for b in &welded.vertices[i + 1..] {
                assert!(WeldKey::new(a) != WeldKey::new(b));
            }
        }
    }

    #[test]
    fn weld_split_uv_seam() {
        let mut mesh = quad();
        mesh.loops.uv_layers[0][3] = vec2(0.5, 0.5);
        let welded = weld_static(&mesh).unwrap();
        assert_eq!(5, welded.vertices.len());
        assert_eq!(vec![0, 1, 2, 3, 2, 4], welded.triangles);
    }

    #[test]
    fn weld_is_idempotent() {
        let welded = weld_static(&quad()).unwrap();

        // Create a mesh with one loop per welded vertex and weld again.
        let mesh = Mesh {
            positions: welded
                .vertices
                .iter()
                .map(|v| crate::coordinates::vec3_from_game(v.position.into()))
                .collect(),
            loops: Loops {
                point_indices: welded.triangles.iter().map(|i| *i as usize).collect(),
                uv_layers: vec![
                    welded
                        .triangles
                        .iter()
                        .map(|i| {
                            crate::coordinates::uv_from_game(
                                welded.vertices[*i as usize].uvs[0].into(),
                            )
                        })
                        .collect(),
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        let faces: Vec<Vec<usize>> = (0..mesh.loops.len())
            .collect::<Vec<_>>()
            .chunks_exact(3)
            .map(|c| c.to_vec())
            .collect();
        let mesh = Mesh { faces, ..mesh };

        let rewelded = weld_static(&mesh).unwrap();
        assert_eq!(welded.vertices, rewelded.vertices);
        assert_eq!(welded.triangles, rewelded.triangles);
    }

    #[test]
    fn weld_weighted_four_bones() {
        let mut mesh = quad();
        mesh.influences = vec![
            weights("a", &[(0, 0.25)]),
            weights("b", &[(0, 0.25)]),
            weights("c", &[(0, 0.25), (1, 1.0)]),
            weights("d", &[(0, 0.25)]),
        ];
        let lookup: IndexMap<_, _> = [("a", 4), ("b", 3), ("c", 2), ("d", 1)].into();
        let welded = weld(
            &mesh,
            &build_layout(LayoutFlags {
                is_rigged: true,
                ..Default::default()
            }),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 5,
                global_bone_indices: false,
            },
        )
        .unwrap();

        assert_eq!([0, 1, 2, 3], welded.vertices[0].bone_indices);
        assert_eq!([0.25; 4], welded.vertices[0].bone_weights);
        assert_eq!([2, 0, 0, 0], welded.vertices[1].bone_indices);
        assert_eq!([1.0, 0.0, 0.0, 0.0], welded.vertices[1].bone_weights);
        // Points without influences use the first bone.
        assert_eq!([4, 0, 0, 0], welded.vertices[2].bone_indices);
        assert_eq!([1.0, 0.0, 0.0, 0.0], welded.vertices[2].bone_weights);
        assert_eq!(vec![4, 3, 2, 1, 0], welded.local_bone_indices);
    }

    #[test]
    fn weld_weighted_five_bones() {
        let mut mesh = quad();
        mesh.influences = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| weights(n, &[(0, 0.2)]))
            .collect();
        let lookup: IndexMap<_, _> = [("a", 0), ("b", 1), ("c", 2), ("d", 3), ("e", 4)].into();
        let result = weld(
            &mesh,
            &build_layout(LayoutFlags {
                is_rigged: true,
                ..Default::default()
            }),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 5,
                global_bone_indices: false,
            },
        );
        assert_eq!(
            Err(WeldError::TooManyBones { point: 0, count: 5 }),
            result
        );
    }

    fn weld_rigged(mesh: &Mesh, global_bone_indices: bool) -> Result<WeldedMesh, WeldError> {
        let lookup: IndexMap<_, _> = [("a", 0), ("b", 1), ("c", 2), ("d", 3), ("e", 4)].into();
        weld(
            mesh,
            &build_layout(LayoutFlags {
                is_rigged: true,
                ..Default::default()
            }),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 5,
                global_bone_indices,
            },
        )
    }

    #[test]
    fn weld_weighted_default_bone() {
        let mut mesh = quad();
        mesh.default_bone_index = Some(3);
        mesh.influences = vec![weights("b", &[(0, 1.0), (1, 1.0)])];

        let welded = weld_rigged(&mesh, false).unwrap();
        assert_eq!(vec![1, 3], welded.local_bone_indices);
        assert_eq!([1, 0, 0, 0], welded.vertices[3].bone_indices);
        assert_eq!([1.0, 0.0, 0.0, 0.0], welded.vertices[3].bone_weights);

        let welded = weld_rigged(&mesh, true).unwrap();
        assert_eq!([3, 0, 0, 0], welded.vertices[3].bone_indices);
        assert_eq!([1.0, 0.0, 0.0, 0.0], welded.vertices[3].bone_weights);
    }

    #[test]
    fn weld_combined_point_five_bones() {
        // Point 4 has the same attributes as point 0 and is combined into vertex 0.
        let mut mesh = quad();
        mesh.positions.push(mesh.positions[0]);
        mesh.loops.point_indices[3] = 4;
        mesh.influences = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| weights(n, &[(0, 0.2), (4, 0.2)]))
            .collect();
        mesh.influences[4].weights.remove(0);

        assert_eq!(
            Err(WeldError::TooManyBones { point: 4, count: 5 }),
            weld_rigged(&mesh, false)
        );
    }

    #[test]
    fn weld_unused_point_five_bones() {
        let mut mesh = quad();
        mesh.positions.push(Vec3::ONE);
        mesh.influences = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| weights(n, &[(4, 0.2)]))
            .collect();

        assert_eq!(
            Err(WeldError::TooManyBones { point: 4, count: 5 }),
            weld_rigged(&mesh, false)
        );
    }

    #[test]
    fn weld_no_bones() {
        let lookup = IndexMap::new();
        let result = weld(
            &quad(),
            &build_layout(LayoutFlags::default()),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 0,
                global_bone_indices: false,
            },
        );
        assert_eq!(Err(WeldError::MissingDefaultBone { point: 0 }), result);
    }

    #[test]
    fn weld_default_bone_out_of_range() {
        let mut mesh = quad();
        mesh.default_bone_index = Some(5);
        assert_eq!(
            Err(WeldError::DefaultBoneIndexOutOfRange { index: 5, count: 5 }),
            weld_rigged(&mesh, false)
        );
    }

    #[test]
    fn weld_secondary_tangents() {
        let mut mesh = quad();
        mesh.loops.tangents = vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 6];
        mesh.loops.secondary_tangents = Some(vec![Vec4::new(0.0, 1.0, 0.0, -1.0); 6]);

        let mut layout = build_layout(LayoutFlags::default());
        layout.members.push(flver_lib::LayoutMember::new(
            MemberType::Tangent,
            flver_lib::MemberFormat::Byte4C,
            1,
        ));

        let lookup: IndexMap<_, _> = [("root", 0)].into();
        let welded = weld(
            &mesh,
            &layout,
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 1,
                global_bone_indices: false,
            },
        )
        .unwrap();
        assert_eq!(
            vec![[1.0, 0.0, 0.0, -1.0], [0.0, 0.0, 1.0, 1.0]],
            welded.vertices[0].tangents
        );
    }

    #[test]
    fn weld_static_single_bone() {
        let mut mesh = quad();
        mesh.influences = vec![weights("b", &[(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0)])];
        let lookup: IndexMap<_, _> = [("a", 0), ("b", 1)].into();
        let welded = weld(
            &mesh,
            &build_layout(LayoutFlags::default()),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 2,
                global_bone_indices: true,
            },
        )
        .unwrap();
        assert!(welded.vertices.iter().all(|v| v.bone_indices == [1; 4]));
        assert!(welded.vertices.iter().all(|v| v.bone_weights == [0.0; 4]));
        assert_eq!(vec![1], welded.local_bone_indices);
    }

    #[test]
    fn weld_static_multiple_bones() {
        let mut mesh = quad();
        mesh.influences = vec![weights("a", &[(2, 0.5)]), weights("b", &[(2, 0.5)])];
        let lookup: IndexMap<_, _> = [("a", 0), ("b", 1)].into();
        let result = weld(
            &mesh,
            &build_layout(LayoutFlags::default()),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 2,
                global_bone_indices: false,
            },
        );
        assert_eq!(
            Err(WeldError::MultipleStaticBones { point: 2, count: 2 }),
            result
        );
    }

    #[test]
    fn weld_empty_mesh() {
        assert_eq!(Err(WeldError::EmptyMesh), weld_static(&Mesh::default()));
    }

    #[test]
    fn weld_non_triangle_face() {
        let mut mesh = quad();
        mesh.faces = vec![vec![0, 1, 2, 5]];
        assert_eq!(
            Err(WeldError::NonTriangularFace { face: 0, count: 4 }),
            weld_static(&mesh)
        );
    }

    #[test]
    fn weld_missing_uv_layer() {
        let mut mesh = quad();
        mesh.loops.uv_layers = Vec::new();
        assert_eq!(
            Err(WeldError::MissingUvLayer {
                required: 1,
                count: 0
            }),
            weld_static(&mesh)
        );
    }

    #[test]
    fn weld_loop_out_of_range() {
        let mut mesh = quad();
        mesh.faces[1] = vec![3, 4, 6];
        assert_eq!(
            Err(WeldError::LoopIndexOutOfRange {
                face: 1,
                index: 6,
                count: 6
            }),
            weld_static(&mesh)
        );
    }

    #[test]
    fn computed_bitangent() {
        let mut mesh = quad();
        mesh.loops.normals = vec![Vec3::Z; 6];
        mesh.loops.tangents = vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 6];
        mesh.loops.uv_layers.push(vec![Vec2::ZERO; 6]);

        let lookup = IndexMap::new();
        let welded = weld(
            &mesh,
            &build_layout(LayoutFlags {
                is_multiple: true,
                ..Default::default()
            }),
            WeldSettings {
                bone_lookup: &lookup,
                bone_count: 1,
                global_bone_indices: false,
            },
        )
        .unwrap();

        // Z cross X is Y in the scene which is Z in game.
        assert_eq!([0.0, 0.0, 1.0, -1.0], welded.vertices[0].bitangent);
        assert_eq!(vec![[1.0, 0.0, 0.0, -1.0]], welded.vertices[0].tangents);
        assert_eq!([0.0, 1.0, 0.0], welded.vertices[0].normal);
    }
}
