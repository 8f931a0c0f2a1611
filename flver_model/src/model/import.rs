use flver_lib::{BufferLayout, Flver, MemberType, Vertex};
use glam::{Vec2, Vec4};
use log::{debug, warn};

use crate::{
    Bone, BoneSpace, Dummy, HeaderProperties, ImportSettings, LoadFlverError, Loops, Material,
    Mesh, ModelRoot, Skeleton, Transform, ValidationWarning,
    coordinates::{tangent_from_game, transform_from_game, uv_from_game, vec3_from_game},
    shader::ShaderInfo,
    skinning::{influences_from_weight_groups, weight_groups},
};

impl ModelRoot {
    /// Convert a FLVER document to an editable model.
    ///
    /// Vertices are not combined, so each vertex becomes a point.
    /// Only the first face set of each mesh is used.
    #[tracing::instrument(skip_all)]
    pub fn from_flver(
        flver: &Flver,
        settings: &ImportSettings,
    ) -> Result<(Self, Vec<ValidationWarning>), LoadFlverError> {
        let mut warnings = Vec::new();

        let pose_skeleton = Skeleton {
            bones: flver
                .bones
                .iter()
                .map(|b| Bone {
                    name: b.name.clone(),
                    transform: Transform::from_euler(
                        b.translation.into(),
                        b.rotation.into(),
                        b.scale.into(),
                    ),
                    space: BoneSpace::Pose,
                    parent_index: b.parent(),
                    child_index: b.child(),
                    next_sibling_index: b.next_sibling(),
                    previous_sibling_index: b.previous_sibling(),
                    unk3c: b.unk3c,
                })
                .collect(),
        };
        pose_skeleton.validate()?;
        let absolute_transforms = pose_skeleton.model_space_transforms()?;

        let bone_names: Vec<_> = flver.bones.iter().map(|b| b.name.clone()).collect();

        let meshes = flver
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| import_mesh(flver, i, mesh, &bone_names))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Imported {} meshes", meshes.len());

        let materials: Vec<_> = flver.materials.iter().map(Material::from_document).collect();
        for material in &materials {
            warnings.extend(material.validate_textures(&ShaderInfo::default()));
        }

        let dummies = flver
            .dummies
            .iter()
            .enumerate()
            .map(|(i, d)| Dummy::from_document(d, i, &bone_names, &absolute_transforms))
            .collect::<Result<Vec<_>, _>>()?;

        let skeleton = Skeleton {
            bones: pose_skeleton
                .bones
                .into_iter()
                .zip(absolute_transforms)
                .map(|(bone, absolute)| match settings.bone_space {
                    BoneSpace::Edit => Bone {
                        transform: transform_from_game(absolute),
                        space: BoneSpace::Edit,
                        ..bone
                    },
                    BoneSpace::Pose => Bone {
                        transform: transform_from_game(bone.transform),
                        ..bone
                    },
                })
                .collect(),
        };

        for warning in &warnings {
            warn!("{warning}");
        }

        let header = &flver.header;
        Ok((
            Self {
                name: String::new(),
                header: HeaderProperties {
                    endian: header.endian,
                    version: header.version,
                    unicode: header.unicode,
                    unk4a: header.unk4a,
                    unk4c: header.unk4c,
                    unk5c: header.unk5c,
                    unk5d: header.unk5d,
                    unk68: header.unk68,
                },
                skeleton,
                materials,
                meshes,
                dummies,
            },
            warnings,
        ))
    }
}

fn import_mesh(
    flver: &Flver,
    mesh_index: usize,
    mesh: &flver_lib::Mesh,
    bone_names: &[String],
) -> Result<Mesh, LoadFlverError> {
    let material = mesh
        .material()
        .and_then(|i| flver.materials.get(i))
        .ok_or(LoadFlverError::MaterialIndexOutOfRange {
            mesh: mesh_index,
            index: mesh.material_index,
            count: flver.materials.len(),
        })?;

    let buffer = mesh
        .vertex_buffers
        .first()
        .ok_or(LoadFlverError::MissingVertexBuffer { mesh: mesh_index })?;
    let layout = buffer
        .layout()
        .and_then(|i| flver.buffer_layouts.get(i))
        .ok_or(LoadFlverError::LayoutIndexOutOfRange {
            mesh: mesh_index,
            index: buffer.layout_index,
            count: flver.buffer_layouts.len(),
        })?;

    let face_set = mesh.face_sets.first();
    let triangles = face_set.map(|f| f.triangles()).unwrap_or_default();
    let point_indices = triangles
        .iter()
        .flatten()
        .map(|i| {
            let index = *i as usize;
            if index < mesh.vertices.len() {
                Ok(index)
            } else {
                Err(LoadFlverError::VertexIndexOutOfRange {
                    mesh: mesh_index,
                    index: *i,
                    count: mesh.vertices.len(),
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (bone_indices, bone_weights) = vertex_bones(mesh_index, mesh, bone_names.len())?;
    let groups = weight_groups(&bone_indices, &bone_weights);

    Ok(Mesh {
        name: material.name.clone(),
        material_index: mesh.material_index as usize,
        is_bind_pose: mesh.dynamic,
        default_bone_index: usize::try_from(mesh.default_bone_index).ok(),
        cull_back_faces: face_set.map(|f| f.cull_back_faces).unwrap_or_default(),
        positions: mesh
            .vertices
            .iter()
            .map(|v| vec3_from_game(v.position.into()))
            .collect(),
        influences: influences_from_weight_groups(&groups, bone_names),
        faces: (0..triangles.len())
            .map(|i| vec![i * 3, i * 3 + 1, i * 3 + 2])
            .collect(),
        loops: loops(&mesh.vertices, layout, point_indices),
    })
}

// Each triangle corner becomes a loop with the attributes of its vertex.
fn loops(vertices: &[Vertex], layout: &BufferLayout, point_indices: Vec<usize>) -> Loops {
    let loop_vertices = || point_indices.iter().map(|i| &vertices[*i]);

    Loops {
        normals: loop_vertices()
            .map(|v| vec3_from_game(v.normal.into()))
            .collect(),
        tangents: loop_vertices().map(|v| vertex_tangent(v, 0)).collect(),
        secondary_tangents: (layout.tangent_count() > 1)
            .then(|| loop_vertices().map(|v| vertex_tangent(v, 1)).collect()),
        bitangents: layout.contains(MemberType::Bitangent).then(|| {
            loop_vertices()
                .map(|v| tangent_from_game(v.bitangent.into()))
                .collect()
        }),
        uv_layers: (0..layout.uv_count())
            .map(|i| {
                loop_vertices()
                    .map(|v| v.uvs.get(i).map(|uv| uv_from_game((*uv).into())).unwrap_or(Vec2::ZERO))
                    .collect()
            })
            .collect(),
        color_layers: (0..layout.color_count())
            .map(|i| {
                loop_vertices()
                    .map(|v| v.colors.get(i).map(|c| Vec4::from(*c)).unwrap_or(Vec4::ONE))
                    .collect()
            })
            .collect(),
        point_indices,
    }
}

fn vertex_tangent(vertex: &Vertex, index: usize) -> Vec4 {
    vertex
        .tangents
        .get(index)
        .map(|t| tangent_from_game(Vec4::from(*t)))
        .unwrap_or(Vec4::new(1.0, 0.0, 0.0, 1.0))
}

// Resolve the skeleton index for each vertex bone slot.
// Unused slots with zero weights are not validated.
#[allow(clippy::type_complexity)]
fn vertex_bones(
    mesh_index: usize,
    mesh: &flver_lib::Mesh,
    bone_count: usize,
) -> Result<(Vec<[usize; 4]>, Vec<[f32; 4]>), LoadFlverError> {
    // Meshes without a bone table use skeleton indices.
    let is_local = !mesh.bone_indices.is_empty();

    let resolve = |index: i32| -> Result<usize, LoadFlverError> {
        let global_index = if is_local {
            usize::try_from(index)
                .ok()
                .and_then(|i| mesh.bone_indices.get(i).copied())
                .ok_or(LoadFlverError::MeshBoneIndexOutOfRange {
                    mesh: mesh_index,
                    index,
                    count: mesh.bone_indices.len(),
                })?
        } else {
            index
        };
        usize::try_from(global_index)
            .ok()
            .filter(|i| *i < bone_count)
            .ok_or(LoadFlverError::MeshBoneIndexOutOfRange {
                mesh: mesh_index,
                index: global_index,
                count: bone_count,
            })
    };

    let mut bone_indices = Vec::with_capacity(mesh.vertices.len());
    let mut bone_weights = Vec::with_capacity(mesh.vertices.len());
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        let is_rigid = vertex.bone_weights.iter().all(|w| *w == 0.0);
        if is_rigid && vertex.bone_indices.iter().any(|b| *b != vertex.bone_indices[0]) {
            warn!(
                "Mesh {mesh_index} vertex {i} has zero weights for bone indices {:?}. Using the first bone.",
                vertex.bone_indices
            );
        }
        let mut indices = [0; 4];
        for i in 0..4 {
            if is_rigid || vertex.bone_weights[i] != 0.0 {
                indices[i] = resolve(vertex.bone_indices[i])?;
            }
        }
        bone_indices.push(indices);
        bone_weights.push(vertex.bone_weights);
    }
    Ok((bone_indices, bone_weights))
}
