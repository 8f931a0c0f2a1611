use flver_lib::{BufferLayout, FaceSet, FaceSetFlags, Flver, FlverHeader, VertexBuffer};
use indexmap::IndexMap;
use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    Bone, BoneSpace, CreateFlverError, ExportSettings, IndexMapExt, Material, Mesh, ModelRoot,
    Skeleton, Transform, ValidationWarning,
    bounds::{BoundingBox, compute_bounds, weighted_bone_bounds},
    coordinates::transform_to_game,
    layout::{LayoutFlags, build_layout},
    model::{BoneBounds, BoneIndexing},
    shader::{ShaderInfo, ShaderLookup},
    weld::{WeldSettings, WeldedMesh, weld},
};

// The full detail face set and two lower levels of detail.
const MAX_FACE_SETS: usize = 3;

impl ModelRoot {
    /// Convert this model to a new FLVER document.
    ///
    /// Vertex layouts and required textures are selected using the shader information in `shaders`.
    /// Materials without any shader information use the layout for a single texture set.
    #[tracing::instrument(skip_all)]
    pub fn to_flver(
        &self,
        shaders: &impl ShaderLookup,
        settings: &ExportSettings,
    ) -> Result<(Flver, Vec<ValidationWarning>), CreateFlverError> {
        let mut warnings = Vec::new();

        self.skeleton.validate()?;
        let (local_transforms, warning) = self.skeleton.local_transforms()?;
        warnings.extend(warning);

        let local_transforms: Vec<_> = local_transforms.into_iter().map(transform_to_game).collect();

        // Dummies use the same model space transforms the game calculates from the local transforms.
        let absolute_transforms = Skeleton {
            bones: self
                .skeleton
                .bones
                .iter()
                .zip(&local_transforms)
                .map(|(b, t)| Bone {
                    transform: *t,
                    space: BoneSpace::Pose,
                    ..b.clone()
                })
                .collect(),
        }
        .model_space_transforms()?;

        let mut header = FlverHeader {
            endian: self.header.endian,
            version: self.header.version,
            bounding_box_min: [0.0; 3],
            bounding_box_max: [0.0; 3],
            unicode: self.header.unicode,
            unk4a: self.header.unk4a,
            unk4c: self.header.unk4c,
            unk5c: self.header.unk5c,
            unk5d: self.header.unk5d,
            unk68: self.header.unk68,
        };

        let bone_indexing = settings
            .bone_indexing
            .unwrap_or_else(|| BoneIndexing::from_header(&header));
        let global_bone_indices = bone_indexing == BoneIndexing::Global;

        let shader_infos: Vec<_> = self
            .materials
            .iter()
            .map(|m| {
                shaders.shader_info(&m.mat_def_path).unwrap_or_else(|| {
                    debug!("No shader info for {:?}", m.mat_def_path);
                    ShaderInfo::default()
                })
            })
            .collect();

        let (layouts, mesh_layout_indices) = self.mesh_layouts(&shader_infos)?;

        let bone_lookup = self.skeleton.bone_lookup();
        let weld_settings = WeldSettings {
            bone_lookup: &bone_lookup,
            bone_count: self.skeleton.bones.len(),
            global_bone_indices,
        };
        let weld_mesh = |(mesh, layout_index): (&Mesh, &usize)| {
            weld(mesh, &layouts[*layout_index], weld_settings).map_err(|source| {
                CreateFlverError::Mesh {
                    mesh: mesh.name.clone(),
                    source,
                }
            })
        };

        // Parallel iterators preserve the original mesh order.
        let welded_meshes: Vec<WeldedMesh> = if settings.parallel {
            self.meshes
                .par_iter()
                .zip(mesh_layout_indices.par_iter())
                .map(weld_mesh)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.meshes
                .iter()
                .zip(mesh_layout_indices.iter())
                .map(weld_mesh)
                .collect::<Result<Vec<_>, _>>()?
        };
        debug!("Created vertices for {} meshes", welded_meshes.len());

        let has_mesh_bounding_boxes = header.has_mesh_bounding_boxes();

        let meshes: Vec<_> = self
            .meshes
            .iter()
            .zip(welded_meshes)
            .zip(mesh_layout_indices)
            .map(|((mesh, welded), layout_index)| flver_lib::Mesh {
                dynamic: mesh.is_bind_pose,
                material_index: mesh.material_index as i32,
                default_bone_index: mesh.default_bone_index.map(|i| i as i32).unwrap_or(-1),
                bone_indices: if global_bone_indices {
                    Vec::new()
                } else {
                    welded
                        .local_bone_indices
                        .iter()
                        .map(|i| *i as i32)
                        .collect()
                },
                bounding_box: BoundingBox::from_vertices(&welded.vertices)
                    .filter(|_| has_mesh_bounding_boxes)
                    .map(|b| flver_lib::BoundingBox {
                        min: b.min.to_array(),
                        max: b.max.to_array(),
                        unk: None,
                    }),
                face_sets: face_sets(&welded.triangles, mesh.cull_back_faces, settings),
                vertex_buffers: vec![VertexBuffer {
                    layout_index: layout_index as i32,
                }],
                vertices: welded.vertices,
            })
            .collect();

        for (material, shader) in self.materials.iter().zip(&shader_infos) {
            warnings.extend(material.validate_textures(shader));
        }

        let dummies = self
            .dummies
            .iter()
            .enumerate()
            .map(|(i, d)| d.to_document(i, &bone_lookup, &absolute_transforms))
            .collect::<Result<Vec<_>, _>>()?;

        let model_bounds = compute_bounds(&meshes, &mut warnings);
        let bone_bounds = match settings.bone_bounds {
            BoneBounds::Model => vec![model_bounds; self.skeleton.bones.len()],
            BoneBounds::Weighted => weighted_bone_bounds(
                &meshes,
                self.skeleton.bones.len(),
                global_bone_indices,
                model_bounds,
            ),
        };

        let bones = self
            .skeleton
            .bones
            .iter()
            .zip(local_transforms)
            .zip(bone_bounds)
            .map(|((bone, transform), bounds)| bone_document(bone, transform, bounds))
            .collect();

        for warning in &warnings {
            warn!("{warning}");
        }

        header.bounding_box_min = model_bounds.min.to_array();
        header.bounding_box_max = model_bounds.max.to_array();

        Ok((
            Flver {
                header,
                dummies,
                materials: self.materials.iter().map(Material::to_document).collect(),
                bones,
                meshes,
                buffer_layouts: layouts,
            },
            warnings,
        ))
    }

    // Find the unique layouts and the layout index for each mesh.
    fn mesh_layouts(
        &self,
        shader_infos: &[ShaderInfo],
    ) -> Result<(Vec<BufferLayout>, Vec<usize>), CreateFlverError> {
        let mut layouts = IndexMap::new();
        let mesh_layout_indices = self
            .meshes
            .iter()
            .map(|mesh| {
                shader_infos
                    .get(mesh.material_index)
                    .map(|shader| {
                        let layout = build_layout(LayoutFlags::new(shader, mesh.is_bind_pose));
                        layouts.entry_index(layout)
                    })
                    .ok_or_else(|| CreateFlverError::MaterialIndexOutOfRange {
                        mesh: mesh.name.clone(),
                        index: mesh.material_index,
                        count: shader_infos.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((layouts.into_keys().collect(), mesh_layout_indices))
    }
}

fn face_sets(triangles: &[u32], cull_back_faces: bool, settings: &ExportSettings) -> Vec<FaceSet> {
    let count = settings.face_set_count.clamp(1, MAX_FACE_SETS);
    let mut flags: Vec<_> = (0..count).map(|lod| face_set_flags(lod, false)).collect();
    if settings.motion_blur_face_sets {
        flags.extend((0..count).map(|lod| face_set_flags(lod, true)));
    }

    // Lower detail face sets use the same triangles.
    flags
        .into_iter()
        .map(|flags| FaceSet {
            flags,
            triangle_strip: false,
            cull_back_faces,
            unk06: 0,
            indices: triangles.to_vec(),
        })
        .collect()
}

fn face_set_flags(lod: usize, motion_blur: bool) -> FaceSetFlags {
    FaceSetFlags::new(
        Default::default(),
        lod == 1,
        lod == 2,
        Default::default(),
        false,
        motion_blur,
    )
}

fn bone_document(bone: &Bone, transform: Transform, bounds: BoundingBox) -> flver_lib::Bone {
    let index = |i: Option<usize>| i.map(|i| i as i16).unwrap_or(-1);
    flver_lib::Bone {
        name: bone.name.clone(),
        translation: transform.translation.to_array(),
        rotation: transform.euler().to_array(),
        scale: transform.scale.to_array(),
        parent_index: index(bone.parent_index),
        child_index: index(bone.child_index),
        next_sibling_index: index(bone.next_sibling_index),
        previous_sibling_index: index(bone.previous_sibling_index),
        bounding_box_min: bounds.min.to_array(),
        bounding_box_max: bounds.max.to_array(),
        unk3c: bone.unk3c,
    }
}
