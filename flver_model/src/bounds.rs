//! Axis aligned bounding boxes for the model, bones, and meshes.
use flver_lib::Vertex;
use glam::Vec3;

use crate::ValidationWarning;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// The bounds of `points` or `None` if there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                Some(Self { min, max }) => Self {
                    min: min.min(p),
                    max: max.max(p),
                },
                None => Self { min: p, max: p },
            })
        })
    }

    pub fn from_vertices<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> Option<Self> {
        Self::from_points(vertices.into_iter().map(|v| Vec3::from(v.position)))
    }
}

/// The bounds of all vertex positions in `meshes`.
///
/// Models without vertices use [BoundingBox::ZERO] and add [ValidationWarning::EmptyBoundingBox].
pub fn compute_bounds(
    meshes: &[flver_lib::Mesh],
    warnings: &mut Vec<ValidationWarning>,
) -> BoundingBox {
    BoundingBox::from_vertices(meshes.iter().flat_map(|m| &m.vertices)).unwrap_or_else(|| {
        warnings.push(ValidationWarning::EmptyBoundingBox);
        BoundingBox::ZERO
    })
}

/// The bounds of the vertices with a nonzero weight or rigid assignment for each bone.
///
/// Bones without any vertices use `model_bounds`.
/// The `global_bone_indices` should match how the vertex bone indices were written.
pub fn weighted_bone_bounds(
    meshes: &[flver_lib::Mesh],
    bone_count: usize,
    global_bone_indices: bool,
    model_bounds: BoundingBox,
) -> Vec<BoundingBox> {
    let mut bounds: Vec<Option<BoundingBox>> = vec![None; bone_count];

    for mesh in meshes {
        for vertex in &mesh.vertices {
            let is_rigid = vertex.bone_weights.iter().all(|w| *w == 0.0);
            for (index, weight) in vertex.bone_indices.iter().zip(vertex.bone_weights) {
                if !is_rigid && weight == 0.0 {
                    continue;
                }

                let global_index = if global_bone_indices {
                    usize::try_from(*index).ok()
                } else {
                    usize::try_from(*index)
                        .ok()
                        .and_then(|i| mesh.bone_indices.get(i))
                        .and_then(|i| usize::try_from(*i).ok())
                };

                if let Some(b) = global_index.and_then(|i| bounds.get_mut(i)) {
                    let p = Vec3::from(vertex.position);
                    *b = Some(match *b {
                        Some(BoundingBox { min, max }) => BoundingBox {
                            min: min.min(p),
                            max: max.max(p),
                        },
                        None => BoundingBox { min: p, max: p },
                    });
                }
            }
        }
    }

    bounds
        .into_iter()
        .map(|b| b.unwrap_or(model_bounds))
        .collect()
}
