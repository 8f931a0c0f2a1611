//! Conversions between per bone influences and per vertex bone indices and weights.
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::error::WeldError;

// Using a bone name allows influences to remain valid when bones are reordered.
// Names are resolved to indices when creating vertices.
#[derive(Debug, PartialEq, Clone)]
pub struct Influence {
    pub bone_name: String,
    pub weights: Vec<SkinWeight>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SkinWeight {
    /// The index of the point in [positions](struct.Mesh.html#structfield.positions).
    pub vertex_index: u32,
    pub weight: f32,
}

/// Points sharing the same bone assignment.
#[derive(Debug, PartialEq, Clone)]
pub enum WeightGroup {
    /// Points fully attached to a single bone without weights.
    Rigid {
        bone_index: usize,
        point_indices: Vec<usize>,
    },
    /// Points influenced by a bone with the same weight.
    Weighted {
        bone_index: usize,
        weight: f32,
        point_indices: Vec<usize>,
    },
}

/// The nonzero `(bone index, weight)` pairs for each point in influence order.
///
/// Bone names are resolved to indices using `bone_lookup`.
pub fn point_bone_weights(
    influences: &[Influence],
    point_count: usize,
    bone_lookup: &IndexMap<&str, usize>,
) -> Result<Vec<Vec<(usize, f32)>>, WeldError> {
    let mut point_weights = vec![Vec::new(); point_count];
    for influence in influences {
        let bone_index = *bone_lookup
            .get(influence.bone_name.as_str())
            .ok_or_else(|| WeldError::UnknownBoneName {
                name: influence.bone_name.clone(),
            })?;

        for w in &influence.weights {
            if w.weight == 0.0 {
                continue;
            }
            let index = w.vertex_index as usize;
            point_weights
                .get_mut(index)
                .ok_or(WeldError::PointIndexOutOfRange {
                    index,
                    count: point_count,
                })?
                .push((bone_index, w.weight));
        }
    }
    Ok(point_weights)
}

/// Group points by their bone assignment.
///
/// Points with all zero weights are [WeightGroup::Rigid] using the bone in the first slot.
/// Zero weights are ignored for all other points.
/// Groups are ordered by first occurrence.
pub fn weight_groups(bone_indices: &[[usize; 4]], bone_weights: &[[f32; 4]]) -> Vec<WeightGroup> {
    let mut rigid = IndexMap::<usize, Vec<usize>>::new();
    let mut weighted = IndexMap::<(usize, OrderedFloat<f32>), Vec<usize>>::new();

    for (point, (indices, weights)) in bone_indices.iter().zip(bone_weights).enumerate() {
        if weights.iter().all(|w| *w == 0.0) {
            rigid.entry(indices[0]).or_default().push(point);
            continue;
        }

        // Combine slots that reference the same bone.
        let mut combined = IndexMap::<usize, f32>::new();
        for (index, weight) in indices.iter().zip(weights) {
            if *weight != 0.0 {
                *combined.entry(*index).or_default() += weight;
            }
        }

        for (index, weight) in combined {
            weighted
                .entry((index, OrderedFloat(weight)))
                .or_default()
                .push(point);
        }
    }

    rigid
        .into_iter()
        .map(|(bone_index, point_indices)| WeightGroup::Rigid {
            bone_index,
            point_indices,
        })
        .chain(
            weighted
                .into_iter()
                .map(|((bone_index, weight), point_indices)| WeightGroup::Weighted {
                    bone_index,
                    weight: weight.0,
                    point_indices,
                }),
        )
        .collect()
}

/// Convert weight groups to an [Influence] for each referenced bone in `bone_names`.
///
/// Rigid points have a weight of `1.0`.
pub fn influences_from_weight_groups(
    groups: &[WeightGroup],
    bone_names: &[String],
) -> Vec<Influence> {
    let mut weights = IndexMap::<usize, Vec<SkinWeight>>::new();
    for group in groups {
        let (bone_index, weight, point_indices) = match group {
            WeightGroup::Rigid {
                bone_index,
                point_indices,
            } => (*bone_index, 1.0, point_indices),
            WeightGroup::Weighted {
                bone_index,
                weight,
                point_indices,
            } => (*bone_index, *weight, point_indices),
        };
        weights
            .entry(bone_index)
            .or_default()
            .extend(point_indices.iter().map(|i| SkinWeight {
                vertex_index: *i as u32,
                weight,
            }));
    }

    weights
        .into_iter()
        .filter_map(|(bone_index, mut weights)| {
            weights.sort_by_key(|w| w.vertex_index);
            Some(Influence {
                bone_name: bone_names.get(bone_index)?.clone(),
                weights,
            })
        })
        .collect()
}
