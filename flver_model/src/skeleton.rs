//! Bone hierarchies in model space or relative to their parent.
use indexmap::IndexMap;

use crate::{Transform, ValidationWarning, error::BoneHierarchyError};

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Skeleton {
    /// The hierarchy of bones in the skeleton.
    /// Parents may appear before or after their children.
    pub bones: Vec<Bone>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Bone {
    /// The name used to refer to this bone in influences and dummies.
    pub name: String,
    /// The transform in the space given by [space](#structfield.space).
    pub transform: Transform,
    pub space: BoneSpace,
    /// The index of the parent [Bone] in [bones](struct.Skeleton.html#structfield.bones)
    /// or `None` if this is a root bone.
    pub parent_index: Option<usize>,
    pub child_index: Option<usize>,
    pub next_sibling_index: Option<usize>,
    pub previous_sibling_index: Option<usize>,
    pub unk3c: i32,
}

/// The space for a [Bone] transform.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum BoneSpace {
    /// The transform is in model space like bones in the rest pose of modeling applications.
    #[default]
    Edit,
    /// The transform is relative to the parent bone.
    Pose,
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        space: BoneSpace,
        parent_index: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            transform,
            space,
            parent_index,
            child_index: None,
            next_sibling_index: None,
            previous_sibling_index: None,
            unk3c: 0,
        }
    }
}

impl Skeleton {
    /// Check for duplicate names, out of range indices, and parent cycles.
    pub fn validate(&self) -> Result<(), BoneHierarchyError> {
        let mut names = IndexMap::new();
        for (i, bone) in self.bones.iter().enumerate() {
            if let Some(first) = names.insert(bone.name.as_str(), i) {
                return Err(BoneHierarchyError::DuplicateBoneName {
                    name: bone.name.clone(),
                    first,
                    second: i,
                });
            }
        }

        let count = self.bones.len();
        for bone in &self.bones {
            for (link, index) in [
                ("parent", bone.parent_index),
                ("child", bone.child_index),
                ("next sibling", bone.next_sibling_index),
                ("previous sibling", bone.previous_sibling_index),
            ] {
                if let Some(index) = index.filter(|i| *i >= count) {
                    return Err(BoneHierarchyError::BoneIndexOutOfRange {
                        bone: bone.name.clone(),
                        link,
                        index,
                        count,
                    });
                }
            }
        }

        // Mark bones with the first bone whose parent chain reached them.
        let mut visited: Vec<Option<usize>> = vec![None; count];
        for start in 0..count {
            let mut current = Some(start);
            while let Some(i) = current {
                match visited[i] {
                    Some(s) if s == start => {
                        return Err(BoneHierarchyError::BoneCycle {
                            bone: self.bones[i].name.clone(),
                        });
                    }
                    Some(_) => break,
                    None => visited[i] = Some(start),
                }
                current = self.bones[i].parent_index;
            }
        }

        Ok(())
    }

    /// The index of each bone by name.
    pub fn bone_lookup(&self) -> IndexMap<&str, usize> {
        self.bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect()
    }

    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.bones.iter().map(|b| b.parent_index).collect()
    }

    /// The model space transform of each bone.
    ///
    /// [BoneSpace::Edit] bones are already in model space.
    /// [BoneSpace::Pose] bones are accumulated through their parents.
    pub fn model_space_transforms(&self) -> Result<Vec<Transform>, BoneHierarchyError> {
        let count = self.bones.len();
        let mut resolved: Vec<Option<Transform>> = vec![None; count];
        let mut visited: Vec<Option<usize>> = vec![None; count];

        for start in 0..count {
            // Find the bones up to the first bone with a known model space transform.
            let mut chain = Vec::new();
            let mut base = Transform::IDENTITY;
            let mut current = Some(start);
            while let Some(i) = current {
                let bone = self.bones.get(i).ok_or_else(|| {
                    let child = &self.bones[*chain.last().unwrap_or(&start)];
                    BoneHierarchyError::BoneIndexOutOfRange {
                        bone: child.name.clone(),
                        link: "parent",
                        index: i,
                        count,
                    }
                })?;
                if let Some(transform) = resolved[i] {
                    base = transform;
                    break;
                }
                if visited[i] == Some(start) {
                    return Err(BoneHierarchyError::BoneCycle {
                        bone: bone.name.clone(),
                    });
                }
                visited[i] = Some(start);
                chain.push(i);

                if bone.space == BoneSpace::Edit {
                    break;
                }
                current = bone.parent_index;
            }

            for i in chain.into_iter().rev() {
                let bone = &self.bones[i];
                let transform = match bone.space {
                    BoneSpace::Edit => bone.transform,
                    BoneSpace::Pose => base * bone.transform,
                };
                resolved[i] = Some(transform);
                base = transform;
            }
        }

        Ok(resolved.into_iter().flatten().collect())
    }

    /// The parent relative transform of each bone.
    ///
    /// Skeletons that mix [BoneSpace::Edit] and [BoneSpace::Pose] bones
    /// are converted to model space first and return [ValidationWarning::MixedBoneSpaces].
    pub fn local_transforms(
        &self,
    ) -> Result<(Vec<Transform>, Option<ValidationWarning>), BoneHierarchyError> {
        let pose_count = self
            .bones
            .iter()
            .filter(|b| b.space == BoneSpace::Pose)
            .count();
        if pose_count == self.bones.len() {
            return Ok((self.bones.iter().map(|b| b.transform).collect(), None));
        }

        let warning = (pose_count > 0).then_some(ValidationWarning::MixedBoneSpaces);
        let absolute = self.model_space_transforms()?;
        Ok((local_from_absolute(&absolute, &self.parent_indices()), warning))
    }
}

/// Convert model space transforms to transforms relative to the parent.
///
/// The scale is always the model space scale of the bone and is not divided by the parent scale.
pub fn local_from_absolute(absolute: &[Transform], parent_indices: &[Option<usize>]) -> Vec<Transform> {
    absolute
        .iter()
        .zip(parent_indices)
        .map(|(transform, parent)| match parent.and_then(|p| absolute.get(p)) {
            Some(parent) => Transform {
                scale: transform.scale,
                ..parent.inverse() * *transform
            },
            None => *transform,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::{Mat3, vec3};
    use pretty_assertions::assert_eq;

    macro_rules! assert_matrix_relative_eq {
        ($a:expr, $b:expr) => {
            assert!(
                $a.to_cols_array()
                    .iter()
                    .zip($b.to_cols_array().iter())
                    .all(|(a, b)| approx::relative_eq!(a, b, epsilon = 0.0001f32)),
                "Matrices not equal to within 0.0001.\nleft = {:?}\nright = {:?}",
                $a,
                $b
            )
        };
    }

    fn transform(translation: [f32; 3], euler: [f32; 3]) -> Transform {
        Transform::from_euler(translation.into(), euler.into(), glam::Vec3::ONE)
    }

    fn edit_skeleton() -> Skeleton {
        Skeleton {
            bones: vec![
                Bone::new(
                    "root",
                    transform([0.0, 1.0, 0.0], [0.0, 0.5, 0.0]),
                    BoneSpace::Edit,
                    None,
                ),
                Bone::new(
                    "spine",
                    transform([0.5, 2.0, 0.0], [0.25, 0.5, 0.0]),
                    BoneSpace::Edit,
                    Some(0),
                ),
                Bone::new(
                    "head",
                    transform([0.5, 3.0, 1.0], [0.25, 0.75, -0.5]),
                    BoneSpace::Edit,
                    Some(1),
                ),
            ],
        }
    }

    #[test]
    fn edit_bones_round_trip() {
        let skeleton = edit_skeleton();
        let (local, warning) = skeleton.local_transforms().unwrap();
        assert_eq!(None, warning);
        assert_eq!(skeleton.bones[0].transform, local[0]);

        let pose = Skeleton {
            bones: skeleton
                .bones
                .iter()
                .zip(local)
                .map(|(b, t)| Bone {
                    transform: t,
                    space: BoneSpace::Pose,
                    ..b.clone()
                })
                .collect(),
        };
        let absolute = pose.model_space_transforms().unwrap();
        for (bone, transform) in skeleton.bones.iter().zip(absolute) {
            assert_matrix_relative_eq!(bone.transform.to_matrix(), transform.to_matrix());
        }
    }

    #[test]
    fn edit_bones_keep_model_space_scale() {
        let skeleton = Skeleton {
            bones: vec![
                Bone::new(
                    "parent",
                    Transform {
                        scale: vec3(2.0, 2.0, 2.0),
                        ..Transform::IDENTITY
                    },
                    BoneSpace::Edit,
                    None,
                ),
                Bone::new(
                    "child",
                    Transform {
                        translation: vec3(0.0, 1.0, 0.0),
                        scale: vec3(3.0, 3.0, 3.0),
                        ..Transform::IDENTITY
                    },
                    BoneSpace::Edit,
                    Some(0),
                ),
            ],
        };
        let (local, _) = skeleton.local_transforms().unwrap();
        assert_eq!(vec3(3.0, 3.0, 3.0), local[1].scale);
        assert_eq!(vec3(0.0, 1.0, 0.0), local[1].translation);
    }

    #[test]
    fn pose_bones_pass_through() {
        let mut skeleton = edit_skeleton();
        for bone in &mut skeleton.bones {
            bone.space = BoneSpace::Pose;
        }
        let (local, warning) = skeleton.local_transforms().unwrap();
        assert_eq!(None, warning);
        assert_eq!(
            skeleton.bones.iter().map(|b| b.transform).collect::<Vec<_>>(),
            local
        );
    }

    #[test]
    fn mixed_bone_spaces() {
        let skeleton = Skeleton {
            bones: vec![
                // The pose bone's parent appears after it.
                Bone::new(
                    "child",
                    Transform {
                        translation: vec3(0.0, 0.0, 1.0),
                        ..Transform::IDENTITY
                    },
                    BoneSpace::Pose,
                    Some(1),
                ),
                Bone::new(
                    "root",
                    Transform {
                        translation: vec3(1.0, 0.0, 0.0),
                        rotation: Mat3::from_rotation_x(std::f32::consts::FRAC_PI_2),
                        scale: glam::Vec3::ONE,
                    },
                    BoneSpace::Edit,
                    None,
                ),
            ],
        };
        let absolute = skeleton.model_space_transforms().unwrap();
        assert!(absolute[0].translation.abs_diff_eq(vec3(1.0, -1.0, 0.0), 1e-6));

        let (local, warning) = skeleton.local_transforms().unwrap();
        assert_eq!(Some(ValidationWarning::MixedBoneSpaces), warning);
        assert!(local[0].translation.abs_diff_eq(vec3(0.0, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn validate_parent_cycle() {
        let skeleton = Skeleton {
            bones: vec![
                Bone::new("a", Transform::IDENTITY, BoneSpace::Pose, Some(1)),
                Bone::new("b", Transform::IDENTITY, BoneSpace::Pose, Some(0)),
            ],
        };
        assert_eq!(
            Err(BoneHierarchyError::BoneCycle {
                bone: "a".to_string()
            }),
            skeleton.validate()
        );
        assert!(matches!(
            skeleton.model_space_transforms(),
            Err(BoneHierarchyError::BoneCycle { .. })
        ));
    }

    #[test]
    fn validate_duplicate_name() {
        let skeleton = Skeleton {
            bones: vec![
                Bone::new("a", Transform::IDENTITY, BoneSpace::Edit, None),
                Bone::new("a", Transform::IDENTITY, BoneSpace::Edit, None),
            ],
        };
        assert_eq!(
            Err(BoneHierarchyError::DuplicateBoneName {
                name: "a".to_string(),
                first: 0,
                second: 1
            }),
            skeleton.validate()
        );
    }

    #[test]
    fn validate_index_out_of_range() {
        let mut bone = Bone::new("a", Transform::IDENTITY, BoneSpace::Edit, None);
        bone.next_sibling_index = Some(4);
        let skeleton = Skeleton { bones: vec![bone] };
        assert_eq!(
            Err(BoneHierarchyError::BoneIndexOutOfRange {
                bone: "a".to_string(),
                link: "next sibling",
                index: 4,
                count: 1
            }),
            skeleton.validate()
        );
    }

    #[test]
    fn validate_valid_skeleton() {
        assert_eq!(Ok(()), edit_skeleton().validate());
    }
}
