//! Dummy locators for effects, hitboxes, and attachment points.
//!
//! FLVER dummies store a position relative to the parent bone
//! and an orientation as forward and up vectors.
//! The editable [Dummy] stores a transform relative to the attach bone instead.
use glam::Vec3;
use indexmap::IndexMap;

use crate::{
    Transform,
    coordinates::{
        GAME_UP, forward_up_from_rotation, rotation_from_forward_up, transform_from_game,
        transform_to_game,
    },
    error::DummyError,
};

#[derive(Debug, PartialEq, Clone)]
pub struct Dummy {
    /// The ID used to reference this dummy from game parameters.
    pub reference_id: i16,
    /// The transform relative to the attach bone or model space if there is no attach bone.
    /// Scale is not stored in the file.
    pub transform: Transform,
    pub color: [u8; 4],
    pub parent_bone_name: Option<String>,
    pub attach_bone_name: Option<String>,
    pub follows_attach_bone: bool,
    /// Store the up direction instead of using the game's global up direction.
    pub use_upward_vector: bool,
    pub unk30: i32,
    pub unk34: i32,
}

impl Default for Dummy {
    fn default() -> Self {
        Self {
            reference_id: -1,
            transform: Transform::IDENTITY,
            color: [255; 4],
            parent_bone_name: None,
            attach_bone_name: None,
            follows_attach_bone: false,
            use_upward_vector: true,
            unk30: 0,
            unk34: 0,
        }
    }
}

impl Dummy {
    /// Convert to a FLVER dummy using the model space bone transforms in game coordinates.
    pub fn to_document(
        &self,
        dummy_index: usize,
        bone_lookup: &IndexMap<&str, usize>,
        absolute_transforms: &[Transform],
    ) -> Result<flver_lib::Dummy, DummyError> {
        let resolve = |link, name: &Option<String>| {
            name.as_deref()
                .map(|name| {
                    bone_lookup
                        .get(name)
                        .and_then(|i| Some((*i, *absolute_transforms.get(*i)?)))
                        .ok_or_else(|| DummyError::UnknownBoneName {
                            dummy: dummy_index,
                            link,
                            name: name.to_string(),
                        })
                })
                .transpose()
        };
        let attach = resolve("attach", &self.attach_bone_name)?;
        let parent = resolve("parent", &self.parent_bone_name)?;

        let local = transform_to_game(self.transform);
        let world = match attach {
            Some((_, attach)) => attach * local,
            None => local,
        };
        let stored = match parent {
            Some((_, parent)) => parent.inverse() * world,
            None => world,
        };

        let (forward, upward) = forward_up_from_rotation(stored.rotation);

        Ok(flver_lib::Dummy {
            position: stored.translation.to_array(),
            forward: forward.to_array(),
            upward: if self.use_upward_vector {
                upward.to_array()
            } else {
                [0.0; 3]
            },
            color: self.color,
            reference_id: self.reference_id,
            parent_bone_index: parent.map(|(i, _)| i as i16).unwrap_or(-1),
            attach_bone_index: attach.map(|(i, _)| i as i16).unwrap_or(-1),
            flag1: self.follows_attach_bone,
            use_upward_vector: self.use_upward_vector,
            unk30: self.unk30,
            unk34: self.unk34,
        })
    }

    /// Convert from a FLVER dummy using the model space bone transforms in game coordinates.
    pub fn from_document(
        dummy: &flver_lib::Dummy,
        dummy_index: usize,
        bone_names: &[String],
        absolute_transforms: &[Transform],
    ) -> Result<Self, DummyError> {
        let resolve = |link, index: Option<usize>| {
            index
                .map(|i| {
                    bone_names
                        .get(i)
                        .zip(absolute_transforms.get(i))
                        .map(|(name, transform)| (name.clone(), *transform))
                        .ok_or(DummyError::BoneIndexOutOfRange {
                            dummy: dummy_index,
                            link,
                            index: i,
                            count: bone_names.len(),
                        })
                })
                .transpose()
        };
        let attach = resolve("attach", dummy.attach_bone())?;
        let parent = resolve("parent", dummy.parent_bone())?;

        let upward = if dummy.use_upward_vector {
            Vec3::from(dummy.upward)
        } else {
            GAME_UP
        };
        let stored = Transform {
            translation: dummy.position.into(),
            rotation: rotation_from_forward_up(dummy.forward.into(), upward),
            scale: Vec3::ONE,
        };

        let world = match &parent {
            Some((_, parent)) => *parent * stored,
            None => stored,
        };
        let local = match &attach {
            Some((_, attach)) => attach.inverse() * world,
            None => world,
        };

        Ok(Self {
            reference_id: dummy.reference_id,
            transform: transform_from_game(Transform {
                scale: Vec3::ONE,
                ..local
            }),
            color: dummy.color,
            parent_bone_name: parent.map(|(name, _)| name),
            attach_bone_name: attach.map(|(name, _)| name),
            follows_attach_bone: dummy.flag1,
            use_upward_vector: dummy.use_upward_vector,
            unk30: dummy.unk30,
            unk34: dummy.unk34,
        })
    }
}
