//! Skeleton bones and dummy locators.
use crate::optional_index;

/// A single bone in the flattened skeleton hierarchy.
///
/// Only [parent_index](#structfield.parent_index) defines the hierarchy.
/// The child and sibling indices are redundant links stored in the file
/// and should be preserved as is.
#[derive(Debug, PartialEq, Clone)]
pub struct Bone {
    pub name: String,
    /// The translation relative to the parent bone.
    pub translation: [f32; 3],
    /// Euler angles in radians relative to the parent bone applied in X, Z, Y order.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    /// The index of the parent bone in [bones](../struct.Flver.html#structfield.bones) or `-1` for root bones.
    pub parent_index: i16,
    /// The index of the first child bone or `-1`.
    pub child_index: i16,
    pub next_sibling_index: i16,
    pub previous_sibling_index: i16,
    pub bounding_box_min: [f32; 3],
    pub bounding_box_max: [f32; 3],
    pub unk3c: i32,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            parent_index: -1,
            child_index: -1,
            next_sibling_index: -1,
            previous_sibling_index: -1,
            bounding_box_min: [0.0; 3],
            bounding_box_max: [0.0; 3],
            unk3c: 0,
        }
    }
}

impl Bone {
    pub fn parent(&self) -> Option<usize> {
        optional_index(self.parent_index)
    }

    pub fn child(&self) -> Option<usize> {
        optional_index(self.child_index)
    }

    pub fn next_sibling(&self) -> Option<usize> {
        optional_index(self.next_sibling_index)
    }

    pub fn previous_sibling(&self) -> Option<usize> {
        optional_index(self.previous_sibling_index)
    }
}

/// An oriented point used for attaching effects, weapons, or other models.
///
/// The position and orientation are relative to the
/// [parent bone](#structfield.parent_bone_index) if present.
/// The [attach bone](#structfield.attach_bone_index) is the bone the dummy moves with.
#[derive(Debug, PartialEq, Clone)]
pub struct Dummy {
    pub position: [f32; 3],
    pub forward: [f32; 3],
    /// The up direction or all zeros if [use_upward_vector](#structfield.use_upward_vector) is `false`.
    pub upward: [f32; 3],
    /// RGBA color for editors.
    pub color: [u8; 4],
    /// Identifier used by game code to find this dummy. Not unique.
    pub reference_id: i16,
    /// The bone defining the space for the position and orientation or `-1`.
    pub parent_bone_index: i16,
    /// The bone this dummy is attached to or `-1`.
    pub attach_bone_index: i16,
    /// The dummy follows the attach bone when animating.
    pub flag1: bool,
    pub use_upward_vector: bool,
    pub unk30: i32,
    pub unk34: i32,
}

impl Default for Dummy {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            forward: [0.0, 0.0, 1.0],
            upward: [0.0, 1.0, 0.0],
            color: [255; 4],
            reference_id: -1,
            parent_bone_index: -1,
            attach_bone_index: -1,
            flag1: false,
            use_upward_vector: true,
            unk30: 0,
            unk34: 0,
        }
    }
}

impl Dummy {
    pub fn parent_bone(&self) -> Option<usize> {
        optional_index(self.parent_bone_index)
    }

    pub fn attach_bone(&self) -> Option<usize> {
        optional_index(self.attach_bone_index)
    }
}
