use flver_lib::FlverHeader;

use crate::BoneSpace;

mod export;
mod import;

/// How vertex bone indices reference bones.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BoneIndexing {
    /// Vertices index the mesh bone table, which indexes the skeleton.
    Local,
    /// Vertices index the skeleton directly and the mesh bone table is empty.
    Global,
}

impl BoneIndexing {
    /// The indexing used by the game for the FLVER version in `header`.
    pub fn from_header(header: &FlverHeader) -> Self {
        if header.uses_global_bone_indices() {
            Self::Global
        } else {
            Self::Local
        }
    }
}

/// The bounding box written for each bone.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum BoneBounds {
    /// Every bone uses the bounds of the entire model.
    #[default]
    Model,
    /// Each bone uses the bounds of the vertices it influences.
    /// Bones without vertices use the bounds of the entire model.
    Weighted,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExportSettings {
    /// Create vertices for meshes in parallel.
    pub parallel: bool,
    /// Override the bone indexing selected from the header version.
    pub bone_indexing: Option<BoneIndexing>,
    pub bone_bounds: BoneBounds,
    /// The number of face sets including the full detail face set.
    /// Additional face sets are copies flagged as lower levels of detail.
    pub face_set_count: usize,
    /// Add a motion blur copy of each face set.
    pub motion_blur_face_sets: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            parallel: false,
            bone_indexing: None,
            bone_bounds: BoneBounds::Model,
            face_set_count: 3,
            motion_blur_face_sets: false,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ImportSettings {
    /// The space for the imported bone transforms.
    pub bone_space: BoneSpace,
}
