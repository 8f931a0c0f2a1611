use thiserror::Error;

/// Errors in the bone hierarchy that prevent calculating bone transforms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoneHierarchyError {
    #[error("bone name {name:?} is used by bones {first} and {second}")]
    DuplicateBoneName {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("bone {bone:?} {link} index {index} is out of range for {count} bones")]
    BoneIndexOutOfRange {
        bone: String,
        link: &'static str,
        index: usize,
        count: usize,
    },

    #[error("bone {bone:?} is its own ancestor")]
    BoneCycle { bone: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum WeldError {
    #[error("point {point} has {count} bone weights but at most 4 are supported")]
    TooManyBones { point: usize, count: usize },

    #[error("point {point} is assigned to {count} bones but static meshes support one bone")]
    MultipleStaticBones { point: usize, count: usize },

    #[error("point {point} has no bone weights and the skeleton has no default bone")]
    MissingDefaultBone { point: usize },

    #[error("default bone index {index} is out of range for {count} bones")]
    DefaultBoneIndexOutOfRange { index: usize, count: usize },

    #[error("mesh has no faces")]
    EmptyMesh,

    #[error("face {face} has {count} corners instead of 3")]
    NonTriangularFace { face: usize, count: usize },

    #[error("layout requires {required} UV layers but the mesh has {count}")]
    MissingUvLayer { required: usize, count: usize },

    #[error("influence {name:?} does not match any bone")]
    UnknownBoneName { name: String },

    #[error("face {face} loop index {index} is out of range for {count} loops")]
    LoopIndexOutOfRange {
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("point index {index} is out of range for {count} points")]
    PointIndexOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DummyError {
    #[error("dummy {dummy} {link} bone {name:?} does not match any bone")]
    UnknownBoneName {
        dummy: usize,
        link: &'static str,
        name: String,
    },

    #[error("dummy {dummy} {link} bone index {index} is out of range for {count} bones")]
    BoneIndexOutOfRange {
        dummy: usize,
        link: &'static str,
        index: usize,
        count: usize,
    },
}

#[derive(Debug, Error)]
pub enum CreateFlverError {
    #[error("error validating skeleton")]
    Skeleton(#[from] BoneHierarchyError),

    #[error("error creating vertices for mesh {mesh:?}")]
    Mesh {
        mesh: String,
        #[source]
        source: WeldError,
    },

    #[error("mesh {mesh:?} material index {index} is out of range for {count} materials")]
    MaterialIndexOutOfRange {
        mesh: String,
        index: usize,
        count: usize,
    },

    #[error("error converting dummy")]
    Dummy(#[from] DummyError),
}

#[derive(Debug, Error)]
pub enum LoadFlverError {
    #[error("error validating skeleton")]
    Skeleton(#[from] BoneHierarchyError),

    #[error("mesh {mesh} material index {index} is out of range for {count} materials")]
    MaterialIndexOutOfRange {
        mesh: usize,
        index: i32,
        count: usize,
    },

    #[error("mesh {mesh} layout index {index} is out of range for {count} layouts")]
    LayoutIndexOutOfRange {
        mesh: usize,
        index: i32,
        count: usize,
    },

    #[error("mesh {mesh} has no vertex buffers")]
    MissingVertexBuffer { mesh: usize },

    #[error("mesh {mesh} vertex index {index} is out of range for {count} vertices")]
    VertexIndexOutOfRange {
        mesh: usize,
        index: u32,
        count: usize,
    },

    #[error("mesh {mesh} bone index {index} is out of range for {count} bones")]
    MeshBoneIndexOutOfRange {
        mesh: usize,
        index: i32,
        count: usize,
    },

    #[error("error converting dummy")]
    Dummy(#[from] DummyError),
}

/// Problems that don't prevent conversion but likely produce unexpected results in game.
///
/// Warnings are also logged using [log::warn].
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ValidationWarning {
    #[error("skeleton mixes edit and pose bones, exporting all bones in edit space")]
    MixedBoneSpaces,

    #[error("material {material:?} is missing texture {texture_type:?}")]
    MissingTexture {
        material: String,
        texture_type: String,
    },

    #[error("material {material:?} is missing secondary texture {texture_type:?}")]
    MissingSecondaryTexture {
        material: String,
        texture_type: String,
    },

    #[error("material {material:?} texture type {texture_type:?} is not recognized")]
    UnknownTextureType {
        material: String,
        texture_type: String,
    },

    #[error("model has no vertices, using an empty bounding box")]
    EmptyBoundingBox,
}
