use std::str::FromStr;

use glam::Vec2;
use strum::{AsRefStr, Display, EnumString};

use crate::{ValidationWarning, shader::ShaderInfo};

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Material {
    pub name: String,
    /// The path of the material definition file that selects the shader.
    pub mat_def_path: String,
    pub flags: i32,
    pub gx_index: i32,
    pub unk18: i32,
    pub textures: Vec<Texture>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Texture {
    /// The shader sampler name like `g_Diffuse`.
    /// See [TextureType] for known values.
    pub texture_type: String,
    pub path: String,
    pub scale: Vec2,
    pub unk10: u8,
    pub unk11: bool,
    pub unk14: f32,
    pub unk18: f32,
    pub unk1c: f32,
}

impl Default for Texture {
    fn default() -> Self {
        let texture = flver_lib::Texture::default();
        Self {
            texture_type: texture.texture_type,
            path: texture.path,
            scale: texture.scale.into(),
            unk10: texture.unk10,
            unk11: texture.unk11,
            unk14: texture.unk14,
            unk18: texture.unk18,
            unk1c: texture.unk1c,
        }
    }
}

/// Known texture sampler names.
///
/// Types ending in `2` are the secondary textures of shaders that blend two texture sets.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, EnumString, Display, AsRefStr)]
pub enum TextureType {
    #[strum(serialize = "g_Diffuse")]
    Diffuse,
    #[strum(serialize = "g_Diffuse_2")]
    Diffuse2,
    #[strum(serialize = "g_Specular")]
    Specular,
    #[strum(serialize = "g_Specular_2")]
    Specular2,
    #[strum(serialize = "g_Bumpmap")]
    Bumpmap,
    #[strum(serialize = "g_Bumpmap_2")]
    Bumpmap2,
    #[strum(serialize = "g_Height")]
    Height,
    #[strum(serialize = "g_Height_2")]
    Height2,
    #[strum(serialize = "g_Lightmap")]
    Lightmap,
    #[strum(serialize = "g_DetailBumpmap")]
    DetailBumpmap,
}

impl TextureType {
    pub fn is_secondary(self) -> bool {
        matches!(
            self,
            TextureType::Diffuse2
                | TextureType::Specular2
                | TextureType::Bumpmap2
                | TextureType::Height2
        )
    }
}

impl Material {
    pub(crate) fn from_document(material: &flver_lib::Material) -> Self {
        Self {
            name: material.name.clone(),
            mat_def_path: material.mat_def_path.clone(),
            flags: material.flags,
            gx_index: material.gx_index,
            unk18: material.unk18,
            textures: material
                .textures
                .iter()
                .map(|t| Texture {
                    texture_type: t.texture_type.clone(),
                    path: t.path.clone(),
                    scale: t.scale.into(),
                    unk10: t.unk10,
                    unk11: t.unk11,
                    unk14: t.unk14,
                    unk18: t.unk18,
                    unk1c: t.unk1c,
                })
                .collect(),
        }
    }

    pub(crate) fn to_document(&self) -> flver_lib::Material {
        flver_lib::Material {
            name: self.name.clone(),
            mat_def_path: self.mat_def_path.clone(),
            flags: self.flags,
            gx_index: self.gx_index,
            unk18: self.unk18,
            textures: self
                .textures
                .iter()
                .map(|t| flver_lib::Texture {
                    texture_type: t.texture_type.clone(),
                    path: t.path.clone(),
                    scale: t.scale.to_array(),
                    unk10: t.unk10,
                    unk11: t.unk11,
                    unk14: t.unk14,
                    unk18: t.unk18,
                    unk1c: t.unk1c,
                })
                .collect(),
        }
    }

    /// Check the textures against the textures sampled by `shader`.
    ///
    /// Textures with an empty path are treated as missing.
    pub fn validate_textures(&self, shader: &ShaderInfo) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for texture in &self.textures {
            if TextureType::from_str(&texture.texture_type).is_err() {
                warnings.push(ValidationWarning::UnknownTextureType {
                    material: self.name.clone(),
                    texture_type: texture.texture_type.clone(),
                });
            }
        }

        for texture_type in &shader.required_texture_types {
            let assigned = self
                .textures
                .iter()
                .any(|t| t.texture_type == texture_type.as_ref() && !t.path.is_empty());
            if !assigned {
                let material = self.name.clone();
                let texture_type_name = texture_type.to_string();
                warnings.push(if texture_type.is_secondary() {
                    ValidationWarning::MissingSecondaryTexture {
                        material,
                        texture_type: texture_type_name,
                    }
                } else {
                    ValidationWarning::MissingTexture {
                        material,
                        texture_type: texture_type_name,
                    }
                });
            }
        }

        warnings
    }
}
