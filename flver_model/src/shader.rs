//! Shader capabilities that select vertex layouts and required textures.
//!
//! FLVER materials reference a material definition file by path.
//! The definition's shader determines which vertex attributes and textures are used.
//! Applications with access to the definition files can provide a custom [ShaderLookup].
use indexmap::IndexMap;

use crate::material::TextureType;

/// Vertex and texture requirements for a material definition.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ShaderInfo {
    /// Blends two sets of textures with a second UV set and bitangents.
    pub is_multiple: bool,
    /// Samples a lightmap with its own UV set.
    pub is_lightmap: bool,
    pub required_texture_types: Vec<TextureType>,
}

/// Find the [ShaderInfo] for a material definition path.
pub trait ShaderLookup: Sync {
    fn shader_info(&self, mat_def_path: &str) -> Option<ShaderInfo>;
}

impl ShaderLookup for IndexMap<String, ShaderInfo> {
    fn shader_info(&self, mat_def_path: &str) -> Option<ShaderInfo> {
        self.get(mat_def_path).cloned()
    }
}

/// Derive the [ShaderInfo] from Dark Souls style material definition names.
///
/// Names like `M[DSB][L].mtd` list the sampled textures in brackets.
/// A leading `M` indicates multiple textures for blending and `[L]` indicates a lightmap.
/// The letters `D`, `S`, `B`, and `H` are diffuse, specular, bumpmap, and height textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtdNameLookup;

impl ShaderLookup for MtdNameLookup {
    fn shader_info(&self, mat_def_path: &str) -> Option<ShaderInfo> {
        let name = mat_def_path
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(mat_def_path);
        let stem = name.split_once('.').map(|(s, _)| s).unwrap_or(name);

        // The texture letters are in the first bracket group.
        let start = stem.find('[')?;
        let end = start + stem[start..].find(']')?;
        let letters = &stem[start + 1..end];

        let is_multiple = stem.starts_with("M[");
        let is_lightmap = stem.contains("[L]");

        let mut required_texture_types = Vec::new();
        for c in letters.chars() {
            let (primary, secondary) = match c {
                'D' => (TextureType::Diffuse, TextureType::Diffuse2),
                'S' => (TextureType::Specular, TextureType::Specular2),
                'B' => (TextureType::Bumpmap, TextureType::Bumpmap2),
                'H' => (TextureType::Height, TextureType::Height2),
                _ => continue,
            };
            required_texture_types.push(primary);
            if is_multiple {
                required_texture_types.push(secondary);
            }
        }
        if is_lightmap {
            required_texture_types.push(TextureType::Lightmap);
        }

        Some(ShaderInfo {
            is_multiple,
            is_lightmap,
            required_texture_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn single_textures() {
        assert_eq!(
            Some(ShaderInfo {
                is_multiple: false,
                is_lightmap: false,
                required_texture_types: vec![
                    TextureType::Diffuse,
                    TextureType::Specular,
                    TextureType::Bumpmap
                ],
            }),
            MtdNameLookup.shader_info("N:\\FRPG\\data\\Material\\mtd\\map\\P[DSB].mtd")
        );
    }

    #[test]
    fn multiple_lightmap() {
        assert_eq!(
            Some(ShaderInfo {
                is_multiple: true,
                is_lightmap: true,
                required_texture_types: vec![
                    TextureType::Diffuse,
                    TextureType::Diffuse2,
                    TextureType::Bumpmap,
                    TextureType::Bumpmap2,
                    TextureType::Lightmap
                ],
            }),
            MtdNameLookup.shader_info("M[DB][L].mtd")
        );
    }

    #[test]
    fn no_brackets() {
        assert_eq!(None, MtdNameLookup.shader_info("c1000_body.mtd"));
    }

    #[test]
    fn map_lookup() {
        let info = ShaderInfo {
            is_lightmap: true,
            ..Default::default()
        };
        let map: IndexMap<_, _> = [("a.mtd".to_string(), info.clone())].into();
        assert_eq!(Some(info), map.shader_info("a.mtd"));
        assert_eq!(None, map.shader_info("b.mtd"));
    }
}
