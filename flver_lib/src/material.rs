/// A material referencing a shader definition and its textures.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Material {
    pub name: String,
    /// The path to the material definition like `N:\FRPG\data\Material\mtd\M[DSB].mtd`.
    /// The definition determines the required textures and vertex buffer layout.
    pub mat_def_path: String,
    pub flags: i32,
    pub gx_index: i32,
    pub unk18: i32,
    pub textures: Vec<Texture>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Texture {
    /// The shader sampler name like `g_Diffuse` or `g_Bumpmap_2`.
    pub texture_type: String,
    pub path: String,
    pub scale: [f32; 2],
    pub unk10: u8,
    pub unk11: bool,
    pub unk14: f32,
    pub unk18: f32,
    pub unk1c: f32,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            texture_type: String::new(),
            path: String::new(),
            scale: [1.0; 2],
            unk10: 1,
            unk11: true,
            unk14: 0.0,
            unk18: 0.0,
            unk1c: 0.0,
        }
    }
}
