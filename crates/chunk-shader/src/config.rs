//! Chunk shader backend configuration

use crate::shader::ShaderLoader;
use crate::vertex::ChunkVertexType;

/// Default texture unit of the block atlas sampler
pub const DEFAULT_BLOCK_TEXTURE_UNIT: i32 = 0;
/// Default texture unit of the lightmap sampler
pub const DEFAULT_LIGHT_TEXTURE_UNIT: i32 = 2;

/// Configuration for [`crate::ChunkShaderBackend`]
#[derive(Clone, Debug)]
pub struct ChunkShaderConfig {
    pub vertex_type: ChunkVertexType,
    pub block_texture_unit: i32,
    pub light_texture_unit: i32,
    /// Disable back-face culling while drawing into the shadow map
    pub shadow_pass_disables_culling: bool,
    pub loader: ShaderLoader,
}

impl ChunkShaderConfig {
    pub fn new() -> Self {
        Self {
            vertex_type: ChunkVertexType::default(),
            block_texture_unit: DEFAULT_BLOCK_TEXTURE_UNIT,
            light_texture_unit: DEFAULT_LIGHT_TEXTURE_UNIT,
            shadow_pass_disables_culling: true,
            loader: ShaderLoader::builtin(),
        }
    }

    pub fn with_vertex_type(mut self, vertex_type: ChunkVertexType) -> Self {
        self.vertex_type = vertex_type;
        self
    }

    pub fn with_texture_units(mut self, block: i32, light: i32) -> Self {
        self.block_texture_unit = block;
        self.light_texture_unit = light;
        self
    }

    pub fn with_shadow_pass_disables_culling(mut self, disables: bool) -> Self {
        self.shadow_pass_disables_culling = disables;
        self
    }

    pub fn with_loader(mut self, loader: ShaderLoader) -> Self {
        self.loader = loader;
        self
    }
}

impl Default for ChunkShaderConfig {
    fn default() -> Self {
        Self::new()
    }
}
