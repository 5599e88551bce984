//! Linked chunk program variants

use crate::config::ChunkShaderConfig;
use crate::device::{RenderDevice, ShaderStages};
use crate::fog::{ChunkFogMode, ChunkShaderFogComponent, FogState};
use crate::overrides::{ProgramSamplers, ProgramUniforms};
use glam::{Mat3, Mat4, Vec2, Vec3};
use std::sync::Arc;

/// Transforms of the draw pass being started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkRenderMatrices {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl ChunkRenderMatrices {
    pub fn new(projection: Mat4, model_view: Mat4) -> Self {
        Self { projection, model_view }
    }

    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.model_view
    }

    /// Inverse transpose of the model-view rotation/scale
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_view).inverse().transpose()
    }
}

impl Default for ChunkRenderMatrices {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Everything `begin` needs to know about the frame being drawn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChunkRenderContext {
    pub matrices: ChunkRenderMatrices,
    pub fog: FogState,
}

impl ChunkRenderContext {
    pub fn new(matrices: ChunkRenderMatrices, fog: FogState) -> Self {
        Self { matrices, fog }
    }
}

/// Uniforms and samplers resolved by an override pipeline
pub struct OverrideBindings<D: RenderDevice> {
    pub uniforms: Box<dyn ProgramUniforms<D>>,
    pub samplers: Box<dyn ProgramSamplers<D>>,
}

/// One fully linked chunk program variant
///
/// The program object is deleted when the variant is dropped, so a variant
/// can only ever be released once.
pub struct ChunkProgram<D: RenderDevice> {
    device: Arc<D>,
    handle: D::Program,
    name: String,
    fog_mode: ChunkFogMode,
    stages: ShaderStages,

    u_model_view_projection: Option<D::UniformLocation>,
    u_model_view: Option<D::UniformLocation>,
    u_normal_matrix: Option<D::UniformLocation>,
    u_model_scale: Option<D::UniformLocation>,
    u_texture_scale: Option<D::UniformLocation>,
    u_block_tex: Option<D::UniformLocation>,
    u_light_tex: Option<D::UniformLocation>,

    fog: ChunkShaderFogComponent<D>,
    overrides: Option<OverrideBindings<D>>,
}

impl<D: RenderDevice> ChunkProgram<D> {
    /// Wrap a linked program and resolve its uniforms
    pub fn new(
        device: Arc<D>,
        handle: D::Program,
        name: String,
        fog_mode: ChunkFogMode,
        stages: ShaderStages,
        overrides: Option<OverrideBindings<D>>,
    ) -> Self {
        let uniform = |name: &str| device.uniform_location(&handle, name);

        Self {
            u_model_view_projection: uniform("u_ModelViewProjectionMatrix"),
            u_model_view: uniform("u_ModelViewMatrix"),
            u_normal_matrix: uniform("u_NormalMatrix"),
            u_model_scale: uniform("u_ModelScale"),
            u_texture_scale: uniform("u_TextureScale"),
            u_block_tex: uniform("u_BlockTex"),
            u_light_tex: uniform("u_LightTex"),
            fog: fog_mode.create_component(device.as_ref(), &handle),
            device,
            handle,
            name,
            fog_mode,
            stages,
            overrides,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &D::Program {
        &self.handle
    }

    /// Device that owns the program object
    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    pub fn fog_mode(&self) -> ChunkFogMode {
        self.fog_mode
    }

    /// Stages that were linked into this program
    pub fn stages(&self) -> ShaderStages {
        self.stages
    }

    pub fn has_overrides(&self) -> bool {
        self.overrides.is_some()
    }

    pub fn bind(&self) {
        self.device.bind_program(Some(&self.handle));
    }

    pub fn unbind(&self) {
        self.device.bind_program(None);
    }

    /// Upload per-pass uniforms. The program must be bound.
    pub fn setup(&self, ctx: &ChunkRenderContext, config: &ChunkShaderConfig) {
        let device = self.device.as_ref();

        if self.overrides.is_none() {
            if let Some(loc) = &self.u_block_tex {
                device.set_uniform_i32(loc, config.block_texture_unit);
            }
            if let Some(loc) = &self.u_light_tex {
                device.set_uniform_i32(loc, config.light_texture_unit);
            }
        }

        let model_scale = config.vertex_type.model_scale();
        let texture_scale = config.vertex_type.texture_scale();
        if let Some(loc) = &self.u_model_scale {
            device.set_uniform_vec3(loc, Vec3::splat(model_scale));
        }
        if let Some(loc) = &self.u_texture_scale {
            device.set_uniform_vec2(loc, Vec2::splat(texture_scale));
        }

        self.fog.setup(device, &ctx.fog);

        if let Some(overrides) = &self.overrides {
            overrides.uniforms.update(device);
            overrides.samplers.update(device);
        }

        let matrices = &ctx.matrices;
        if let Some(loc) = &self.u_model_view_projection {
            device.set_uniform_mat4(loc, &matrices.model_view_projection());
        }
        if let Some(loc) = &self.u_model_view {
            device.set_uniform_mat4(loc, &matrices.model_view);
        }
        if let Some(loc) = &self.u_normal_matrix {
            device.set_uniform_mat3(loc, &matrices.normal_matrix());
        }
    }
}

impl<D: RenderDevice> Drop for ChunkProgram<D> {
    fn drop(&mut self) {
        log::trace!("Deleting chunk program {}", self.name);
        self.device.delete_program(&self.handle);
    }
}
