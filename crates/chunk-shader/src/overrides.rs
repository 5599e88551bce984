//! Override pipeline integration
//!
//! A shader pack style lighting system can take over chunk rendering by
//! supplying its own stage sources and resolving its own uniforms and
//! samplers. The cache asks a [`PipelineProvider`] for the current
//! [`ShaderOverride`] every time it builds, and consults it again at the start
//! of each pass for reload and shadow state.

use crate::device::{RenderDevice, ShaderType};
use crate::pass::BlockRenderPass;
use std::sync::Arc;

/// Which family of override sources a variant is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainDrawKind {
    /// Opaque and cutout terrain in the main view
    Terrain,
    /// Translucent terrain in the main view
    Translucent,
    /// Any terrain drawn into the shadow map
    Shadow,
}

impl TerrainDrawKind {
    /// Shadow variants share one set of sources regardless of pass.
    pub fn select(pass: BlockRenderPass, shadow: bool) -> Self {
        if shadow {
            TerrainDrawKind::Shadow
        } else if pass.is_translucent() {
            TerrainDrawKind::Translucent
        } else {
            TerrainDrawKind::Terrain
        }
    }

    pub fn is_shadow(self) -> bool {
        self == TerrainDrawKind::Shadow
    }
}

/// Override-owned uniforms, refreshed whenever their program is activated
pub trait ProgramUniforms<D: RenderDevice> {
    fn update(&self, device: &D);
}

/// Override-owned sampler bindings, refreshed whenever their program is activated
pub trait ProgramSamplers<D: RenderDevice> {
    fn update(&self, device: &D);
}

/// Replacement terrain pipeline supplied by an override system
pub trait TerrainPipeline<D: RenderDevice> {
    /// Source for one stage of one draw kind. `None` falls back to the
    /// built-in source (or to no stage at all for geometry).
    fn shader_source(&self, kind: TerrainDrawKind, stage: ShaderType) -> Option<String>;

    /// Resolve the pipeline's uniforms for a freshly linked program
    fn init_uniforms(&self, device: &D, program: &D::Program, name: &str) -> Box<dyn ProgramUniforms<D>>;

    /// Resolve samplers for main-view programs
    fn init_terrain_samplers(&self, device: &D, program: &D::Program, name: &str) -> Box<dyn ProgramSamplers<D>>;

    /// Resolve samplers for shadow-map programs
    fn init_shadow_samplers(&self, device: &D, program: &D::Program, name: &str) -> Box<dyn ProgramSamplers<D>>;
}

/// Whether chunk programs are built from an override pipeline
pub enum ShaderOverride<D: RenderDevice> {
    Disabled,
    Enabled(Arc<dyn TerrainPipeline<D>>),
}

impl<D: RenderDevice> ShaderOverride<D> {
    pub fn pipeline(&self) -> Option<&dyn TerrainPipeline<D>> {
        match self {
            ShaderOverride::Disabled => None,
            ShaderOverride::Enabled(pipeline) => Some(pipeline.as_ref()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ShaderOverride::Enabled(_))
    }
}

impl<D: RenderDevice> Clone for ShaderOverride<D> {
    fn clone(&self) -> Self {
        match self {
            ShaderOverride::Disabled => ShaderOverride::Disabled,
            ShaderOverride::Enabled(pipeline) => ShaderOverride::Enabled(pipeline.clone()),
        }
    }
}

impl<D: RenderDevice> std::fmt::Debug for ShaderOverride<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderOverride::Disabled => f.write_str("Disabled"),
            ShaderOverride::Enabled(_) => f.write_str("Enabled(..)"),
        }
    }
}

/// Host-side state of the override system
///
/// **Lifecycle:**
/// 1. `shader_override()` + `clear_reload_needed()` - every build
/// 2. `is_reload_needed()` + `shadows_being_rendered()` - every `begin`
/// 3. `clear_active_uniforms()` - every `end`
pub trait PipelineProvider<D: RenderDevice> {
    /// The pipeline to build from right now
    fn shader_override(&self) -> ShaderOverride<D>;

    /// Set when the override system changed and chunk programs are stale
    fn is_reload_needed(&self) -> bool;

    fn clear_reload_needed(&mut self);

    /// True while the shadow map is being drawn
    fn shadows_being_rendered(&self) -> bool;

    /// Forget whichever program's uniforms were last marked live
    fn clear_active_uniforms(&mut self);
}

/// Provider for hosts without an override system
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShaderPipeline;

impl<D: RenderDevice> PipelineProvider<D> for NoShaderPipeline {
    fn shader_override(&self) -> ShaderOverride<D> {
        ShaderOverride::Disabled
    }

    fn is_reload_needed(&self) -> bool {
        false
    }

    fn clear_reload_needed(&mut self) {}

    fn shadows_being_rendered(&self) -> bool {
        false
    }

    fn clear_active_uniforms(&mut self) {}
}
