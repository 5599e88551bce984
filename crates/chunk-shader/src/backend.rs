//! Chunk shader backend - the variant cache
//!
//! Owns one table of programs for normal draws and one for shadow-map draws,
//! each indexed by `[fog mode][render pass]`.
//!
//! **Lifecycle:**
//! 1. `create_shaders()` - builds every variant (`Uninitialized -> Built`)
//! 2. `begin()` - rebuilds if the override pipeline asked for it, then binds
//!    the variant for the current fog mode and pass (`Built -> Active`)
//! 3. `end()` - unbinds (`Active -> Built`)
//! 4. `delete()` - releases every variant (`-> Deleted`)

use crate::config::ChunkShaderConfig;
use crate::device::{RenderDevice, ShaderGuard, ShaderStages, ShaderType};
use crate::fog::ChunkFogMode;
use crate::overrides::{PipelineProvider, ShaderOverride, TerrainDrawKind};
use crate::pass::BlockRenderPass;
use crate::program::{ChunkProgram, ChunkRenderContext, OverrideBindings};
use crate::shader::ShaderId;
use crate::vertex::{ChunkVertexType, CHUNK_ATTRIBUTES};
use crate::{Error, Result};
use std::marker::PhantomData;
use std::sync::Arc;

/// Programs for every (fog mode, render pass) pair of one draw kind
pub type VariantTable<D> = [[ChunkProgram<D>; BlockRenderPass::COUNT]; ChunkFogMode::COUNT];

/// Both variant tables plus the device they were built on
pub struct ProgramTables<D: RenderDevice> {
    device: Arc<D>,
    normal: VariantTable<D>,
    shadow: VariantTable<D>,
}

impl<D: RenderDevice> ProgramTables<D> {
    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    pub fn get(&self, shadow: bool, fog: ChunkFogMode, pass: BlockRenderPass) -> &ChunkProgram<D> {
        let table = if shadow { &self.shadow } else { &self.normal };
        &table[fog.index()][pass.index()]
    }

    pub fn len(&self) -> usize {
        2 * ChunkFogMode::COUNT * BlockRenderPass::COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Observable lifecycle state of a [`ChunkShaderBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderCacheState {
    /// `create_shaders` has not succeeded yet
    Uninitialized,
    /// Tables are populated and no pass is in progress
    Built,
    /// A variant is bound for drawing
    Active,
    /// `delete` released every variant
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveVariant {
    shadow: bool,
    fog: ChunkFogMode,
    pass: BlockRenderPass,
}

/// Shader side of a chunk renderer
///
/// `GraphicsState` is the renderer-specific per-chunk GPU state type; the
/// shader backend never looks inside it.
pub trait ChunkRenderBackend<D: RenderDevice> {
    type GraphicsState;

    /// Build every program variant on `device`
    fn create_shaders(&mut self, device: Arc<D>) -> Result<()>;

    /// Bind the variant for `pass` and upload its per-pass uniforms
    fn begin(&mut self, ctx: &ChunkRenderContext, pass: BlockRenderPass) -> Result<()>;

    /// Unbind the active variant
    fn end(&mut self);

    /// Release every variant
    fn delete(&mut self);

    fn vertex_type(&self) -> ChunkVertexType;
}

/// Shader variant cache for chunk rendering
pub struct ChunkShaderBackend<D: RenderDevice, S = ()> {
    config: ChunkShaderConfig,
    provider: Box<dyn PipelineProvider<D>>,
    tables: Option<ProgramTables<D>>,
    active: Option<ActiveVariant>,
    deleted: bool,
    _state: PhantomData<fn() -> S>,
}

impl<D: RenderDevice, S> ChunkShaderBackend<D, S> {
    pub fn new(config: ChunkShaderConfig, provider: impl PipelineProvider<D> + 'static) -> Self {
        Self {
            config,
            provider: Box::new(provider),
            tables: None,
            active: None,
            deleted: false,
            _state: PhantomData,
        }
    }

    pub fn config(&self) -> &ChunkShaderConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn PipelineProvider<D> {
        self.provider.as_ref()
    }

    pub fn state(&self) -> ShaderCacheState {
        match (&self.tables, self.active) {
            (_, Some(_)) => ShaderCacheState::Active,
            (Some(_), None) => ShaderCacheState::Built,
            (None, None) if self.deleted => ShaderCacheState::Deleted,
            (None, None) => ShaderCacheState::Uninitialized,
        }
    }

    /// Device the current tables were built on
    pub fn device(&self) -> Option<&Arc<D>> {
        self.tables.as_ref().map(|t| t.device())
    }

    pub fn tables(&self) -> Option<&ProgramTables<D>> {
        self.tables.as_ref()
    }

    pub fn program(&self, shadow: bool, fog: ChunkFogMode, pass: BlockRenderPass) -> Option<&ChunkProgram<D>> {
        self.tables.as_ref().map(|t| t.get(shadow, fog, pass))
    }

    /// Variant bound by the last `begin`, until `end`
    pub fn active_program(&self) -> Option<&ChunkProgram<D>> {
        let active = self.active?;
        self.program(active.shadow, active.fog, active.pass)
    }

    fn build_table(
        &self,
        device: &Arc<D>,
        fog: ChunkFogMode,
        shadow: bool,
        overrides: &ShaderOverride<D>,
    ) -> Result<[ChunkProgram<D>; BlockRenderPass::COUNT]> {
        try_array(|i| self.create_program(device, fog, BlockRenderPass::VALUES[i], shadow, overrides))
    }

    fn create_program(
        &self,
        device: &Arc<D>,
        fog: ChunkFogMode,
        pass: BlockRenderPass,
        shadow: bool,
        overrides: &ShaderOverride<D>,
    ) -> Result<ChunkProgram<D>> {
        let kind = TerrainDrawKind::select(pass, shadow);
        let name = format!(
            "chunk_shader_for_{}_{}",
            pass.name(),
            if shadow { "shadow" } else { "gbuffer" }
        );

        // Stage objects are released when `guards` drops, linked or not
        let mut guards: Vec<ShaderGuard<'_, D>> = Vec::with_capacity(ShaderType::ALL.len());
        for stage in ShaderType::ALL {
            if let Some(guard) = self.create_stage(device.as_ref(), stage, fog, kind, overrides)? {
                guards.push(guard);
            }
        }

        let stages = guards
            .iter()
            .fold(ShaderStages::empty(), |acc, guard| acc | guard.stage().stage());
        let shaders: Vec<&D::Shader> = guards.iter().map(|guard| guard.shader()).collect();
        let handle = device.link_program(&name, &shaders, &CHUNK_ATTRIBUTES)?;

        let bindings = overrides.pipeline().map(|pipeline| OverrideBindings {
            uniforms: pipeline.init_uniforms(device.as_ref(), &handle, &name),
            samplers: if shadow {
                pipeline.init_shadow_samplers(device.as_ref(), &handle, &name)
            } else {
                pipeline.init_terrain_samplers(device.as_ref(), &handle, &name)
            },
        });

        log::debug!("Linked {} (fog: {}, stages: {:?})", name, fog, stages);
        Ok(ChunkProgram::new(device.clone(), handle, name, fog, stages, bindings))
    }

    /// Compile one stage from the override pipeline or the built-in sources.
    /// Returns `None` only for a geometry stage nobody supplied.
    fn create_stage<'a>(
        &self,
        device: &'a D,
        stage: ShaderType,
        fog: ChunkFogMode,
        kind: TerrainDrawKind,
        overrides: &ShaderOverride<D>,
    ) -> Result<Option<ShaderGuard<'a, D>>> {
        if let Some(source) = overrides.pipeline().and_then(|p| p.shader_source(kind, stage)) {
            let id = ShaderId::override_source(stage);
            return ShaderGuard::compile(device, stage, &id.to_string(), &source).map(Some);
        }

        match ShaderId::builtin(stage) {
            Some(id) => self.config.loader.load(device, stage, id, &fog.defines()).map(Some),
            None => Ok(None),
        }
    }

    fn delete_shaders(&mut self) {
        if let Some(tables) = self.tables.take() {
            log::info!("Deleting {} chunk programs", tables.len());
        }
    }
}

impl<D: RenderDevice, S> ChunkRenderBackend<D> for ChunkShaderBackend<D, S> {
    type GraphicsState = S;

    fn create_shaders(&mut self, device: Arc<D>) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::PassInProgress);
        }

        let overrides = self.provider.shader_override();
        self.provider.clear_reload_needed();

        log::info!(
            "Building chunk shaders ({} fog modes x {} passes, overrides {})",
            ChunkFogMode::COUNT,
            BlockRenderPass::COUNT,
            if overrides.is_enabled() { "enabled" } else { "disabled" }
        );

        let normal = try_array(|i| self.build_table(&device, ChunkFogMode::VALUES[i], false, &overrides))?;
        let shadow = try_array(|i| self.build_table(&device, ChunkFogMode::VALUES[i], true, &overrides))?;

        if self.tables.is_some() {
            log::debug!("Replacing previously built chunk programs");
        }
        self.tables = Some(ProgramTables { device, normal, shadow });
        self.deleted = false;
        Ok(())
    }

    fn begin(&mut self, ctx: &ChunkRenderContext, pass: BlockRenderPass) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::PassInProgress);
        }
        let device = self.tables.as_ref().ok_or(Error::NotBuilt)?.device().clone();

        if self.provider.is_reload_needed() {
            log::warn!("Override pipeline changed, rebuilding chunk shaders");
            self.delete_shaders();
            self.create_shaders(device)?;
        }

        let shadow = self.provider.shadows_being_rendered();
        let tables = self.tables.as_ref().ok_or(Error::NotBuilt)?;
        let program = tables.get(shadow, ctx.fog.mode, pass);

        if shadow && self.config.shadow_pass_disables_culling {
            tables.device().set_cull_enabled(false);
        }

        program.bind();
        program.setup(ctx, &self.config);
        log::trace!("Bound {} (fog: {})", program.name(), ctx.fog.mode);

        self.active = Some(ActiveVariant {
            shadow,
            fog: ctx.fog.mode,
            pass,
        });
        Ok(())
    }

    fn end(&mut self) {
        match self.active_program() {
            Some(program) => program.unbind(),
            None => log::trace!("end() called with no active chunk program"),
        }
        self.active = None;
        self.provider.clear_active_uniforms();
    }

    fn delete(&mut self) {
        if let Some(program) = self.active_program() {
            program.unbind();
        }
        self.active = None;
        self.delete_shaders();
        self.deleted = true;
    }

    fn vertex_type(&self) -> ChunkVertexType {
        self.config.vertex_type
    }
}

/// Build an array element by element, stopping at the first error.
/// Elements built before the error are dropped.
fn try_array<T, const N: usize>(mut f: impl FnMut(usize) -> Result<T>) -> Result<[T; N]> {
    let mut items = Vec::with_capacity(N);
    for i in 0..N {
        items.push(f(i)?);
    }
    Ok(items
        .try_into()
        .unwrap_or_else(|_: Vec<T>| unreachable!("exactly {N} elements were built")))
}
