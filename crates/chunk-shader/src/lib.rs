//! Chunk shader variant cache
//!
//! Builds one GPU program per (fog mode, block render pass) combination for
//! both normal and shadow-map terrain draws, and binds the right one at the
//! start of every draw pass.
//!
//! - Fixed-size tables indexed by enum ordinal, so every lookup is total
//! - Optional override pipeline (shader packs) that can replace sources and
//!   uniform/sampler resolution
//! - Lazy, same-thread rebuild when the override pipeline asks for a reload
//! - GPU access goes through the [`RenderDevice`] trait

pub mod backend;
pub mod config;
pub mod device;
pub mod fog;
pub mod overrides;
pub mod pass;
pub mod program;
pub mod shader;
pub mod vertex;

#[cfg(test)]
mod testing;

pub use backend::{ChunkRenderBackend, ChunkShaderBackend, ProgramTables, ShaderCacheState, VariantTable};
pub use config::ChunkShaderConfig;
pub use device::{RenderDevice, ShaderGuard, ShaderStages, ShaderType};
pub use fog::{ChunkFogMode, ChunkShaderFogComponent, FogState};
pub use overrides::{
    NoShaderPipeline, PipelineProvider, ProgramSamplers, ProgramUniforms, ShaderOverride,
    TerrainDrawKind, TerrainPipeline,
};
pub use pass::BlockRenderPass;
pub use program::{ChunkProgram, ChunkRenderContext, ChunkRenderMatrices, OverrideBindings};
pub use shader::{ShaderConstants, ShaderDefine, ShaderId, ShaderLoader};
pub use vertex::{ChunkVertexType, CompactChunkVertex, FullChunkVertex};

/// Result type for chunk shader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or activating chunk programs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to compile {stage:?} shader '{name}': {log}")]
    Compile {
        name: String,
        stage: ShaderType,
        log: String,
    },

    #[error("Failed to link program '{name}': {log}")]
    Link { name: String, log: String },

    #[error("No {stage:?} shader source registered for '{id}'")]
    MissingSource { stage: ShaderType, id: ShaderId },

    #[error("Chunk shaders have not been built")]
    NotBuilt,

    #[error("A chunk render pass is already in progress")]
    PassInProgress,

    #[error("Device error: {0}")]
    Device(String),
}
