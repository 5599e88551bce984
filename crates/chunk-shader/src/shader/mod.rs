//! Shader source loading and preprocessing

mod constants;
mod loader;

pub use constants::{ShaderConstants, ShaderConstantsBuilder, ShaderDefine};
pub use loader::{ShaderId, ShaderLoader};
