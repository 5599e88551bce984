//! Fog modes and their per-program uniform components

use crate::device::RenderDevice;
use crate::shader::ShaderConstants;
use glam::Vec4;
use std::fmt;

/// Atmospheric fog variant a chunk program is specialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkFogMode {
    None,
    Linear,
    Exp2,
}

impl ChunkFogMode {
    pub const COUNT: usize = 3;

    /// Every fog mode, in ordinal order
    pub const VALUES: [ChunkFogMode; Self::COUNT] = [ChunkFogMode::None, ChunkFogMode::Linear, ChunkFogMode::Exp2];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Preprocessor defines selecting the fog code path in the built-in shaders
    pub fn defines(self) -> ShaderConstants {
        let builder = ShaderConstants::builder();
        let builder = match self {
            ChunkFogMode::None => builder,
            ChunkFogMode::Linear => builder.add("USE_FOG").add("USE_FOG_LINEAR"),
            ChunkFogMode::Exp2 => builder.add("USE_FOG").add("USE_FOG_EXP2"),
        };
        builder.build()
    }

    /// Resolve the fog uniforms this mode needs inside `program`
    pub fn create_component<D: RenderDevice>(self, device: &D, program: &D::Program) -> ChunkShaderFogComponent<D> {
        match self {
            ChunkFogMode::None => ChunkShaderFogComponent::None,
            ChunkFogMode::Linear => ChunkShaderFogComponent::Linear {
                color: device.uniform_location(program, "u_FogColor"),
                length: device.uniform_location(program, "u_FogLength"),
                end: device.uniform_location(program, "u_FogEnd"),
            },
            ChunkFogMode::Exp2 => ChunkShaderFogComponent::Exp2 {
                color: device.uniform_location(program, "u_FogColor"),
                density: device.uniform_location(program, "u_FogDensity"),
            },
        }
    }
}

impl fmt::Display for ChunkFogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChunkFogMode::None => "none",
            ChunkFogMode::Linear => "linear",
            ChunkFogMode::Exp2 => "exp2",
        })
    }
}

/// Fog parameters of the frame being drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogState {
    pub mode: ChunkFogMode,
    pub color: Vec4,
    pub start: f32,
    pub end: f32,
    pub density: f32,
}

impl FogState {
    pub fn none() -> Self {
        Self {
            mode: ChunkFogMode::None,
            color: Vec4::ZERO,
            start: 0.0,
            end: 0.0,
            density: 0.0,
        }
    }

    pub fn linear(color: Vec4, start: f32, end: f32) -> Self {
        Self {
            mode: ChunkFogMode::Linear,
            color,
            start,
            end,
            ..Self::none()
        }
    }

    pub fn exp2(color: Vec4, density: f32) -> Self {
        Self {
            mode: ChunkFogMode::Exp2,
            color,
            density,
            ..Self::none()
        }
    }
}

impl Default for FogState {
    fn default() -> Self {
        Self::none()
    }
}

/// Fog uniforms of one linked program
///
/// Locations are optional because override sources are free to drop the
/// fog uniforms entirely.
pub enum ChunkShaderFogComponent<D: RenderDevice> {
    None,
    Linear {
        color: Option<D::UniformLocation>,
        length: Option<D::UniformLocation>,
        end: Option<D::UniformLocation>,
    },
    Exp2 {
        color: Option<D::UniformLocation>,
        density: Option<D::UniformLocation>,
    },
}

impl<D: RenderDevice> ChunkShaderFogComponent<D> {
    /// Upload `fog` into the currently bound program
    pub fn setup(&self, device: &D, fog: &FogState) {
        match self {
            ChunkShaderFogComponent::None => {}
            ChunkShaderFogComponent::Linear { color, length, end } => {
                if let Some(loc) = color {
                    device.set_uniform_vec4(loc, fog.color);
                }
                if let Some(loc) = length {
                    device.set_uniform_f32(loc, fog.end - fog.start);
                }
                if let Some(loc) = end {
                    device.set_uniform_f32(loc, fog.end);
                }
            }
            ChunkShaderFogComponent::Exp2 { color, density } => {
                if let Some(loc) = color {
                    device.set_uniform_vec4(loc, fog.color);
                }
                if let Some(loc) = density {
                    device.set_uniform_f32(loc, fog.density);
                }
            }
        }
    }
}
