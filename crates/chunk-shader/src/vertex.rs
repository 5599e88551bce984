//! Chunk vertex encodings and attribute binding points

use crate::device::AttributeBinding;
use bytemuck::{Pod, Zeroable};

/// Fixed attribute locations shared by every chunk program
pub mod binding_points {
    pub const POSITION: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const TEX_COORD: u32 = 2;
    pub const LIGHT_COORD: u32 = 3;
    pub const MODEL_OFFSET: u32 = 4;

    // Only consumed by override shaders
    pub const NORMAL: u32 = 5;
    pub const BLOCK_ID: u32 = 6;
    pub const MID_TEX_COORD: u32 = 7;
    pub const TANGENT: u32 = 8;
}

/// Attribute name to location contract applied before every link
pub const CHUNK_ATTRIBUTES: [AttributeBinding; 9] = [
    AttributeBinding::new("a_Pos", binding_points::POSITION),
    AttributeBinding::new("a_Color", binding_points::COLOR),
    AttributeBinding::new("a_TexCoord", binding_points::TEX_COORD),
    AttributeBinding::new("a_LightCoord", binding_points::LIGHT_COORD),
    AttributeBinding::new("mc_Entity", binding_points::BLOCK_ID),
    AttributeBinding::new("mc_midTexCoord", binding_points::MID_TEX_COORD),
    AttributeBinding::new("at_tangent", binding_points::TANGENT),
    AttributeBinding::new("a_Normal", binding_points::NORMAL),
    AttributeBinding::new("d_ModelOffset", binding_points::MODEL_OFFSET),
];

/// Vertex with quantized position and texture coordinates (20 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CompactChunkVertex {
    pub position: [u16; 3],
    pub _pad: u16,
    pub color: [u8; 4],
    pub tex_coord: [u16; 2],
    pub light_coord: [u16; 2],
}

/// Vertex with full precision position and texture coordinates (28 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FullChunkVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub tex_coord: [f32; 2],
    pub light_coord: [u16; 2],
}

/// Vertex encoding used by the chunk meshes
///
/// The programs undo the quantization with `u_ModelScale` and
/// `u_TextureScale`, which are uploaded from here on every `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChunkVertexType {
    #[default]
    Compact,
    Full,
}

impl ChunkVertexType {
    /// Multiplier applied to `a_Pos`
    pub fn model_scale(self) -> f32 {
        match self {
            ChunkVertexType::Compact => 32.0 / 65536.0,
            ChunkVertexType::Full => 1.0,
        }
    }

    /// Multiplier applied to `a_TexCoord`
    pub fn texture_scale(self) -> f32 {
        match self {
            ChunkVertexType::Compact => 1.0 / 32768.0,
            ChunkVertexType::Full => 1.0,
        }
    }

    /// Size of one vertex in bytes
    pub fn stride(self) -> usize {
        match self {
            ChunkVertexType::Compact => std::mem::size_of::<CompactChunkVertex>(),
            ChunkVertexType::Full => std::mem::size_of::<FullChunkVertex>(),
        }
    }
}
