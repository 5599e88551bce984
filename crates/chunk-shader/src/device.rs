//! GPU device capability
//!
//! The cache never talks to a graphics API directly. Everything it needs from
//! the GPU (stage compilation, program linking, uniform writes, bind state)
//! goes through [`RenderDevice`], so the same cache drives an OpenGL context
//! or a recording device in tests.

use crate::Result;
use bitflags::bitflags;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderType {
    pub const ALL: [ShaderType; 3] = [ShaderType::Vertex, ShaderType::Geometry, ShaderType::Fragment];

    /// Stage bit for this shader type
    pub fn stage(self) -> ShaderStages {
        match self {
            ShaderType::Vertex => ShaderStages::VERTEX,
            ShaderType::Geometry => ShaderStages::GEOMETRY,
            ShaderType::Fragment => ShaderStages::FRAGMENT,
        }
    }
}

bitflags! {
    /// Set of stages attached to a linked program
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        const VERTEX = 1 << 0;
        const GEOMETRY = 1 << 1;
        const FRAGMENT = 1 << 2;
    }
}

/// Named vertex attribute bound to a fixed location before linking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: &'static str,
    pub index: u32,
}

impl AttributeBinding {
    pub const fn new(name: &'static str, index: u32) -> Self {
        Self { name, index }
    }
}

/// Device capability consumed by the chunk shader cache
///
/// Implementations are expected to be used from the thread that owns the
/// graphics context; none of the methods are required to be thread-safe.
pub trait RenderDevice {
    /// Compiled single-stage shader object
    type Shader;
    /// Linked program object
    type Program;
    /// Resolved uniform slot inside a program
    type UniformLocation;

    /// Compile `source` for `stage`. `name` is only used for diagnostics.
    fn compile_shader(&self, stage: ShaderType, name: &str, source: &str) -> Result<Self::Shader>;

    fn delete_shader(&self, shader: &Self::Shader);

    /// Link the given stages into a program, binding each attribute name to
    /// its fixed location first.
    fn link_program(
        &self,
        name: &str,
        shaders: &[&Self::Shader],
        attributes: &[AttributeBinding],
    ) -> Result<Self::Program>;

    fn delete_program(&self, program: &Self::Program);

    /// Look up a uniform. Returns `None` when the program does not use it.
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::UniformLocation>;

    /// Make `program` current, or unbind with `None`.
    fn bind_program(&self, program: Option<&Self::Program>);

    fn set_uniform_i32(&self, location: &Self::UniformLocation, value: i32);
    fn set_uniform_f32(&self, location: &Self::UniformLocation, value: f32);
    fn set_uniform_vec2(&self, location: &Self::UniformLocation, value: Vec2);
    fn set_uniform_vec3(&self, location: &Self::UniformLocation, value: Vec3);
    fn set_uniform_vec4(&self, location: &Self::UniformLocation, value: Vec4);
    fn set_uniform_mat3(&self, location: &Self::UniformLocation, value: &Mat3);
    fn set_uniform_mat4(&self, location: &Self::UniformLocation, value: &Mat4);

    /// Enable or disable back-face culling.
    fn set_cull_enabled(&self, enabled: bool);
}

/// Compiled shader stage that is deleted when the guard goes out of scope
///
/// Stage objects are only needed until the program is linked, so the guards
/// are dropped at the end of variant construction whether linking succeeded
/// or not.
pub struct ShaderGuard<'a, D: RenderDevice + ?Sized> {
    device: &'a D,
    stage: ShaderType,
    shader: D::Shader,
}

impl<'a, D: RenderDevice + ?Sized> ShaderGuard<'a, D> {
    /// Compile a stage and take ownership of the result
    pub fn compile(device: &'a D, stage: ShaderType, name: &str, source: &str) -> Result<Self> {
        let shader = device.compile_shader(stage, name, source)?;
        Ok(Self { device, stage, shader })
    }

    pub fn stage(&self) -> ShaderType {
        self.stage
    }

    pub fn shader(&self) -> &D::Shader {
        &self.shader
    }
}

impl<D: RenderDevice + ?Sized> Drop for ShaderGuard<'_, D> {
    fn drop(&mut self) {
        self.device.delete_shader(&self.shader);
    }
}
