//! OpenGL [`RenderDevice`] for the chunk shader cache, on top of `glow`
//!
//! The device assumes its context is current on the calling thread for every
//! call; it never makes a context current itself.

use chunk_shader::device::AttributeBinding;
use chunk_shader::{Error, RenderDevice, Result, ShaderType};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

/// GL enum for a shader stage
pub fn gl_shader_type(stage: ShaderType) -> u32 {
    match stage {
        ShaderType::Vertex => glow::VERTEX_SHADER,
        ShaderType::Geometry => glow::GEOMETRY_SHADER,
        ShaderType::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Render device backed by a `glow` context
pub struct GlDevice {
    gl: glow::Context,
}

impl GlDevice {
    pub fn new(gl: glow::Context) -> Self {
        log::info!("OpenGL chunk device: {}", gl_version(&gl));
        Self { gl }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn into_inner(self) -> glow::Context {
        self.gl
    }
}

fn gl_version(gl: &glow::Context) -> String {
    let version = gl.version();
    format!("{}.{}{}", version.major, version.minor, if version.is_embedded { " ES" } else { "" })
}

impl RenderDevice for GlDevice {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn compile_shader(&self, stage: ShaderType, name: &str, source: &str) -> Result<glow::Shader> {
        let gl = &self.gl;
        unsafe {
            let shader = gl
                .create_shader(gl_shader_type(stage))
                .map_err(|e| Error::Device(format!("glCreateShader failed for '{name}': {e}")))?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(Error::Compile {
                    name: name.to_string(),
                    stage,
                    log,
                });
            }

            let log = gl.get_shader_info_log(shader);
            if !log.trim().is_empty() {
                log::warn!("Shader '{}' compiled with warnings: {}", name, log.trim());
            }
            Ok(shader)
        }
    }

    fn delete_shader(&self, shader: &glow::Shader) {
        unsafe { self.gl.delete_shader(*shader) }
    }

    fn link_program(
        &self,
        name: &str,
        shaders: &[&glow::Shader],
        attributes: &[AttributeBinding],
    ) -> Result<glow::Program> {
        let gl = &self.gl;
        unsafe {
            let program = gl
                .create_program()
                .map_err(|e| Error::Device(format!("glCreateProgram failed for '{name}': {e}")))?;

            for shader in shaders {
                gl.attach_shader(program, **shader);
            }
            for attribute in attributes {
                gl.bind_attrib_location(program, attribute.index, attribute.name);
            }
            gl.link_program(program);

            let linked = gl.get_program_link_status(program);
            let log = gl.get_program_info_log(program);
            for shader in shaders {
                gl.detach_shader(program, **shader);
            }

            if !linked {
                gl.delete_program(program);
                return Err(Error::Link {
                    name: name.to_string(),
                    log,
                });
            }
            if !log.trim().is_empty() {
                log::warn!("Program '{}' linked with warnings: {}", name, log.trim());
            }
            Ok(program)
        }
    }

    fn delete_program(&self, program: &glow::Program) {
        unsafe { self.gl.delete_program(*program) }
    }

    fn uniform_location(&self, program: &glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(*program, name) }
    }

    fn bind_program(&self, program: Option<&glow::Program>) {
        unsafe { self.gl.use_program(program.copied()) }
    }

    fn set_uniform_i32(&self, location: &glow::UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), value) }
    }

    fn set_uniform_f32(&self, location: &glow::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn set_uniform_vec2(&self, location: &glow::UniformLocation, value: Vec2) {
        unsafe { self.gl.uniform_2_f32(Some(location), value.x, value.y) }
    }

    fn set_uniform_vec3(&self, location: &glow::UniformLocation, value: Vec3) {
        unsafe { self.gl.uniform_3_f32(Some(location), value.x, value.y, value.z) }
    }

    fn set_uniform_vec4(&self, location: &glow::UniformLocation, value: Vec4) {
        unsafe { self.gl.uniform_4_f32(Some(location), value.x, value.y, value.z, value.w) }
    }

    fn set_uniform_mat3(&self, location: &glow::UniformLocation, value: &Mat3) {
        unsafe {
            self.gl
                .uniform_matrix_3_f32_slice(Some(location), false, &value.to_cols_array())
        }
    }

    fn set_uniform_mat4(&self, location: &glow::UniformLocation, value: &Mat4) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array())
        }
    }

    fn set_cull_enabled(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::CULL_FACE);
            } else {
                self.gl.disable(glow::CULL_FACE);
            }
        }
    }
}
