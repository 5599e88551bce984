//! Recording device and scripted pipeline used by the unit tests

use crate::device::{AttributeBinding, RenderDevice, ShaderStages, ShaderType};
use crate::overrides::{
    PipelineProvider, ProgramSamplers, ProgramUniforms, ShaderOverride, TerrainDrawKind, TerrainPipeline,
};
use crate::{Error, Result};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    CompileShader { id: u32, stage: ShaderType, name: String },
    DeleteShader(u32),
    LinkProgram { id: u32, name: String },
    DeleteProgram(u32),
    BindProgram(Option<u32>),
    SetUniform { program: Option<u32>, name: String, value: UniformValue },
    SetCull(bool),
}

#[derive(Debug, Clone)]
pub struct ShaderRecord {
    pub stage: ShaderType,
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone)]
pub struct ProgramRecord {
    pub name: String,
    pub stages: ShaderStages,
    pub shaders: Vec<ShaderRecord>,
    pub attributes: Vec<AttributeBinding>,
}

#[derive(Default)]
struct DeviceState {
    next_id: u32,
    shaders: HashMap<u32, ShaderRecord>,
    live_shaders: HashSet<u32>,
    programs: HashMap<u32, ProgramRecord>,
    live_programs: HashSet<u32>,
    deleted_programs: Vec<u32>,
    bound: Option<u32>,
    events: Vec<DeviceEvent>,
    fail_compile: Option<String>,
    fail_link: Option<String>,
}

/// In-memory device that records every call
#[derive(Default)]
pub struct RecordingDevice {
    state: RefCell<DeviceState>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any compile whose source contains `needle`
    pub fn fail_compile_containing(&self, needle: &str) {
        self.state.borrow_mut().fail_compile = Some(needle.to_string());
    }

    /// Fail any link whose program name contains `needle`
    pub fn fail_link_named(&self, needle: &str) {
        self.state.borrow_mut().fail_link = Some(needle.to_string());
    }

    pub fn events(&self) -> Vec<DeviceEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().live_shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().live_programs.len()
    }

    pub fn deleted_programs(&self) -> Vec<u32> {
        self.state.borrow().deleted_programs.clone()
    }

    pub fn program(&self, id: u32) -> ProgramRecord {
        self.state.borrow().programs[&id].clone()
    }

    pub fn bound_program(&self) -> Option<u32> {
        self.state.borrow().bound
    }

    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::SetUniform { name: n, value, .. } if n == name => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cull_changes(&self) -> Vec<bool> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                DeviceEvent::SetCull(enabled) => Some(*enabled),
                _ => None,
            })
            .collect()
    }

    fn record_uniform(&self, location: &MockLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let program = state.bound;
        state.events.push(DeviceEvent::SetUniform {
            program,
            name: location.name.clone(),
            value,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockLocation {
    pub program: u32,
    pub name: String,
}

impl RenderDevice for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockLocation;

    fn compile_shader(&self, stage: ShaderType, name: &str, source: &str) -> Result<u32> {
        let mut state = self.state.borrow_mut();
        if let Some(needle) = &state.fail_compile {
            if source.contains(needle.as_str()) {
                return Err(Error::Compile {
                    name: name.to_string(),
                    stage,
                    log: format!("0:1: syntax error near '{needle}'"),
                });
            }
        }
        state.next_id += 1;
        let id = state.next_id;
        state.shaders.insert(
            id,
            ShaderRecord {
                stage,
                name: name.to_string(),
                source: source.to_string(),
            },
        );
        state.live_shaders.insert(id);
        state.events.push(DeviceEvent::CompileShader {
            id,
            stage,
            name: name.to_string(),
        });
        Ok(id)
    }

    fn delete_shader(&self, shader: &u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_shaders.remove(shader), "shader {shader} deleted twice");
        state.events.push(DeviceEvent::DeleteShader(*shader));
    }

    fn link_program(&self, name: &str, shaders: &[&u32], attributes: &[AttributeBinding]) -> Result<u32> {
        let mut state = self.state.borrow_mut();
        if let Some(needle) = &state.fail_link {
            if name.contains(needle.as_str()) {
                return Err(Error::Link {
                    name: name.to_string(),
                    log: "error: unresolved varying".to_string(),
                });
            }
        }
        let records: Vec<ShaderRecord> = shaders
            .iter()
            .map(|id| {
                assert!(state.live_shaders.contains(*id), "linking deleted shader {id}");
                state.shaders[*id].clone()
            })
            .collect();
        let stages = records.iter().fold(ShaderStages::empty(), |acc, r| acc | r.stage.stage());

        state.next_id += 1;
        let id = state.next_id;
        state.programs.insert(
            id,
            ProgramRecord {
                name: name.to_string(),
                stages,
                shaders: records,
                attributes: attributes.to_vec(),
            },
        );
        state.live_programs.insert(id);
        state.events.push(DeviceEvent::LinkProgram {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    fn delete_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.live_programs.remove(program), "program {program} deleted twice");
        state.deleted_programs.push(*program);
        state.events.push(DeviceEvent::DeleteProgram(*program));
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<MockLocation> {
        Some(MockLocation {
            program: *program,
            name: name.to_string(),
        })
    }

    fn bind_program(&self, program: Option<&u32>) {
        let mut state = self.state.borrow_mut();
        state.bound = program.copied();
        state.events.push(DeviceEvent::BindProgram(program.copied()));
    }

    fn set_uniform_i32(&self, location: &MockLocation, value: i32) {
        self.record_uniform(location, UniformValue::I32(value));
    }

    fn set_uniform_f32(&self, location: &MockLocation, value: f32) {
        self.record_uniform(location, UniformValue::F32(value));
    }

    fn set_uniform_vec2(&self, location: &MockLocation, value: Vec2) {
        self.record_uniform(location, UniformValue::Vec2(value));
    }

    fn set_uniform_vec3(&self, location: &MockLocation, value: Vec3) {
        self.record_uniform(location, UniformValue::Vec3(value));
    }

    fn set_uniform_vec4(&self, location: &MockLocation, value: Vec4) {
        self.record_uniform(location, UniformValue::Vec4(value));
    }

    fn set_uniform_mat3(&self, location: &MockLocation, value: &Mat3) {
        self.record_uniform(location, UniformValue::Mat3(*value));
    }

    fn set_uniform_mat4(&self, location: &MockLocation, value: &Mat4) {
        self.record_uniform(location, UniformValue::Mat4(*value));
    }

    fn set_cull_enabled(&self, enabled: bool) {
        self.state.borrow_mut().events.push(DeviceEvent::SetCull(enabled));
    }
}

/// Override pipeline serving fixed sources and counting uniform updates
#[derive(Default)]
pub struct ScriptedPipeline {
    sources: HashMap<(TerrainDrawKind, ShaderType), String>,
    pub initialized: Mutex<Vec<String>>,
    pub shadow_samplers: Mutex<Vec<String>>,
    pub terrain_samplers: Mutex<Vec<String>>,
    pub updates: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, kind: TerrainDrawKind, stage: ShaderType, source: &str) -> Self {
        self.sources.insert((kind, stage), source.to_string());
        self
    }
}

struct RecordedUpdate {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl ProgramUniforms<RecordingDevice> for RecordedUpdate {
    fn update(&self, _device: &RecordingDevice) {
        self.log.lock().unwrap().push(format!("uniforms:{}", self.label));
    }
}

impl ProgramSamplers<RecordingDevice> for RecordedUpdate {
    fn update(&self, _device: &RecordingDevice) {
        self.log.lock().unwrap().push(format!("samplers:{}", self.label));
    }
}

impl TerrainPipeline<RecordingDevice> for ScriptedPipeline {
    fn shader_source(&self, kind: TerrainDrawKind, stage: ShaderType) -> Option<String> {
        self.sources.get(&(kind, stage)).cloned()
    }

    fn init_uniforms(
        &self,
        _device: &RecordingDevice,
        _program: &u32,
        name: &str,
    ) -> Box<dyn ProgramUniforms<RecordingDevice>> {
        self.initialized.lock().unwrap().push(name.to_string());
        Box::new(RecordedUpdate {
            label: name.to_string(),
            log: self.updates.clone(),
        })
    }

    fn init_terrain_samplers(
        &self,
        _device: &RecordingDevice,
        _program: &u32,
        name: &str,
    ) -> Box<dyn ProgramSamplers<RecordingDevice>> {
        self.terrain_samplers.lock().unwrap().push(name.to_string());
        Box::new(RecordedUpdate {
            label: name.to_string(),
            log: self.updates.clone(),
        })
    }

    fn init_shadow_samplers(
        &self,
        _device: &RecordingDevice,
        _program: &u32,
        name: &str,
    ) -> Box<dyn ProgramSamplers<RecordingDevice>> {
        self.shadow_samplers.lock().unwrap().push(name.to_string());
        Box::new(RecordedUpdate {
            label: name.to_string(),
            log: self.updates.clone(),
        })
    }
}

/// Shared knobs for [`ScriptedProvider`], kept by the test after the
/// provider moves into the backend
#[derive(Default)]
pub struct ProviderState {
    pub pipeline: RefCell<Option<Arc<ScriptedPipeline>>>,
    pub reload_needed: Cell<bool>,
    pub reload_clears: Cell<usize>,
    pub shadows: Cell<bool>,
    pub active_uniform_clears: Cell<usize>,
}

pub struct ScriptedProvider {
    pub state: Rc<ProviderState>,
}

impl ScriptedProvider {
    pub fn new() -> (Self, Rc<ProviderState>) {
        let state = Rc::new(ProviderState::default());
        (Self { state: state.clone() }, state)
    }
}

impl PipelineProvider<RecordingDevice> for ScriptedProvider {
    fn shader_override(&self) -> ShaderOverride<RecordingDevice> {
        match self.state.pipeline.borrow().as_ref() {
            Some(pipeline) => ShaderOverride::Enabled(pipeline.clone()),
            None => ShaderOverride::Disabled,
        }
    }

    fn is_reload_needed(&self) -> bool {
        self.state.reload_needed.get()
    }

    fn clear_reload_needed(&mut self) {
        self.state.reload_needed.set(false);
        self.state.reload_clears.set(self.state.reload_clears.get() + 1);
    }

    fn shadows_being_rendered(&self) -> bool {
        self.state.shadows.get()
    }

    fn clear_active_uniforms(&mut self) {
        self.state
            .active_uniform_clears
            .set(self.state.active_uniform_clears.get() + 1);
    }
}
