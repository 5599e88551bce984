//! Shader source registry

use super::ShaderConstants;
use crate::device::{RenderDevice, ShaderGuard, ShaderType};
use crate::{Error, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// `namespace:path` identifier of a shader source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId {
    pub namespace: &'static str,
    pub path: &'static str,
}

impl ShaderId {
    /// Built-in chunk vertex shader
    pub const CHUNK_VERTEX: ShaderId = ShaderId::new("chunk", "chunk_gl20.v.glsl");
    /// Built-in chunk fragment shader
    pub const CHUNK_FRAGMENT: ShaderId = ShaderId::new("chunk", "chunk_gl20.f.glsl");

    pub const fn new(namespace: &'static str, path: &'static str) -> Self {
        Self { namespace, path }
    }

    /// Label given to override-supplied sources of `stage`
    pub fn override_source(stage: ShaderType) -> ShaderId {
        match stage {
            ShaderType::Vertex => ShaderId::new("override", "terrain.vsh"),
            ShaderType::Geometry => ShaderId::new("override", "terrain.gsh"),
            ShaderType::Fragment => ShaderId::new("override", "terrain.fsh"),
        }
    }

    /// Built-in source for `stage`. There is no built-in geometry stage.
    pub fn builtin(stage: ShaderType) -> Option<ShaderId> {
        match stage {
            ShaderType::Vertex => Some(Self::CHUNK_VERTEX),
            ShaderType::Geometry => None,
            ShaderType::Fragment => Some(Self::CHUNK_FRAGMENT),
        }
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Registry of shader sources by id
///
/// [`ShaderLoader::builtin`] carries the default chunk shaders compiled into
/// the crate; hosts can replace or add sources with [`ShaderLoader::with_source`].
#[derive(Clone, Debug, Default)]
pub struct ShaderLoader {
    sources: HashMap<ShaderId, Cow<'static, str>>,
}

impl ShaderLoader {
    /// Loader with no sources at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loader with the embedded default chunk shaders
    pub fn builtin() -> Self {
        Self::empty()
            .with_source(ShaderId::CHUNK_VERTEX, CHUNK_VERTEX_SRC)
            .with_source(ShaderId::CHUNK_FRAGMENT, CHUNK_FRAGMENT_SRC)
    }

    pub fn with_source(mut self, id: ShaderId, source: impl Into<Cow<'static, str>>) -> Self {
        self.insert(id, source);
        self
    }

    pub fn insert(&mut self, id: ShaderId, source: impl Into<Cow<'static, str>>) {
        self.sources.insert(id, source.into());
    }

    pub fn source(&self, id: &ShaderId) -> Option<&str> {
        self.sources.get(id).map(|s| s.as_ref())
    }

    /// Preprocess and compile the source registered under `id`
    pub fn load<'a, D: RenderDevice + ?Sized>(
        &self,
        device: &'a D,
        stage: ShaderType,
        id: ShaderId,
        constants: &ShaderConstants,
    ) -> Result<ShaderGuard<'a, D>> {
        let source = self.source(&id).ok_or(Error::MissingSource { stage, id })?;
        let processed = constants.apply(source);
        log::trace!("Compiling {:?} shader {} ({} bytes)", stage, id, processed.len());
        ShaderGuard::compile(device, stage, &id.to_string(), &processed)
    }
}

const CHUNK_VERTEX_SRC: &str = include_str!("../../shaders/chunk_gl20.v.glsl");
const CHUNK_FRAGMENT_SRC: &str = include_str!("../../shaders/chunk_gl20.f.glsl");
