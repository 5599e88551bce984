//! Preprocessor constants injected into GLSL sources

/// Value of a preprocessor define
#[derive(Clone, Debug, PartialEq)]
pub enum ShaderDefine {
    /// `#define NAME`
    Flag,
    U32(u32),
    F32(f32),
}

/// Ordered set of preprocessor defines
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderConstants {
    defines: Vec<(String, ShaderDefine)>,
}

impl ShaderConstants {
    pub fn builder() -> ShaderConstantsBuilder {
        ShaderConstantsBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// One `#define` line per constant, in insertion order
    pub fn define_strings(&self) -> Vec<String> {
        self.defines
            .iter()
            .map(|(name, value)| match value {
                ShaderDefine::Flag => format!("#define {name}"),
                ShaderDefine::U32(v) => format!("#define {name} {v}"),
                // Debug keeps the decimal point on whole numbers
                ShaderDefine::F32(v) => format!("#define {name} {v:?}"),
            })
            .collect()
    }

    /// Insert the defines directly after the `#version` directive.
    ///
    /// GLSL requires `#version` to come first, so a source without one gets
    /// the defines prepended instead.
    pub fn apply(&self, source: &str) -> String {
        let defines = self.define_strings();
        let extra: usize = defines.iter().map(|d| d.len() + 1).sum();
        let mut result = String::with_capacity(source.len() + extra + 1);

        if !source.lines().any(|line| line.starts_with("#version")) {
            for define in &defines {
                result.push_str(define);
                result.push('\n');
            }
            result.push_str(source);
            return result;
        }

        let mut patched = false;
        for line in source.lines() {
            result.push_str(line);
            result.push('\n');

            if !patched && line.starts_with("#version") {
                for define in &defines {
                    result.push_str(define);
                    result.push('\n');
                }
                patched = true;
            }
        }

        result
    }
}

/// Builder for [`ShaderConstants`]
#[derive(Default)]
pub struct ShaderConstantsBuilder {
    defines: Vec<(String, ShaderDefine)>,
}

impl ShaderConstantsBuilder {
    /// Add a valueless define
    pub fn add(self, name: impl Into<String>) -> Self {
        self.add_value(name, ShaderDefine::Flag)
    }

    /// Add a define, replacing an earlier one with the same name
    pub fn add_value(mut self, name: impl Into<String>, value: ShaderDefine) -> Self {
        let name = name.into();
        match self.defines.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.defines.push((name, value)),
        }
        self
    }

    pub fn build(self) -> ShaderConstants {
        ShaderConstants { defines: self.defines }
    }
}
