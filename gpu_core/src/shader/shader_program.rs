/// Shader programs compiled and linked from one or more stages
///
/// Stages only exist during `ShaderProgram::create`: they are compiled,
/// attached, linked, then detached and deleted whatever the outcome. A program
/// is valid iff linking succeeded.

use std::fmt;

use crate::driver::{GraphicsDriver, SharedDriver};
use crate::error::{Error, Result};
use crate::shader::{preprocess_source, UniformStorage, UniformValue};
use crate::utils::{lock, HashCombiner};
use crate::{engine_assert, engine_debug, engine_error, engine_warn};

const SOURCE: &str = "gpu::ShaderManager";

/// Shader stage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStageType {
    Vertex,
    /// Fragment stage
    Pixel,
}

impl ShaderStageType {
    /// Number of stage types, the maximum number of stages in a program
    pub const COUNT: usize = 2;
}

/// One compilation unit of a program
#[derive(Debug, Clone, Copy)]
pub struct ShaderStageCreateInfo<'a> {
    pub stage_type: ShaderStageType,
    /// Pre-resolved source text (includes already expanded)
    pub source: &'a str,
    /// Preprocessor symbols, each emitted as `#define <entry>`
    pub defines: &'a [&'a str],
}

/// Full program description
#[derive(Debug, Clone, Copy)]
pub struct ShaderProgramCreateInfo<'a> {
    pub stages: &'a [ShaderStageCreateInfo<'a>],
    /// Debug name, not part of the program identity
    pub debug_name: &'a str,
}

impl ShaderProgramCreateInfo<'_> {
    /// Content-derived identity: stage types, source bytes and defines, in order
    pub fn content_id(&self) -> ProgramId {
        let mut hasher = HashCombiner::new();
        hasher.add(&self.stages.len());
        for stage in self.stages {
            hasher.add(&stage.stage_type).add(stage.source).add(&stage.defines.len());
            for define in stage.defines {
                hasher.add(*define);
            }
        }
        match hasher.finish() {
            0 => ProgramId(1),
            hash => ProgramId(hash),
        }
    }
}

/// Content-addressed program identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramId(u64);

impl ProgramId {
    pub const INVALID: Self = Self(0);

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Linked shader program
pub struct ShaderProgram {
    driver: SharedDriver,
    id: ProgramId,
    handle: u32,
    uniforms: UniformStorage,
    #[cfg(debug_assertions)]
    debug_name: String,
}

impl ShaderProgram {
    pub(crate) fn new(driver: SharedDriver, id: ProgramId) -> Self {
        Self {
            driver,
            id,
            handle: 0,
            uniforms: UniformStorage::default(),
            #[cfg(debug_assertions)]
            debug_name: String::new(),
        }
    }

    /// Compile every stage, then link
    ///
    /// # Errors
    ///
    /// `ShaderCompilationFailed` on an empty source or a compiler error,
    /// `ShaderLinkFailed` on a linker error. The program stays invalid and no
    /// native object survives.
    pub fn create(&mut self, info: &ShaderProgramCreateInfo) -> Result<()> {
        engine_assert!(!self.is_valid(), SOURCE, "Program {} is already created", self.id);
        engine_assert!(!info.stages.is_empty(), SOURCE, "Program '{}' has no stages", info.debug_name);
        engine_assert!(
            info.stages.len() <= ShaderStageType::COUNT,
            SOURCE,
            "Program '{}' has {} stages, at most {} allowed",
            info.debug_name, info.stages.len(), ShaderStageType::COUNT
        );
        for (index, stage) in info.stages.iter().enumerate() {
            engine_assert!(
                info.stages[..index].iter().all(|other| other.stage_type != stage.stage_type),
                SOURCE,
                "Program '{}' has more than one {:?} stage",
                info.debug_name, stage.stage_type
            );
        }

        let mut sources = Vec::with_capacity(info.stages.len());
        for stage in info.stages {
            if stage.source.is_empty() {
                engine_warn!(SOURCE, "Program '{}': empty {:?} stage source", info.debug_name, stage.stage_type);
                return Err(Error::ShaderCompilationFailed(format!("empty {:?} stage source", stage.stage_type)));
            }
            sources.push(preprocess_source(stage.source, stage.defines));
        }

        let mut guard = lock(&self.driver);
        let driver: &mut dyn GraphicsDriver = &mut *guard;

        let mut stage_handles = Vec::with_capacity(info.stages.len());
        for (stage, source) in info.stages.iter().zip(&sources) {
            match compile_stage(driver, stage.stage_type, source) {
                Ok(handle) => stage_handles.push(handle),
                Err(log) => {
                    for handle in stage_handles {
                        driver.delete_shader(handle);
                    }
                    drop(guard);
                    engine_error!(
                        SOURCE,
                        "Program '{}': {:?} stage failed to compile:\n{}",
                        info.debug_name, stage.stage_type, log
                    );
                    return Err(Error::ShaderCompilationFailed(log));
                }
            }
        }

        let program = driver.create_program();
        for &handle in &stage_handles {
            driver.attach_shader(program, handle);
        }
        driver.link_program(program);
        let linked = driver.program_link_status(program);

        for handle in stage_handles {
            driver.detach_shader(program, handle);
            driver.delete_shader(handle);
        }

        if !linked {
            let log = driver.program_info_log(program);
            driver.delete_program(program);
            drop(guard);
            engine_error!(SOURCE, "Program '{}' failed to link:\n{}", info.debug_name, log);
            return Err(Error::ShaderLinkFailed(log));
        }

        let uniforms = UniformStorage::from_active(driver.active_uniforms(program));
        drop(guard);

        self.handle = program;
        self.uniforms = uniforms;
        self.apply_debug_label();
        engine_debug!(SOURCE, "Program '{}' ({}) linked, {} uniform(s)", info.debug_name, self.id, self.uniforms.len());
        Ok(())
    }

    /// Delete the native program; no-op if not valid
    pub fn destroy(&mut self) {
        if !self.is_valid() {
            return;
        }
        lock(&self.driver).delete_program(self.handle);
        self.handle = 0;
        self.uniforms = UniformStorage::default();
    }

    /// Write a uniform by name without binding the program
    ///
    /// Returns `false` (with a warning) if the program has no such uniform or
    /// the value type does not match the declared type.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) -> bool {
        engine_assert!(self.is_valid(), SOURCE, "Setting uniform '{}' on invalid program {}", name, self.id);
        let value = value.into();

        let Some(uniform) = self.uniforms.find(name) else {
            engine_warn!(SOURCE, "Program {} has no active uniform '{}'", self.id, name);
            return false;
        };
        if !value.is_compatible_with(uniform.uniform_type) {
            engine_warn!(
                SOURCE,
                "Uniform '{}' of program {} is {:?}, got {:?}",
                name, self.id, uniform.uniform_type, value
            );
            return false;
        }

        lock(&self.driver).program_uniform(self.handle, uniform.location, &value);
        true
    }

    pub fn is_valid(&self) -> bool {
        self.handle != 0
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn native_handle(&self) -> u32 {
        self.handle
    }

    pub fn uniforms(&self) -> &UniformStorage {
        &self.uniforms
    }

    // ===== Debug name =====

    #[cfg(debug_assertions)]
    pub fn set_debug_name(&mut self, name: &str) {
        self.debug_name = name.to_string();
        self.apply_debug_label();
    }

    /// Set the debug name (compiled out in release builds)
    #[cfg(not(debug_assertions))]
    pub fn set_debug_name(&mut self, _name: &str) {}

    #[cfg(debug_assertions)]
    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    /// Debug name, always empty in release builds
    #[cfg(not(debug_assertions))]
    pub fn debug_name(&self) -> &str {
        ""
    }

    #[cfg(debug_assertions)]
    fn apply_debug_label(&self) {
        if self.handle != 0 && !self.debug_name.is_empty() {
            lock(&self.driver).object_label(crate::driver::ObjectKind::Program, self.handle, &self.debug_name);
        }
    }

    #[cfg(not(debug_assertions))]
    fn apply_debug_label(&self) {}
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Compile one stage, returning its handle or the compiler log
///
/// A failed stage is deleted before returning.
fn compile_stage(driver: &mut dyn GraphicsDriver, stage_type: ShaderStageType, source: &str) -> std::result::Result<u32, String> {
    let handle = driver.create_shader(stage_type);
    driver.shader_source(handle, source);
    driver.compile_shader(handle);
    if driver.shader_compile_status(handle) {
        Ok(handle)
    } else {
        let log = driver.shader_info_log(handle);
        driver.delete_shader(handle);
        Err(log)
    }
}
