/// Content-addressed shader program cache
///
/// A program's id is the hash of its create-info (stage types, sources,
/// defines), so registering the same definition twice returns the same id
/// without recompiling. The manager also tracks the currently bound program
/// to skip redundant binds.

use rustc_hash::FxHashMap;

use crate::driver::SharedDriver;
use crate::error::Result;
use crate::shader::{ProgramId, ShaderProgram, ShaderProgramCreateInfo};
use crate::utils::lock;
use crate::{engine_assert, engine_debug, engine_trace};

const SOURCE: &str = "gpu::ShaderManager";

pub struct ShaderManager {
    driver: SharedDriver,
    programs: FxHashMap<ProgramId, ShaderProgram>,
    bound_program: u32,
}

impl ShaderManager {
    pub fn new(driver: SharedDriver) -> Self {
        engine_debug!(SOURCE, "Shader manager initialized");
        Self {
            driver,
            programs: FxHashMap::default(),
            bound_program: 0,
        }
    }

    /// Compile and link a program, or return the id of the identical one already registered
    ///
    /// # Errors
    ///
    /// Compilation and link failures are returned (and logged); nothing is registered.
    pub fn register_shader_program(&mut self, info: &ShaderProgramCreateInfo) -> Result<ProgramId> {
        let id = info.content_id();
        if self.programs.contains_key(&id) {
            engine_trace!(SOURCE, "Program '{}' already registered as {}", info.debug_name, id);
            return Ok(id);
        }

        let mut program = ShaderProgram::new(self.driver.clone(), id);
        program.set_debug_name(info.debug_name);
        program.create(info)?;

        self.programs.insert(id, program);
        Ok(id)
    }

    /// Destroy a program, `false` if the id is not registered
    pub fn unregister_shader_program(&mut self, id: ProgramId) -> bool {
        let Some(mut program) = self.programs.remove(&id) else {
            return false;
        };
        if program.native_handle() == self.bound_program {
            self.bound_program = 0;
        }
        program.destroy();
        true
    }

    pub fn program(&self, id: ProgramId) -> Option<&ShaderProgram> {
        self.programs.get(&id)
    }

    pub fn program_mut(&mut self, id: ProgramId) -> Option<&mut ShaderProgram> {
        self.programs.get_mut(&id)
    }

    /// Whether `id` names a registered, linked program
    pub fn contains(&self, id: ProgramId) -> bool {
        self.programs.get(&id).is_some_and(ShaderProgram::is_valid)
    }

    /// Make the program current, skipping the driver call if it already is
    pub fn bind_program(&mut self, id: ProgramId) {
        let handle = match self.programs.get(&id) {
            Some(program) if program.is_valid() => program.native_handle(),
            _ => 0,
        };
        engine_assert!(handle != 0, SOURCE, "Binding unknown or invalid program {}", id);

        if handle != self.bound_program {
            lock(&self.driver).use_program(handle);
            self.bound_program = handle;
        }
    }

    /// Forget the cached binding, forcing the next bind to reach the driver
    ///
    /// Call after anything outside the manager changed the current program.
    pub fn invalidate_bound_program(&mut self) {
        self.bound_program = 0;
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Destroy every program
    pub fn terminate(&mut self) {
        self.programs.clear();
        self.bound_program = 0;
        engine_debug!(SOURCE, "Shader manager terminated");
    }
}

impl Drop for ShaderManager {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "shader_manager_tests.rs"]
mod tests;
