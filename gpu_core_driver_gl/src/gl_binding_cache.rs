/// Redundant-bind filter for the GL driver
///
/// Tracks the current program and framebuffer so repeated binds of the
/// same object skip the native call. `None` means the binding is unknown and
/// the next bind always goes through.

#[derive(Debug, Default)]
pub(crate) struct BindingCache {
    program: Option<u32>,
    framebuffer: Option<u32>,
}

impl BindingCache {
    /// Record a program bind, `true` if the native call is needed
    pub(crate) fn bind_program(&mut self, program: u32) -> bool {
        Self::bind(&mut self.program, program)
    }

    /// Forget a deleted program so a recycled name is bound again
    pub(crate) fn program_deleted(&mut self, program: u32) {
        if self.program == Some(program) {
            self.program = None;
        }
    }

    /// Record a framebuffer bind, `true` if the native call is needed
    pub(crate) fn bind_framebuffer(&mut self, framebuffer: u32) -> bool {
        Self::bind(&mut self.framebuffer, framebuffer)
    }

    /// Deleting the bound framebuffer reverts the binding to the default one
    pub(crate) fn framebuffer_deleted(&mut self, framebuffer: u32) {
        if self.framebuffer == Some(framebuffer) {
            self.framebuffer = Some(0);
        }
    }

    /// Whether the default framebuffer is known to be bound for drawing
    pub(crate) fn default_framebuffer_bound(&self) -> bool {
        self.framebuffer == Some(0)
    }

    fn bind(slot: &mut Option<u32>, handle: u32) -> bool {
        if *slot == Some(handle) {
            return false;
        }
        *slot = Some(handle);
        true
    }
}

#[cfg(test)]
#[path = "gl_binding_cache_tests.rs"]
mod tests;
