/*!
# GPU Core - OpenGL Driver Backend

OpenGL 4.5+ implementation of the `gpu_core` graphics driver boundary.

This crate provides `GlDriver`, which implements `GraphicsDriver` on top of
the `gl` crate's raw bindings using direct state access. Engine enumerations
are translated to native constants in `gl_translate`, and redundant program
and framebuffer binds are filtered by a small binding cache.

The caller owns the window and the GL context: the context must be current
on the thread that drives the `GpuContext` before `GlDriver::new` is called.
*/

mod gl_translate;
mod gl_binding_cache;
mod gl_driver;

pub use gl_driver::GlDriver;
